// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use anyhow::Result;
use awsign_aws_v4::{CognitoIdentityCredentialProvider, Config, Lambda, RequestSigner};
use awsign_core::{Context, OsEnv, Signer};
use awsign_http_send_reqwest::ReqwestHttpSend;
use http::Method;
use serde_json::json;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let (Ok(url), Ok(pool_id)) = (
        std::env::var("LAMBDA_FUNCTION_URL"),
        std::env::var("COGNITO_IDENTITY_POOL_ID"),
    ) else {
        eprintln!("Set LAMBDA_FUNCTION_URL and COGNITO_IDENTITY_POOL_ID to run this example");
        return Ok(());
    };

    let ctx = Context::new()
        .with_http_send(ReqwestHttpSend::default())
        .with_env(OsEnv);
    let config = Config::default().from_env(&ctx);

    // Unauthenticated cognito identity, the function URL host gives the region.
    let provider = CognitoIdentityCredentialProvider::new().with_identity_pool_id(pool_id);
    let signer = Signer::new(ctx, provider, RequestSigner::new());

    let payload = json!({"word": "otherwords", "lang": "en"});
    let resp = Lambda::new(signer, config)
        .invoke(&url, Method::POST, &payload)
        .await?;

    println!("Response status: {}", resp.status());
    println!("Body: {}", resp.body());
    Ok(())
}
