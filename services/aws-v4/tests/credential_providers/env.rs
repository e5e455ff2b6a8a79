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
use awsign_aws_v4::{Config, DynamoDb, EnvCredentialProvider, RequestSigner};
use awsign_core::{Context, ErrorKind, Signer, SigningRequest, StaticEnv};
use http::Method;
use serde_json::json;
use std::collections::HashMap;

fn context(envs: &[(&str, &str)]) -> Context {
    Context::new().with_env(StaticEnv {
        envs: envs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>(),
    })
}

#[tokio::test]
async fn test_sign_with_env_credential_and_region() -> Result<()> {
    let ctx = context(&[
        ("AWS_ACCESS_KEY_ID", "ASIAENVEXAMPLE"),
        ("AWS_SECRET_ACCESS_KEY", "env_secret_access_key"),
        ("AWS_SESSION_TOKEN", "env_session_token"),
        ("AWS_DEFAULT_REGION", "eu-central-1"),
    ]);
    let config = Config::default().from_env(&ctx);
    let signer = Signer::new(ctx, EnvCredentialProvider::new(), RequestSigner::new());

    let req = DynamoDb::new(signer.clone(), config)
        .build_request("Query".parse()?, &json!({"TableName": "UserWords"}))?;
    let signed = signer.sign(&req).await?;

    assert_eq!(signed.region, "eu-central-1");
    assert_eq!(
        signed.header("x-amz-security-token"),
        Some("env_session_token")
    );
    assert!(signed
        .header("authorization")
        .unwrap()
        .contains("Credential=ASIAENVEXAMPLE/"));
    Ok(())
}

#[tokio::test]
async fn test_sign_without_env_credential() {
    let signer = Signer::new(
        context(&[]),
        EnvCredentialProvider::new(),
        RequestSigner::new(),
    );
    let req = SigningRequest::new(Method::GET, "iam.amazonaws.com", "us-east-1", "iam");

    let err = signer.sign(&req).await.expect_err("must fail");
    assert_eq!(err.kind(), ErrorKind::CredentialMissing);
}
