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
use awsign_core::{Context, OsEnv, Signer};
use awsign_http_send_reqwest::ReqwestHttpSend;
use serde_json::json;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    // Create context
    let ctx = Context::new()
        .with_http_send(ReqwestHttpSend::default())
        .with_env(OsEnv);

    // Region and endpoint come from AWS_REGION / AWS_ENDPOINT_URL
    let config = Config::default().from_env(&ctx);
    if config.region.is_none() {
        eprintln!("Set AWS_REGION to run this example");
        return Ok(());
    }

    // Credentials come from AWS_ACCESS_KEY_ID / AWS_SECRET_ACCESS_KEY
    let signer = Signer::new(ctx, EnvCredentialProvider::new(), RequestSigner::new());
    let dynamodb = DynamoDb::new(signer, config);

    let table = std::env::var("DYNAMODB_TABLE").unwrap_or_else(|_| "UserWords".to_string());

    println!("Example 1: PutItem into {table}");
    let resp = dynamodb
        .command(
            "PutItem",
            &json!({
                "TableName": table,
                "Item": {
                    "UserId": {"S": "01dbe510-9091-7005-7e37-421c7ea0a562"},
                    "Word": {"S": "en#otherwords"},
                    "Status": {"N": "0"}
                }
            }),
        )
        .await?;
    println!("Response status: {}", resp.status());
    println!("Body: {}", serde_json::to_string_pretty(resp.body())?);

    println!("\nExample 2: Query {table}");
    let resp = dynamodb
        .command(
            "Query",
            &json!({
                "TableName": table,
                "KeyConditionExpression": "UserId = :userId AND begins_with(Word, :lang)",
                "ExpressionAttributeValues": {
                    ":userId": {"S": "01dbe510-9091-7005-7e37-421c7ea0a562"},
                    ":lang": {"S": "en#"}
                }
            }),
        )
        .await?;
    println!("Response status: {}", resp.status());
    println!("Body: {}", serde_json::to_string_pretty(resp.body())?);

    Ok(())
}
