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

use crate::signing::signer;
use crate::MockHttpSend;
use anyhow::Result;
use awsign_aws_v4::{Config, DynamoDb, DynamoDbOperation};
use awsign_core::{Context, ErrorKind};
use http::{Method, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn put_item_params() -> Value {
    json!({
        "TableName": "UserWords",
        "Item": {
            "UserId": {"S": "01dbe510-9091-7005-7e37-421c7ea0a562"},
            "Word": {"S": "en#otherwords"},
            "Status": {"N": "0"}
        }
    })
}

#[tokio::test]
async fn test_put_item_request_on_the_wire() -> Result<()> {
    let http = MockHttpSend::new(StatusCode::OK, "{}");
    let client = DynamoDb::new(
        signer(Context::new().with_http_send(http.clone())),
        Config::default().with_region("us-east-2"),
    );

    let resp = client.command("PutItem", &put_item_params()).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.body(), &json!({}));
    assert_eq!(resp.headers()["x-amzn-requestid"], "mock-request-id");

    let reqs = http.requests();
    assert_eq!(reqs.len(), 1);
    let req = &reqs[0];
    assert_eq!(req.method(), Method::POST);
    assert_eq!(
        req.uri().to_string(),
        "https://dynamodb.us-east-2.amazonaws.com/"
    );
    assert_eq!(req.headers()["content-type"], "application/x-amz-json-1.0");
    assert_eq!(req.headers()["x-amz-target"], "DynamoDB_20120810.PutItem");
    assert_eq!(req.headers()["host"], "dynamodb.us-east-2.amazonaws.com");

    let authorization = req.headers()["authorization"].to_str()?;
    assert!(authorization.starts_with(
        "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20150830/us-east-2/dynamodb/aws4_request, \
         SignedHeaders=content-type;host;x-amz-content-sha256;x-amz-date;x-amz-target, "
    ));
    assert_eq!(
        serde_json::from_slice::<Value>(req.body())?,
        put_item_params()
    );
    Ok(())
}

#[tokio::test]
async fn test_error_response_is_returned() -> Result<()> {
    let http = MockHttpSend::new(
        StatusCode::BAD_REQUEST,
        r#"{"__type":"com.amazonaws.dynamodb.v20120810#ResourceNotFoundException","message":"Requested resource not found"}"#,
    );
    let client = DynamoDb::new(
        signer(Context::new().with_http_send(http)),
        Config::default().with_region("us-east-2"),
    );

    let resp = client
        .execute(DynamoDbOperation::GetItem, &json!({"TableName": "Missing"}))
        .await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(resp.body()["message"], "Requested resource not found");
    Ok(())
}

#[tokio::test]
async fn test_non_json_response() {
    let http = MockHttpSend::new(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
    let client = DynamoDb::new(
        signer(Context::new().with_http_send(http)),
        Config::default().with_region("us-east-2"),
    );

    let err = client
        .execute(DynamoDbOperation::Scan, &json!({"TableName": "UserWords"}))
        .await
        .expect_err("must fail");
    assert_eq!(err.kind(), ErrorKind::Unexpected);
}

#[tokio::test]
async fn test_unknown_command_sends_nothing() {
    let http = MockHttpSend::new(StatusCode::OK, "{}");
    let client = DynamoDb::new(
        signer(Context::new().with_http_send(http.clone())),
        Config::default().with_region("us-east-2"),
    );

    let err = client
        .command("DescribeTable", &json!({}))
        .await
        .expect_err("must fail");
    assert_eq!(err.kind(), ErrorKind::UnsupportedService);
    assert!(http.requests().is_empty());
}
