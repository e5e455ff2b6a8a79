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

use crate::MockHttpSend;
use anyhow::Result;
use awsign_aws_v4::{CognitoIdentityCredentialProvider, RequestSigner};
use awsign_core::{Context, ErrorKind, Signer, SigningRequest};
use http::{Method, StatusCode};

/// Answers both GetId and GetCredentialsForIdentity.
const IDENTITY_RESPONSE: &str = r#"{
    "IdentityId": "us-east-2:01dbe510-9091-7005-7e37-421c7ea0a562",
    "Credentials": {
        "AccessKeyId": "ASIACOGNITOEXAMPLE",
        "SecretKey": "cognito_secret_key",
        "SessionToken": "cognito_session_token",
        "Expiration": 4102444800
    }
}"#;

fn provider() -> CognitoIdentityCredentialProvider {
    CognitoIdentityCredentialProvider::new()
        .with_identity_pool_id("us-east-2:12345678-1234-1234-1234-123456789012")
}

#[tokio::test]
async fn test_sign_with_cognito_identity() -> Result<()> {
    let http = MockHttpSend::new(StatusCode::OK, IDENTITY_RESPONSE);
    let signer = Signer::new(
        Context::new().with_http_send(http.clone()),
        provider(),
        RequestSigner::new(),
    );

    let req = SigningRequest::new(
        Method::POST,
        "dynamodb.us-east-2.amazonaws.com",
        "us-east-2",
        "dynamodb",
    );
    let signed = signer.sign(&req).await?;

    assert_eq!(
        signed.header("x-amz-security-token"),
        Some("cognito_session_token")
    );
    assert!(signed
        .header("authorization")
        .unwrap()
        .contains("Credential=ASIACOGNITOEXAMPLE/"));

    let reqs = http.requests();
    assert_eq!(reqs.len(), 2);
    assert_eq!(
        reqs[0].uri().to_string(),
        "https://cognito-identity.us-east-2.amazonaws.com/"
    );
    assert!(reqs
        .iter()
        .all(|r| r.headers().get("authorization").is_none()));
    Ok(())
}

#[tokio::test]
async fn test_cognito_failure_surfaces_as_credential_error() {
    let http = MockHttpSend::new(
        StatusCode::BAD_REQUEST,
        r#"{"__type":"ResourceNotFoundException","message":"IdentityPool not found"}"#,
    );
    let signer = Signer::new(
        Context::new().with_http_send(http),
        provider(),
        RequestSigner::new(),
    );

    let req = SigningRequest::new(Method::GET, "iam.amazonaws.com", "us-east-1", "iam");
    let err = signer.sign(&req).await.expect_err("must fail");
    assert_eq!(err.kind(), ErrorKind::CredentialInvalid);
}
