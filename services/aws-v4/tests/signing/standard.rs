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

use super::{credential, signer, signing_time, ACCESS_KEY_ID, SECRET_ACCESS_KEY};
use crate::MockHttpSend;
use anyhow::Result;
use async_trait::async_trait;
use awsign_aws_v4::{Credential, RequestSigner, SigningKeyCache};
use awsign_core::{Context, Error, ErrorKind, HttpSend, ProvideCredential, Signer, SigningRequest};
use bytes::Bytes;
use http::{Method, StatusCode};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn iam_request() -> SigningRequest {
    SigningRequest::new(Method::GET, "iam.amazonaws.com", "us-east-1", "iam")
        .with_query("Action", "ListUsers")
        .with_query("Version", "2010-05-08")
        .with_header(
            "Content-Type",
            "application/x-www-form-urlencoded; charset=utf-8",
        )
}

#[tokio::test]
async fn test_send_delivers_signed_request() -> Result<()> {
    let http = MockHttpSend::new(StatusCode::OK, "<ListUsersResponse/>");
    let signer = signer(Context::new().with_http_send(http.clone()));

    let resp = signer.send(&iam_request()).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.body(), &Bytes::from_static(b"<ListUsersResponse/>"));

    let reqs = http.requests();
    assert_eq!(reqs.len(), 1);
    let req = &reqs[0];
    assert_eq!(req.method(), Method::GET);
    assert_eq!(
        req.uri().to_string(),
        "https://iam.amazonaws.com/?Action=ListUsers&Version=2010-05-08"
    );
    assert_eq!(req.headers()["host"], "iam.amazonaws.com");
    assert_eq!(req.headers()["x-amz-date"], "20150830T123600Z");
    assert_eq!(
        req.headers()["x-amz-content-sha256"],
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
    assert_eq!(
        req.headers()["authorization"],
        "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20150830/us-east-1/iam/aws4_request, \
         SignedHeaders=content-type;host;x-amz-content-sha256;x-amz-date, \
         Signature=dd479fa8a80364edf2119ec24bebde66712ee9c9cb2b0d92eb3ab9ccdc0c3947"
    );
    assert!(req.headers()["authorization"].is_sensitive());
    Ok(())
}

#[tokio::test]
async fn test_sign_with_body_and_session_token() -> Result<()> {
    let signer = Signer::new(
        Context::new(),
        awsign_aws_v4::StaticCredentialProvider::new(ACCESS_KEY_ID, SECRET_ACCESS_KEY)
            .with_session_token("session-token"),
        RequestSigner::new().with_time(signing_time()),
    );
    let req = SigningRequest::new(
        Method::POST,
        "dynamodb.us-east-2.amazonaws.com",
        "us-east-2",
        "dynamodb",
    )
    .with_header("content-type", "application/x-amz-json-1.0")
    .with_header("x-amz-target", "DynamoDB_20120810.Scan")
    .with_body(r#"{"TableName":"UserWords"}"#);

    let signed = signer.sign(&req).await?;
    assert_eq!(
        signed.header("x-amz-content-sha256"),
        Some("31a03271b7d79c701358eba891117ccdb8fcbf2091aede5a9e95383dcc356e7b")
    );
    assert_eq!(signed.header("x-amz-security-token"), Some("session-token"));
    assert_eq!(
        signed.header("authorization"),
        Some(
            "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20150830/us-east-2/dynamodb/aws4_request, \
             SignedHeaders=content-type;host;x-amz-content-sha256;x-amz-date;x-amz-security-token;x-amz-target, \
             Signature=1454150e91098269e6cd1c323608c6329f388d414b13870db13b7734029b554d"
        )
    );
    assert_eq!(signed.body, req.body);
    Ok(())
}

#[derive(Debug)]
struct BrokenHttpSend;

#[async_trait]
impl HttpSend for BrokenHttpSend {
    async fn http_send(
        &self,
        _: http::Request<Bytes>,
    ) -> awsign_core::Result<http::Response<Bytes>> {
        Err(Error::transport("dns error: failed to lookup address"))
    }
}

#[tokio::test]
async fn test_send_returns_transport_error_untouched() {
    let signer = signer(Context::new().with_http_send(BrokenHttpSend));

    let err = signer.send(&iam_request()).await.expect_err("must fail");
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(
        err.to_string(),
        "transport error: dns error: failed to lookup address"
    );
}

#[derive(Debug)]
struct ExpiredProvider;

#[async_trait]
impl ProvideCredential for ExpiredProvider {
    type Credential = Credential;

    async fn provide_credential(
        &self,
        _: &Context,
    ) -> awsign_core::Result<Option<Self::Credential>> {
        Ok(Some(Credential {
            expires_in: Some(awsign_core::time::now()),
            ..credential()
        }))
    }
}

#[tokio::test]
async fn test_sign_rejects_expired_credential() {
    let signer = Signer::new(Context::new(), ExpiredProvider, RequestSigner::new());
    let err = signer.sign(&iam_request()).await.expect_err("must fail");
    assert_eq!(err.kind(), ErrorKind::CredentialInvalid);
    assert!(err.is_credential_error());
}

#[tokio::test]
async fn test_sign_with_empty_key_is_missing_credential() {
    for (access_key_id, secret_access_key) in [(ACCESS_KEY_ID, ""), ("", SECRET_ACCESS_KEY)] {
        let signer = Signer::new(
            Context::new(),
            awsign_aws_v4::StaticCredentialProvider::new(access_key_id, secret_access_key),
            RequestSigner::new().with_time(signing_time()),
        );

        let err = signer.sign(&iam_request()).await.expect_err("must fail");
        assert_eq!(err.kind(), ErrorKind::CredentialMissing);
    }
}

#[tokio::test]
async fn test_concurrent_signing_is_independent() -> Result<()> {
    let cache = Arc::new(SigningKeyCache::new());
    let signer = Signer::new(
        Context::new(),
        awsign_aws_v4::StaticCredentialProvider::new(ACCESS_KEY_ID, SECRET_ACCESS_KEY),
        RequestSigner::new()
            .with_time(signing_time())
            .with_signing_key_cache(cache.clone()),
    );

    let tasks = (0..16)
        .map(|idx| {
            let signer = signer.clone();
            tokio::spawn(async move {
                let req = iam_request().with_body(format!("body-{}", idx % 4));
                signer.sign(&req).await
            })
        })
        .collect::<Vec<_>>();

    let mut signed = Vec::new();
    for task in tasks {
        signed.push(task.await??);
    }

    for (idx, req) in signed.iter().enumerate() {
        let expected = RequestSigner::new()
            .with_time(signing_time())
            .sign(
                &iam_request().with_body(format!("body-{}", idx % 4)),
                &credential(),
            )?;
        assert_eq!(
            req.header("authorization"),
            expected.header("authorization")
        );
    }
    assert_eq!(cache.len(), 1);
    Ok(())
}
