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

//! AWS SigV4 signing for awsign.
//!
//! This crate turns a [`SigningRequest`](awsign_core::SigningRequest) into a
//! request carrying `x-amz-date`, `x-amz-content-sha256`, the optional
//! `x-amz-security-token` and the `Authorization` header.
//!
//! ## Example
//!
//! ```no_run
//! use awsign_aws_v4::{RequestSigner, StaticCredentialProvider};
//! use awsign_core::{Context, Result, Signer, SigningRequest};
//! use http::Method;
//!
//! # async fn example() -> Result<()> {
//! let signer = Signer::new(
//!     Context::new(),
//!     StaticCredentialProvider::new("access_key_id", "secret_access_key"),
//!     RequestSigner::new(),
//! );
//!
//! let req = SigningRequest::new(Method::GET, "iam.amazonaws.com", "us-east-1", "iam")
//!     .with_query("Action", "ListUsers")
//!     .with_query("Version", "2010-05-08");
//! let signed = signer.sign(&req).await?;
//! println!("authorization: {:?}", signed.header("authorization"));
//! # Ok(())
//! # }
//! ```
//!
//! Service helpers for [`DynamoDb`] and [`Lambda`] build the request,
//! sign it and send it through the [`Context`](awsign_core::Context).

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

mod constants;

mod config;
pub use config::Config;

mod credential;
pub use credential::Credential;

mod provide_credential;
pub use provide_credential::*;

mod signing_key;
pub use signing_key::{SigningKey, SigningKeyCache, SigningScope};

mod sign_request;
pub use sign_request::{
    authorization_value, canonical_request_string, canonicalize_headers, string_to_sign,
    RequestSigner,
};

mod dynamodb;
pub use dynamodb::{DynamoDb, DynamoDbOperation};

mod lambda;
pub use lambda::Lambda;
