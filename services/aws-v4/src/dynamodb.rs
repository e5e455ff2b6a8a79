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

use crate::constants::{APPLICATION_AMZ_JSON_1_0, X_AMZ_TARGET};
use crate::{Config, Credential};
use awsign_core::{Error, Result, Signer, SigningRequest};
use bytes::Bytes;
use http::header::{CONTENT_TYPE, HOST};
use http::{Method, Request, Uri};
use log::debug;
use serde_json::Value;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

const DYNAMODB_SERVICE: &str = "dynamodb";
const DYNAMODB_TARGET_PREFIX: &str = "DynamoDB_20120810";

/// DynamoDB operations that can be dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DynamoDbOperation {
    /// PutItem
    PutItem,
    /// GetItem
    GetItem,
    /// UpdateItem
    UpdateItem,
    /// DeleteItem
    DeleteItem,
    /// Query
    Query,
    /// Scan
    Scan,
    /// BatchWriteItem
    BatchWriteItem,
    /// BatchGetItem
    BatchGetItem,
}

impl DynamoDbOperation {
    /// All supported operations.
    pub const ALL: [DynamoDbOperation; 8] = [
        DynamoDbOperation::PutItem,
        DynamoDbOperation::GetItem,
        DynamoDbOperation::UpdateItem,
        DynamoDbOperation::DeleteItem,
        DynamoDbOperation::Query,
        DynamoDbOperation::Scan,
        DynamoDbOperation::BatchWriteItem,
        DynamoDbOperation::BatchGetItem,
    ];

    /// Name of the operation as used by the API.
    pub fn as_str(&self) -> &'static str {
        match self {
            DynamoDbOperation::PutItem => "PutItem",
            DynamoDbOperation::GetItem => "GetItem",
            DynamoDbOperation::UpdateItem => "UpdateItem",
            DynamoDbOperation::DeleteItem => "DeleteItem",
            DynamoDbOperation::Query => "Query",
            DynamoDbOperation::Scan => "Scan",
            DynamoDbOperation::BatchWriteItem => "BatchWriteItem",
            DynamoDbOperation::BatchGetItem => "BatchGetItem",
        }
    }

    /// Value of the `x-amz-target` header: `DynamoDB_20120810.PutItem`
    pub fn target(&self) -> String {
        format!("{DYNAMODB_TARGET_PREFIX}.{}", self.as_str())
    }
}

impl Display for DynamoDbOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DynamoDbOperation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        DynamoDbOperation::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| {
                Error::unsupported_service(format!("dynamodb operation {s} is not supported"))
            })
    }
}

/// DynamoDb builds, signs and sends DynamoDB JSON 1.0 requests.
#[derive(Debug, Clone)]
pub struct DynamoDb {
    signer: Signer<Credential>,
    config: Config,
}

impl DynamoDb {
    /// Create a new DynamoDb client.
    pub fn new(signer: Signer<Credential>, config: Config) -> Self {
        Self { signer, config }
    }

    /// Build the unsigned request of `op` carrying `params` as body.
    pub fn build_request(&self, op: DynamoDbOperation, params: &Value) -> Result<SigningRequest> {
        let region = self
            .config
            .region
            .as_deref()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::config_invalid("region is required for dynamodb"))?;

        let endpoint = match &self.config.endpoint_url {
            Some(endpoint) => endpoint.clone(),
            None => format!("https://{DYNAMODB_SERVICE}.{region}.amazonaws.com/"),
        };
        let uri = endpoint.parse::<Uri>().map_err(|e| {
            Error::config_invalid(format!("invalid dynamodb endpoint {endpoint}")).with_source(e)
        })?;
        let host = uri
            .authority()
            .ok_or_else(|| {
                Error::config_invalid(format!("dynamodb endpoint {endpoint} has no host"))
            })?
            .to_string();

        let req = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(CONTENT_TYPE, APPLICATION_AMZ_JSON_1_0)
            .header(X_AMZ_TARGET, op.target())
            .header(HOST, host)
            .body(Bytes::from(params.to_string()))?;

        SigningRequest::from_http(req, region, DYNAMODB_SERVICE)
    }

    /// Sign and send `op`, returning the decoded JSON response.
    ///
    /// Error responses are returned as is, callers inspect the status.
    pub async fn execute(
        &self,
        op: DynamoDbOperation,
        params: &Value,
    ) -> Result<http::Response<Value>> {
        let req = self.build_request(op, params)?;
        let (parts, body) = self.signer.send(&req).await?.into_parts();
        debug!("dynamodb {op} returned status {}", parts.status);

        let body = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).map_err(|e| {
                Error::unexpected(format!("dynamodb {op} returned a non json body")).with_source(e)
            })?
        };
        Ok(http::Response::from_parts(parts, body))
    }

    /// Same as [`DynamoDb::execute`] with the operation given by name.
    pub async fn command(&self, command: &str, params: &Value) -> Result<http::Response<Value>> {
        let op = command.parse::<DynamoDbOperation>()?;
        self.execute(op, params).await
    }
}
