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

use crate::constants::APPLICATION_AMZ_JSON_1_0;
use crate::{Config, Credential};
use awsign_core::{Error, Result, Signer, SigningRequest};
use bytes::Bytes;
use http::header::{CONTENT_TYPE, HOST};
use http::{Method, Request, Uri};
use log::debug;
use serde_json::{json, Value};

const LAMBDA_SERVICE: &str = "lambda";

/// Lambda invokes functions through signed HTTP calls, usually function URLs.
#[derive(Debug, Clone)]
pub struct Lambda {
    signer: Signer<Credential>,
    config: Config,
}

impl Lambda {
    /// Create a new Lambda client.
    pub fn new(signer: Signer<Credential>, config: Config) -> Self {
        Self { signer, config }
    }

    /// Build the unsigned invoke request.
    ///
    /// The payload is serialized to a JSON string and wrapped as
    /// `{"Payload": "<payload>"}`.
    pub fn build_invoke_request(
        &self,
        url: &str,
        method: Method,
        payload: &Value,
    ) -> Result<SigningRequest> {
        let uri = url.parse::<Uri>().map_err(|e| {
            Error::request_invalid(format!("invalid lambda url {url}")).with_source(e)
        })?;
        let host = uri
            .host()
            .ok_or_else(|| Error::request_invalid(format!("lambda url {url} has no host")))?;

        let region = match self.config.region.as_deref().filter(|v| !v.is_empty()) {
            Some(region) => region.to_string(),
            None => region_from_host(host).ok_or_else(|| {
                Error::config_invalid(format!("region is required to invoke {url}"))
            })?,
        };
        let authority = uri
            .authority()
            .map(|v| v.to_string())
            .unwrap_or_else(|| host.to_string());

        let body = json!({ "Payload": payload.to_string() });
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .header(CONTENT_TYPE, APPLICATION_AMZ_JSON_1_0)
            .header(HOST, authority)
            .body(Bytes::from(body.to_string()))?;

        SigningRequest::from_http(req, &region, LAMBDA_SERVICE)
    }

    /// Sign and send the invoke request, returning the raw response text.
    pub async fn invoke(
        &self,
        url: &str,
        method: Method,
        payload: &Value,
    ) -> Result<http::Response<String>> {
        let req = self.build_invoke_request(url, method, payload)?;
        let (parts, body) = self.signer.send(&req).await?.into_parts();
        debug!("lambda invoke {url} returned status {}", parts.status);

        let body = String::from_utf8_lossy(&body).to_string();
        Ok(http::Response::from_parts(parts, body))
    }
}

/// Extract the region from lambda hosts.
///
/// - Function URL: `<url-id>.lambda-url.<region>.on.aws`
/// - API endpoint: `lambda.<region>.amazonaws.com`
fn region_from_host(host: &str) -> Option<String> {
    let labels = host.split('.').collect::<Vec<_>>();
    let idx = labels
        .iter()
        .position(|label| *label == "lambda-url" || *label == LAMBDA_SERVICE)?;
    labels
        .get(idx + 1)
        .filter(|region| !region.is_empty())
        .map(|region| region.to_string())
}
