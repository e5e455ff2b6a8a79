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

use crate::constants::{APPLICATION_AMZ_JSON_1_1, X_AMZ_TARGET};
use crate::Credential;
use async_trait::async_trait;
use awsign_core::{Context, Error, ProvideCredential, Result};
use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{Method, Request, StatusCode};
use log::debug;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;

/// Cognito Identity Credentials Provider
///
/// This provider fetches temporary AWS credentials using Amazon Cognito Identity.
/// It's typically used for mobile and web applications that need temporary AWS access.
///
/// Both calls are unsigned: `GetId` resolves the identity (skipped when an
/// identity id is given) and `GetCredentialsForIdentity` exchanges it for a
/// short-lived credential.
///
/// # Usage
/// ```rust,no_run
/// use awsign_aws_v4::CognitoIdentityCredentialProvider;
///
/// let provider = CognitoIdentityCredentialProvider::new()
///     .with_identity_pool_id("us-east-1:12345678-1234-1234-1234-123456789012")
///     .with_region("us-east-1");
/// ```
#[derive(Debug, Clone, Default)]
pub struct CognitoIdentityCredentialProvider {
    identity_pool_id: Option<String>,
    region: Option<String>,
    identity_id: Option<String>,
    logins: Option<HashMap<String, String>>,
    endpoint: Option<String>,
}

impl CognitoIdentityCredentialProvider {
    /// Create a new Cognito Identity credential provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the Cognito Identity Pool ID
    pub fn with_identity_pool_id(mut self, pool_id: impl Into<String>) -> Self {
        self.identity_pool_id = Some(pool_id.into());
        self
    }

    /// Set the AWS region
    ///
    /// Defaults to the region prefix of the identity pool id.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Set a specific identity ID (if already known)
    pub fn with_identity_id(mut self, identity_id: impl Into<String>) -> Self {
        self.identity_id = Some(identity_id.into());
        self
    }

    /// Add login tokens from identity providers
    pub fn with_logins(mut self, logins: HashMap<String, String>) -> Self {
        self.logins = Some(logins);
        self
    }

    /// Override the cognito identity endpoint, mainly for testing.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    fn region(&self) -> Result<&str> {
        if let Some(region) = &self.region {
            return Ok(region);
        }

        // Pool ids look like `us-east-1:12345678-1234-1234-1234-123456789012`.
        self.identity_pool_id
            .as_deref()
            .and_then(|id| id.split_once(':'))
            .map(|(region, _)| region)
            .filter(|region| !region.is_empty())
            .ok_or_else(|| Error::config_invalid("region is required for cognito identity"))
    }

    fn endpoint(&self) -> Result<String> {
        match &self.endpoint {
            Some(endpoint) => Ok(endpoint.clone()),
            None => Ok(format!(
                "https://cognito-identity.{}.amazonaws.com/",
                self.region()?
            )),
        }
    }

    async fn call(&self, ctx: &Context, target: &str, body: Value) -> Result<Bytes> {
        let body = serde_json::to_vec(&body).map_err(|e| {
            Error::unexpected("failed to serialize cognito request").with_source(e)
        })?;

        let req = Request::builder()
            .method(Method::POST)
            .uri(self.endpoint()?)
            .header(X_AMZ_TARGET, format!("AWSCognitoIdentityService.{target}"))
            .header(CONTENT_TYPE, APPLICATION_AMZ_JSON_1_1)
            .body(Bytes::from(body))?;

        let resp = ctx.http_send(req).await?;
        if resp.status() != StatusCode::OK {
            return Err(Error::credential_invalid(format!(
                "cognito {target} returned status {}: {}",
                resp.status(),
                String::from_utf8_lossy(resp.body())
            )));
        }

        Ok(resp.into_body())
    }

    async fn get_identity_id(&self, ctx: &Context, pool_id: &str) -> Result<String> {
        if let Some(id) = &self.identity_id {
            return Ok(id.clone());
        }

        let mut body = json!({ "IdentityPoolId": pool_id });
        if let Some(logins) = &self.logins {
            body["Logins"] = json!(logins);
        }

        let content = self.call(ctx, "GetId", body).await?;
        let resp: GetIdResponse = serde_json::from_slice(&content).map_err(|e| {
            Error::credential_invalid("failed to parse cognito GetId response").with_source(e)
        })?;
        Ok(resp.identity_id)
    }

    async fn get_credentials_for_identity(
        &self,
        ctx: &Context,
        identity_id: &str,
    ) -> Result<Credential> {
        let mut body = json!({ "IdentityId": identity_id });
        if let Some(logins) = &self.logins {
            body["Logins"] = json!(logins);
        }

        let content = self.call(ctx, "GetCredentialsForIdentity", body).await?;
        Credential::from_identity_json(&content)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GetIdResponse {
    identity_id: String,
}

#[async_trait]
impl ProvideCredential for CognitoIdentityCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let Some(pool_id) = &self.identity_pool_id else {
            debug!("cognito identity: no identity pool id configured");
            return Ok(None);
        };

        let identity_id = self.get_identity_id(ctx, pool_id).await?;
        debug!("cognito identity: using identity id {identity_id}");

        let cred = self.get_credentials_for_identity(ctx, &identity_id).await?;
        Ok(Some(cred))
    }
}
