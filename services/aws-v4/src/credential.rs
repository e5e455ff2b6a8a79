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

use awsign_core::time::{now, DateTime};
use awsign_core::utils::Redact;
use awsign_core::{Error, Result, SigningCredential};
use serde::Deserialize;
use std::fmt::{Debug, Formatter};

/// Credential that holds the access_key and secret_key.
#[derive(Default, Clone)]
pub struct Credential {
    /// Access key id for aws services.
    pub access_key_id: String,
    /// Secret access key for aws services.
    pub secret_access_key: String,
    /// Session token for aws services.
    pub session_token: Option<String>,
    /// Expiration time for this credential.
    pub expires_in: Option<DateTime>,
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("access_key_id", &Redact::from(&self.access_key_id))
            .field("secret_access_key", &Redact::from(&self.secret_access_key))
            .field("session_token", &Redact::from(&self.session_token))
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

impl SigningCredential for Credential {
    /// Only expiration is checked here, empty keys are reported as missing
    /// credentials by the request signer.
    fn is_valid(&self) -> bool {
        // Take 120s as buffer to avoid edge cases.
        if let Some(valid) = self
            .expires_in
            .map(|v| v > now() + chrono::TimeDelta::try_minutes(2).expect("in bounds"))
        {
            return valid;
        }

        true
    }
}

impl Credential {
    /// Parse credentials handed out by an identity provider.
    ///
    /// Accepts both the wrapped `{"Credentials": {...}}` document returned by
    /// Cognito `GetCredentialsForIdentity` and the bare credentials object, with
    /// PascalCase or camelCase field names. `Expiration` is in epoch seconds.
    pub fn from_identity_json(content: &[u8]) -> Result<Self> {
        let doc: IdentityDocument = serde_json::from_slice(content).map_err(|e| {
            Error::credential_invalid("failed to parse identity credentials").with_source(e)
        })?;
        let creds = match doc {
            IdentityDocument::Wrapped { credentials } => credentials,
            IdentityDocument::Bare(credentials) => credentials,
        };

        let expires_in = match creds.expiration {
            Some(ts) => Some(DateTime::from_timestamp(ts as i64, 0).ok_or_else(|| {
                Error::credential_invalid(format!("invalid expiration timestamp {ts}"))
            })?),
            None => None,
        };

        Ok(Credential {
            access_key_id: creds.access_key_id,
            secret_access_key: creds.secret_key,
            session_token: creds.session_token,
            expires_in,
        })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IdentityDocument {
    Wrapped {
        #[serde(rename = "Credentials", alias = "credentials")]
        credentials: IdentityCredentials,
    },
    Bare(IdentityCredentials),
}

#[derive(Deserialize)]
struct IdentityCredentials {
    #[serde(rename = "AccessKeyId", alias = "accessKeyId")]
    access_key_id: String,
    #[serde(
        rename = "SecretKey",
        alias = "secretKey",
        alias = "SecretAccessKey",
        alias = "secretAccessKey"
    )]
    secret_key: String,
    #[serde(rename = "SessionToken", alias = "sessionToken", default)]
    session_token: Option<String>,
    #[serde(rename = "Expiration", alias = "expiration", default)]
    expiration: Option<f64>,
}
