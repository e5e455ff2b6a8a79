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

use crate::constants::{
    AWS4_HMAC_SHA256, X_AMZ_CONTENT_SHA_256, X_AMZ_DATE, X_AMZ_SECURITY_TOKEN,
};
use crate::{Credential, SigningKey, SigningKeyCache, SigningScope};
use async_trait::async_trait;
use awsign_core::hash::hex_sha256;
use awsign_core::time::{format_iso8601, now, DateTime};
use awsign_core::{Context, Error, Result, SignRequest, SigningRequest};
use http::header::{AUTHORIZATION, HOST};
use http::{HeaderName, HeaderValue, Method};
use log::debug;
use std::collections::BTreeMap;
use std::fmt::Write;
use std::sync::Arc;

/// Headers owned by the signer, caller supplied values are dropped.
const MANAGED_HEADERS: [&str; 4] = [
    "authorization",
    X_AMZ_DATE,
    X_AMZ_CONTENT_SHA_256,
    X_AMZ_SECURITY_TOKEN,
];

/// RequestSigner that implement AWS SigV4.
///
/// - [Signature Version 4 signing process](https://docs.aws.amazon.com/general/latest/gr/signature-version-4.html)
///
/// Region and service are taken from the request as given, the signer never
/// rewrites them.
#[derive(Debug, Default, Clone)]
pub struct RequestSigner {
    time: Option<DateTime>,
    key_cache: Option<Arc<SigningKeyCache>>,
}

impl RequestSigner {
    /// Create a new AWS V4 request signer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    /// Reuse derived signing keys through the given cache.
    pub fn with_signing_key_cache(mut self, cache: Arc<SigningKeyCache>) -> Self {
        self.key_cache = Some(cache);
        self
    }

    /// Sign the request with given credential and return the signed copy.
    ///
    /// The returned request carries the canonical header set, including
    /// `x-amz-date`, `x-amz-content-sha256`, `x-amz-security-token` when the
    /// credential has a session token, and finally `authorization`.
    pub fn sign(&self, req: &SigningRequest, cred: &Credential) -> Result<SigningRequest> {
        if cred.access_key_id.is_empty() {
            return Err(Error::credential_missing("access key id is empty"));
        }
        if cred.secret_access_key.is_empty() {
            return Err(Error::credential_missing("secret access key is empty"));
        }
        if req.region.is_empty() {
            return Err(Error::request_invalid("region is required for signing"));
        }
        if req.service.is_empty() {
            return Err(Error::request_invalid("service is required for signing"));
        }

        // Take the time once, date header, scope and string to sign must agree.
        let now = self.time.unwrap_or_else(now);
        let payload_hash = hex_sha256(&req.body);

        let mut headers = req
            .headers
            .iter()
            .filter(|(k, _)| {
                !MANAGED_HEADERS
                    .iter()
                    .any(|managed| k.eq_ignore_ascii_case(managed))
            })
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect::<BTreeMap<_, _>>();
        if !headers.keys().any(|k| k.eq_ignore_ascii_case(HOST.as_str())) {
            headers.insert(HOST.to_string(), req.hostname.clone());
        }
        headers.insert(X_AMZ_DATE.to_string(), format_iso8601(now));
        if let Some(token) = cred.session_token.as_deref().filter(|v| !v.is_empty()) {
            headers.insert(X_AMZ_SECURITY_TOKEN.to_string(), token.to_string());
        }
        headers.insert(X_AMZ_CONTENT_SHA_256.to_string(), payload_hash.clone());

        // Canonicalize after all aws headers are in place so they get signed.
        let headers = canonicalize_headers(&headers)?;
        let signed_headers = headers.keys().map(String::as_str).collect::<Vec<_>>();

        let creq = canonical_request_string(
            &req.method,
            &req.canonical_path()?,
            &req.canonical_query(),
            &headers,
            &payload_hash,
        )?;

        let scope = SigningScope::new(now, &req.region, &req.service);
        debug!("calculated scope: {scope}");

        let string_to_sign = string_to_sign(now, &scope, &creq)?;
        debug!("calculated string to sign: {string_to_sign}");

        let signing_key = match &self.key_cache {
            Some(cache) => cache.get_or_derive(&cred.secret_access_key, &scope),
            None => SigningKey::derive(&cred.secret_access_key, &scope),
        };
        let signature = signing_key.sign(&string_to_sign);
        let authorization =
            authorization_value(&cred.access_key_id, &scope, &signed_headers, &signature);

        let mut signed = req.clone();
        signed.headers = headers;
        signed.headers.insert(AUTHORIZATION.to_string(), authorization);
        signed.signed_at = Some(now);
        Ok(signed)
    }
}

#[async_trait]
impl SignRequest for RequestSigner {
    type Credential = Credential;

    async fn sign_request(
        &self,
        _: &Context,
        req: &SigningRequest,
        credential: &Self::Credential,
    ) -> Result<SigningRequest> {
        self.sign(req, credential)
    }
}

/// Normalize headers into their canonical form.
///
/// - Names are lowercased.
/// - Values are trimmed and inner whitespace runs collapse into one space.
///
/// Two names that only differ in case are rejected since the signed value
/// would be ambiguous. Applying this to an already canonical map is a no-op.
pub fn canonicalize_headers(
    headers: &BTreeMap<String, String>,
) -> Result<BTreeMap<String, String>> {
    let mut canonical = BTreeMap::new();
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())?;
        let value = value.split_whitespace().collect::<Vec<_>>().join(" ");
        HeaderValue::from_str(&value)?;

        if canonical.insert(name.to_string(), value).is_some() {
            return Err(Error::encoding(format!(
                "header {name} is present more than once with different cases"
            )));
        }
    }
    Ok(canonical)
}

/// Build the canonical request string.
///
/// ```shell
/// GET
/// /
/// Action=ListUsers&Version=2010-05-08
/// content-type:application/x-www-form-urlencoded; charset=utf-8
/// host:iam.amazonaws.com
/// x-amz-date:20150830T123600Z
///
/// content-type;host;x-amz-date
/// e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855
/// ```
pub fn canonical_request_string(
    method: &Method,
    path: &str,
    query: &str,
    headers: &BTreeMap<String, String>,
    payload_hash: &str,
) -> Result<String> {
    // 256 is specially chosen to avoid reallocation for most requests.
    let mut f = String::with_capacity(256);

    // Insert method
    writeln!(f, "{method}")?;
    // Insert encoded path
    writeln!(f, "{path}")?;
    // Insert query
    writeln!(f, "{query}")?;
    // Insert signed headers
    for (k, v) in headers {
        writeln!(f, "{k}:{v}")?;
    }
    writeln!(f)?;
    writeln!(
        f,
        "{}",
        headers.keys().map(String::as_str).collect::<Vec<_>>().join(";")
    )?;
    write!(f, "{payload_hash}")?;

    Ok(f)
}

/// Build the string to sign.
///
/// ```shell
/// AWS4-HMAC-SHA256
/// 20220313T072004Z
/// 20220313/<region>/<service>/aws4_request
/// <hashed_canonical_request>
/// ```
pub fn string_to_sign(
    time: DateTime,
    scope: &SigningScope,
    canonical_request: &str,
) -> Result<String> {
    let mut f = String::new();
    writeln!(f, "{AWS4_HMAC_SHA256}")?;
    writeln!(f, "{}", format_iso8601(time))?;
    writeln!(f, "{scope}")?;
    write!(f, "{}", hex_sha256(canonical_request.as_bytes()))?;
    Ok(f)
}

/// Format the value of the `Authorization` header.
pub fn authorization_value(
    access_key_id: &str,
    scope: &SigningScope,
    signed_headers: &[&str],
    signature: &str,
) -> String {
    format!(
        "{AWS4_HMAC_SHA256} Credential={access_key_id}/{scope}, SignedHeaders={}, Signature={signature}",
        signed_headers.join(";"),
    )
}
