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

use crate::constants::AWS4_REQUEST;
use awsign_core::hash::{hex_hmac_sha256, hex_sha256, hmac_sha256};
use awsign_core::time::{format_date, DateTime};
use std::collections::HashMap;
use std::fmt::{Debug, Display, Formatter};
use std::sync::Mutex;

/// SigningScope binds a signature to one day, region and service.
///
/// The same scope value must feed the signing key, the string to sign and the
/// `Authorization` header, AWS rejects any mismatch without telling why.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SigningScope {
    date: String,
    region: String,
    service: String,
}

impl SigningScope {
    /// Create a scope for the UTC day of `time`.
    pub fn new(time: DateTime, region: &str, service: &str) -> Self {
        Self {
            date: format_date(time),
            region: region.to_string(),
            service: service.to_string(),
        }
    }

    /// Date of this scope: `20220313`
    pub fn date(&self) -> &str {
        &self.date
    }

    /// Region of this scope.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Service of this scope.
    pub fn service(&self) -> &str {
        &self.service
    }
}

/// Scope: "20220313/<region>/<service>/aws4_request"
impl Display for SigningScope {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.date, self.region, self.service, AWS4_REQUEST
        )
    }
}

/// SigningKey is the output of the SigV4 key derivation chain.
///
/// The content is raw HMAC output, never text.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningKey(Vec<u8>);

impl Debug for SigningKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("SigningKey(***)")
    }
}

impl SigningKey {
    /// Derive the signing key of `scope` from the secret access key.
    pub fn derive(secret: &str, scope: &SigningScope) -> Self {
        let [_, _, _, sign_request] = derive_chain(secret, scope);
        Self(sign_request)
    }

    /// Raw bytes of this key.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Compute the hex encoded signature of `string_to_sign`.
    pub fn sign(&self, string_to_sign: &str) -> String {
        hex_hmac_sha256(&self.0, string_to_sign.as_bytes())
    }
}

/// Run the four HMAC steps, each output keying the next one.
fn derive_chain(secret: &str, scope: &SigningScope) -> [Vec<u8>; 4] {
    // Sign secret
    let secret = format!("AWS4{secret}");
    // Sign date
    let sign_date = hmac_sha256(secret.as_bytes(), scope.date.as_bytes());
    // Sign region
    let sign_region = hmac_sha256(&sign_date, scope.region.as_bytes());
    // Sign service
    let sign_service = hmac_sha256(&sign_region, scope.service.as_bytes());
    // Sign request
    let sign_request = hmac_sha256(&sign_service, AWS4_REQUEST.as_bytes());

    [sign_date, sign_region, sign_service, sign_request]
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    scope: SigningScope,
    secret_fingerprint: String,
}

/// SigningKeyCache keeps derived signing keys for the current day.
///
/// Keys are indexed by scope and a SHA-256 fingerprint of the secret, the
/// secret itself is never stored. Inserting a key for a new day drops the keys
/// of every other day. The cache can be shared across threads.
#[derive(Default)]
pub struct SigningKeyCache {
    keys: Mutex<HashMap<CacheKey, SigningKey>>,
}

impl Debug for SigningKeyCache {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKeyCache")
            .field("len", &self.len())
            .finish()
    }
}

impl SigningKeyCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the signing key of `scope`, deriving and storing it on miss.
    pub fn get_or_derive(&self, secret: &str, scope: &SigningScope) -> SigningKey {
        let key = CacheKey {
            scope: scope.clone(),
            secret_fingerprint: hex_sha256(secret.as_bytes()),
        };

        let mut keys = self.keys.lock().expect("lock poisoned");
        if let Some(signing_key) = keys.get(&key) {
            return signing_key.clone();
        }

        let signing_key = SigningKey::derive(secret, scope);
        keys.retain(|k, _| k.scope.date == scope.date);
        keys.insert(key, signing_key.clone());
        signing_key
    }

    /// Number of cached keys.
    pub fn len(&self) -> usize {
        self.keys.lock().expect("lock poisoned").len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
