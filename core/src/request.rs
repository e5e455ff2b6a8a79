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

use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};

use bytes::Bytes;
use http::header::{HeaderName, AUTHORIZATION};
use http::uri::{PathAndQuery, Scheme};
use http::{HeaderValue, Method, Uri};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::time::DateTime;
use crate::utils::Redact;
use crate::{Error, Result};

/// AsciiSet for [AWS UriEncode](https://docs.aws.amazon.com/IAM/latest/UserGuide/create-signed-request.html)
///
/// - URI encode every byte except the unreserved characters: 'A'-'Z', 'a'-'z', '0'-'9', '-', '.', '_', and '~'.
/// - The path separator `/` is kept as is.
static URI_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Same as [`URI_ENCODE_SET`] but `/` is encoded too, used in query.
static QUERY_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Description of a request to be signed.
///
/// Header and query values are kept decoded; encoding happens when the
/// canonical form is rendered, so the signed form and the wire form never
/// drift apart.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningRequest {
    /// HTTP method.
    pub method: Method,
    /// HTTP scheme, `https` unless told otherwise.
    pub scheme: Scheme,
    /// Host of the target, including the port if it's not the default one.
    pub hostname: String,
    /// HTTP path.
    pub path: String,
    /// HTTP query parameters.
    pub query: BTreeMap<String, String>,
    /// HTTP headers.
    pub headers: BTreeMap<String, String>,
    /// HTTP body.
    pub body: Bytes,
    /// Region used in the credential scope.
    pub region: String,
    /// Service used in the credential scope.
    pub service: String,
    /// Time this request has been signed at.
    pub signed_at: Option<DateTime>,
}

impl Debug for SigningRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let headers = self
            .headers
            .iter()
            .map(|(k, v)| {
                let sensitive = k.eq_ignore_ascii_case(AUTHORIZATION.as_str())
                    || k.to_ascii_lowercase().ends_with("-token");
                if sensitive {
                    (k.as_str(), format!("{:?}", Redact::from(v)))
                } else {
                    (k.as_str(), v.clone())
                }
            })
            .collect::<Vec<_>>();

        f.debug_struct("SigningRequest")
            .field("method", &self.method)
            .field("scheme", &self.scheme)
            .field("hostname", &self.hostname)
            .field("path", &self.path)
            .field("query", &self.query)
            .field("headers", &headers)
            .field("body_len", &self.body.len())
            .field("region", &self.region)
            .field("service", &self.service)
            .field("signed_at", &self.signed_at)
            .finish()
    }
}

impl SigningRequest {
    /// Create a new request against `hostname` signed for `region` and `service`.
    pub fn new(
        method: Method,
        hostname: impl Into<String>,
        region: impl Into<String>,
        service: impl Into<String>,
    ) -> Self {
        Self {
            method,
            scheme: Scheme::HTTPS,
            hostname: hostname.into(),
            path: "/".to_string(),
            query: BTreeMap::new(),
            headers: BTreeMap::new(),
            body: Bytes::new(),
            region: region.into(),
            service: service.into(),
            signed_at: None,
        }
    }

    /// Build a signing request from an `http::Request`.
    pub fn from_http(req: http::Request<Bytes>, region: &str, service: &str) -> Result<Self> {
        let (parts, body) = req.into_parts();
        let uri = parts.uri.into_parts();
        let paq = uri
            .path_and_query
            .unwrap_or_else(|| PathAndQuery::from_static("/"));
        let authority = uri.authority.ok_or_else(|| {
            Error::request_invalid("request without authority is invalid for signing")
        })?;

        let mut headers: BTreeMap<String, String> = BTreeMap::new();
        for (name, value) in parts.headers.iter() {
            let value = value.to_str()?;
            // Repeated headers are folded into one comma separated value.
            headers
                .entry(name.as_str().to_string())
                .and_modify(|v| {
                    v.push(',');
                    v.push_str(value);
                })
                .or_insert_with(|| value.to_string());
        }

        Ok(SigningRequest {
            method: parts.method,
            scheme: uri.scheme.unwrap_or(Scheme::HTTPS),
            hostname: authority.as_str().to_string(),
            path: paq.path().to_string(),
            query: paq
                .query()
                .map(|v| {
                    form_urlencoded::parse(v.as_bytes())
                        .map(|(k, v)| (k.into_owned(), v.into_owned()))
                        .collect()
                })
                .unwrap_or_default(),
            headers,
            body,
            region: region.to_string(),
            service: service.to_string(),
            signed_at: None,
        })
    }

    /// Set the scheme.
    pub fn with_scheme(mut self, scheme: Scheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// Set the path.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Insert a query parameter, replacing any previous value of the key.
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Insert a header, replacing any previous value of the same name.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Set the body.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Get header value by name, ignoring ASCII case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Get the path as it is sent on the wire.
    ///
    /// The path is percent decoded first and then encoded again, so already
    /// encoded paths keep their encoding and raw reserved characters get
    /// encoded. An empty path becomes `/`.
    pub fn encoded_path(&self) -> Result<String> {
        if self.path.is_empty() {
            return Ok("/".to_string());
        }

        let path = percent_decode_str(&self.path).decode_utf8().map_err(|e| {
            Error::encoding(format!("decoded path {} is not utf-8", self.path))
                .with_source(e)
        })?;
        Ok(utf8_percent_encode(&path, &URI_ENCODE_SET).to_string())
    }

    /// Get the path in its canonical form.
    ///
    /// S3 signs the [`encoded_path`](Self::encoded_path) as is, every other
    /// service signs it encoded once more.
    ///
    /// ```shell
    /// s3:     /my-func%3Aprod => /my-func%3Aprod
    /// lambda: /my-func%3Aprod => /my-func%253Aprod
    /// ```
    pub fn canonical_path(&self) -> Result<String> {
        let path = self.encoded_path()?;
        if self.service == "s3" {
            return Ok(path);
        }
        Ok(utf8_percent_encode(&path, &URI_ENCODE_SET).to_string())
    }

    /// Get the query in its canonical form.
    ///
    /// ```shell
    /// {b: "2", a: "x y"} => "a=x%20y&b=2"
    /// ```
    pub fn canonical_query(&self) -> String {
        canonicalize_query(&self.query)
    }

    /// Convert into an `http::Request` carrying exactly the signed path and query.
    pub fn into_http_request(self) -> Result<http::Request<Bytes>> {
        let mut paq = self.encoded_path()?;
        let query = self.canonical_query();
        if !query.is_empty() {
            paq.push('?');
            paq.push_str(&query);
        }

        let uri = Uri::builder()
            .scheme(self.scheme)
            .authority(self.hostname.as_str())
            .path_and_query(paq)
            .build()?;

        let mut req = http::Request::new(self.body);
        *req.method_mut() = self.method;
        *req.uri_mut() = uri;
        for (k, v) in self.headers {
            let name = HeaderName::from_bytes(k.as_bytes())?;
            let mut value = HeaderValue::from_str(&v)?;
            if name == AUTHORIZATION {
                value.set_sensitive(true);
            }
            req.headers_mut().insert(name, value);
        }

        Ok(req)
    }
}

/// Convert query parameters into the canonical query string.
///
/// Keys and values are encoded with the RFC 3986 unreserved set before the
/// pairs are sorted by byte order, empty values are kept as `key=`.
pub fn canonicalize_query(query: &BTreeMap<String, String>) -> String {
    let mut pairs = query
        .iter()
        .map(|(k, v)| {
            (
                utf8_percent_encode(k, &QUERY_ENCODE_SET).to_string(),
                utf8_percent_encode(v, &QUERY_ENCODE_SET).to_string(),
            )
        })
        .collect::<Vec<_>>();
    pairs.sort();

    let mut s = String::with_capacity(16);
    for (idx, (k, v)) in pairs.into_iter().enumerate() {
        if idx != 0 {
            s.push('&');
        }
        s.push_str(&k);
        s.push('=');
        s.push_str(&v);
    }
    s
}
