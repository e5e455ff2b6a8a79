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

use crate::constants::*;
use awsign_core::Context;

/// Config for the AWS service clients.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct Config {
    /// `region` will be loaded from:
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AWS_REGION`]
    /// - env value: [`AWS_DEFAULT_REGION`]
    pub region: Option<String>,
    /// `endpoint_url` will be loaded from:
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AWS_ENDPOINT_URL`]
    ///
    /// Overrides the default `https://<service>.<region>.amazonaws.com` endpoint.
    pub endpoint_url: Option<String>,
}

impl Config {
    /// Load config from env, values already set are kept.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        if self.region.is_none() {
            self.region = ctx
                .env_var(AWS_REGION)
                .or_else(|| ctx.env_var(AWS_DEFAULT_REGION))
                .filter(|v| !v.is_empty());
        }
        if self.endpoint_url.is_none() {
            self.endpoint_url = ctx.env_var(AWS_ENDPOINT_URL).filter(|v| !v.is_empty());
        }
        self
    }

    /// Set the region.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Set the endpoint url.
    pub fn with_endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = Some(endpoint_url.into());
        self
    }
}
