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

use crate::{
    Context, Error, ProvideCredential, Result, SignRequest, SigningCredential, SigningRequest,
};
use bytes::Bytes;
use log::debug;
use std::sync::Arc;

/// Signer is the main struct used to sign the request.
///
/// A credential is loaded from the provider on every call, the signer never
/// keeps one around.
#[derive(Clone, Debug)]
pub struct Signer<K: SigningCredential> {
    ctx: Context,
    loader: Arc<dyn ProvideCredential<Credential = K>>,
    builder: Arc<dyn SignRequest<Credential = K>>,
}

impl<K: SigningCredential> Signer<K> {
    /// Create a new signer.
    pub fn new(
        ctx: Context,
        loader: impl ProvideCredential<Credential = K>,
        builder: impl SignRequest<Credential = K>,
    ) -> Self {
        Self {
            ctx,
            loader: Arc::new(loader),
            builder: Arc::new(builder),
        }
    }

    /// Get the context used by this signer.
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Sign the request and return the signed copy.
    pub async fn sign(&self, req: &SigningRequest) -> Result<SigningRequest> {
        let credential = self
            .loader
            .provide_credential(&self.ctx)
            .await?
            .ok_or_else(|| Error::credential_missing("no credential found by provider"))?;
        if !credential.is_valid() {
            return Err(Error::credential_invalid("credential is expired"));
        }

        self.builder
            .sign_request(&self.ctx, req, &credential)
            .await
    }

    /// Sign the request and send it with the context's http client.
    ///
    /// Transport failures are returned as reported by [`crate::HttpSend`].
    pub async fn send(&self, req: &SigningRequest) -> Result<http::Response<Bytes>> {
        let signed = self.sign(req).await?;
        debug!(
            "sending signed {} request to {}{}",
            signed.method, signed.hostname, signed.path
        );
        self.ctx.http_send(signed.into_http_request()?).await
    }
}
