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

mod standard;

use awsign_aws_v4::{Credential, RequestSigner, StaticCredentialProvider};
use awsign_core::time::{parse_iso8601, DateTime};
use awsign_core::{Context, Signer};

pub const ACCESS_KEY_ID: &str = "AKIDEXAMPLE";
pub const SECRET_ACCESS_KEY: &str = "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY";

pub fn signing_time() -> DateTime {
    parse_iso8601("20150830T123600Z").expect("time must be valid")
}

pub fn credential() -> Credential {
    Credential {
        access_key_id: ACCESS_KEY_ID.to_string(),
        secret_access_key: SECRET_ACCESS_KEY.to_string(),
        ..Default::default()
    }
}

/// Build a signer pinned at [`signing_time`].
pub fn signer(ctx: Context) -> Signer<Credential> {
    Signer::new(
        ctx,
        StaticCredentialProvider::new(ACCESS_KEY_ID, SECRET_ACCESS_KEY),
        RequestSigner::new().with_time(signing_time()),
    )
}
