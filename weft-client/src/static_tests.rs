/*
 * Copyright Oxbow Contributors. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Compile-only checks that a minimal operation satisfies the bounds on
//! `Client::call`. Nothing here runs.

#![allow(dead_code)]

use weft_http::body::SdkBody;
use weft_http::operation::Operation;
use weft_http::response::ParseHttpResponse;

#[derive(Clone)]
struct ValidTestOperation;

impl ParseHttpResponse<SdkBody> for ValidTestOperation {
    type Output = Result<(), ()>;

    fn parse_unloaded(&self, _: &mut http::Response<SdkBody>) -> Option<Self::Output> {
        unreachable!("compile-only")
    }

    fn parse_loaded(&self, _: &http::Response<bytes::Bytes>) -> Self::Output {
        unreachable!("compile-only")
    }
}

// If this function does not compile, the bounds on `Client::call` cannot be
// satisfied by a minimal operation with the default middleware-free stack.
#[cfg(feature = "native-tls")]
async fn sanity_client_bounds(
    client: crate::Client<crate::Https, tower::layer::util::Identity>,
    op: Operation<ValidTestOperation, ()>,
) {
    let _ = client.call(op).await;
}
