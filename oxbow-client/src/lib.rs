/*
 * Copyright Oxbow Contributors. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! A client pre-assembled with the full Oxbow middleware stack: endpoint
//! resolution, user agent headers, credentials loading, and SigV4 signing.

pub mod conn;

use oxbow_auth::middleware::CredentialsStage;
use oxbow_endpoint::EndpointStage;
use oxbow_http::user_agent::UserAgentStage;
use oxbow_sig_auth::middleware::SigV4SigningStage;
use oxbow_sig_auth::signer::SigV4Signer;
use tower::Layer;
use weft_http_tower::map_request::{
    AsyncMapRequestLayer, AsyncMapRequestService, MapRequestLayer, MapRequestService,
};

/// A client that dispatches over the [`Standard`](conn::Standard)
/// connection with the default middleware.
pub type Client<C = conn::Standard> = weft_client::Client<C, OxbowMiddleware>;

pub use weft_client::{SdkError, SdkSuccess};

/// The default middleware stack.
///
/// Request flow, outermost first:
/// 1. [`EndpointStage`]: resolve the endpoint and record the signing scope.
/// 2. [`UserAgentStage`]: apply user agent headers. These run before the
///    signer but are excluded from the signed header set.
/// 3. [`CredentialsStage`]: asynchronously resolve credentials.
/// 4. [`SigV4SigningStage`]: sign the finished request.
#[derive(Debug, Default, Clone)]
#[non_exhaustive]
pub struct OxbowMiddleware;

impl OxbowMiddleware {
    pub fn new() -> Self {
        OxbowMiddleware
    }
}

type OxbowMiddlewareStack<S> = MapRequestService<
    MapRequestService<
        AsyncMapRequestService<MapRequestService<S, SigV4SigningStage>, CredentialsStage>,
        UserAgentStage,
    >,
    EndpointStage,
>;

impl<S> Layer<S> for OxbowMiddleware {
    type Service = OxbowMiddlewareStack<S>;

    fn layer(&self, inner: S) -> Self::Service {
        let signer = MapRequestLayer::for_mapper(SigV4SigningStage::new(SigV4Signer::new()));
        let credential_provider = AsyncMapRequestLayer::for_mapper(CredentialsStage::new());
        let user_agent = MapRequestLayer::for_mapper(UserAgentStage::new());
        let endpoint_resolver = MapRequestLayer::for_mapper(EndpointStage);
        endpoint_resolver.layer(user_agent.layer(credential_provider.layer(signer.layer(inner))))
    }
}
