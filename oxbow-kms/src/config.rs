/*
 * Copyright Oxbow Contributors. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

use oxbow_auth::provider::{default_provider, AsyncProvideCredentials, CredentialsProvider};
use oxbow_endpoint::partition::{Metadata, Protocol, SignatureVersion};
use oxbow_endpoint::{CredentialScope, ResolveServiceEndpoint};
use oxbow_types::region::Region;
use std::sync::Arc;

/// Service configuration, shared across operations.
pub struct Config {
    pub(crate) region: Option<Region>,
    pub(crate) credentials_provider: CredentialsProvider,
    pub(crate) endpoint_resolver: Arc<dyn ResolveServiceEndpoint>,
}

impl Config {
    pub fn builder() -> Builder {
        Builder::default()
    }

    pub fn region(&self) -> Option<&Region> {
        self.region.as_ref()
    }
}

#[derive(Default)]
pub struct Builder {
    region: Option<Region>,
    credentials_provider: Option<CredentialsProvider>,
    endpoint_resolver: Option<Arc<dyn ResolveServiceEndpoint>>,
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn region(mut self, region: impl Into<Region>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn credentials_provider(
        mut self,
        provider: impl AsyncProvideCredentials + 'static,
    ) -> Self {
        self.credentials_provider = Some(Arc::new(provider));
        self
    }

    /// Override where requests are sent, e.g. to target a local instance.
    pub fn endpoint_resolver(mut self, resolver: impl ResolveServiceEndpoint + 'static) -> Self {
        self.endpoint_resolver = Some(Arc::new(resolver));
        self
    }

    pub fn build(self) -> Config {
        Config {
            region: self.region,
            credentials_provider: self
                .credentials_provider
                .unwrap_or_else(|| Arc::new(default_provider())),
            endpoint_resolver: self
                .endpoint_resolver
                .unwrap_or_else(|| Arc::new(default_endpoint())),
        }
    }
}

fn default_endpoint() -> Metadata {
    Metadata {
        uri_template: "kms.{region}.amazonaws.com",
        protocol: Protocol::Https,
        credential_scope: CredentialScope::default(),
        signature_versions: SignatureVersion::V4,
    }
}
