/*
 * Copyright Oxbow Contributors. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

use crate::{BoxError, CredentialScope, ResolveServiceEndpoint, ServiceEndpoint};
use oxbow_types::region::Region;
use weft_http::endpoint::Endpoint;

/// Endpoint metadata for a service within a partition.
#[derive(Debug)]
pub struct Metadata {
    /// URI for the endpoint.
    ///
    /// May contain `{region}`, replaced with the region during endpoint
    /// construction.
    pub uri_template: &'static str,

    /// Protocol to use for this endpoint.
    pub protocol: Protocol,

    /// Credential scope to set for requests to this endpoint.
    pub credential_scope: CredentialScope,

    /// Signature versions supported by this endpoint.
    ///
    /// Currently unused since only SigV4 is supported.
    pub signature_versions: SignatureVersion,
}

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum Protocol {
    Http,
    Https,
}

impl Protocol {
    fn as_str(&self) -> &'static str {
        match self {
            Protocol::Http => "http",
            Protocol::Https => "https",
        }
    }
}

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum SignatureVersion {
    V4,
}

impl ResolveServiceEndpoint for Metadata {
    fn resolve_endpoint(&self, region: &Region) -> Result<ServiceEndpoint, BoxError> {
        let uri = self.uri_template.replace("{region}", region.as_ref());
        let uri = format!("{}://{}", self.protocol.as_str(), uri);
        let endpoint = Endpoint::mutable(uri.parse()?);
        let credential_scope = CredentialScope {
            service: self.credential_scope.service().cloned(),
            region: self.credential_scope.region().cloned(),
        };
        Ok(ServiceEndpoint::new(endpoint, credential_scope))
    }
}
