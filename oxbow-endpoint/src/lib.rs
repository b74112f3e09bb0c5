/*
 * Copyright Oxbow Contributors. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Resolves service endpoints from a region and applies them to requests.

pub mod partition;

use oxbow_types::region::{Region, SigningRegion, SigningService};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;
use weft_http::endpoint::{Endpoint, EndpointPrefix};
use weft_http::middleware::MapRequest;
use weft_http::operation::Request;
use weft_http::property_bag::PropertyBag;

pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// An `Endpoint` paired with the credential scope requests to it must be
/// signed with.
#[derive(Clone, Debug)]
pub struct ServiceEndpoint {
    endpoint: Endpoint,
    credential_scope: CredentialScope,
}

impl ServiceEndpoint {
    pub fn new(endpoint: Endpoint, credential_scope: CredentialScope) -> Self {
        Self {
            endpoint,
            credential_scope,
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn credential_scope(&self) -> &CredentialScope {
        &self.credential_scope
    }
}

/// Overrides to the region and service name used for signing.
///
/// Some endpoints are signed for a different region or service than the one
/// the request targets; the scope carried by the resolved endpoint wins over
/// the client's configured values.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CredentialScope {
    region: Option<SigningRegion>,
    service: Option<SigningService>,
}

impl CredentialScope {
    pub fn builder() -> credential_scope::Builder {
        Default::default()
    }

    pub fn region(&self) -> Option<&SigningRegion> {
        self.region.as_ref()
    }

    pub fn service(&self) -> Option<&SigningService> {
        self.service.as_ref()
    }
}

pub mod credential_scope {
    use crate::CredentialScope;
    use oxbow_types::region::{SigningRegion, SigningService};

    #[derive(Debug, Default)]
    pub struct Builder {
        region: Option<SigningRegion>,
        service: Option<SigningService>,
    }

    impl Builder {
        pub fn region(mut self, region: SigningRegion) -> Self {
            self.region = Some(region);
            self
        }

        pub fn service(mut self, service: SigningService) -> Self {
            self.service = Some(service);
            self
        }

        pub fn build(self) -> CredentialScope {
            CredentialScope {
                region: self.region,
                service: self.service,
            }
        }
    }
}

/// Resolve the endpoint to use for a service in a given region.
pub trait ResolveServiceEndpoint: Send + Sync {
    fn resolve_endpoint(&self, region: &Region) -> Result<ServiceEndpoint, BoxError>;
}

/// A fixed endpoint, e.g. one configured for a local test server. The
/// credential scope is left empty so the client's region and service name
/// drive signing.
impl ResolveServiceEndpoint for Endpoint {
    fn resolve_endpoint(&self, _region: &Region) -> Result<ServiceEndpoint, BoxError> {
        Ok(ServiceEndpoint::new(self.clone(), CredentialScope::default()))
    }
}

type ServiceEndpointResolver = Arc<dyn ResolveServiceEndpoint>;

pub fn get_endpoint_resolver(properties: &PropertyBag) -> Option<&ServiceEndpointResolver> {
    properties.get()
}

pub fn set_endpoint_resolver(properties: &mut PropertyBag, resolver: ServiceEndpointResolver) {
    properties.insert(resolver);
}

/// Middleware stage that adds an endpoint to a request. It will:
/// 1. Load an endpoint resolver from the property bag.
/// 2. Resolve an endpoint for the [`Region`] in the property bag.
/// 3. Apply the endpoint to the request URI.
/// 4. Record the `SigningRegion` and `SigningService` in the property bag
///    to drive the signing middleware downstream.
#[derive(Clone, Debug)]
pub struct EndpointStage;

#[derive(Debug)]
pub enum EndpointStageError {
    NoEndpointResolver,
    NoRegion,
    EndpointResolutionError(BoxError),
}

impl Display for EndpointStageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(self, f)
    }
}

impl Error for EndpointStageError {}

impl MapRequest for EndpointStage {
    type Error = EndpointStageError;

    fn name(&self) -> &'static str {
        "resolve_endpoint"
    }

    fn apply(&self, request: Request) -> Result<Request, Self::Error> {
        request.augment(|mut http_req, props| {
            let resolver =
                get_endpoint_resolver(props).ok_or(EndpointStageError::NoEndpointResolver)?;
            let region = props.get::<Region>().ok_or(EndpointStageError::NoRegion)?;
            let endpoint = resolver
                .resolve_endpoint(region)
                .map_err(EndpointStageError::EndpointResolutionError)?;
            tracing::debug!(endpoint = ?endpoint, base_region = ?region, "resolved endpoint");
            let signing_region = endpoint
                .credential_scope()
                .region()
                .cloned()
                .unwrap_or_else(|| region.clone().into());
            props.insert::<SigningRegion>(signing_region);
            if let Some(signing_service) = endpoint.credential_scope().service() {
                props.insert::<SigningService>(signing_service.clone());
            }
            endpoint
                .endpoint()
                .set_endpoint(http_req.uri_mut(), props.get::<EndpointPrefix>());
            Ok(http_req)
        })
    }
}
