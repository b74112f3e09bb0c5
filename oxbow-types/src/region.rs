/*
 * Copyright Oxbow Contributors. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Regions, and providers that discover them.

use crate::os_shim_internal::Env;
use std::borrow::Cow;
use std::fmt;
use std::future::Future;
use std::pin::Pin;

/// The region to send requests to.
///
/// A `Region` selects an endpoint; it is not necessarily the same as the
/// [`SigningRegion`] the request is signed for, though it usually is.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Region(Cow<'static, str>);

impl Region {
    pub fn new(region: impl Into<Cow<'static, str>>) -> Self {
        Region(region.into())
    }

    pub fn from_static(region: &'static str) -> Self {
        Region(Cow::Borrowed(region))
    }

    pub fn as_ref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Region {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The region a request is signed for.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct SigningRegion(Cow<'static, str>);

impl SigningRegion {
    pub fn from_static(region: &'static str) -> Self {
        SigningRegion(Cow::Borrowed(region))
    }

    pub fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<Region> for SigningRegion {
    fn from(region: Region) -> Self {
        SigningRegion(region.0)
    }
}

impl From<&'static str> for SigningRegion {
    fn from(region: &'static str) -> Self {
        Self::from_static(region)
    }
}

/// The service name a request is signed for, eg. `dynamodb`.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct SigningService(Cow<'static, str>);

impl SigningService {
    pub fn from_static(service: &'static str) -> Self {
        SigningService(Cow::Borrowed(service))
    }

    pub fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for SigningService {
    fn from(service: &'static str) -> Self {
        Self::from_static(service)
    }
}

type RegionFuture<'a> = Pin<Box<dyn Future<Output = Option<Region>> + Send + 'a>>;

/// Asynchronously discover a region.
pub trait ProvideRegion: Send + Sync {
    fn region(&self) -> RegionFuture<'_>;
}

/// A static region always provides itself.
impl ProvideRegion for Region {
    fn region(&self) -> RegionFuture<'_> {
        let region = self.clone();
        Box::pin(async move { Some(region) })
    }
}

impl ProvideRegion for Option<Region> {
    fn region(&self) -> RegionFuture<'_> {
        let region = self.clone();
        Box::pin(async move { region })
    }
}

/// Discover a region from the `AWS_REGION` / `AWS_DEFAULT_REGION`
/// environment variables, in that order.
#[derive(Clone, Debug)]
pub struct EnvironmentProvider {
    env: Env,
}

impl EnvironmentProvider {
    pub fn new() -> Self {
        EnvironmentProvider { env: Env::real() }
    }

    #[doc(hidden)]
    pub fn new_with_env(env: Env) -> Self {
        EnvironmentProvider { env }
    }
}

impl Default for EnvironmentProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ProvideRegion for EnvironmentProvider {
    fn region(&self) -> RegionFuture<'_> {
        let region = self
            .env
            .get("AWS_REGION")
            .or_else(|_| self.env.get("AWS_DEFAULT_REGION"))
            .ok()
            .map(Region::new);
        Box::pin(async move { region })
    }
}

/// Try a list of providers in order, returning the first region found.
#[derive(Default)]
pub struct ChainProvider {
    providers: Vec<Box<dyn ProvideRegion>>,
}

impl ChainProvider {
    pub fn first_try(provider: impl ProvideRegion + 'static) -> Self {
        ChainProvider {
            providers: vec![Box::new(provider)],
        }
    }

    pub fn or_else(mut self, fallback: impl ProvideRegion + 'static) -> Self {
        self.providers.push(Box::new(fallback));
        self
    }
}

impl ProvideRegion for ChainProvider {
    fn region(&self) -> RegionFuture<'_> {
        Box::pin(async move {
            for provider in &self.providers {
                if let Some(region) = provider.region().await {
                    return Some(region);
                }
            }
            None
        })
    }
}

/// The default region provider chain: explicit configuration first, then the
/// environment.
pub fn default_provider() -> impl ProvideRegion {
    EnvironmentProvider::new()
}

#[cfg(test)]
mod test {
    use super::{ChainProvider, EnvironmentProvider, ProvideRegion, Region};
    use crate::os_shim_internal::Env;
    use futures_executor::block_on;

    #[test]
    fn environment_provider_prefers_aws_region() {
        let provider = EnvironmentProvider::new_with_env(Env::from_slice(&[
            ("AWS_REGION", "us-east-1"),
            ("AWS_DEFAULT_REGION", "eu-west-2"),
        ]));
        assert_eq!(block_on(provider.region()), Some(Region::new("us-east-1")));
    }

    #[test]
    fn environment_provider_falls_back_to_default_region() {
        let provider = EnvironmentProvider::new_with_env(Env::from_slice(&[(
            "AWS_DEFAULT_REGION",
            "eu-west-2",
        )]));
        assert_eq!(block_on(provider.region()), Some(Region::new("eu-west-2")));
    }

    #[test]
    fn environment_provider_empty_env() {
        let provider = EnvironmentProvider::new_with_env(Env::from_slice(&[]));
        assert_eq!(block_on(provider.region()), None);
    }

    #[test]
    fn chain_provider_first_match_wins() {
        let chain = ChainProvider::first_try(Option::<Region>::None)
            .or_else(Region::new("ap-southeast-2"))
            .or_else(Region::new("us-west-1"));
        assert_eq!(block_on(chain.region()), Some(Region::new("ap-southeast-2")));
    }
}
