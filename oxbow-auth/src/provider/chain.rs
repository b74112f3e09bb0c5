/*
 * Copyright Oxbow Contributors. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Chain several credentials providers, taking the first that succeeds.

use crate::provider::{AsyncProvideCredentials, CredentialsError, CredentialsResult};
use std::borrow::Cow;
use std::pin::Pin;
use tracing::Instrument;

/// Providers are tried in the order given; each failure is logged and the
/// next provider consulted. The chain fails only when every provider does.
pub struct ChainProvider {
    providers: Vec<(Cow<'static, str>, Box<dyn AsyncProvideCredentials>)>,
}

impl ChainProvider {
    pub fn first_try(
        name: impl Into<Cow<'static, str>>,
        provider: impl AsyncProvideCredentials + 'static,
    ) -> Self {
        ChainProvider {
            providers: vec![(name.into(), Box::new(provider))],
        }
    }

    pub fn or_else(
        mut self,
        name: impl Into<Cow<'static, str>>,
        provider: impl AsyncProvideCredentials + 'static,
    ) -> Self {
        self.providers.push((name.into(), Box::new(provider)));
        self
    }

    async fn credentials(&self) -> CredentialsResult {
        let mut last_error = CredentialsError::CredentialsNotLoaded;
        for (name, provider) in &self.providers {
            let span = tracing::info_span!("load_credentials", provider = %name);
            match provider.provide_credentials().instrument(span).await {
                Ok(credentials) => {
                    tracing::info!(provider = %name, "loaded credentials");
                    return Ok(credentials);
                }
                Err(err) => {
                    tracing::info!(provider = %name, error = %err, "provider in chain did not provide credentials");
                    last_error = err;
                }
            }
        }
        Err(last_error)
    }
}

impl AsyncProvideCredentials for ChainProvider {
    fn provide_credentials(&self) -> Pin<Box<dyn std::future::Future<Output = CredentialsResult> + Send + '_>> {
        Box::pin(self.credentials())
    }
}

#[cfg(test)]
mod test {
    use super::ChainProvider;
    use crate::provider::{AsyncProvideCredentials, CredentialsError, ProvideCredentials};
    use crate::Credentials;

    struct AlwaysFails;

    impl ProvideCredentials for AlwaysFails {
        fn provide_credentials(&self) -> crate::provider::CredentialsResult {
            Err(CredentialsError::CredentialsNotLoaded)
        }
    }

    #[tokio::test]
    async fn first_success_wins() {
        let chain = ChainProvider::first_try("fails", AlwaysFails)
            .or_else("static", Credentials::from_keys("access", "secret", None))
            .or_else("unreached", AlwaysFails);
        let creds = chain.provide_credentials().await.expect("chain succeeds");
        assert_eq!(creds.access_key_id(), "access");
    }

    #[tokio::test]
    async fn exhausted_chain_returns_the_last_error() {
        let chain = ChainProvider::first_try("fails", AlwaysFails).or_else("fails2", AlwaysFails);
        match chain.provide_credentials().await {
            Err(CredentialsError::CredentialsNotLoaded) => (),
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }
}
