/*
 * Copyright Oxbow Contributors. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! The pipeline stage that resolves credentials before signing.

use crate::provider::{CredentialsError, CredentialsProvider};
use std::error::Error;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use weft_http::middleware::AsyncMapRequest;
use weft_http::operation::Request;

/// Resolve credentials from the provider in the property bag and store them
/// for the signing stage.
///
/// If no provider is configured the request passes through untouched; the
/// signing stage decides whether absent credentials are an error.
#[derive(Clone, Debug, Default)]
#[non_exhaustive]
pub struct CredentialsStage;

impl CredentialsStage {
    pub fn new() -> Self {
        CredentialsStage
    }

    async fn load_creds(mut request: Request) -> Result<Request, CredentialsStageError> {
        let provider = request.properties().get::<CredentialsProvider>().cloned();
        if let Some(provider) = provider {
            let credentials = provider
                .provide_credentials()
                .await
                .map_err(CredentialsStageError::CredentialsLoadingError)?;
            request.properties_mut().insert(credentials);
        }
        Ok(request)
    }
}

#[derive(Debug)]
pub enum CredentialsStageError {
    CredentialsLoadingError(CredentialsError),
}

impl fmt::Display for CredentialsStageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialsStageError::CredentialsLoadingError(err) => {
                write!(f, "failed to load credentials for the request: {}", err)
            }
        }
    }
}

impl Error for CredentialsStageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CredentialsStageError::CredentialsLoadingError(err) => Some(err),
        }
    }
}

impl AsyncMapRequest for CredentialsStage {
    type Error = CredentialsStageError;
    type Future = Pin<Box<dyn Future<Output = Result<Request, Self::Error>> + Send + 'static>>;

    fn apply(&self, request: Request) -> Self::Future {
        Box::pin(Self::load_creds(request))
    }
}

#[cfg(test)]
mod test {
    use super::CredentialsStage;
    use crate::provider::CredentialsProvider;
    use crate::Credentials;
    use std::sync::Arc;
    use weft_http::body::SdkBody;
    use weft_http::middleware::AsyncMapRequest;
    use weft_http::operation::Request;

    #[tokio::test]
    async fn installs_credentials_from_the_provider() {
        let mut request = Request::new(http::Request::new(SdkBody::empty()));
        let provider: CredentialsProvider =
            Arc::new(Credentials::from_keys("access", "secret", None));
        crate::set_provider(&mut request.properties_mut(), provider);
        let request = CredentialsStage::new()
            .apply(request)
            .await
            .expect("credentials resolve");
        let credentials = request
            .properties()
            .get::<Credentials>()
            .cloned()
            .expect("credentials in the bag");
        assert_eq!(credentials.access_key_id(), "access");
    }

    #[tokio::test]
    async fn missing_provider_is_a_passthrough() {
        let request = Request::new(http::Request::new(SdkBody::empty()));
        let request = CredentialsStage::new()
            .apply(request)
            .await
            .expect("passthrough");
        assert!(request.properties().get::<Credentials>().is_none());
    }
}
