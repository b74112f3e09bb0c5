/*
 * Copyright Oxbow Contributors. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

use crate::signer::{
    OperationSigningConfig, RequestConfig, SigV4Signer, SignableBody, SigningError,
    SigningRequirements,
};
use oxbow_auth::Credentials;
use oxbow_types::{SigningRegion, SigningService};
use std::time::SystemTime;
use thiserror::Error;
use weft_http::middleware::MapRequest;
use weft_http::operation::Request;
use weft_http::property_bag::PropertyBag;

/// Middleware stage to sign requests with SigV4.
///
/// `SigV4SigningStage` loads its configuration from the request property
/// bag and adds a signature.
///
/// Prior to signing, the following fields MUST be present in the bag:
/// - [`SigningRegion`]: the region used when signing, e.g. `us-east-1`
/// - [`SigningService`]: the service name used when signing, e.g. `dynamodb`
/// - [`Credentials`]: the credentials to sign with, resolved by an earlier
///   stage (unless signing is optional or disabled for the operation)
/// - [`OperationSigningConfig`]: operation-specific signing configuration
///
/// The following fields MAY be present:
/// - [`SystemTime`]: the timestamp to sign with; defaults to
///   [`SystemTime::now`]
/// - [`SignableBody`]: a payload override for bodies that cannot be read
///   during signing
#[derive(Clone, Debug)]
pub struct SigV4SigningStage {
    signer: SigV4Signer,
}

impl SigV4SigningStage {
    pub fn new(signer: SigV4Signer) -> Self {
        Self { signer }
    }
}

impl Default for SigV4SigningStage {
    fn default() -> Self {
        Self::new(SigV4Signer::new())
    }
}

#[derive(Debug, Error)]
pub enum SigningStageError {
    #[error("no credentials in the property bag")]
    MissingCredentials,
    #[error("no signing region in the property bag")]
    MissingSigningRegion,
    #[error("no signing service in the property bag")]
    MissingSigningService,
    #[error("no signing configuration in the property bag")]
    MissingSigningConfig,
    #[error("signing failed")]
    SigningFailure(#[from] SigningError),
}

/// The computed signature, recorded in the property bag so that callers
/// (presigners, tests) can retrieve it after the stage runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature(String);

impl Signature {
    pub fn new(signature: String) -> Self {
        Self(signature)
    }
}

impl AsRef<str> for Signature {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Resolve the credentials to sign with, honoring the operation's signing
/// requirements. `Ok(None)` means the request passes through unsigned.
fn credentials(
    config: &PropertyBag,
    requirements: SigningRequirements,
) -> Result<Option<Credentials>, SigningStageError> {
    match (requirements, config.get::<Credentials>()) {
        (SigningRequirements::Disabled, _) => Ok(None),
        (SigningRequirements::Optional, None) => Ok(None),
        (SigningRequirements::Required, None) => Err(SigningStageError::MissingCredentials),
        (_, Some(creds)) => Ok(Some(creds.clone())),
    }
}

impl MapRequest for SigV4SigningStage {
    type Error = SigningStageError;

    fn name(&self) -> &'static str {
        "sigv4_sign"
    }

    fn apply(&self, req: Request) -> Result<Request, Self::Error> {
        req.augment(|mut req, config| {
            let operation_config = config
                .get::<OperationSigningConfig>()
                .ok_or(SigningStageError::MissingSigningConfig)?;
            let creds = match credentials(config, operation_config.signing_requirements)? {
                Some(creds) => creds,
                None => return Ok(req),
            };
            let region = config
                .get::<SigningRegion>()
                .ok_or(SigningStageError::MissingSigningRegion)?;
            let service = config
                .get::<SigningService>()
                .ok_or(SigningStageError::MissingSigningService)?;
            let request_config = RequestConfig {
                request_ts: config
                    .get::<SystemTime>()
                    .copied()
                    .unwrap_or_else(SystemTime::now),
                region,
                service,
                payload_override: config.get::<SignableBody<'static>>(),
            };

            let signature =
                self.signer
                    .sign(operation_config, &request_config, &creds, &mut req)?;
            config.insert(signature);
            Ok(req)
        })
    }
}
