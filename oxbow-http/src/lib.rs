/*
 * Copyright Oxbow Contributors. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! HTTP-level behavior shared by every Oxbow service client.

pub mod user_agent;

use std::time::Duration;
use weft_http::result::{SdkError, SdkSuccess};
use weft_http::retry::ClassifyResponse;
use weft_types::retry::{ErrorKind, ProvideErrorKind, RetryKind};

/// A retry policy that models cloud-service error conventions.
///
/// In order of priority:
/// 1. The `x-amz-retry-after` header is checked.
/// 2. The modeled error retry mode is checked.
/// 3. The error code is checked against a predetermined list of throttling
///    and transient error codes.
/// 4. The status code is checked against a predetermined list of status
///    codes.
#[non_exhaustive]
#[derive(Clone, Debug)]
pub struct OxbowErrorRetryPolicy;

const TRANSIENT_ERROR_STATUS_CODES: [u16; 2] = [400, 408];
const THROTTLING_ERRORS: &[&str] = &[
    "Throttling",
    "ThrottlingException",
    "ThrottledException",
    "RequestThrottledException",
    "TooManyRequestsException",
    "ProvisionedThroughputExceededException",
    "TransactionInProgressException",
    "RequestLimitExceeded",
    "BandwidthLimitExceeded",
    "LimitExceededException",
    "RequestThrottled",
    "SlowDown",
    "PriorRequestNotComplete",
    "EC2ThrottledException",
];
const TRANSIENT_ERRORS: &[&str] = &["RequestTimeout", "RequestTimeoutException"];

impl OxbowErrorRetryPolicy {
    /// An `OxbowErrorRetryPolicy` with the default set of known error and
    /// status codes.
    pub fn new() -> Self {
        OxbowErrorRetryPolicy
    }
}

impl Default for OxbowErrorRetryPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> ClassifyResponse<SdkSuccess<T>, SdkError<E>> for OxbowErrorRetryPolicy
where
    E: ProvideErrorKind,
{
    fn classify(&self, result: Result<&SdkSuccess<T>, &SdkError<E>>) -> RetryKind {
        let (err, response) = match result {
            Err(SdkError::ServiceError { err, raw }) => (err, raw),
            // construction and dispatch failures carry no service response
            // to classify
            Err(_) => return RetryKind::NotRetryable,
            Ok(_) => return RetryKind::NotRetryable,
        };
        if let Some(retry_after_delay) = response
            .headers()
            .get("x-amz-retry-after")
            .and_then(|header| header.to_str().ok())
            .and_then(|header| header.parse::<u64>().ok())
        {
            return RetryKind::Explicit(Duration::from_millis(retry_after_delay));
        }
        if let Some(kind) = err.retryable_error_kind() {
            return RetryKind::Error(kind);
        }
        if let Some(code) = err.code() {
            if THROTTLING_ERRORS.contains(&code) {
                return RetryKind::Error(ErrorKind::ThrottlingError);
            }
            if TRANSIENT_ERRORS.contains(&code) {
                return RetryKind::Error(ErrorKind::TransientError);
            }
        }
        if TRANSIENT_ERROR_STATUS_CODES.contains(&response.status().as_u16()) {
            return RetryKind::Error(ErrorKind::TransientError);
        }
        RetryKind::NotRetryable
    }
}

#[cfg(test)]
mod test {
    use crate::OxbowErrorRetryPolicy;
    use std::time::Duration;
    use weft_http::body::SdkBody;
    use weft_http::result::{SdkError, SdkSuccess};
    use weft_http::retry::ClassifyResponse;
    use weft_types::retry::{ErrorKind, ProvideErrorKind, RetryKind};

    struct UnmodeledError;

    struct CodedError {
        code: &'static str,
    }

    impl ProvideErrorKind for UnmodeledError {
        fn retryable_error_kind(&self) -> Option<ErrorKind> {
            None
        }

        fn code(&self) -> Option<&str> {
            None
        }
    }

    impl ProvideErrorKind for CodedError {
        fn retryable_error_kind(&self) -> Option<ErrorKind> {
            None
        }

        fn code(&self) -> Option<&str> {
            Some(self.code)
        }
    }

    fn service_error<E>(err: E, response: http::Response<&'static str>) -> SdkError<E> {
        let (parts, body) = response.into_parts();
        SdkError::ServiceError {
            err,
            raw: http::Response::from_parts(parts, SdkBody::from(body)),
        }
    }

    fn classify<E: ProvideErrorKind>(err: SdkError<E>) -> RetryKind {
        let policy = OxbowErrorRetryPolicy::new();
        let result: Result<&SdkSuccess<()>, &SdkError<E>> = Err(&err);
        policy.classify(result)
    }

    #[test]
    fn not_an_error() {
        let err = service_error(UnmodeledError, http::Response::new("OK"));
        assert_eq!(classify(err), RetryKind::NotRetryable);
    }

    #[test]
    fn classify_by_error_code() {
        let err = service_error(
            CodedError {
                code: "Throttling",
            },
            http::Response::new("error!"),
        );
        assert_eq!(classify(err), RetryKind::Error(ErrorKind::ThrottlingError));

        let err = service_error(
            CodedError {
                code: "RequestTimeout",
            },
            http::Response::new("error!"),
        );
        assert_eq!(classify(err), RetryKind::Error(ErrorKind::TransientError));
    }

    #[test]
    fn classify_by_status_code() {
        let err = service_error(
            UnmodeledError,
            http::Response::builder()
                .status(408)
                .body("error!")
                .unwrap(),
        );
        assert_eq!(classify(err), RetryKind::Error(ErrorKind::TransientError));

        let err = service_error(
            UnmodeledError,
            http::Response::builder()
                .status(500)
                .body("error!")
                .unwrap(),
        );
        assert_eq!(classify(err), RetryKind::NotRetryable);
    }

    #[test]
    fn modeled_retry_kind_wins_over_code() {
        struct ModeledRetries;
        impl ProvideErrorKind for ModeledRetries {
            fn retryable_error_kind(&self) -> Option<ErrorKind> {
                Some(ErrorKind::ClientError)
            }

            fn code(&self) -> Option<&str> {
                Some("Throttling")
            }
        }
        let err = service_error(ModeledRetries, http::Response::new("error!"));
        assert_eq!(classify(err), RetryKind::Error(ErrorKind::ClientError));
    }

    #[test]
    fn retry_after_header_takes_priority() {
        let err = service_error(
            UnmodeledError,
            http::Response::builder()
                .header("x-amz-retry-after", "5000")
                .status(408)
                .body("error!")
                .unwrap(),
        );
        assert_eq!(
            classify(err),
            RetryKind::Explicit(Duration::from_millis(5000))
        );
    }

    #[test]
    fn successful_responses_are_never_retried() {
        let policy = OxbowErrorRetryPolicy::new();
        let success = SdkSuccess {
            raw: http::Response::new(SdkBody::from("OK")),
            parsed: (),
        };
        let result: Result<&SdkSuccess<()>, &SdkError<UnmodeledError>> = Ok(&success);
        assert_eq!(policy.classify(result), RetryKind::NotRetryable);
    }
}
