/*
 * Copyright Oxbow Contributors. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Modeled service errors and the generic error fallback.

use bytes::Bytes;
use serde::Deserialize;
use std::fmt;
use weft_types::retry::{ErrorKind, ProvideErrorKind};

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(rename = "__type")]
    code: Option<String>,
    #[serde(rename = "message", alias = "Message")]
    message: Option<String>,
}

fn sanitize_error_code(code: &str) -> &str {
    // `com.amazon...#Code` and `Code:http://...` both reduce to `Code`
    let code = code.rsplit('#').next().unwrap_or(code);
    code.split(':').next().unwrap_or(code)
}

/// Extract the generic error data from an error response.
pub fn parse_generic_error(response: &http::Response<Bytes>) -> weft_types::Error {
    let body: ErrorBody = serde_json::from_slice(response.body()).unwrap_or_default();
    weft_types::Error {
        code: body.code.as_deref().map(sanitize_error_code).map(str::to_string),
        message: body.message,
        request_id: response
            .headers()
            .get("x-amzn-requestid")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string),
    }
}

macro_rules! modeled_error {
    ($(#[$docs:meta])* $name:ident) => {
        $(#[$docs])*
        #[derive(Clone, Debug, Default, Eq, PartialEq)]
        pub struct $name {
            pub message: Option<String>,
        }

        impl $name {
            pub(crate) fn from_generic(generic: &weft_types::Error) -> Self {
                Self {
                    message: generic.message().map(str::to_string),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(stringify!($name))?;
                if let Some(message) = &self.message {
                    write!(f, ": {}", message)?;
                }
                Ok(())
            }
        }

        impl std::error::Error for $name {}
    };
}

modeled_error! {
    /// The named key, alias, or key store does not exist.
    NotFoundException
}
modeled_error! {
    /// The key exists but cannot be used for this operation.
    InvalidKeyUsageException
}
modeled_error! {
    /// The key's backing store is unreachable right now.
    KeyUnavailableException
}
modeled_error! {
    /// The service hit an internal error while processing the request.
    KMSInternalException
}
modeled_error! {
    /// A dependency of the service timed out.
    DependencyTimeoutException
}

macro_rules! operation_error {
    ($name:ident, $operation:literal, [$($variant:ident),+]) => {
        #[derive(Clone, Debug)]
        #[non_exhaustive]
        pub enum $name {
            $($variant($variant),)+
            /// An error code this client has no modeled variant for.
            Unhandled(weft_types::Error),
        }

        impl $name {
            pub(crate) fn from_response(response: &http::Response<Bytes>) -> Self {
                let generic = parse_generic_error(response);
                match generic.code() {
                    $(Some(code) if code == stringify!($variant) => {
                        $name::$variant($variant::from_generic(&generic))
                    })+
                    _ => $name::Unhandled(generic),
                }
            }

            pub(crate) fn unhandled(message: impl Into<String>) -> Self {
                $name::Unhandled(weft_types::Error {
                    message: Some(message.into()),
                    ..Default::default()
                })
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($operation, " failed: "))?;
                match self {
                    $($name::$variant(inner) => inner.fmt(f),)+
                    $name::Unhandled(inner) => inner.fmt(f),
                }
            }
        }

        impl std::error::Error for $name {}

        impl ProvideErrorKind for $name {
            fn retryable_error_kind(&self) -> Option<ErrorKind> {
                match self {
                    $name::Unhandled(_) => None,
                    _ => retryable_code(self.code()),
                }
            }

            fn code(&self) -> Option<&str> {
                match self {
                    $($name::$variant(_) => Some(stringify!($variant)),)+
                    $name::Unhandled(inner) => inner.code(),
                }
            }
        }
    };
}

/// Modeled retryability, consulted before the generic code tables.
fn retryable_code(code: Option<&str>) -> Option<ErrorKind> {
    match code {
        Some("KeyUnavailableException") | Some("DependencyTimeoutException") => {
            Some(ErrorKind::ServerError)
        }
        _ => None,
    }
}

operation_error!(
    GenerateRandomError,
    "GenerateRandom",
    [KMSInternalException, DependencyTimeoutException]
);
operation_error!(
    EncryptError,
    "Encrypt",
    [
        NotFoundException,
        InvalidKeyUsageException,
        KeyUnavailableException,
        KMSInternalException,
        DependencyTimeoutException
    ]
);
operation_error!(
    DecryptError,
    "Decrypt",
    [
        NotFoundException,
        InvalidKeyUsageException,
        KeyUnavailableException,
        KMSInternalException,
        DependencyTimeoutException
    ]
);
