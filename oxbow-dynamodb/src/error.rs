/*
 * Copyright Oxbow Contributors. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Modeled service errors and the generic error fallback.
//!
//! Error responses carry `{"__type": "namespace#Code", "message": "..."}`
//! plus an `x-amzn-requestid` header. Codes with a modeled variant are
//! matched by name; everything else lands in `Unhandled` carrying the
//! generic [`weft_types::Error`].

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

/// Strip the namespace prefix (`com.amazon...#Code`) and any trailing
/// URI suffix (`Code:http://...`) from an error code.
fn sanitize_error_code(code: &str) -> &str {
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
    /// The server hit an internal error while processing the request.
    InternalServerError
}
modeled_error! {
    /// The named table or index does not exist or is not `ACTIVE`.
    ResourceNotFoundException
}
modeled_error! {
    /// Request rate is too high for the table's provisioned throughput.
    ProvisionedThroughputExceededException
}
modeled_error! {
    /// A condition expression evaluated to false.
    ConditionalCheckFailedException
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

fn retryable_code(code: Option<&str>) -> Option<ErrorKind> {
    match code {
        Some("ProvisionedThroughputExceededException") => Some(ErrorKind::ThrottlingError),
        _ => None,
    }
}

operation_error!(ListTablesError, "ListTables", [InternalServerError]);
operation_error!(
    DescribeTableError,
    "DescribeTable",
    [ResourceNotFoundException, InternalServerError]
);
operation_error!(
    GetItemError,
    "GetItem",
    [
        ProvisionedThroughputExceededException,
        ResourceNotFoundException,
        InternalServerError
    ]
);
operation_error!(
    PutItemError,
    "PutItem",
    [
        ConditionalCheckFailedException,
        ProvisionedThroughputExceededException,
        ResourceNotFoundException,
        InternalServerError
    ]
);
operation_error!(
    DeleteItemError,
    "DeleteItem",
    [
        ConditionalCheckFailedException,
        ProvisionedThroughputExceededException,
        ResourceNotFoundException,
        InternalServerError
    ]
);

#[cfg(test)]
mod test {
    use super::{parse_generic_error, GetItemError, ListTablesError};
    use bytes::Bytes;
    use weft_types::retry::{ErrorKind, ProvideErrorKind};

    fn error_response(body: &str) -> http::Response<Bytes> {
        http::Response::builder()
            .status(400)
            .header("x-amzn-requestid", "bfe81a0a-9a08-4e71-9910-cdb5ab6ea3b6")
            .body(Bytes::from(body.to_string()))
            .unwrap()
    }

    #[test]
    fn namespace_prefix_is_stripped_from_the_code() {
        let err = parse_generic_error(&error_response(
            r#"{"__type":"com.amazonaws.dynamodb.v20120810#ResourceNotFoundException","message":"Requested resource not found"}"#,
        ));
        assert_eq!(err.code(), Some("ResourceNotFoundException"));
        assert_eq!(err.message(), Some("Requested resource not found"));
        assert_eq!(
            err.request_id(),
            Some("bfe81a0a-9a08-4e71-9910-cdb5ab6ea3b6")
        );
    }

    #[test]
    fn uri_suffix_is_stripped_from_the_code() {
        let err = parse_generic_error(&error_response(
            r#"{"__type":"ThrottlingException:http://internal.amazon.com/coral/com.amazon.coral.service/"}"#,
        ));
        assert_eq!(err.code(), Some("ThrottlingException"));
    }

    #[test]
    fn malformed_error_bodies_still_produce_a_request_id() {
        let err = parse_generic_error(&error_response("not json"));
        assert_eq!(err.code(), None);
        assert_eq!(
            err.request_id(),
            Some("bfe81a0a-9a08-4e71-9910-cdb5ab6ea3b6")
        );
    }

    #[test]
    fn modeled_codes_map_to_modeled_variants() {
        let err = GetItemError::from_response(&error_response(
            r#"{"__type":"com.amazonaws.dynamodb.v20120810#ProvisionedThroughputExceededException","message":"slow down"}"#,
        ));
        match &err {
            GetItemError::ProvisionedThroughputExceededException(inner) => {
                assert_eq!(inner.message.as_deref(), Some("slow down"))
            }
            other => panic!("wrong variant: {:?}", other),
        }
        assert_eq!(
            err.retryable_error_kind(),
            Some(ErrorKind::ThrottlingError)
        );
    }

    #[test]
    fn unknown_codes_fall_back_to_unhandled() {
        let err = ListTablesError::from_response(&error_response(
            r#"{"__type":"ns#SomeNewException","message":"?"}"#,
        ));
        match &err {
            ListTablesError::Unhandled(inner) => {
                assert_eq!(inner.code(), Some("SomeNewException"))
            }
            other => panic!("wrong variant: {:?}", other),
        }
        assert_eq!(err.retryable_error_kind(), None);
    }
}
