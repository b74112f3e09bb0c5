/*
 * Copyright Oxbow Contributors. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Terminal result types returned by `Client::call`.

use crate::body::SdkBody;
use std::error::Error;
use std::fmt;

type BoxError = Box<dyn Error + Send + Sync>;

/// A successful SDK response: the parsed output plus the raw HTTP response
/// it was parsed from.
#[derive(Debug)]
pub struct SdkSuccess<O> {
    pub raw: http::Response<SdkBody>,
    pub parsed: O,
}

/// A failed SDK request. The variant records which pipeline phase failed.
#[derive(Debug)]
pub enum SdkError<E> {
    /// The request could not be constructed (eg. a missing required field).
    /// Nothing was sent.
    ConstructionFailure(BoxError),

    /// The request could not be dispatched (connection refused, TLS failure).
    /// The request may or may not have been received.
    DispatchFailure(BoxError),

    /// A response was received but could not be parsed as either an output
    /// or a modeled error.
    ResponseError {
        raw: http::Response<SdkBody>,
        err: BoxError,
    },

    /// The service returned a modeled error.
    ServiceError {
        raw: http::Response<SdkBody>,
        err: E,
    },
}

impl<E: Error + Send + Sync + 'static> SdkError<E> {
    /// Discard the variant and raw response, keeping only the underlying
    /// error.
    pub fn into_source(self) -> BoxError {
        match self {
            SdkError::ConstructionFailure(err) => err,
            SdkError::DispatchFailure(err) => err,
            SdkError::ResponseError { err, .. } => err,
            SdkError::ServiceError { err, .. } => Box::new(err),
        }
    }
}

impl<E: fmt::Display> fmt::Display for SdkError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SdkError::ConstructionFailure(err) => {
                write!(f, "failed to construct request: {}", err)
            }
            SdkError::DispatchFailure(err) => write!(f, "failed to dispatch request: {}", err),
            SdkError::ResponseError { err, .. } => write!(f, "failed to parse response: {}", err),
            SdkError::ServiceError { err, .. } => write!(f, "service error: {}", err),
        }
    }
}

impl<E: Error + 'static> Error for SdkError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SdkError::ConstructionFailure(err)
            | SdkError::DispatchFailure(err)
            | SdkError::ResponseError { err, .. } => Some(err.as_ref()),
            SdkError::ServiceError { err, .. } => Some(err),
        }
    }
}
