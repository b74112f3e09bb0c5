/*
 * Copyright Oxbow Contributors. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! The shared retry vocabulary: how an error may be retried, and how modeled
//! errors report it.

use std::time::Duration;

/// The result of a retry classification: what category of error occurred.
#[non_exhaustive]
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum ErrorKind {
    /// A connection-level or timeout error. The request may never have
    /// reached the service.
    TransientError,

    /// The service asked the client to slow down.
    ThrottlingError,

    /// The service failed to process the request. Retrying an identical
    /// request may succeed.
    ServerError,

    /// The request will never succeed as written. Client errors are not
    /// retried.
    ClientError,
}

/// Implemented by modeled error types to surface their retryability.
pub trait ProvideErrorKind {
    /// Returns the `ErrorKind` when the error is modeled as retryable.
    ///
    /// `None` does not mean the error is permanent; generic classification
    /// (error code tables, status codes) may still decide to retry it.
    fn retryable_error_kind(&self) -> Option<ErrorKind>;

    /// The error code, if one was present in the response.
    fn code(&self) -> Option<&str>;
}

/// The outcome of classifying a response for the retry loop.
#[non_exhaustive]
#[derive(Clone, PartialEq, Debug)]
pub enum RetryKind {
    /// The associated error kind drives quota usage and backoff.
    Error(ErrorKind),

    /// Retry after exactly this delay, bypassing quota and backoff. Produced
    /// when the service names its own delay.
    Explicit(Duration),

    /// The response should not be retried.
    NotRetryable,
}
