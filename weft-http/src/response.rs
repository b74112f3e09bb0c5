/*
 * Copyright Oxbow Contributors. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Contracts for converting raw HTTP responses into modeled outputs.

use bytes::Bytes;

/// Turn an HTTP response into a modeled `Result<Output, Error>`.
///
/// `parse_unloaded` is offered the response before the body has been read;
/// implementations that need to stream the body claim the response there.
/// Everything else returns `None` and is handed the fully loaded body in
/// `parse_loaded`.
pub trait ParseHttpResponse<B> {
    type Output;

    /// Parse an HTTP request without reading the body. If the body must be
    /// provided to proceed, return `None`.
    fn parse_unloaded(&self, response: &mut http::Response<B>) -> Option<Self::Output>;

    /// Parse an HTTP request from a fully loaded body.
    fn parse_loaded(&self, response: &http::Response<Bytes>) -> Self::Output;
}

/// A response parser that always requires the complete body.
///
/// Most JSON protocol operations implement this; a blanket impl wires it into
/// the pipeline as a `ParseHttpResponse` that never claims unloaded
/// responses.
pub trait ParseStrictResponse {
    type Output;
    fn parse(&self, response: &http::Response<Bytes>) -> Self::Output;
}

impl<B, T: ParseStrictResponse> ParseHttpResponse<B> for T {
    type Output = T::Output;

    fn parse_unloaded(&self, _response: &mut http::Response<B>) -> Option<Self::Output> {
        None
    }

    fn parse_loaded(&self, response: &http::Response<Bytes>) -> Self::Output {
        self.parse(response)
    }
}
