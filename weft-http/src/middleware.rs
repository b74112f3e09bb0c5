/*
 * Copyright Oxbow Contributors. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Contracts implemented by pipeline stages, and the glue that loads a
//! response body and hands it to the operation's parser.

use crate::body::SdkBody;
use crate::operation;
use crate::response::ParseHttpResponse;
use crate::result::{SdkError, SdkSuccess};
use bytes::{Buf, Bytes};
use http_body::Body;
use std::error::Error;
use std::future::Future;
use std::pin::Pin;

pub type BoxError = Box<dyn Error + Send + Sync>;

/// A synchronous request transform: add headers, resolve the endpoint, sign.
///
/// Stages compose into the middleware stack via
/// `weft_http_tower::MapRequestLayer`.
pub trait MapRequest {
    type Error: Into<BoxError>;

    /// The name of this stage, used in logging.
    fn name(&self) -> &'static str;

    fn apply(&self, request: operation::Request) -> Result<operation::Request, Self::Error>;
}

/// An asynchronous request transform, for stages that must await something
/// before the request can proceed (eg. credentials resolution).
pub trait AsyncMapRequest {
    type Error: Into<BoxError> + Send + 'static;
    type Future: Future<Output = Result<operation::Request, Self::Error>> + Send + 'static;

    fn apply(&self, request: operation::Request) -> Self::Future;
}

/// Load the response body into memory (unless the handler claims it first),
/// then parse it into the operation's modeled result.
pub async fn load_response<T, E, O>(
    mut raw: http::Response<SdkBody>,
    handler: &O,
) -> Result<SdkSuccess<T>, SdkError<E>>
where
    O: ParseHttpResponse<SdkBody, Output = Result<T, E>>,
{
    if let Some(parsed_response) = handler.parse_unloaded(&mut raw) {
        tracing::trace!(response = ?raw, "parsed unloaded response");
        return sdk_result(parsed_response, raw);
    }

    let (parts, body) = raw.into_parts();
    let body = match read_body(body).await {
        Ok(body) => body,
        Err(err) => {
            return Err(SdkError::ResponseError {
                raw: http::Response::from_parts(parts, SdkBody::taken()),
                err,
            });
        }
    };

    let response = http::Response::from_parts(parts, Bytes::from(body));
    tracing::trace!(response = ?response, "loaded response");
    let parsed = handler.parse_loaded(&response);
    sdk_result(parsed, response.map(SdkBody::from))
}

async fn read_body(mut body: SdkBody) -> Result<Vec<u8>, BoxError> {
    let mut output = Vec::new();
    loop {
        let data = std::future::poll_fn(|cx| Pin::new(&mut body).poll_data(cx)).await;
        match data {
            Some(Ok(mut data)) => {
                while data.has_remaining() {
                    let chunk = data.chunk();
                    output.extend_from_slice(chunk);
                    let len = chunk.len();
                    data.advance(len);
                }
            }
            Some(Err(err)) => return Err(err),
            None => break,
        }
    }
    Ok(output)
}

/// Wrap a modeled result and the raw response into the terminal SDK types.
fn sdk_result<T, E>(
    parsed: Result<T, E>,
    raw: http::Response<SdkBody>,
) -> Result<SdkSuccess<T>, SdkError<E>> {
    match parsed {
        Ok(parsed) => Ok(SdkSuccess { raw, parsed }),
        Err(err) => Err(SdkError::ServiceError { raw, err }),
    }
}
