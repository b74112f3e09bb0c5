/*
 * Copyright Oxbow Contributors. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Tower layers that adapt the pipeline contracts in `weft-http` into
//! composable services: request mapping, dispatch, and response parsing.

pub mod dispatch;
pub mod map_request;
pub mod parse_response;

use std::error::Error;
use std::fmt;
use weft_http::result::SdkError;

pub type BoxError = Box<dyn Error + Send + Sync>;

/// The error type flowing through the middleware stack, below response
/// parsing. `ParseResponseService` converts it into `SdkError`.
#[derive(Debug)]
pub enum SendOperationError {
    /// The request could not be constructed by a pipeline stage.
    RequestConstructionError(BoxError),
    /// The request could not be dispatched over the connector.
    RequestDispatchError(BoxError),
}

impl fmt::Display for SendOperationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SendOperationError::RequestConstructionError(err) => {
                write!(f, "failed to construct request: {}", err)
            }
            SendOperationError::RequestDispatchError(err) => {
                write!(f, "failed to dispatch request: {}", err)
            }
        }
    }
}

impl Error for SendOperationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SendOperationError::RequestConstructionError(err)
            | SendOperationError::RequestDispatchError(err) => Some(err.as_ref()),
        }
    }
}

impl<E> From<SendOperationError> for SdkError<E> {
    fn from(err: SendOperationError) -> Self {
        match err {
            SendOperationError::RequestConstructionError(err) => {
                SdkError::ConstructionFailure(err)
            }
            SendOperationError::RequestDispatchError(err) => SdkError::DispatchFailure(err),
        }
    }
}
