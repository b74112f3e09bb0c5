/*
 * Copyright Oxbow Contributors. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Utilities to sign HTTP requests.

mod canonical_request;
mod error;
mod query_writer;
mod settings;
mod sign;
mod url_escape;

pub use error::SigningError;
pub use settings::{
    PayloadChecksumKind, SignatureLocation, SigningSettings, UriEncoding,
};
pub use sign::{sign, SignableBody, SignableRequest, SigningInstructions};
