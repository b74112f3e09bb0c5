/*
 * Copyright Oxbow Contributors. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Client for the KMS-compatible key management API.
//!
//! Binary members (`plaintext`, `ciphertext_blob`) are [`Blob`]s and travel
//! base64-encoded in the JSON bodies.

pub mod config;
pub mod error;
pub mod input;
pub mod operation;
pub mod output;

pub use config::{Builder, Config};
pub use oxbow_auth::Credentials;
pub use oxbow_types::region::Region;
pub use weft_types::Blob;

pub(crate) const API_METADATA: oxbow_http::user_agent::ApiMetadata =
    oxbow_http::user_agent::ApiMetadata::new("kms", env!("CARGO_PKG_VERSION"));
