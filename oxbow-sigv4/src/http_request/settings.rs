/*
 * Copyright Oxbow Contributors. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

use std::time::Duration;

/// HTTP-specific signing settings.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct SigningSettings {
    /// Whether the URI path should be percent-encoded a second time when
    /// building the canonical request. Most services expect double encoding;
    /// S3 is the notable exception.
    pub uri_encoding: UriEncoding,

    /// Whether to mirror the payload checksum into the
    /// `x-amz-content-sha256` header.
    pub payload_checksum_kind: PayloadChecksumKind,

    /// Where the signature is placed: request headers (the default), or
    /// query parameters for presigned requests.
    pub signature_location: SignatureLocation,

    /// For presigned requests, how long the resulting URL stays valid.
    pub expires_in: Option<Duration>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum UriEncoding {
    /// Re-encode the already-encoded path when creating the canonical
    /// request.
    Double,

    /// Take the path as given.
    Single,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum PayloadChecksumKind {
    /// Add the computed payload hash as the `x-amz-content-sha256` header
    /// and include it in the signed headers.
    XAmzSha256,

    /// Use the payload hash in the canonical request only.
    NoHeader,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum SignatureLocation {
    Headers,
    QueryParams,
}

impl Default for SigningSettings {
    fn default() -> Self {
        SigningSettings {
            uri_encoding: UriEncoding::Double,
            payload_checksum_kind: PayloadChecksumKind::NoHeader,
            signature_location: SignatureLocation::Headers,
            expires_in: None,
        }
    }
}
