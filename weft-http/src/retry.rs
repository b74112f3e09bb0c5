/*
 * Copyright Oxbow Contributors. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Response classification for the retry loop.

use weft_types::retry::RetryKind;

/// Classify a completed attempt so the retry loop can decide what to do
/// with it.
///
/// Classifiers are attached per-operation; service clients install one that
/// understands their modeled errors.
pub trait ClassifyResponse<T, E>: Clone {
    fn classify(&self, response: Result<&T, &E>) -> RetryKind;
}

/// The null classifier: never retry anything.
impl<T, E> ClassifyResponse<T, E> for () {
    fn classify(&self, _response: Result<&T, &E>) -> RetryKind {
        RetryKind::NotRetryable
    }
}
