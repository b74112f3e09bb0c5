/*
 * Copyright Oxbow Contributors. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! SigV4 signing support for the request pipeline.
//!
//! [`signer::SigV4Signer`] turns the configuration stored in an operation's
//! property bag into a call against `oxbow-sigv4`, and
//! [`middleware::SigV4SigningStage`] wires it into the middleware stack.

pub mod middleware;
pub mod signer;
