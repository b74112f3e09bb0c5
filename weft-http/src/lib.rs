/*
 * Copyright Oxbow Contributors. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Core HTTP primitives for the Oxbow SDK: the request body, the operation
//! envelope carried through the pipeline, the stage contracts, and the
//! terminal result types.

pub mod body;
pub mod endpoint;
pub mod middleware;
pub mod operation;
pub mod property_bag;
pub mod response;
pub mod result;
pub mod retry;
