/*
 * Copyright Oxbow Contributors. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Cross-service types shared by every Oxbow cloud client: regions, region
//! providers, and test shims for ambient OS state.

pub mod build_metadata;
pub mod os_shim_internal;
pub mod region;

pub use region::{Region, SigningRegion, SigningService};
