/*
 * Copyright Oxbow Contributors. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Client for the DynamoDB-compatible document database API.
//!
//! Each operation is an input builder plus a `make_operation` constructor:
//!
//! ```no_run
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! use oxbow_dynamodb::input::ListTablesInput;
//! use oxbow_dynamodb::{Config, Region};
//!
//! let conf = Config::builder().region(Region::new("us-east-1")).build();
//! let client = oxbow_client::Client::new(oxbow_client::conn::Standard::https());
//! let op = ListTablesInput::builder()
//!     .limit(10)
//!     .build()?
//!     .make_operation(&conf)?;
//! let tables = client.call(op).await?;
//! # Ok(()) }
//! ```

pub mod config;
pub mod error;
pub mod input;
pub mod model;
pub mod operation;
pub mod output;

pub use config::{Builder, Config};
pub use oxbow_auth::Credentials;
pub use oxbow_types::region::Region;

pub(crate) const API_METADATA: oxbow_http::user_agent::ApiMetadata =
    oxbow_http::user_agent::ApiMetadata::new("dynamodb", env!("CARGO_PKG_VERSION"));
