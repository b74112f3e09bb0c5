/*
 * Copyright Oxbow Contributors. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! A builder for `Client`, letting each component be swapped independently.

use crate::retry::{self, Standard};
use crate::Client;

#[derive(Clone, Debug, Default)]
pub struct Builder<C = (), M = (), R = Standard> {
    connector: C,
    middleware: M,
    retry_policy: R,
}

impl Builder<(), ()> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C, M, R> Builder<C, M, R> {
    /// Specify the connector that dispatches requests over the wire.
    pub fn connector<C2>(self, connector: C2) -> Builder<C2, M, R> {
        Builder {
            connector,
            middleware: self.middleware,
            retry_policy: self.retry_policy,
        }
    }

    /// Specify the middleware stack applied to every request.
    pub fn middleware<M2>(self, middleware: M2) -> Builder<C, M2, R> {
        Builder {
            connector: self.connector,
            middleware,
            retry_policy: self.retry_policy,
        }
    }

    /// Use the standard retry policy with a custom configuration.
    pub fn retry_config(self, config: retry::Config) -> Builder<C, M, Standard> {
        Builder {
            connector: self.connector,
            middleware: self.middleware,
            retry_policy: Standard::new(config),
        }
    }

    pub fn build(self) -> Client<C, M, R> {
        Client {
            connector: self.connector,
            middleware: self.middleware,
            retry_policy: self.retry_policy,
        }
    }
}
