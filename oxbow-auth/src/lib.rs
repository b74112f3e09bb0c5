/*
 * Copyright Oxbow Contributors. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Credentials for request signing, the providers that load them, and the
//! pipeline stage that resolves them per request.

mod credentials;
pub mod middleware;
pub mod provider;

pub use credentials::Credentials;
pub use provider::{
    async_provide_credentials_fn, AsyncProvideCredentials, CredentialsError, CredentialsProvider,
    CredentialsResult, ProvideCredentials,
};

use weft_http::property_bag::PropertyBag;

/// Install a credentials provider into an operation's property bag.
pub fn set_provider(bag: &mut PropertyBag, provider: CredentialsProvider) {
    bag.insert(provider);
}
