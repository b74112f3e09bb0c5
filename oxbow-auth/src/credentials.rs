/*
 * Copyright Oxbow Contributors. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;

/// Credentials used to sign requests.
///
/// Cheaply clonable. The `Debug` implementation redacts the secret key so
/// credentials can appear in request logs without leaking.
#[derive(Clone, Eq, PartialEq)]
pub struct Credentials(Arc<Inner>);

#[derive(Eq, PartialEq)]
struct Inner {
    access_key_id: String,
    secret_access_key: String,
    session_token: Option<String>,

    /// When the credentials stop working. After this point a provider must
    /// supply fresh credentials.
    expires_after: Option<SystemTime>,

    provider_name: &'static str,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut creds = f.debug_struct("Credentials");
        creds.field("provider_name", &self.0.provider_name);
        creds.field("access_key_id", &self.0.access_key_id);
        creds.field("secret_access_key", &"** redacted **");
        if let Some(expiry) = self.0.expires_after {
            creds.field("expires_after", &expiry);
        }
        creds.finish()
    }
}

const STATIC_CREDENTIALS: &str = "Static";

impl Credentials {
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        session_token: Option<String>,
        expires_after: Option<SystemTime>,
        provider_name: &'static str,
    ) -> Self {
        Credentials(Arc::new(Inner {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token,
            expires_after,
            provider_name,
        }))
    }

    /// Create credentials directly from a key pair. Intended for tests and
    /// quick experiments; production code should use a provider.
    pub fn from_keys(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        session_token: Option<String>,
    ) -> Self {
        Self::new(
            access_key_id,
            secret_access_key,
            session_token,
            None,
            STATIC_CREDENTIALS,
        )
    }

    pub fn access_key_id(&self) -> &str {
        &self.0.access_key_id
    }

    pub fn secret_access_key(&self) -> &str {
        &self.0.secret_access_key
    }

    pub fn session_token(&self) -> Option<&str> {
        self.0.session_token.as_deref()
    }

    pub fn expiry(&self) -> Option<SystemTime> {
        self.0.expires_after
    }
}

#[cfg(test)]
mod test {
    use super::Credentials;

    #[test]
    fn debug_redacts_the_secret_key() {
        let creds = Credentials::from_keys("AKIDEXAMPLE", "super-secret", None);
        let rendered = format!("{:?}", creds);
        assert!(rendered.contains("AKIDEXAMPLE"));
        assert!(!rendered.contains("super-secret"));
    }
}
