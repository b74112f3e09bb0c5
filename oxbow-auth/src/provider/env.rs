/*
 * Copyright Oxbow Contributors. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Loads credentials from `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY` /
//! `AWS_SESSION_TOKEN`.

use crate::provider::{CredentialsError, CredentialsResult, ProvideCredentials};
use crate::Credentials;
use oxbow_types::os_shim_internal::Env;

const PROVIDER_NAME: &str = "EnvironmentVariable";

#[derive(Clone, Debug)]
pub struct EnvironmentVariableCredentialsProvider {
    env: Env,
}

impl EnvironmentVariableCredentialsProvider {
    pub fn new() -> Self {
        Self::new_with_env(Env::real())
    }

    #[doc(hidden)]
    pub fn new_with_env(env: Env) -> Self {
        EnvironmentVariableCredentialsProvider { env }
    }
}

impl Default for EnvironmentVariableCredentialsProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ProvideCredentials for EnvironmentVariableCredentialsProvider {
    fn provide_credentials(&self) -> CredentialsResult {
        let access_key_id = self
            .env
            .get("AWS_ACCESS_KEY_ID")
            .map_err(|_| CredentialsError::CredentialsNotLoaded)?;
        let secret_access_key = self
            .env
            .get("AWS_SECRET_ACCESS_KEY")
            .map_err(|_| CredentialsError::CredentialsNotLoaded)?;
        let session_token = self.env.get("AWS_SESSION_TOKEN").ok();
        if access_key_id.is_empty() || secret_access_key.is_empty() {
            return Err(CredentialsError::CredentialsNotLoaded);
        }
        Ok(Credentials::new(
            access_key_id,
            secret_access_key,
            session_token,
            None,
            PROVIDER_NAME,
        ))
    }
}

#[cfg(test)]
mod test {
    use super::EnvironmentVariableCredentialsProvider;
    use crate::provider::{CredentialsError, ProvideCredentials};
    use oxbow_types::os_shim_internal::Env;

    #[test]
    fn loads_keys_and_token() {
        let provider = EnvironmentVariableCredentialsProvider::new_with_env(Env::from_slice(&[
            ("AWS_ACCESS_KEY_ID", "access"),
            ("AWS_SECRET_ACCESS_KEY", "secret"),
            ("AWS_SESSION_TOKEN", "token"),
        ]));
        let creds = provider.provide_credentials().expect("credentials load");
        assert_eq!(creds.access_key_id(), "access");
        assert_eq!(creds.secret_access_key(), "secret");
        assert_eq!(creds.session_token(), Some("token"));
    }

    #[test]
    fn token_is_optional() {
        let provider = EnvironmentVariableCredentialsProvider::new_with_env(Env::from_slice(&[
            ("AWS_ACCESS_KEY_ID", "access"),
            ("AWS_SECRET_ACCESS_KEY", "secret"),
        ]));
        let creds = provider.provide_credentials().expect("credentials load");
        assert_eq!(creds.session_token(), None);
    }

    #[test]
    fn missing_keys_are_not_loaded() {
        let provider =
            EnvironmentVariableCredentialsProvider::new_with_env(Env::from_slice(&[(
                "AWS_ACCESS_KEY_ID",
                "access",
            )]));
        match provider.provide_credentials() {
            Err(CredentialsError::CredentialsNotLoaded) => (),
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }
}
