/*
 * Copyright Oxbow Contributors. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Abstractions over ambient OS state (environment variables) so providers
//! can be tested hermetically.
//!
//! Outside of tests, `Env::real()` is the only constructor that should be
//! used.

use std::collections::HashMap;
use std::env::VarError;
use std::sync::Arc;

/// The process environment, or a faked replacement for tests.
#[derive(Clone, Debug)]
pub struct Env(EnvInner);

#[derive(Clone, Debug)]
enum EnvInner {
    Real,
    Fake(Arc<HashMap<String, String>>),
}

impl Env {
    pub fn real() -> Self {
        Env(EnvInner::Real)
    }

    pub fn from(env_vars: HashMap<String, String>) -> Self {
        Env(EnvInner::Fake(Arc::new(env_vars)))
    }

    pub fn from_slice(vars: &[(&str, &str)]) -> Self {
        Self::from(
            vars.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    pub fn get(&self, key: &str) -> Result<String, VarError> {
        match &self.0 {
            EnvInner::Real => std::env::var(key),
            EnvInner::Fake(map) => map.get(key).cloned().ok_or(VarError::NotPresent),
        }
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::real()
    }
}

#[cfg(test)]
mod test {
    use super::Env;
    use std::env::VarError;

    #[test]
    fn fake_env_returns_faked_values() {
        let env = Env::from_slice(&[("HOME", "/home/oxbow")]);
        assert_eq!(env.get("HOME"), Ok("/home/oxbow".to_string()));
        assert_eq!(env.get("MISSING"), Err(VarError::NotPresent));
    }
}
