/*
 * Copyright Oxbow Contributors. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Low-level SigV4 request signing.
//!
//! This crate implements the algorithm only; it has no opinion about how
//! requests are built or dispatched. The request pipeline drives it through
//! [`http_request::sign`].

mod date_time;
pub mod http_request;
pub mod sign;

use crate::http_request::SigningSettings;
use std::fmt;
use std::time::SystemTime;

/// Parameters for one signing invocation.
#[derive(Clone)]
pub struct SigningParams<'a> {
    pub(crate) access_key: &'a str,
    pub(crate) secret_key: &'a str,
    pub(crate) security_token: Option<&'a str>,

    pub(crate) region: &'a str,
    pub(crate) service_name: &'a str,
    pub(crate) time: SystemTime,

    pub(crate) settings: SigningSettings,
}

impl<'a> SigningParams<'a> {
    pub fn builder() -> signing_params::Builder<'a> {
        Default::default()
    }

    pub fn region(&self) -> &str {
        self.region
    }

    pub fn service_name(&self) -> &str {
        self.service_name
    }
}

impl<'a> fmt::Debug for SigningParams<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningParams")
            .field("access_key", &self.access_key)
            .field("secret_key", &"** redacted **")
            .field("region", &self.region)
            .field("service_name", &self.service_name)
            .field("time", &self.time)
            .field("settings", &self.settings)
            .finish()
    }
}

pub mod signing_params {
    use super::SigningParams;
    use crate::http_request::SigningSettings;
    use std::error::Error;
    use std::fmt;
    use std::time::SystemTime;

    /// [`SigningParams::builder`] was missing a required field.
    #[derive(Debug)]
    pub struct BuildError {
        reason: &'static str,
    }

    impl BuildError {
        fn new(reason: &'static str) -> Self {
            Self { reason }
        }
    }

    impl fmt::Display for BuildError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.reason)
        }
    }

    impl Error for BuildError {}

    #[derive(Debug, Default)]
    pub struct Builder<'a> {
        access_key: Option<&'a str>,
        secret_key: Option<&'a str>,
        security_token: Option<&'a str>,
        region: Option<&'a str>,
        service_name: Option<&'a str>,
        time: Option<SystemTime>,
        settings: Option<SigningSettings>,
    }

    impl<'a> Builder<'a> {
        pub fn access_key(mut self, access_key: &'a str) -> Self {
            self.access_key = Some(access_key);
            self
        }

        pub fn secret_key(mut self, secret_key: &'a str) -> Self {
            self.secret_key = Some(secret_key);
            self
        }

        pub fn security_token(mut self, security_token: &'a str) -> Self {
            self.security_token = Some(security_token);
            self
        }

        pub fn set_security_token(mut self, security_token: Option<&'a str>) -> Self {
            self.security_token = security_token;
            self
        }

        pub fn region(mut self, region: &'a str) -> Self {
            self.region = Some(region);
            self
        }

        pub fn service_name(mut self, service_name: &'a str) -> Self {
            self.service_name = Some(service_name);
            self
        }

        pub fn time(mut self, time: SystemTime) -> Self {
            self.time = Some(time);
            self
        }

        pub fn settings(mut self, settings: SigningSettings) -> Self {
            self.settings = Some(settings);
            self
        }

        pub fn build(self) -> Result<SigningParams<'a>, BuildError> {
            Ok(SigningParams {
                access_key: self
                    .access_key
                    .ok_or_else(|| BuildError::new("access key is required"))?,
                secret_key: self
                    .secret_key
                    .ok_or_else(|| BuildError::new("secret key is required"))?,
                security_token: self.security_token,
                region: self
                    .region
                    .ok_or_else(|| BuildError::new("region is required"))?,
                service_name: self
                    .service_name
                    .ok_or_else(|| BuildError::new("service name is required"))?,
                time: self
                    .time
                    .ok_or_else(|| BuildError::new("time is required"))?,
                settings: self.settings.unwrap_or_default(),
            })
        }
    }
}

/// A signing output paired with the signature that produced it.
#[derive(Debug)]
pub struct SigningOutput<T> {
    output: T,
    signature: String,
}

impl<T> SigningOutput<T> {
    pub fn new(output: T, signature: String) -> Self {
        Self { output, signature }
    }

    pub fn output(&self) -> &T {
        &self.output
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }

    pub fn into_parts(self) -> (T, String) {
        (self.output, self.signature)
    }
}
