/*
 * Copyright Oxbow Contributors. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

use http::header::{HeaderName, InvalidHeaderValue, USER_AGENT};
use http::HeaderValue;
use once_cell::sync::Lazy;
use oxbow_types::build_metadata::{OsFamily, BUILD_METADATA};
use oxbow_types::os_shim_internal::Env;
use std::borrow::Cow;
use std::convert::TryFrom;
use std::fmt;
use std::fmt::{Display, Formatter};
use thiserror::Error;
use weft_http::middleware::MapRequest;
use weft_http::operation::Request;

/// The user agent for an operation.
///
/// Service clients insert this into the property bag during operation
/// construction; [`UserAgentStage`] reads it back and sets the `User-Agent`
/// and `x-oxbow-user-agent` headers.
#[derive(Clone, Debug)]
pub struct UserAgent {
    sdk_metadata: SdkMetadata,
    api_metadata: ApiMetadata,
    os_metadata: OsMetadata,
    language_metadata: LanguageMetadata,
    exec_env_metadata: Option<ExecEnvMetadata>,
}

impl UserAgent {
    /// Build a user agent from the environment.
    ///
    /// [`BUILD_METADATA`] supplies the Rust version and target platform;
    /// `ApiMetadata` names the specific service and its version.
    pub fn new_from_environment(env: Env, api_metadata: ApiMetadata) -> Self {
        let build_metadata = &BUILD_METADATA;
        let sdk_metadata = SdkMetadata {
            name: "rust",
            version: build_metadata.core_pkg_version,
        };
        let os_metadata = OsMetadata {
            os_family: build_metadata.os_family,
            version: None,
        };
        let exec_env_metadata = env
            .get("OXBOW_EXECUTION_ENV")
            .ok()
            .map(|name| ExecEnvMetadata { name });
        UserAgent {
            sdk_metadata,
            api_metadata,
            os_metadata,
            language_metadata: LanguageMetadata {
                lang: "rust",
                version: build_metadata.rust_version,
            },
            exec_env_metadata,
        }
    }

    /// An environment-independent user agent for tests.
    ///
    /// Without this, running tests on a different platform would produce
    /// different user agent strings.
    pub fn for_tests() -> Self {
        Self {
            sdk_metadata: SdkMetadata {
                name: "rust",
                version: "0.123.test",
            },
            api_metadata: ApiMetadata {
                service_id: "test-service".into(),
                version: "0.123",
            },
            os_metadata: OsMetadata {
                os_family: OsFamily::Windows,
                version: Some("XPSP3".to_string()),
            },
            language_metadata: LanguageMetadata {
                lang: "rust",
                version: "1.50.0",
            },
            exec_env_metadata: None,
        }
    }

    /// The value for the extended `x-oxbow-user-agent` header.
    pub fn extended_ua_header(&self) -> String {
        use std::fmt::Write;
        let mut ua_value = String::new();
        // write! to a String cannot fail
        write!(ua_value, "{} ", &self.sdk_metadata).unwrap();
        write!(ua_value, "{} ", &self.api_metadata).unwrap();
        write!(ua_value, "{} ", &self.os_metadata).unwrap();
        write!(ua_value, "{}", &self.language_metadata).unwrap();
        if let Some(ref env_meta) = self.exec_env_metadata {
            write!(ua_value, " {}", env_meta).unwrap();
        }
        ua_value
    }

    /// The value for the standard `User-Agent` header.
    pub fn ua_header(&self) -> String {
        use std::fmt::Write;
        let mut ua_value = String::new();
        write!(ua_value, "{} ", &self.sdk_metadata).unwrap();
        write!(ua_value, "{} ", &self.os_metadata).unwrap();
        write!(ua_value, "{}", &self.language_metadata).unwrap();
        ua_value
    }
}

#[derive(Clone, Copy, Debug)]
struct SdkMetadata {
    name: &'static str,
    version: &'static str,
}

impl Display for SdkMetadata {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "oxbow-sdk-{}/{}", self.name, self.version)
    }
}

#[derive(Clone, Debug)]
pub struct ApiMetadata {
    service_id: Cow<'static, str>,
    version: &'static str,
}

impl ApiMetadata {
    pub const fn new(service_id: &'static str, version: &'static str) -> Self {
        Self {
            service_id: Cow::Borrowed(service_id),
            version,
        }
    }
}

impl Display for ApiMetadata {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "api/{}/{}", self.service_id, self.version)
    }
}

#[derive(Clone, Debug)]
struct OsMetadata {
    os_family: OsFamily,
    version: Option<String>,
}

impl Display for OsMetadata {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let os_family = match self.os_family {
            OsFamily::Windows => "windows",
            OsFamily::Linux => "linux",
            OsFamily::Macos => "macos",
            OsFamily::Android => "android",
            OsFamily::Ios => "ios",
            _ => "other",
        };
        write!(f, "os/{}", os_family)?;
        if let Some(ref version) = self.version {
            write!(f, "/{}", version)?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug)]
struct LanguageMetadata {
    lang: &'static str,
    version: &'static str,
}

impl Display for LanguageMetadata {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "lang/{}/{}", self.lang, self.version)
    }
}

#[derive(Clone, Debug)]
struct ExecEnvMetadata {
    name: String,
}

impl Display for ExecEnvMetadata {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "exec-env/{}", &self.name)
    }
}

pub static X_OXBOW_USER_AGENT: Lazy<HeaderName> =
    Lazy::new(|| HeaderName::from_static("x-oxbow-user-agent"));

/// Middleware stage that applies the user agent headers from the property
/// bag. The extended header is deliberately kept out of the signed header
/// set, so adding it here never invalidates an already-computed signature.
#[non_exhaustive]
#[derive(Default, Clone, Debug)]
pub struct UserAgentStage;

impl UserAgentStage {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Debug, Error)]
pub enum UserAgentStageError {
    #[error("user agent missing from property bag")]
    UserAgentMissing,
    #[error("provided user agent header was invalid")]
    InvalidHeader(#[from] InvalidHeaderValue),
}

impl MapRequest for UserAgentStage {
    type Error = UserAgentStageError;

    fn name(&self) -> &'static str {
        "user_agent"
    }

    fn apply(&self, request: Request) -> Result<Request, Self::Error> {
        request.augment(|mut req, conf| {
            let ua = conf
                .get::<UserAgent>()
                .ok_or(UserAgentStageError::UserAgentMissing)?;
            req.headers_mut()
                .append(USER_AGENT, HeaderValue::try_from(ua.ua_header())?);
            req.headers_mut().append(
                X_OXBOW_USER_AGENT.clone(),
                HeaderValue::try_from(ua.extended_ua_header())?,
            );
            Ok(req)
        })
    }
}
