/*
 * Copyright Oxbow Contributors. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Metadata about the toolchain and platform this crate was built with,
//! captured by the build script. Feeds the user agent headers.

#[derive(Debug)]
pub struct BuildMetadata {
    /// Version of the Rust compiler the crate was built with, e.g. `1.54.0`.
    pub rust_version: &'static str,

    /// Version of the core runtime crates.
    pub core_pkg_version: &'static str,

    /// The OS family this crate was compiled for.
    pub os_family: OsFamily,
}

#[non_exhaustive]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OsFamily {
    Windows,
    Linux,
    Macos,
    Android,
    Ios,
    Other,
}

impl OsFamily {
    pub const fn from_env() -> Self {
        // values of `target_os`: https://doc.rust-lang.org/reference/conditional-compilation.html#target_os
        if cfg!(target_os = "windows") {
            OsFamily::Windows
        } else if cfg!(target_os = "linux") {
            OsFamily::Linux
        } else if cfg!(target_os = "macos") {
            OsFamily::Macos
        } else if cfg!(target_os = "android") {
            OsFamily::Android
        } else if cfg!(target_os = "ios") {
            OsFamily::Ios
        } else {
            OsFamily::Other
        }
    }
}

pub const BUILD_METADATA: BuildMetadata = BuildMetadata {
    rust_version: env!("OXBOW_RUST_VERSION"),
    core_pkg_version: env!("CARGO_PKG_VERSION"),
    os_family: OsFamily::from_env(),
};

#[cfg(test)]
mod test {
    use super::BUILD_METADATA;

    #[test]
    fn valid_build_metadata() {
        let meta = &BUILD_METADATA;
        assert!(meta.rust_version.starts_with("1."));
        assert!(meta.core_pkg_version.starts_with("0."));
    }
}
