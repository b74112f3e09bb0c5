/*
 * Copyright Oxbow Contributors. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

use std::env;
use std::process::Command;

fn main() {
    let rustc = env::var("RUSTC").unwrap_or_else(|_| "rustc".to_string());
    let output = Command::new(rustc)
        .arg("--version")
        .output()
        .expect("rustc --version must run to capture build metadata");
    let version_line =
        String::from_utf8(output.stdout).expect("rustc --version output is UTF-8");
    // "rustc 1.54.0 (a178d0322 2021-07-26)" -> "1.54.0"
    let version = version_line.split(' ').nth(1).unwrap_or("unknown");
    println!("cargo:rustc-env=OXBOW_RUST_VERSION={}", version);
}
