/*
 * Copyright Oxbow Contributors. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Response handlers, one per operation.

use bytes::Bytes;
use weft_http::response::ParseStrictResponse;

macro_rules! operation {
    ($(#[$docs:meta])* $name:ident, $builder:ident, $output:ident, $error:ident) => {
        $(#[$docs])*
        #[derive(Clone, Copy, Debug, Default)]
        pub struct $name {
            _private: (),
        }

        impl $name {
            pub fn new() -> Self {
                Self::default()
            }

            pub fn builder() -> crate::input::$builder::Builder {
                crate::input::$builder::Builder::default()
            }
        }

        impl ParseStrictResponse for $name {
            type Output = Result<crate::output::$output, crate::error::$error>;

            fn parse(&self, response: &http::Response<Bytes>) -> Self::Output {
                if !response.status().is_success() {
                    return Err(crate::error::$error::from_response(response));
                }
                serde_json::from_slice(response.body()).map_err(|err| {
                    crate::error::$error::unhandled(format!(
                        "failed to parse the response body: {}",
                        err
                    ))
                })
            }
        }
    };
}

operation! {
    /// Produce cryptographically secure random bytes.
    GenerateRandom, generate_random_input, GenerateRandomOutput, GenerateRandomError
}
operation! {
    /// Encrypt a plaintext under a named key.
    Encrypt, encrypt_input, EncryptOutput, EncryptError
}
operation! {
    /// Decrypt a ciphertext produced by `Encrypt`.
    Decrypt, decrypt_input, DecryptOutput, DecryptError
}
