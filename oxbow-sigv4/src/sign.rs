/*
 * Copyright Oxbow Contributors. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Functions to create signing keys and calculate signatures.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use std::time::SystemTime;

/// The hex-encoded SHA-256 digest of `bytes`, as used for payload hashes and
/// canonical request hashes.
pub fn sha256_hex_string(bytes: impl AsRef<[u8]>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Calculate a signature: the HMAC-SHA256 of the string to sign, keyed with
/// the derived signing key.
pub fn calculate_signature(signing_key: impl AsRef<[u8]>, string_to_sign: &[u8]) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(signing_key.as_ref())
        .expect("HMAC can take key of any size");
    mac.update(string_to_sign);
    hex::encode(mac.finalize().into_bytes())
}

/// Derive a signing key from the secret through the SigV4 key chain:
/// `AWS4{secret}` -> date -> region -> service -> `aws4_request`.
pub fn generate_signing_key(
    secret: &str,
    time: SystemTime,
    region: &str,
    service: &str,
) -> impl AsRef<[u8]> {
    let mut mac = Hmac::<Sha256>::new_from_slice(format!("AWS4{}", secret).as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(crate::date_time::format_date(time).as_bytes());
    let tag = mac.finalize().into_bytes();

    let mut mac =
        Hmac::<Sha256>::new_from_slice(&tag).expect("HMAC can take key of any size");
    mac.update(region.as_bytes());
    let tag = mac.finalize().into_bytes();

    let mut mac =
        Hmac::<Sha256>::new_from_slice(&tag).expect("HMAC can take key of any size");
    mac.update(service.as_bytes());
    let tag = mac.finalize().into_bytes();

    let mut mac =
        Hmac::<Sha256>::new_from_slice(&tag).expect("HMAC can take key of any size");
    mac.update(b"aws4_request");
    mac.finalize().into_bytes()
}

#[cfg(test)]
mod tests {
    use super::{calculate_signature, generate_signing_key, sha256_hex_string};
    use crate::date_time::test::test_suite_time;

    #[test]
    fn test_signature_calculation() {
        let secret = "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY";
        let string_to_sign = "AWS4-HMAC-SHA256\n\
             20150830T123600Z\n\
             20150830/us-east-1/iam/aws4_request\n\
             f536975d06c0309214f805bb90ccff089219ecd68b2577efef23edd43b7e1a59";

        let derived_key = generate_signing_key(secret, test_suite_time(), "us-east-1", "iam");
        let signature = calculate_signature(derived_key, string_to_sign.as_bytes());

        let expected = "5d672d79c15b13162d9279b0855cfba6789a8edb4c82c400e06b5924a6f2b5d7";
        assert_eq!(expected, &signature);
    }

    #[test]
    fn empty_payload_hash() {
        assert_eq!(
            sha256_hex_string(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
