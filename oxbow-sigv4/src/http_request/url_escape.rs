/*
 * Copyright Oxbow Contributors. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

use percent_encoding::{AsciiSet, CONTROLS};

/// Characters that must be percent-encoded in canonical query strings and
/// paths. The unreserved set (`A-Za-z0-9-_.~`) passes through untouched.
const BASE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'/')
    .add(b':')
    .add(b',')
    .add(b'?')
    .add(b'#')
    .add(b'[')
    .add(b']')
    .add(b'@')
    .add(b'!')
    .add(b'$')
    .add(b'&')
    .add(b'\'')
    .add(b'(')
    .add(b')')
    .add(b'*')
    .add(b'+')
    .add(b';')
    .add(b'=')
    .add(b'%');

pub(crate) fn percent_encode(value: &str) -> String {
    percent_encoding::percent_encode(value.as_bytes(), BASE_SET).to_string()
}

#[cfg(test)]
mod test {
    use super::percent_encode;

    #[test]
    fn unreserved_characters_pass_through() {
        assert_eq!(percent_encode("a-zA-Z0-9-_.~"), "a-zA-Z0-9-_.~");
    }

    #[test]
    fn reserved_characters_are_encoded() {
        assert_eq!(percent_encode("a b/c=d&e"), "a%20b%2Fc%3Dd%26e");
        assert_eq!(percent_encode("100%"), "100%25");
    }
}
