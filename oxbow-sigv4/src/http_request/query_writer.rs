/*
 * Copyright Oxbow Contributors. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Appends query parameters to a URI, preserving whatever query string it
//! already carries.

use http::Uri;
use percent_encoding::{AsciiSet, CONTROLS};

/// Characters that must be encoded inside query keys and values so the
/// result parses back into the same pairs.
const QUERY_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'&')
    .add(b'=')
    .add(b'?')
    .add(b'%')
    .add(b'+');

pub(crate) struct QueryWriter {
    base_uri: Uri,
    new_path_and_query: String,
    prefix: char,
}

impl QueryWriter {
    pub(crate) fn new(uri: &Uri) -> Self {
        let new_path_and_query = uri
            .path_and_query()
            .map(|pq| pq.to_string())
            .unwrap_or_default();
        let prefix = if uri.query().is_some() { '&' } else { '?' };
        QueryWriter {
            base_uri: uri.clone(),
            new_path_and_query,
            prefix,
        }
    }

    pub(crate) fn insert(&mut self, k: &str, v: &str) {
        self.new_path_and_query.push(self.prefix);
        self.prefix = '&';
        self.new_path_and_query
            .push_str(&percent_encoding::percent_encode(k.as_bytes(), QUERY_SET).to_string());
        self.new_path_and_query.push('=');
        self.new_path_and_query
            .push_str(&percent_encoding::percent_encode(v.as_bytes(), QUERY_SET).to_string());
    }

    pub(crate) fn build_uri(self) -> Uri {
        let mut parts = self.base_uri.into_parts();
        parts.path_and_query = Some(
            self.new_path_and_query
                .parse()
                .expect("adding encoded query parameters keeps the path valid"),
        );
        Uri::from_parts(parts).expect("parts are valid")
    }
}

#[cfg(test)]
mod test {
    use super::QueryWriter;
    use http::Uri;

    #[test]
    fn appends_to_empty_query() {
        let uri = Uri::from_static("https://www.example.com/path");
        let mut writer = QueryWriter::new(&uri);
        writer.insert("key", "value");
        writer.insert("another", "value2");
        assert_eq!(
            writer.build_uri(),
            Uri::from_static("https://www.example.com/path?key=value&another=value2")
        );
    }

    #[test]
    fn preserves_existing_query() {
        let uri = Uri::from_static("https://www.example.com/path?a=b");
        let mut writer = QueryWriter::new(&uri);
        writer.insert("c", "d");
        assert_eq!(
            writer.build_uri(),
            Uri::from_static("https://www.example.com/path?a=b&c=d")
        );
    }

    #[test]
    fn encodes_reserved_characters() {
        let uri = Uri::from_static("https://www.example.com/some/path");
        let mut writer = QueryWriter::new(&uri);
        writer.insert("some-param", "f&o?o");
        writer.insert("some-other-param?", "bar");
        assert_eq!(
            writer.build_uri(),
            Uri::from_static(
                "https://www.example.com/some/path?some-param=f%26o%3Fo&some-other-param%3F=bar"
            )
        );
    }
}
