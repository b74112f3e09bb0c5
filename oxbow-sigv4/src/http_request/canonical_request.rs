/*
 * Copyright Oxbow Contributors. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

use crate::date_time::{format_date, format_date_time};
use crate::http_request::error::CanonicalRequestError;
use crate::http_request::settings::{PayloadChecksumKind, SignatureLocation, UriEncoding};
use crate::http_request::sign::{SignableBody, SignableRequest};
use crate::http_request::url_escape::percent_encode;
use crate::sign::sha256_hex_string;
use crate::SigningParams;
use http::header::{HeaderMap, HeaderName, HeaderValue, HOST, USER_AGENT};
use http::Uri;
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::time::SystemTime;

pub(crate) mod header {
    pub(crate) const X_AMZ_CONTENT_SHA_256: &str = "x-amz-content-sha256";
    pub(crate) const X_AMZ_DATE: &str = "x-amz-date";
    pub(crate) const X_AMZ_SECURITY_TOKEN: &str = "x-amz-security-token";
    pub(crate) const X_OXBOW_USER_AGENT: &str = "x-oxbow-user-agent";
}

pub(crate) mod param {
    pub(crate) const X_AMZ_ALGORITHM: &str = "X-Amz-Algorithm";
    pub(crate) const X_AMZ_CREDENTIAL: &str = "X-Amz-Credential";
    pub(crate) const X_AMZ_DATE: &str = "X-Amz-Date";
    pub(crate) const X_AMZ_EXPIRES: &str = "X-Amz-Expires";
    pub(crate) const X_AMZ_SECURITY_TOKEN: &str = "X-Amz-Security-Token";
    pub(crate) const X_AMZ_SIGNED_HEADERS: &str = "X-Amz-SignedHeaders";
    pub(crate) const X_AMZ_SIGNATURE: &str = "X-Amz-Signature";
}

pub(crate) const HMAC_256: &str = "AWS4-HMAC-SHA256";

const UNSIGNED_PAYLOAD: &str = "UNSIGNED-PAYLOAD";

#[derive(Debug, PartialEq)]
pub(crate) struct HeaderValues<'a> {
    pub(crate) content_sha256: Cow<'a, str>,
    pub(crate) date_time: String,
    pub(crate) security_token: Option<&'a str>,
    pub(crate) signed_headers: SignedHeaders,
}

#[derive(Debug, PartialEq)]
pub(crate) struct QueryParamValues<'a> {
    pub(crate) algorithm: &'static str,
    pub(crate) content_sha256: Cow<'a, str>,
    pub(crate) credential: String,
    pub(crate) date_time: String,
    pub(crate) expires: String,
    pub(crate) security_token: Option<&'a str>,
    pub(crate) signed_headers: SignedHeaders,
}

#[derive(Debug, PartialEq)]
pub(crate) enum SignatureValues<'a> {
    Headers(HeaderValues<'a>),
    QueryParams(QueryParamValues<'a>),
}

impl<'a> SignatureValues<'a> {
    fn signed_headers(&self) -> &SignedHeaders {
        match self {
            SignatureValues::Headers(values) => &values.signed_headers,
            SignatureValues::QueryParams(values) => &values.signed_headers,
        }
    }

    fn content_sha256(&self) -> &str {
        match self {
            SignatureValues::Headers(values) => &values.content_sha256,
            SignatureValues::QueryParams(values) => &values.content_sha256,
        }
    }

    pub(crate) fn into_header_values(self) -> Option<HeaderValues<'a>> {
        match self {
            SignatureValues::Headers(values) => Some(values),
            _ => None,
        }
    }

    pub(crate) fn into_query_param_values(self) -> Option<QueryParamValues<'a>> {
        match self {
            SignatureValues::QueryParams(values) => Some(values),
            _ => None,
        }
    }
}

#[derive(Debug, PartialEq)]
pub(crate) struct CanonicalRequest<'a> {
    pub(crate) method: &'a http::Method,
    pub(crate) path: Cow<'a, str>,
    pub(crate) params: Option<String>,
    pub(crate) headers: HeaderMap,
    pub(crate) values: SignatureValues<'a>,
}

impl<'a> CanonicalRequest<'a> {
    /// Construct a canonical request (the normalized form the signature is
    /// computed over) from a signable request and the signing parameters.
    ///
    /// Steps, in order:
    /// - The URI path is normalized per the configured `UriEncoding`.
    /// - `host`, `x-amz-date` and (for header signing) the security token
    ///   and optional payload checksum headers are added.
    /// - Every header except those intermediaries may rewrite becomes part
    ///   of the signed header set.
    /// - For presigning, the `X-Amz-*` parameters join the query string
    ///   before it is sorted and re-encoded.
    pub(crate) fn from(
        req: &'a SignableRequest<'a>,
        params: &'a SigningParams<'a>,
    ) -> Result<CanonicalRequest<'a>, CanonicalRequestError> {
        let path = req.uri().path();
        let path = match params.settings.uri_encoding {
            // The path is already encoded; encoding it again is the
            // double-encode behavior most services expect.
            UriEncoding::Double => Cow::Owned(path.replace('%', "%25")),
            UriEncoding::Single => Cow::Borrowed(path),
        };
        let payload_hash = Self::payload_hash(req.body());
        let date_time = format_date_time(params.time);

        let (headers, values) = match params.settings.signature_location {
            SignatureLocation::Headers => {
                let mut canonical_headers = req.headers().clone();
                Self::insert_host_header(&mut canonical_headers, req.uri());
                Self::insert_date_header(&mut canonical_headers, &date_time);
                if let Some(security_token) = params.security_token {
                    let mut sec_header = HeaderValue::from_str(security_token)?;
                    sec_header.set_sensitive(true);
                    canonical_headers.insert(
                        HeaderName::from_static(header::X_AMZ_SECURITY_TOKEN),
                        sec_header,
                    );
                }
                if params.settings.payload_checksum_kind == PayloadChecksumKind::XAmzSha256 {
                    canonical_headers.insert(
                        HeaderName::from_static(header::X_AMZ_CONTENT_SHA_256),
                        HeaderValue::from_str(&payload_hash)?,
                    );
                }
                let signed_headers = Self::signed_headers(&canonical_headers)?;
                (
                    canonical_headers,
                    SignatureValues::Headers(HeaderValues {
                        content_sha256: payload_hash,
                        date_time,
                        security_token: params.security_token,
                        signed_headers,
                    }),
                )
            }
            SignatureLocation::QueryParams => {
                let mut canonical_headers = req.headers().clone();
                Self::insert_host_header(&mut canonical_headers, req.uri());
                let signed_headers = Self::signed_headers(&canonical_headers)?;
                let expires = params
                    .settings
                    .expires_in
                    .ok_or_else(CanonicalRequestError::missing_expires_in)?
                    .as_secs()
                    .to_string();
                let credential = format!(
                    "{}/{}/{}/{}/aws4_request",
                    params.access_key,
                    format_date(params.time),
                    params.region,
                    params.service_name,
                );
                (
                    canonical_headers,
                    SignatureValues::QueryParams(QueryParamValues {
                        algorithm: HMAC_256,
                        content_sha256: payload_hash,
                        credential,
                        date_time,
                        expires,
                        security_token: params.security_token,
                        signed_headers,
                    }),
                )
            }
        };

        let params_str = Self::params(req.uri(), &values);
        Ok(CanonicalRequest {
            method: req.method(),
            path,
            params: params_str,
            headers,
            values,
        })
    }

    fn payload_hash<'b>(body: &'b SignableBody<'_>) -> Cow<'b, str> {
        match body {
            SignableBody::Bytes(data) => Cow::Owned(sha256_hex_string(data)),
            SignableBody::Precomputed(digest) => Cow::Borrowed(digest.as_str()),
            SignableBody::UnsignedPayload => Cow::Borrowed(UNSIGNED_PAYLOAD),
        }
    }

    fn insert_host_header(headers: &mut HeaderMap, uri: &Uri) {
        if !headers.contains_key(&HOST) {
            let authority = uri
                .authority()
                .expect("request uri must have an authority to be signed");
            headers.insert(
                HOST,
                HeaderValue::from_str(authority.as_str())
                    .expect("authority is a valid header value"),
            );
        }
    }

    fn insert_date_header(headers: &mut HeaderMap, date_time: &str) {
        headers.insert(
            HeaderName::from_static(header::X_AMZ_DATE),
            HeaderValue::from_str(date_time).expect("date is a valid header value"),
        );
    }

    /// Headers that proxies and intermediaries commonly alter are never
    /// signed.
    fn excluded_from_signing(name: &HeaderName) -> bool {
        name == USER_AGENT || name.as_str() == header::X_OXBOW_USER_AGENT
    }

    fn signed_headers(
        canonical_headers: &HeaderMap,
    ) -> Result<SignedHeaders, CanonicalRequestError> {
        let mut names = Vec::with_capacity(canonical_headers.keys_len());
        for name in canonical_headers.keys() {
            if Self::excluded_from_signing(name) {
                continue;
            }
            for value in canonical_headers.get_all(name) {
                std::str::from_utf8(value.as_bytes())
                    .map_err(CanonicalRequestError::invalid_utf8_in_header_value)?;
            }
            names.push(CanonicalHeaderName(name.clone()));
        }
        Ok(SignedHeaders::new(names))
    }

    fn params(uri: &Uri, values: &SignatureValues<'_>) -> Option<String> {
        let mut params: Vec<(Cow<'_, str>, Cow<'_, str>)> =
            form_urlencoded::parse(uri.query().unwrap_or_default().as_bytes()).collect();
        if let SignatureValues::QueryParams(values) = values {
            params.push((
                Cow::Borrowed(param::X_AMZ_ALGORITHM),
                Cow::Borrowed(values.algorithm),
            ));
            params.push((
                Cow::Borrowed(param::X_AMZ_CREDENTIAL),
                Cow::Borrowed(&values.credential),
            ));
            params.push((
                Cow::Borrowed(param::X_AMZ_DATE),
                Cow::Borrowed(&values.date_time),
            ));
            params.push((
                Cow::Borrowed(param::X_AMZ_EXPIRES),
                Cow::Borrowed(&values.expires),
            ));
            params.push((
                Cow::Borrowed(param::X_AMZ_SIGNED_HEADERS),
                Cow::Owned(values.signed_headers.to_string()),
            ));
            // the security token is appended after signing; it is never part
            // of the canonical request
        }
        if params.is_empty() {
            return None;
        }
        params.sort();
        let mut query = String::new();
        let mut first = true;
        for (key, value) in params {
            if !first {
                query.push('&');
            }
            first = false;
            query.push_str(&percent_encode(&key));
            query.push('=');
            query.push_str(&percent_encode(&value));
        }
        Some(query)
    }
}

/// Collapse runs of spaces into one and trim the ends, per the canonical
/// header value rules.
fn trim_all(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_space = false;
    for ch in text.trim().chars() {
        if ch == ' ' {
            if !prev_space {
                out.push(' ');
            }
            prev_space = true;
        } else {
            out.push(ch);
            prev_space = false;
        }
    }
    out
}

impl<'a> fmt::Display for CanonicalRequest<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.method)?;
        writeln!(f, "{}", self.path)?;
        writeln!(f, "{}", self.params.as_deref().unwrap_or(""))?;
        for header in &self.values.signed_headers().headers {
            let value = self
                .headers
                .get_all(&header.0)
                .iter()
                .map(|value| {
                    trim_all(
                        std::str::from_utf8(value.as_bytes())
                            .expect("signed header values were validated as UTF-8"),
                    )
                })
                .collect::<Vec<_>>()
                .join(",");
            writeln!(f, "{}:{}", header.0.as_str(), value)?;
        }
        writeln!(f)?;
        writeln!(f, "{}", self.values.signed_headers())?;
        write!(f, "{}", self.values.content_sha256())
    }
}

#[derive(Debug, PartialEq, Default, Clone)]
pub(crate) struct SignedHeaders {
    headers: Vec<CanonicalHeaderName>,
}

impl SignedHeaders {
    fn new(mut headers: Vec<CanonicalHeaderName>) -> Self {
        headers.sort();
        SignedHeaders { headers }
    }
}

impl fmt::Display for SignedHeaders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut iter = self.headers.iter().peekable();
        while let Some(header) = iter.next() {
            write!(f, "{}", header.0.as_str())?;
            if iter.peek().is_some() {
                write!(f, ";")?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Eq, PartialEq, Clone)]
pub(crate) struct CanonicalHeaderName(HeaderName);

impl PartialOrd for CanonicalHeaderName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CanonicalHeaderName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.as_str().cmp(other.0.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Scope<'a> {
    pub(crate) time: SystemTime,
    pub(crate) region: &'a str,
    pub(crate) service: &'a str,
}

impl<'a> fmt::Display for Scope<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/aws4_request",
            format_date(self.time),
            self.region,
            self.service
        )
    }
}

#[derive(Debug, PartialEq)]
pub(crate) struct StringToSign<'a> {
    pub(crate) scope: Scope<'a>,
    pub(crate) time: SystemTime,
    pub(crate) hashed_creq: &'a str,
}

impl<'a> StringToSign<'a> {
    pub(crate) fn new(time: SystemTime, region: &'a str, service: &'a str, hashed_creq: &'a str) -> Self {
        let scope = Scope {
            time,
            region,
            service,
        };
        Self {
            scope,
            time,
            hashed_creq,
        }
    }
}

impl<'a> fmt::Display for StringToSign<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\n{}\n{}\n{}",
            HMAC_256,
            format_date_time(self.time),
            self.scope,
            self.hashed_creq
        )
    }
}
