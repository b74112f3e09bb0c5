/*
 * Copyright Oxbow Contributors. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! The request/response body type used throughout the SDK.

use bytes::Bytes;
use http::{HeaderMap, HeaderValue};
use http_body::{Body, SizeHint};
use std::error::Error;
use std::pin::Pin;
use std::task::{Context, Poll};

pub type BoxError = Box<dyn Error + Send + Sync>;

/// A body for SDK requests and responses.
///
/// In-memory bodies (`Once`) can be inspected for signing and replayed for
/// retries. Streaming bodies can be neither; a request carrying one is sent
/// at most once.
#[derive(Debug)]
pub enum SdkBody {
    /// An in-memory body. `Once(None)` is an empty body.
    Once(Option<Bytes>),
    /// A streaming body.
    Streaming(hyper::Body),
    /// The body has been moved elsewhere, eg. into a presigned request.
    /// Polling a taken body is an error.
    Taken,
}

impl SdkBody {
    pub fn taken() -> Self {
        SdkBody::Taken
    }

    pub fn empty() -> Self {
        SdkBody::Once(None)
    }

    fn poll_inner(&mut self, cx: &mut Context<'_>) -> Poll<Option<Result<Bytes, BoxError>>> {
        match self {
            SdkBody::Once(ref mut opt) => {
                let data = opt.take();
                match data {
                    Some(bytes) if bytes.is_empty() => Poll::Ready(None),
                    Some(bytes) => Poll::Ready(Some(Ok(bytes))),
                    None => Poll::Ready(None),
                }
            }
            SdkBody::Streaming(body) => Pin::new(body)
                .poll_data(cx)
                .map(|opt| opt.map(|res| res.map_err(|e| e.into()))),
            SdkBody::Taken => Poll::Ready(Some(Err("polled a taken body".into()))),
        }
    }

    /// If this body is in memory, return a reference to its data.
    pub fn bytes(&self) -> Option<&[u8]> {
        match self {
            SdkBody::Once(Some(bytes)) => Some(bytes),
            SdkBody::Once(None) => Some(&[]),
            _ => None,
        }
    }

    /// Replayable bodies can be cloned; streaming and taken bodies cannot.
    pub fn try_clone(&self) -> Option<Self> {
        match self {
            SdkBody::Once(bytes) => Some(SdkBody::Once(bytes.clone())),
            _ => None,
        }
    }
}

impl From<&str> for SdkBody {
    fn from(s: &str) -> Self {
        SdkBody::Once(Some(Bytes::copy_from_slice(s.as_bytes())))
    }
}

impl From<Bytes> for SdkBody {
    fn from(bytes: Bytes) -> Self {
        SdkBody::Once(Some(bytes))
    }
}

impl From<Vec<u8>> for SdkBody {
    fn from(data: Vec<u8>) -> Self {
        SdkBody::from(Bytes::from(data))
    }
}

impl From<String> for SdkBody {
    fn from(s: String) -> Self {
        SdkBody::from(s.into_bytes())
    }
}

impl From<hyper::Body> for SdkBody {
    fn from(body: hyper::Body) -> Self {
        SdkBody::Streaming(body)
    }
}

impl Body for SdkBody {
    type Data = Bytes;
    type Error = BoxError;

    fn poll_data(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Self::Data, Self::Error>>> {
        self.poll_inner(cx)
    }

    fn poll_trailers(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Option<HeaderMap<HeaderValue>>, Self::Error>> {
        match self.get_mut() {
            SdkBody::Streaming(body) => Pin::new(body)
                .poll_trailers(cx)
                .map(|res| res.map_err(|e| e.into())),
            _ => Poll::Ready(Ok(None)),
        }
    }

    fn is_end_stream(&self) -> bool {
        match self {
            SdkBody::Once(None) => true,
            SdkBody::Once(Some(bytes)) => bytes.is_empty(),
            SdkBody::Streaming(body) => body.is_end_stream(),
            SdkBody::Taken => true,
        }
    }

    fn size_hint(&self) -> SizeHint {
        match self {
            SdkBody::Once(None) => SizeHint::with_exact(0),
            SdkBody::Once(Some(bytes)) => SizeHint::with_exact(bytes.len() as u64),
            SdkBody::Streaming(body) => body.size_hint(),
            SdkBody::Taken => SizeHint::new(),
        }
    }
}
