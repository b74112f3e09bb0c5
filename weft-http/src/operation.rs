/*
 * Copyright Oxbow Contributors. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! The operation envelope: an HTTP request paired with a shared property bag,
//! a response handler, and a retry classifier.

use crate::body::SdkBody;
use crate::property_bag::PropertyBag;
use std::borrow::Cow;
use std::error::Error;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

/// Identifies an operation for logging and user-agent purposes.
#[derive(Clone, Debug)]
pub struct Metadata {
    operation: Cow<'static, str>,
    service: Cow<'static, str>,
}

impl Metadata {
    pub fn new(
        operation: impl Into<Cow<'static, str>>,
        service: impl Into<Cow<'static, str>>,
    ) -> Self {
        Metadata {
            operation: operation.into(),
            service: service.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.operation
    }

    pub fn service(&self) -> &str {
        &self.service
    }
}

/// Everything about an `Operation` except the request itself.
#[derive(Clone, Debug)]
pub struct Parts<H, R> {
    pub response_handler: H,
    pub retry_policy: R,
    pub metadata: Option<Metadata>,
}

/// An error occurred attempting to build an `Operation` from an input.
#[derive(Debug)]
pub enum BuildError {
    /// A field contained an invalid value.
    InvalidField {
        field: &'static str,
        details: String,
    },
    /// A required field was missing.
    MissingField {
        field: &'static str,
        details: &'static str,
    },
    /// The input could not be serialized.
    SerializationError(Box<dyn Error + Send + Sync + 'static>),
    /// A URI assembled from the input was invalid.
    InvalidUri {
        uri: String,
        message: Cow<'static, str>,
        err: http::uri::InvalidUri,
    },
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::InvalidField { field, details } => {
                write!(f, "invalid field `{}`: {}", field, details)
            }
            BuildError::MissingField { field, details } => {
                write!(f, "missing required field `{}`: {}", field, details)
            }
            BuildError::SerializationError(err) => {
                write!(f, "failed to serialize input: {}", err)
            }
            BuildError::InvalidUri { uri, message, err } => {
                write!(f, "`{}` is not a valid URI ({}): {}", uri, err, message)
            }
        }
    }
}

impl Error for BuildError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            BuildError::SerializationError(err) => Some(err.as_ref()),
            BuildError::InvalidUri { err, .. } => Some(err),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct Operation<H, R> {
    request: Request,
    parts: Parts<H, R>,
}

impl<H, R> Operation<H, R> {
    pub fn into_request_response(self) -> (Request, Parts<H, R>) {
        (self.request, self.parts)
    }

    pub fn from_parts(request: Request, parts: Parts<H, R>) -> Self {
        Operation { request, parts }
    }

    pub fn properties_mut(&mut self) -> MutexGuard<'_, PropertyBag> {
        self.request.properties_mut()
    }

    pub fn properties(&self) -> MutexGuard<'_, PropertyBag> {
        self.request.properties()
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.parts.metadata = Some(metadata);
        self
    }

    pub fn metadata(&self) -> Option<&Metadata> {
        self.parts.metadata.as_ref()
    }

    pub fn with_retry_policy<R2>(self, retry_policy: R2) -> Operation<H, R2> {
        Operation {
            request: self.request,
            parts: Parts {
                response_handler: self.parts.response_handler,
                retry_policy,
                metadata: self.parts.metadata,
            },
        }
    }

    pub fn retry_policy(&self) -> &R {
        &self.parts.retry_policy
    }

    pub fn try_clone(&self) -> Option<Self>
    where
        H: Clone,
        R: Clone,
    {
        let request = self.request.try_clone()?;
        Some(Operation {
            request,
            parts: self.parts.clone(),
        })
    }
}

impl<H> Operation<H, ()> {
    pub fn new(request: Request, response_handler: H) -> Self {
        Operation {
            request,
            parts: Parts {
                response_handler,
                retry_policy: (),
                metadata: None,
            },
        }
    }
}

/// An HTTP request augmented with a property bag.
///
/// The bag is shared: clones made for retries see the same bag, so state
/// recorded by one attempt (eg. a resolved endpoint) is visible to the next.
#[derive(Debug)]
pub struct Request {
    inner: http::Request<SdkBody>,
    properties: Arc<Mutex<PropertyBag>>,
}

impl Request {
    pub fn new(base: http::Request<SdkBody>) -> Self {
        Request {
            inner: base,
            properties: Arc::new(Mutex::new(PropertyBag::new())),
        }
    }

    /// Apply a fallible transform to the request with mutable access to the
    /// property bag.
    pub fn augment<E>(
        self,
        f: impl FnOnce(http::Request<SdkBody>, &mut PropertyBag) -> Result<http::Request<SdkBody>, E>,
    ) -> Result<Request, E> {
        let Request { inner, properties } = self;
        let inner = {
            let mut properties = properties.lock().unwrap();
            f(inner, &mut properties)?
        };
        Ok(Request { inner, properties })
    }

    pub fn properties(&self) -> MutexGuard<'_, PropertyBag> {
        self.properties.lock().unwrap()
    }

    pub fn properties_mut(&mut self) -> MutexGuard<'_, PropertyBag> {
        self.properties.lock().unwrap()
    }

    pub fn http(&self) -> &http::Request<SdkBody> {
        &self.inner
    }

    pub fn http_mut(&mut self) -> &mut http::Request<SdkBody> {
        &mut self.inner
    }

    pub fn into_parts(self) -> (http::Request<SdkBody>, Arc<Mutex<PropertyBag>>) {
        (self.inner, self.properties)
    }

    /// Clone the request if its body is replayable. The property bag is
    /// shared with the clone, not copied.
    pub fn try_clone(&self) -> Option<Request> {
        let body = self.inner.body().try_clone()?;
        let mut other = http::Request::new(body);
        *other.method_mut() = self.inner.method().clone();
        *other.uri_mut() = self.inner.uri().clone();
        *other.headers_mut() = self.inner.headers().clone();
        *other.version_mut() = self.inner.version();
        Some(Request {
            inner: other,
            properties: self.properties.clone(),
        })
    }
}

#[cfg(test)]
mod test {
    use crate::body::SdkBody;
    use crate::operation::{Metadata, Operation, Request};
    use http::header::{HeaderName, HeaderValue};

    #[test]
    fn operation_carries_metadata() {
        let operation = Operation::new(
            Request::new(http::Request::new(SdkBody::from(""))),
            (),
        )
        .with_metadata(Metadata::new("ListTables", "dynamodb"));
        let metadata = operation.metadata().expect("metadata set");
        assert_eq!(metadata.name(), "ListTables");
        assert_eq!(metadata.service(), "dynamodb");
    }

    #[test]
    fn try_clone_shares_the_property_bag() {
        let mut request = Request::new(http::Request::new(SdkBody::from("body")));
        request.properties_mut().insert("state".to_string());
        let cloned = request.try_clone().expect("replayable body");
        cloned.properties().get::<String>().expect("shared bag");

        request.properties_mut().insert(42_u32);
        assert_eq!(cloned.properties().get::<u32>(), Some(&42));
    }

    #[test]
    fn try_clone_copies_request_components() {
        let base = http::Request::builder()
            .method("POST")
            .uri("https://www.example.com/path")
            .header("x-test", "value")
            .body(SdkBody::from("hello"))
            .unwrap();
        let request = Request::new(base);
        let cloned = request.try_clone().expect("replayable body");
        assert_eq!(cloned.http().method(), http::Method::POST);
        assert_eq!(cloned.http().uri(), &http::Uri::from_static("https://www.example.com/path"));
        assert_eq!(
            cloned.http().headers().get(HeaderName::from_static("x-test")),
            Some(&HeaderValue::from_static("value"))
        );
        assert_eq!(cloned.http().body().bytes(), Some(b"hello" as &[u8]));
    }

    #[test]
    fn streaming_requests_cannot_be_cloned() {
        let request = Request::new(http::Request::new(SdkBody::from(hyper::Body::from("hello"))));
        assert!(request.try_clone().is_none());
    }

    #[test]
    fn augment_mutates_request_and_bag() {
        let request = Request::new(http::Request::new(SdkBody::from("")));
        let request = request
            .augment(|mut req, properties| {
                properties.insert(99_u64);
                req.headers_mut().insert(
                    HeaderName::from_static("x-augmented"),
                    HeaderValue::from_static("true"),
                );
                Result::<_, std::convert::Infallible>::Ok(req)
            })
            .unwrap();
        assert_eq!(request.properties().get::<u64>(), Some(&99));
        assert!(request.http().headers().contains_key("x-augmented"));
    }
}
