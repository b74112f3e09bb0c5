/*
 * Copyright Oxbow Contributors. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0.
 */

//! Named traits summarizing the bounds `Client` places on its type
//! parameters, so the signatures of `call`/`call_raw` stay legible.
//!
//! Each trait has a blanket impl; nothing implements them by hand.

use tower::{Layer, Service};
use weft_http::body::SdkBody;
use weft_http::operation::Operation;
use weft_http::result::{SdkError, SdkSuccess};
use weft_http_tower::dispatch::DispatchService;
use weft_http_tower::SendOperationError;

/// A connector: a service that sends `http::Request<SdkBody>` and returns
/// `http::Response<SdkBody>`.
pub trait WeftConnector:
    Service<
        http::Request<SdkBody>,
        Response = http::Response<SdkBody>,
        Error = <Self as WeftConnector>::ConnectorError,
        Future = <Self as WeftConnector>::ConnectorFuture,
    > + Send
    + Sync
    + Clone
    + 'static
{
    /// Forwarding type to `<Self as Service>::Error`.
    type ConnectorError: Into<Box<dyn std::error::Error + Send + Sync>> + Send + Sync + 'static;
    /// Forwarding type to `<Self as Service>::Future`.
    type ConnectorFuture: Send + 'static;
}

impl<T> WeftConnector for T
where
    T: Service<http::Request<SdkBody>, Response = http::Response<SdkBody>>
        + Send
        + Sync
        + Clone
        + 'static,
    T::Error: Into<Box<dyn std::error::Error + Send + Sync>> + Send + Sync + 'static,
    T::Future: Send + 'static,
{
    type ConnectorError = T::Error;
    type ConnectorFuture = T::Future;
}

/// A middleware stack: a layer over the dispatch service whose output is
/// itself a well-formed pipeline service.
pub trait WeftMiddleware<C>:
    Layer<DispatchService<C>, Service = <Self as WeftMiddleware<C>>::MiddlewareService>
{
    /// Forwarding type to `<Self as Layer>::Service`.
    type MiddlewareService: WeftMiddlewareService + Send + Clone + 'static;
}

impl<T, C> WeftMiddleware<C> for T
where
    T: Layer<DispatchService<C>>,
    T::Service: WeftMiddlewareService + Send + Clone + 'static,
{
    type MiddlewareService = T::Service;
}

/// The service produced by applying a middleware stack to dispatch.
pub trait WeftMiddlewareService:
    Service<
    weft_http::operation::Request,
    Response = http::Response<SdkBody>,
    Error = SendOperationError,
    Future = <Self as WeftMiddlewareService>::MiddlewareFuture,
>
{
    /// Forwarding type to `<Self as Service>::Future`.
    type MiddlewareFuture: Send + 'static;
}

impl<T> WeftMiddlewareService for T
where
    T: Service<
        weft_http::operation::Request,
        Response = http::Response<SdkBody>,
        Error = SendOperationError,
    >,
    T::Future: Send + 'static,
{
    type MiddlewareFuture = T::Future;
}

/// A per-request retry policy usable by `tower::retry::Retry` over the full
/// operation/result types.
pub trait WeftRetryPolicy<O, T, E, Retry>:
    tower::retry::Policy<Operation<O, Retry>, SdkSuccess<T>, SdkError<E>> + Clone
{
}

impl<P, O, T, E, Retry> WeftRetryPolicy<O, T, E, Retry> for P where
    P: tower::retry::Policy<Operation<O, Retry>, SdkSuccess<T>, SdkError<E>> + Clone
{
}
