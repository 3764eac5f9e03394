// src/server/handler.rs
use hyper::{Body, Request, Response};
use std::convert::Infallible;
use tower::Service;

use crate::api::Api;

#[derive(Clone)]
pub struct RequestHandler {
    api: Api,
}

impl RequestHandler {
    pub fn new(api: Api) -> Self {
        Self { api }
    }
}

impl Service<Request<Body>> for RequestHandler {
    type Response = Response<Body>;
    type Error = Infallible;
    type Future = futures::future::BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let api = self.api.clone();
        Box::pin(async move { Ok(api.handle(req).await) })
    }
}
