// src/api/routes.rs
use super::response::{empty_response, json_response, with_cors, ApiError};
use crate::monitor::{Monitor, SweepTrigger};
use crate::registry::{is_valid_url, RegistryError};
use chrono::Utc;
use hyper::{Body, Method, Request, Response, StatusCode};
use percent_encoding::percent_decode_str;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error};

const URLS_PREFIX: &str = "/api/urls/";

/// JSON routes over the monitoring engine.
#[derive(Clone)]
pub struct Api {
    monitor: Arc<Monitor>,
}

impl Api {
    pub fn new(monitor: Arc<Monitor>) -> Self {
        Self { monitor }
    }

    /// Route a request. Errors are already rendered into responses.
    pub async fn handle(&self, req: Request<Body>) -> Response<Body> {
        let method = req.method().clone();
        let path = req.uri().path().to_string();
        debug!("{} {}", method, path);

        let response = match self.route(req).await {
            Ok(response) => response,
            Err(err) => {
                debug!("{} {} failed: {}", method, path, err);
                err.into()
            }
        };
        with_cors(response)
    }

    async fn route(&self, req: Request<Body>) -> Result<Response<Body>, ApiError> {
        let method = req.method().clone();
        let path = req.uri().path().to_string();

        match (&method, path.as_str()) {
            (&Method::OPTIONS, _) => Ok(empty_response(StatusCode::NO_CONTENT)),
            (&Method::GET, "/health") => Ok(json_response(
                StatusCode::OK,
                &json!({ "status": "OK", "timestamp": Utc::now() }),
            )),
            (&Method::GET, "/api/urls") => {
                Ok(json_response(StatusCode::OK, &self.monitor.registry().list()))
            }
            (&Method::POST, "/api/urls") => self.add_urls(req).await,
            (&Method::DELETE, "/api/urls") => {
                let target = req
                    .uri()
                    .query()
                    .and_then(|q| query_param(q, "url"))
                    .ok_or_else(|| ApiError::BadRequest("Missing url parameter".to_string()))?;
                self.delete_url(&target).await
            }
            (&Method::DELETE, p) if p.starts_with(URLS_PREFIX) => {
                let target = decode_component(&p[URLS_PREFIX.len()..]);
                self.delete_url(&target).await
            }
            (&Method::POST, "/api/check-url") => self.check_url(req).await,
            (&Method::POST, "/api/check-all") => self.check_all().await,
            (&Method::GET, "/api/history") => {
                Ok(json_response(StatusCode::OK, &self.monitor.history()))
            }
            (&Method::GET, "/api/stats") => {
                Ok(json_response(StatusCode::OK, &self.monitor.stats()))
            }
            _ => Err(ApiError::NotFound),
        }
    }

    async fn add_urls(&self, req: Request<Body>) -> Result<Response<Body>, ApiError> {
        let body = read_json(req).await?;

        let candidates: Vec<String> = match body.get("urls") {
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect(),
            _ => return Err(ApiError::BadRequest("URLs must be an array".to_string())),
        };

        match self.monitor.add_urls(candidates).await {
            Ok(urls) => Ok(json_response(
                StatusCode::OK,
                &json!({ "message": "URLs added successfully", "urls": urls }),
            )),
            Err(RegistryError::Validation { invalid }) => Err(ApiError::InvalidUrls(invalid)),
            Err(e) => {
                error!("Failed to add URLs: {}", e);
                Err(ApiError::Internal("Failed to add URLs".to_string()))
            }
        }
    }

    async fn delete_url(&self, url: &str) -> Result<Response<Body>, ApiError> {
        match self.monitor.remove_url(url).await {
            Ok(urls) => Ok(json_response(
                StatusCode::OK,
                &json!({ "message": "URL deleted successfully", "urls": urls }),
            )),
            Err(e) => {
                error!("Failed to delete URL {}: {}", url, e);
                Err(ApiError::Internal("Failed to delete URL".to_string()))
            }
        }
    }

    async fn check_url(&self, req: Request<Body>) -> Result<Response<Body>, ApiError> {
        let body = read_json(req).await?;

        let url = match body.get("url").and_then(Value::as_str) {
            Some(url) if is_valid_url(url.trim()) => url.trim().to_string(),
            _ => return Err(ApiError::BadRequest("Invalid URL".to_string())),
        };

        let results = self
            .monitor
            .run_sweep(&[url], SweepTrigger::OnDemand)
            .await
            .map_err(|e| {
                error!("Failed to check URL: {}", e);
                ApiError::Internal("Failed to check URL".to_string())
            })?;

        match results.first() {
            Some(result) => Ok(json_response(StatusCode::OK, result)),
            None => Err(ApiError::Internal("Failed to check URL".to_string())),
        }
    }

    async fn check_all(&self) -> Result<Response<Body>, ApiError> {
        let results = self
            .monitor
            .check_all(SweepTrigger::OnDemand)
            .await
            .map_err(|e| {
                error!("Failed to check URLs: {}", e);
                ApiError::Internal("Failed to check URLs".to_string())
            })?;

        Ok(json_response(StatusCode::OK, &results))
    }
}

async fn read_json(req: Request<Body>) -> Result<Value, ApiError> {
    let bytes = hyper::body::to_bytes(req.into_body())
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read body: {}", e)))?;

    if bytes.is_empty() {
        return Ok(Value::Object(Default::default()));
    }

    serde_json::from_slice(&bytes)
        .map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {}", e)))
}

fn query_param(query: &str, name: &str) -> Option<String> {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

/// Percent-decode one path segment. `+` stays a literal plus.
fn decode_component(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}
