// src/probe/prober.rs
use super::ProbeResult;
use crate::config::ProbeConfig;
use async_trait::async_trait;
use reqwest::{redirect, Client, StatusCode};
use std::error::Error as StdError;
use std::time::Instant;
use tokio::time::{timeout, Duration};
use tracing::{debug, warn};

const MAX_REDIRECTS: usize = 10;

/// Runs one health check against one URL.
///
/// Implementations must not fail: every problem is reported as a `DOWN`
/// result carrying a diagnostic message.
#[async_trait]
pub trait Probe: Send + Sync {
    async fn probe(&self, url: &str) -> ProbeResult;
}

pub struct HttpProber {
    client: Client,
    timeout: Duration,
}

impl HttpProber {
    pub fn new(config: &ProbeConfig) -> reqwest::Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            timeout: config.timeout(),
        })
    }

    fn timeout_message(&self) -> String {
        format!("timeout of {}ms exceeded", self.timeout.as_millis())
    }
}

#[async_trait]
impl Probe for HttpProber {
    async fn probe(&self, url: &str) -> ProbeResult {
        let start = Instant::now();

        // The body is part of the call: a response that stalls mid-body is a timeout.
        let outcome = timeout(self.timeout, async {
            let response = self.client.get(url).send().await?;
            let status = response.status();
            response.bytes().await?;
            Ok::<_, reqwest::Error>(status)
        })
        .await;

        let response_time_ms = start.elapsed().as_millis() as u64;

        let result = match outcome {
            Ok(Ok(status)) if status.is_server_error() => {
                ProbeResult::failed(url, server_error_message(status), response_time_ms)
            }
            Ok(Ok(status)) => ProbeResult::completed(url, status.as_u16(), response_time_ms),
            Ok(Err(e)) if e.is_timeout() => {
                ProbeResult::failed(url, self.timeout_message(), response_time_ms)
            }
            Ok(Err(e)) => ProbeResult::failed(url, describe(&e), response_time_ms),
            Err(_) => ProbeResult::failed(url, self.timeout_message(), response_time_ms),
        };

        if result.is_up() {
            debug!(
                "{} is UP ({:?}) in {}ms",
                url, result.status_code, result.response_time_ms
            );
        } else {
            let reason = match (&result.error, result.status_code) {
                (Some(error), _) => error.clone(),
                (None, Some(code)) => format!("HTTP {}", code),
                (None, None) => String::new(),
            };
            warn!("{} is DOWN in {}ms: {}", url, result.response_time_ms, reason);
        }

        result
    }
}

fn server_error_message(status: StatusCode) -> String {
    format!("HTTP {}", status)
}

/// Flatten an error and its sources into one line.
fn describe(error: &(dyn StdError + 'static)) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !message.contains(&cause_text) {
            message.push_str(": ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }
    message
}
