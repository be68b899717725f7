//! The transport collaborator and its `ureq` implementation.
//!
//! # Design
//! A transport returns `Ok` for every HTTP response regardless of status;
//! only "nothing came back" and "could not send" are errors. Status
//! interpretation belongs to the classifier.
//!
//! `UreqTransport` runs the blocking `ureq` call on tokio's blocking pool so
//! concurrent `issue` calls stay independent.

use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute `request`. `request.path` is already an absolute URL.
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        Self { agent }
    }
}

#[async_trait]
impl Transport for UreqTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let agent = self.agent.clone();
        tokio::task::spawn_blocking(move || execute_blocking(&agent, request))
            .await
            .map_err(|e| TransportError::NoResponse(e.to_string()))?
    }
}

fn execute_blocking(agent: &ureq::Agent, req: HttpRequest) -> Result<HttpResponse, TransportError> {
    let url = req.path.as_str();
    let result = match req.method {
        HttpMethod::Get => decorate(agent.get(url), &req).call(),
        HttpMethod::Delete => decorate(agent.delete(url), &req).call(),
        HttpMethod::Head => decorate(agent.head(url), &req).call(),
        HttpMethod::Post => send_with_body(decorate(agent.post(url), &req), req.body.as_deref()),
        HttpMethod::Put => send_with_body(decorate(agent.put(url), &req), req.body.as_deref()),
        HttpMethod::Patch => send_with_body(decorate(agent.patch(url), &req), req.body.as_deref()),
    };

    let mut response = result.map_err(map_ureq_error)?;
    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();
    // The status already arrived; an unreadable body must not hide it.
    let body = response.body_mut().read_to_string().unwrap_or_else(|e| {
        warn!(status, error = %e, "response body unreadable, classifying by status");
        String::new()
    });

    Ok(HttpResponse {
        status,
        headers,
        body,
    })
}

fn decorate<B>(mut builder: ureq::RequestBuilder<B>, req: &HttpRequest) -> ureq::RequestBuilder<B> {
    for (name, value) in &req.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    for (key, value) in &req.query {
        builder = builder.query(key, value);
    }
    builder
}

fn send_with_body(
    builder: ureq::RequestBuilder<ureq::typestate::WithBody>,
    body: Option<&str>,
) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    match body {
        Some(body) => builder.send(body.as_bytes()),
        None => builder.send_empty(),
    }
}

fn map_ureq_error(err: ureq::Error) -> TransportError {
    match err {
        ureq::Error::BadUri(_) | ureq::Error::Http(_) => TransportError::Setup(err.to_string()),
        other => TransportError::NoResponse(other.to_string()),
    }
}
