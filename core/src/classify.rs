//! Pure response classification.
//!
//! Turns whatever came back from a transport into an `Outcome`, and an
//! `Outcome` into the user-visible text and the `GatewayError` the caller
//! sees. No side effects live here; `HttpGateway` decides what to do with
//! the result.

use crate::envelope::{BusinessCode, EnvelopeHead};
use crate::error::{GatewayError, TransportError};
use crate::http::HttpResponse;

pub const NETWORK_MESSAGE: &str = "服务器无响应";

/// The classification of a single call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// Envelope with a non-zero code. `message` is the server text, if any.
    Business { code: i64, message: Option<String> },
    /// A response without a usable envelope.
    Transport { status: u16 },
    Network { detail: String },
    RequestSetup { detail: String },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }

    /// Whether this outcome ends the current session.
    pub fn invalidates_session(&self) -> bool {
        match self {
            Outcome::Business { code, .. } => BusinessCode::from_code(*code).invalidates_session(),
            Outcome::Transport { status } => *status == 401,
            _ => false,
        }
    }

    /// The notice text for a failing outcome: server message first, then the
    /// fixed per-code or per-status text. `None` for success.
    pub fn notice_message(&self) -> Option<String> {
        let text = match self {
            Outcome::Success => return None,
            Outcome::Business { code, message } => match message.as_deref() {
                Some(msg) if !msg.trim().is_empty() => msg.to_string(),
                _ => BusinessCode::from_code(*code).fallback_message().to_string(),
            },
            Outcome::Transport { status } => status_message(*status),
            Outcome::Network { .. } => NETWORK_MESSAGE.to_string(),
            Outcome::RequestSetup { detail } => setup_message(detail),
        };
        Some(text)
    }

    /// Convert a failing outcome into the caller-facing error. `None` for
    /// success.
    pub fn into_error(self) -> Option<GatewayError> {
        let message = self.notice_message()?;
        let err = match self {
            Outcome::Success => return None,
            Outcome::Business { code, .. } => GatewayError::Business { code, message },
            Outcome::Transport { status } => GatewayError::Transport { status, message },
            Outcome::Network { .. } => GatewayError::Network { message },
            Outcome::RequestSetup { .. } => GatewayError::RequestSetup { message },
        };
        Some(err)
    }
}

/// Classify a received response.
///
/// A parseable envelope wins over the HTTP status: a non-zero code is a
/// business error even on a 4xx/5xx. The raw status is only consulted when
/// there is no envelope, or when a code-0 envelope arrived on a non-2xx.
pub fn classify_response(response: &HttpResponse) -> Outcome {
    if let Some(head) = EnvelopeHead::parse(&response.body) {
        if head.code != 0 {
            return Outcome::Business {
                code: head.code,
                message: head.message,
            };
        }
        if response.is_success() {
            return Outcome::Success;
        }
    }
    Outcome::Transport {
        status: response.status,
    }
}

pub fn classify_transport_failure(err: &TransportError) -> Outcome {
    match err {
        TransportError::NoResponse(detail) => Outcome::Network {
            detail: detail.clone(),
        },
        TransportError::Setup(detail) => Outcome::RequestSetup {
            detail: detail.clone(),
        },
    }
}

/// The caller-facing error for a call that produced no response.
pub fn transport_failure_error(err: &TransportError) -> GatewayError {
    match err {
        TransportError::NoResponse(_) => GatewayError::Network {
            message: NETWORK_MESSAGE.to_string(),
        },
        TransportError::Setup(detail) => GatewayError::RequestSetup {
            message: setup_message(detail),
        },
    }
}

pub(crate) fn setup_message(detail: &str) -> String {
    format!("请求异常: {detail}")
}

fn status_message(status: u16) -> String {
    match status {
        401 => "未授权，请重新登录".to_string(),
        403 => "拒绝访问".to_string(),
        404 => "请求的资源不存在".to_string(),
        500 => "服务器内部错误".to_string(),
        other => format!("请求错误: {other}"),
    }
}
