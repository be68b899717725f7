//! The `{code, data, message}` wrapper every blog API response body uses.
//!
//! # Design
//! Business success or failure lives in `code`, independent of the HTTP
//! status. `BusinessCode` names the fixed five-digit taxonomy; anything the
//! server sends outside it is kept as a raw `i64` and treated as unknown.

use serde::{Deserialize, Serialize};

/// A decoded response envelope carrying a typed payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Envelope<T> {
    pub code: i64,
    pub data: T,
    #[serde(default)]
    pub message: Option<String>,
}

/// The part of an envelope the classifier needs. Ignores `data` so any
/// payload shape (or none) still counts as an envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct EnvelopeHead {
    pub code: i64,
    #[serde(default)]
    pub message: Option<String>,
}

impl EnvelopeHead {
    pub fn parse(body: &str) -> Option<Self> {
        serde_json::from_str(body).ok()
    }
}

/// Business status codes carried inside the envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusinessCode {
    Success,
    ParamsError,
    NotLogin,
    NoAuth,
    Forbidden,
    NotFound,
    SystemError,
    OperationError,
    Unknown(i64),
}

impl BusinessCode {
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => BusinessCode::Success,
            40000 => BusinessCode::ParamsError,
            40100 => BusinessCode::NotLogin,
            40101 => BusinessCode::NoAuth,
            40300 => BusinessCode::Forbidden,
            40400 => BusinessCode::NotFound,
            50000 => BusinessCode::SystemError,
            50001 => BusinessCode::OperationError,
            other => BusinessCode::Unknown(other),
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            BusinessCode::Success => 0,
            BusinessCode::ParamsError => 40000,
            BusinessCode::NotLogin => 40100,
            BusinessCode::NoAuth => 40101,
            BusinessCode::Forbidden => 40300,
            BusinessCode::NotFound => 40400,
            BusinessCode::SystemError => 50000,
            BusinessCode::OperationError => 50001,
            BusinessCode::Unknown(code) => *code,
        }
    }

    /// Text shown when the server sends no message of its own.
    pub fn fallback_message(&self) -> &'static str {
        match self {
            BusinessCode::Success => "成功",
            BusinessCode::ParamsError => "请求参数错误",
            BusinessCode::NotLogin => "未登录",
            BusinessCode::NoAuth => "无权限",
            BusinessCode::Forbidden => "禁止访问",
            BusinessCode::NotFound => "请求数据不存在",
            BusinessCode::SystemError => "系统内部异常",
            BusinessCode::OperationError => "操作失败",
            BusinessCode::Unknown(_) => "未知错误",
        }
    }

    /// Codes that mean the session is gone and must be invalidated.
    pub fn invalidates_session(&self) -> bool {
        matches!(self, BusinessCode::NotLogin | BusinessCode::NoAuth)
    }
}
