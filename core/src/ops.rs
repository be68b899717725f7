//! Run a fallible async operation with UI notices.

use std::future::Future;

use crate::error::GatewayError;
use crate::notify::{Notice, Notifier};

pub const DEFAULT_ERROR_MESSAGE: &str = "操作失败";

#[derive(Debug, Clone, Default)]
pub struct NoticeOptions {
    pub success_message: Option<String>,
    pub error_message: Option<String>,
}

/// Await `op`. Returns `Some` on success, `None` on failure.
///
/// A `GatewayError` has already produced its notice in the gateway or in
/// `UserApi`, so only other errors are reported here.
pub async fn run_with_notice<T, E, F>(
    notifier: &dyn Notifier,
    op: F,
    options: &NoticeOptions,
) -> Option<T>
where
    F: Future<Output = Result<T, E>>,
    E: Into<OperationError>,
{
    match op.await {
        Ok(value) => {
            if let Some(message) = &options.success_message {
                notifier.notify(Notice::success(message.clone()));
            }
            Some(value)
        }
        Err(err) => {
            let err: OperationError = err.into();
            if let OperationError::Other(detail) = err {
                tracing::debug!(%detail, "operation failed");
                let message = options
                    .error_message
                    .clone()
                    .unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string());
                notifier.notify(Notice::error(message));
            }
            None
        }
    }
}

/// Error accepted by `run_with_notice`.
#[derive(Debug)]
pub enum OperationError {
    /// Already reported by the gateway.
    Gateway(GatewayError),
    Other(String),
}

impl From<GatewayError> for OperationError {
    fn from(err: GatewayError) -> Self {
        OperationError::Gateway(err)
    }
}

impl From<String> for OperationError {
    fn from(detail: String) -> Self {
        OperationError::Other(detail)
    }
}

impl From<serde_json::Error> for OperationError {
    fn from(err: serde_json::Error) -> Self {
        OperationError::Other(err.to_string())
    }
}
