//! The HTTP gateway: credential injection, outcome classification, and
//! session invalidation around a `Transport`.
//!
//! # Design
//! `issue` is a decorator composed around the transport call. `prepare` runs
//! synchronously before send and reads the session at that moment; `settle`
//! runs synchronously on the result and fires side effects (one notice per
//! failure, invalidation for login-ending outcomes) before handing the
//! caller either the original response or a `GatewayError`.
//!
//! Invalidation is guarded by `SessionState::try_begin_invalidation`, so any
//! number of concurrent 401s collapse into a single navigation or reload.
//! The delayed part runs on a tokio task owned by an `InvalidationHandle`.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::classify::{classify_response, transport_failure_error, NETWORK_MESSAGE};
use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::http::{set_header, HttpRequest, HttpResponse};
use crate::navigator::Navigator;
use crate::notify::{Notice, Notifier};
use crate::session::SessionState;
use crate::transport::Transport;

#[derive(Clone)]
pub struct HttpGateway {
    config: Arc<GatewayConfig>,
    transport: Arc<dyn Transport>,
    session: Arc<SessionState>,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
}

impl std::fmt::Debug for HttpGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpGateway")
            .field("base_url", &self.config.base_url)
            .field("session", &self.session)
            .finish()
    }
}

impl HttpGateway {
    pub fn new(
        config: GatewayConfig,
        transport: Arc<dyn Transport>,
        session: Arc<SessionState>,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            transport,
            session,
            navigator,
            notifier,
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn session(&self) -> &Arc<SessionState> {
        &self.session
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    /// Send `request` and classify the result.
    ///
    /// Returns the untouched response when the envelope code is 0. Every
    /// other outcome has already shown one notice by the time the error is
    /// returned.
    pub async fn issue(&self, request: HttpRequest) -> Result<HttpResponse, GatewayError> {
        let request_id = Uuid::new_v4();
        let prepared = self.prepare(request);
        debug!(%request_id, method = %prepared.method, url = %prepared.path, "sending request");

        let timeout = self.config.timeout();
        let (err, invalidate) =
            match tokio::time::timeout(timeout, self.transport.execute(prepared)).await {
                Ok(Ok(response)) => {
                    let outcome = classify_response(&response);
                    let invalidate = outcome.invalidates_session();
                    match outcome.into_error() {
                        None => {
                            debug!(%request_id, status = response.status, "request succeeded");
                            return Ok(response);
                        }
                        Some(err) => (err, invalidate),
                    }
                }
                Ok(Err(err)) => {
                    debug!(%request_id, error = %err, "transport failed");
                    (transport_failure_error(&err), false)
                }
                Err(_) => {
                    debug!(%request_id, timeout_ms = timeout.as_millis() as u64, "request timed out");
                    (
                        GatewayError::Network {
                            message: NETWORK_MESSAGE.to_string(),
                        },
                        false,
                    )
                }
            };

        Err(self.settle(request_id, err, invalidate))
    }

    /// Apply default headers, the credential header, and the base URL.
    pub fn prepare(&self, mut request: HttpRequest) -> HttpRequest {
        for (name, value) in &self.config.default_headers {
            if request.header(name).is_none() {
                request.headers.push((name.clone(), value.clone()));
            }
        }
        if let Some(credential) = self.session.credential().filter(|c| c.is_usable()) {
            set_header(
                &mut request.headers,
                credential.header_name,
                format!("{} {}", self.config.auth_scheme, credential.token),
            );
        }
        request.path = self.config.url_for(&request.path);
        request
    }

    fn settle(&self, request_id: Uuid, err: GatewayError, invalidate: bool) -> GatewayError {
        warn!(%request_id, error = %err, code = ?err.business_code(), status = ?err.http_status(), "request failed");

        self.notifier.notify(Notice::error(err.message()));
        if invalidate {
            // Dropping the handle detaches the scheduled tail.
            let _ = self.invalidate_session();
        }
        err
    }

    /// Clear the session and move the UI off any page that needs it.
    ///
    /// Returns `None` when another invalidation is already in progress.
    ///
    /// # Panics
    /// Must be called from within a tokio runtime: the delayed navigation
    /// and guard release are spawned onto it. `issue` always satisfies this.
    pub fn invalidate_session(&self) -> Option<InvalidationHandle> {
        if !self.session.try_begin_invalidation() {
            debug!("invalidation already in progress");
            return None;
        }
        self.session.clear();

        let current = self.navigator.current_path();
        info!(path = %current, "session invalidated");

        let session = self.session.clone();
        let navigator = self.navigator.clone();
        let release_delay = self.config.guard_release_delay();

        let task = if self.config.is_home_or_login(&current) {
            navigator.reload();
            tokio::spawn(async move {
                tokio::time::sleep(release_delay).await;
                session.end_invalidation();
            })
        } else {
            let redirect_delay = self.config.redirect_delay();
            let config = self.config.clone();
            tokio::spawn(async move {
                tokio::time::sleep(redirect_delay).await;
                let path = navigator.current_path();
                if config.is_protected(&path) {
                    info!(from = %path, to = %config.home_path, "leaving protected page");
                    navigator.navigate(&config.home_path);
                } else {
                    navigator.reload();
                }
                tokio::time::sleep(release_delay).await;
                session.end_invalidation();
            })
        };

        Some(InvalidationHandle {
            task,
            session: self.session.clone(),
        })
    }
}

/// The scheduled tail of one invalidation episode.
#[derive(Debug)]
pub struct InvalidationHandle {
    task: JoinHandle<()>,
    session: Arc<SessionState>,
}

impl InvalidationHandle {
    /// Abort any pending navigation and release the guard now.
    pub fn cancel(self) {
        self.task.abort();
        self.session.end_invalidation();
    }

    /// Wait until the guard has been released.
    pub async fn finished(self) {
        if self.task.await.is_err() {
            self.session.end_invalidation();
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Total time an invalidation holds the guard when it has to navigate.
pub fn invalidation_window(config: &GatewayConfig) -> Duration {
    config.redirect_delay() + config.guard_release_delay()
}
