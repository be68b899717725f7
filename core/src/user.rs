//! User endpoints that drive the credential lifecycle.
//!
//! # Design
//! `UserApi` is a thin layer over `HttpGateway`: it builds requests, lets the
//! gateway classify and notify, then decodes the payload. Only the login and
//! logout paths touch `SessionState` directly; everything else flows through
//! the gateway's own invalidation handling.
//!
//! A payload the gateway accepted but this layer cannot use (undecodable,
//! `null`, a token without a header name) is still a failed call: it is
//! reported through the gateway's notifier and returned as
//! `GatewayError::Transport` with the real HTTP status.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::classify::setup_message;
use crate::error::GatewayError;
use crate::gateway::HttpGateway;
use crate::http::{HttpRequest, HttpResponse};
use crate::notify::Notice;
use crate::session::{Credential, UserIdentity};

pub const INVALID_PAYLOAD_MESSAGE: &str = "响应数据无效";

/// Login request body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub user_account: String,
    pub password: String,
}

/// Registration request body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub user_account: String,
    pub password: String,
    pub confirm_password: String,
}

/// Token details returned by a successful login.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    #[serde(default)]
    pub token_name: Option<String>,
    #[serde(default)]
    pub token_value: Option<String>,
    #[serde(default)]
    pub is_login: Option<bool>,
    #[serde(default)]
    pub login_id: Option<serde_json::Value>,
}

impl TokenInfo {
    /// The session credential this token describes, if it has both parts.
    pub fn credential(&self) -> Option<Credential> {
        let credential = Credential {
            token: self.token_value.clone().unwrap_or_default(),
            header_name: self.token_name.clone().unwrap_or_default(),
            logged_in: self.is_login.unwrap_or(true),
        };
        credential.is_usable().then_some(credential)
    }

    fn login_id_string(&self) -> Option<String> {
        match self.login_id.as_ref()? {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UserApi {
    gateway: HttpGateway,
}

impl UserApi {
    pub fn new(gateway: HttpGateway) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &HttpGateway {
        &self.gateway
    }

    /// `POST /user/login`. On success the returned token becomes the
    /// session credential.
    pub async fn login(&self, account: &str, password: &str) -> Result<TokenInfo, GatewayError> {
        let body = LoginRequest {
            user_account: account.to_string(),
            password: password.to_string(),
        };
        let response = self.gateway.issue(self.json_request("/user/login", &body)?).await?;
        let info: TokenInfo = self.decode(&response)?;

        match info.credential() {
            Some(credential) => {
                self.gateway
                    .session()
                    .login(credential, info.login_id_string());
                info!(account, "logged in");
                Ok(info)
            }
            None => Err(self.reject(GatewayError::Transport {
                status: response.status,
                message: INVALID_PAYLOAD_MESSAGE.to_string(),
            })),
        }
    }

    /// `GET /user/info`. Caches the result as the session identity.
    pub async fn current_user(&self) -> Result<UserIdentity, GatewayError> {
        let response = self.gateway.issue(HttpRequest::get("/user/info")).await?;
        let user: UserIdentity = self.decode(&response)?;
        self.gateway.session().set_identity(user.clone());
        Ok(user)
    }

    /// `POST /user/logout`. The local session is cleared even when the
    /// server call fails.
    pub async fn logout(&self) -> Result<(), GatewayError> {
        let result = self.gateway.issue(HttpRequest::post("/user/logout")).await;
        self.gateway.session().clear();
        result.map(|_| ())
    }

    /// `POST /user/register`.
    pub async fn register(
        &self,
        account: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<(), GatewayError> {
        let body = RegisterRequest {
            user_account: account.to_string(),
            password: password.to_string(),
            confirm_password: confirm_password.to_string(),
        };
        self.gateway
            .issue(self.json_request("/user/register", &body)?)
            .await
            .map(|_| ())
    }

    fn json_request<T: Serialize>(&self, path: &str, body: &T) -> Result<HttpRequest, GatewayError> {
        HttpRequest::post_json(path, body).map_err(|e| {
            self.reject(GatewayError::RequestSetup {
                message: setup_message(&e.to_string()),
            })
        })
    }

    /// Decode a non-null payload from an accepted response.
    fn decode<T: DeserializeOwned>(&self, response: &HttpResponse) -> Result<T, GatewayError> {
        let payload = response.payload::<Option<T>>().unwrap_or_else(|e| {
            warn!(error = %e, "undecodable payload");
            None
        });
        payload.ok_or_else(|| {
            self.reject(GatewayError::Transport {
                status: response.status,
                message: INVALID_PAYLOAD_MESSAGE.to_string(),
            })
        })
    }

    /// Show the one notice for a failure the gateway never saw.
    fn reject(&self, err: GatewayError) -> GatewayError {
        self.gateway.notifier().notify(Notice::error(err.message()));
        err
    }
}
