use std::{collections::HashMap, sync::Arc, time::Duration};

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;
use uuid::Uuid;

pub const TOKEN_NAME: &str = "Authorization";
pub const SEED_ACCOUNT: &str = "admin";
pub const SEED_PASSWORD: &str = "12345678";

/// The `{code, data, message}` wrapper every endpoint answers with.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Envelope {
    pub code: i64,
    pub data: Value,
    pub message: String,
}

impl Envelope {
    pub fn ok(data: Value) -> Self {
        Self {
            code: 0,
            data,
            message: "ok".to_string(),
        }
    }

    pub fn error(code: i64, message: &str) -> Self {
        Self {
            code,
            data: Value::Null,
            message: message.to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: i64,
    pub user_account: String,
    pub username: String,
    pub role: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginBody {
    pub user_account: String,
    pub password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterBody {
    pub user_account: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug)]
struct Account {
    password: String,
    info: UserInfo,
}

#[derive(Debug, Default)]
pub struct Backend {
    accounts: HashMap<String, Account>,
    tokens: HashMap<String, String>,
}

pub type Db = Arc<RwLock<Backend>>;

fn seeded() -> Backend {
    let mut backend = Backend::default();
    backend.accounts.insert(
        SEED_ACCOUNT.to_string(),
        Account {
            password: SEED_PASSWORD.to_string(),
            info: UserInfo {
                id: 1,
                user_account: SEED_ACCOUNT.to_string(),
                username: "博主".to_string(),
                role: "admin".to_string(),
            },
        },
    );
    backend
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(seeded()));
    Router::new()
        .route("/user/login", post(login))
        .route("/user/logout", post(logout))
        .route("/user/register", post(register))
        .route("/user/info", get(user_info))
        .route("/article/list", get(list_articles))
        .route("/debug/code/{code}", get(debug_code))
        .route("/debug/status/{status}", get(debug_status))
        .route("/debug/slow/{ms}", get(debug_slow))
        .route("/debug/oversized/{status}", get(debug_oversized))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(TOKEN_NAME)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

async fn login(State(db): State<Db>, Json(input): Json<LoginBody>) -> Json<Envelope> {
    let mut backend = db.write().await;
    let id = match backend.accounts.get(&input.user_account) {
        Some(account) if account.password == input.password => account.info.id,
        _ => return Json(Envelope::error(40000, "账号或密码错误")),
    };
    let token = Uuid::new_v4().to_string();
    backend.tokens.insert(token.clone(), input.user_account.clone());
    info!(account = %input.user_account, "issued token");
    Json(Envelope::ok(json!({
        "tokenName": TOKEN_NAME,
        "tokenValue": token,
        "isLogin": true,
        "loginId": id.to_string(),
    })))
}

async fn logout(State(db): State<Db>, headers: HeaderMap) -> Json<Envelope> {
    let Some(token) = bearer_token(&headers) else {
        return Json(Envelope::error(40100, "未登录"));
    };
    db.write().await.tokens.remove(token);
    Json(Envelope::ok(json!("ok")))
}

async fn register(State(db): State<Db>, Json(input): Json<RegisterBody>) -> Json<Envelope> {
    if input.password != input.confirm_password {
        return Json(Envelope::error(40000, "两次输入的密码不一致"));
    }
    let mut backend = db.write().await;
    if backend.accounts.contains_key(&input.user_account) {
        return Json(Envelope::error(40000, "账号已存在"));
    }
    let id = backend.accounts.len() as i64 + 1;
    backend.accounts.insert(
        input.user_account.clone(),
        Account {
            password: input.password,
            info: UserInfo {
                id,
                user_account: input.user_account.clone(),
                username: input.user_account,
                role: "user".to_string(),
            },
        },
    );
    Json(Envelope::ok(json!("ok")))
}

async fn user_info(State(db): State<Db>, headers: HeaderMap) -> Json<Envelope> {
    let backend = db.read().await;
    let info = bearer_token(&headers)
        .and_then(|token| backend.tokens.get(token))
        .and_then(|account| backend.accounts.get(account))
        .map(|account| account.info.clone());
    match info {
        Some(info) => Json(Envelope::ok(json!(info))),
        None => Json(Envelope::error(40100, "未登录")),
    }
}

async fn list_articles() -> Json<Envelope> {
    Json(Envelope::ok(json!({
        "data": [
            {"id": "1", "title": "Hello", "summary": "first post"},
            {"id": "2", "title": "Rust", "summary": "second post"},
        ],
        "total": 2,
    })))
}

async fn debug_code(Path(code): Path<i64>) -> Json<Envelope> {
    Json(Envelope::error(code, ""))
}

async fn debug_status(Path(status): Path<u16>) -> (StatusCode, String) {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, format!("status {}", status.as_u16()))
}

/// Larger than any client body limit.
pub const OVERSIZED_BODY_LEN: usize = 11 * 1024 * 1024;

async fn debug_oversized(Path(status): Path<u16>) -> (StatusCode, String) {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, "x".repeat(OVERSIZED_BODY_LEN))
}

async fn debug_slow(Path(ms): Path<u64>) -> Json<Envelope> {
    tokio::time::sleep(Duration::from_millis(ms)).await;
    Json(Envelope::ok(Value::Null))
}
