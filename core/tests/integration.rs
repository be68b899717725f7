//! Gateway behaviour against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives `HttpGateway` and
//! `UserApi` over real HTTP through `UreqTransport`. Delays are shortened in
//! the config so invalidation episodes finish quickly in real time.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use blog_core::{
    GatewayConfig, GatewayError, HttpGateway, HttpRequest, MemoryNavigator, MemoryStore,
    NavAction, Navigator, RecordingNotifier, SessionState, UreqTransport, UserApi,
};

struct Harness {
    gateway: HttpGateway,
    navigator: Arc<MemoryNavigator>,
    notifier: Arc<RecordingNotifier>,
}

async fn start_server() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { mock_blog_api::run(listener).await });
    addr
}

fn harness(base_url: &str, path: &str, config: GatewayConfig) -> Harness {
    let config = GatewayConfig {
        redirect_delay_ms: 20,
        guard_release_delay_ms: 20,
        ..config
    }
    .with_base_url(base_url);
    let navigator = Arc::new(MemoryNavigator::new(path));
    let notifier = Arc::new(RecordingNotifier::new());
    let session = Arc::new(SessionState::new(Arc::new(MemoryStore::new())));
    let gateway = HttpGateway::new(
        config.clone(),
        Arc::new(UreqTransport::new(config.timeout())),
        session,
        navigator.clone(),
        notifier.clone(),
    );
    Harness {
        gateway,
        navigator,
        notifier,
    }
}

async fn wait_for_guard_release(gateway: &HttpGateway) {
    for _ in 0..100 {
        if !gateway.session().is_invalidating() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("redirect guard was never released");
}

#[tokio::test(flavor = "multi_thread")]
async fn login_info_logout_lifecycle() {
    let addr = start_server().await;
    let h = harness(&format!("http://{addr}"), "/", GatewayConfig::default());
    let api = UserApi::new(h.gateway.clone());

    let token = api
        .login(mock_blog_api::SEED_ACCOUNT, mock_blog_api::SEED_PASSWORD)
        .await
        .unwrap();
    assert_eq!(token.token_name.as_deref(), Some(mock_blog_api::TOKEN_NAME));
    assert!(h.gateway.session().is_logged_in());
    assert_eq!(h.gateway.session().login_id().as_deref(), Some("1"));

    let user = api.current_user().await.unwrap();
    assert_eq!(user.user_account.as_deref(), Some(mock_blog_api::SEED_ACCOUNT));
    assert_eq!(h.gateway.session().identity(), Some(user));

    api.logout().await.unwrap();
    assert!(!h.gateway.session().is_logged_in());
    assert!(h.notifier.notices().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn successful_call_returns_payload() {
    let addr = start_server().await;
    let h = harness(&format!("http://{addr}"), "/", GatewayConfig::default());

    let resp = h
        .gateway
        .issue(HttpRequest::get("/article/list").with_query("current", "1"))
        .await
        .unwrap();
    let page: serde_json::Value = resp.payload().unwrap();
    assert_eq!(page["total"], 2);
    assert!(h.notifier.notices().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn not_logged_in_on_protected_page_goes_home() {
    let addr = start_server().await;
    let h = harness(&format!("http://{addr}"), "/blog/edit", GatewayConfig::default());
    h.gateway
        .session()
        .set_credential(blog_core::Credential::new("stale", mock_blog_api::TOKEN_NAME));

    let err = h.gateway.issue(HttpRequest::get("/user/info")).await.unwrap_err();
    assert_eq!(err.business_code(), Some(40100));
    assert_eq!(err.message(), "未登录");
    assert_eq!(h.notifier.messages(), vec!["未登录".to_string()]);
    assert!(h.gateway.session().credential().is_none());

    wait_for_guard_release(&h.gateway).await;
    assert_eq!(h.navigator.actions(), vec![NavAction::Navigate("/".into())]);
    assert_eq!(h.navigator.current_path(), "/");
}

#[tokio::test(flavor = "multi_thread")]
async fn system_error_falls_back_to_fixed_text() {
    let addr = start_server().await;
    let h = harness(&format!("http://{addr}"), "/blog/edit", GatewayConfig::default());
    h.gateway
        .session()
        .set_credential(blog_core::Credential::new("abc", "Authorization"));

    let err = h.gateway.issue(HttpRequest::get("/debug/code/50000")).await.unwrap_err();
    assert_eq!(
        err,
        GatewayError::Business {
            code: 50000,
            message: "系统内部异常".into()
        }
    );
    assert_eq!(h.notifier.messages(), vec!["系统内部异常".to_string()]);
    assert!(h.gateway.session().credential().is_some());
    assert!(!h.gateway.session().is_invalidating());
    assert!(h.navigator.actions().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn bare_http_statuses_map_to_transport_errors() {
    let addr = start_server().await;
    let h = harness(&format!("http://{addr}"), "/about", GatewayConfig::default());

    let cases = [
        (403, "拒绝访问"),
        (404, "请求的资源不存在"),
        (500, "服务器内部错误"),
        (502, "请求错误: 502"),
    ];
    for (status, text) in cases {
        let err = h
            .gateway
            .issue(HttpRequest::get(format!("/debug/status/{status}")))
            .await
            .unwrap_err();
        assert_eq!(err.http_status(), Some(status));
        assert_eq!(err.message(), text);
    }
    assert_eq!(h.notifier.notices().len(), cases.len());
    assert!(h.navigator.actions().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn oversized_body_still_classified_by_status() {
    let addr = start_server().await;
    let h = harness(&format!("http://{addr}"), "/about", GatewayConfig::default());

    let err = h
        .gateway
        .issue(HttpRequest::get("/debug/oversized/502"))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        GatewayError::Transport {
            status: 502,
            message: "请求错误: 502".into()
        }
    );
    assert_eq!(h.notifier.messages(), vec!["请求错误: 502".to_string()]);
}

#[tokio::test(flavor = "multi_thread")]
async fn http_401_invalidates_and_reloads_unprotected_page() {
    let addr = start_server().await;
    let h = harness(&format!("http://{addr}"), "/about", GatewayConfig::default());
    h.gateway
        .session()
        .set_credential(blog_core::Credential::new("abc", "Authorization"));

    let err = h.gateway.issue(HttpRequest::get("/debug/status/401")).await.unwrap_err();
    assert_eq!(err.http_status(), Some(401));
    assert!(h.gateway.session().credential().is_none());

    wait_for_guard_release(&h.gateway).await;
    assert_eq!(h.navigator.actions(), vec![NavAction::Reload]);
}

#[tokio::test(flavor = "multi_thread")]
async fn server_down_is_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let h = harness(&format!("http://{addr}"), "/", GatewayConfig::default());
    h.gateway
        .session()
        .set_credential(blog_core::Credential::new("abc", "Authorization"));

    let err = h.gateway.issue(HttpRequest::get("/user/info")).await.unwrap_err();
    assert!(matches!(err, GatewayError::Network { .. }));
    assert_eq!(h.notifier.messages(), vec!["服务器无响应".to_string()]);
    assert!(h.gateway.session().credential().is_some());
}

#[tokio::test(flavor = "multi_thread")]
async fn slow_server_hits_timeout() {
    let addr = start_server().await;
    let config = GatewayConfig {
        timeout_ms: 100,
        ..GatewayConfig::default()
    };
    let h = harness(&format!("http://{addr}"), "/", config);

    let err = h.gateway.issue(HttpRequest::get("/debug/slow/2000")).await.unwrap_err();
    assert!(matches!(err, GatewayError::Network { .. }));
    assert_eq!(err.message(), "服务器无响应");
}

#[tokio::test(flavor = "multi_thread")]
async fn register_mismatch_surfaces_server_message() {
    let addr = start_server().await;
    let h = harness(&format!("http://{addr}"), "/", GatewayConfig::default());
    let api = UserApi::new(h.gateway.clone());

    let err = api.register("bob", "a", "b").await.unwrap_err();
    assert_eq!(err.business_code(), Some(40000));
    assert_eq!(h.notifier.messages(), vec!["两次输入的密码不一致".to_string()]);

    api.register("bob", "secret", "secret").await.unwrap();
    api.login("bob", "secret").await.unwrap();
    assert!(h.gateway.session().is_logged_in());
}
