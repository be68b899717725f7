//! Client core for the blog API.
//!
//! # Overview
//! Every call to the blog backend goes through `HttpGateway`. It attaches the
//! session credential and sends the request through a `Transport`. It then
//! classifies the result into success or a `GatewayError`, showing one
//! notice per failure and invalidating the session when the server says the
//! login is gone.
//!
//! # Design
//! - Classification (`classify`) is a pure function over `HttpResponse` /
//!   `TransportError`; the gateway only adds side effects around it.
//! - Session state is an explicit `Arc<SessionState>` with a check-and-set
//!   redirect guard instead of ambient globals.
//! - Storage, navigation, notices and the wire are traits, with in-memory
//!   implementations for headless use and tests, plus `UreqTransport`.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod classify;
pub mod config;
pub mod envelope;
pub mod error;
pub mod gateway;
pub mod http;
pub mod navigator;
pub mod notify;
pub mod ops;
pub mod session;
pub mod store;
pub mod transport;
pub mod user;

pub use classify::{classify_response, classify_transport_failure, Outcome};
pub use config::GatewayConfig;
pub use envelope::{BusinessCode, Envelope};
pub use error::{ConfigError, GatewayError, TransportError};
pub use gateway::{HttpGateway, InvalidationHandle};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use navigator::{MemoryNavigator, NavAction, Navigator};
pub use notify::{Notice, NoticeLevel, Notifier, RecordingNotifier, TracingNotifier};
pub use ops::{run_with_notice, NoticeOptions, OperationError};
pub use session::{Credential, SessionState, UserIdentity};
pub use store::{KeyValueStore, MemoryStore};
pub use transport::{Transport, UreqTransport};
pub use user::{TokenInfo, UserApi};
