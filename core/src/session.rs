//! Credential, identity and the invalidation guard.
//!
//! # Design
//! One `SessionState` is shared by `Arc` between the gateway and anything
//! that logs in or out. The gateway reads the credential per send, so a
//! login that lands between building and sending a request still applies.
//!
//! The redirect guard is an `AtomicBool` so that `try_begin_invalidation` is
//! a single check-and-set; concurrent failing calls race on it and exactly
//! one wins. Every write also goes through to the `KeyValueStore` so a fresh
//! `SessionState::restore` picks the session back up.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::store::KeyValueStore;

pub const TOKEN_KEY: &str = "token";
pub const TOKEN_NAME_KEY: &str = "tokenName";
pub const IS_LOGIN_KEY: &str = "isLogin";
pub const LOGIN_ID_KEY: &str = "loginId";
pub const REDIRECTING_KEY: &str = "isRedirecting";

/// Token plus the header that carries it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub token: String,
    pub header_name: String,
    pub logged_in: bool,
}

impl Credential {
    pub fn new(token: impl Into<String>, header_name: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            header_name: header_name.into(),
            logged_in: true,
        }
    }

    /// Only a credential with both parts set is attached to requests.
    pub fn is_usable(&self) -> bool {
        !self.token.is_empty() && !self.header_name.is_empty()
    }
}

/// Cached identity of the logged-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub user_account: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub profile: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Default)]
struct Inner {
    credential: Option<Credential>,
    identity: Option<UserIdentity>,
    login_id: Option<String>,
}

pub struct SessionState {
    inner: RwLock<Inner>,
    redirecting: AtomicBool,
    store: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionState")
            .field("logged_in", &self.is_logged_in())
            .field("redirecting", &self.is_invalidating())
            .finish()
    }
}

impl SessionState {
    /// Empty session. Leaves whatever the store holds untouched.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            redirecting: AtomicBool::new(false),
            store,
        }
    }

    /// Rebuild a session from previously persisted keys.
    ///
    /// A stale `isRedirecting` flag from a previous process is dropped: the
    /// guard only protects a live invalidation episode.
    pub fn restore(store: Arc<dyn KeyValueStore>) -> Self {
        let token = store.get(TOKEN_KEY).unwrap_or_default();
        let header_name = store.get(TOKEN_NAME_KEY).unwrap_or_default();
        let logged_in = store.get(IS_LOGIN_KEY).as_deref() == Some("true");
        let login_id = store.get(LOGIN_ID_KEY);
        store.remove(REDIRECTING_KEY);

        let credential = Credential {
            token,
            header_name,
            logged_in,
        };
        let session = Self::new(store);
        if credential.is_usable() {
            debug!(header = %credential.header_name, "restored persisted credential");
            let mut inner = session.inner.write();
            inner.credential = Some(credential);
            inner.login_id = login_id;
        }
        session
    }

    /// Install a credential, replacing any previous one.
    pub fn set_credential(&self, credential: Credential) {
        self.store.set(TOKEN_KEY, &credential.token);
        self.store.set(TOKEN_NAME_KEY, &credential.header_name);
        self.store
            .set(IS_LOGIN_KEY, if credential.logged_in { "true" } else { "false" });
        self.inner.write().credential = Some(credential);
    }

    /// Snapshot of the current credential.
    pub fn credential(&self) -> Option<Credential> {
        self.inner.read().credential.clone()
    }

    pub fn login(&self, credential: Credential, login_id: Option<String>) {
        self.set_credential(credential);
        match &login_id {
            Some(id) => self.store.set(LOGIN_ID_KEY, id),
            None => self.store.remove(LOGIN_ID_KEY),
        }
        self.inner.write().login_id = login_id;
        info!("session logged in");
    }

    pub fn login_id(&self) -> Option<String> {
        self.inner.read().login_id.clone()
    }

    pub fn set_identity(&self, identity: UserIdentity) {
        self.inner.write().identity = Some(identity);
    }

    pub fn identity(&self) -> Option<UserIdentity> {
        self.inner.read().identity.clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.inner
            .read()
            .credential
            .as_ref()
            .is_some_and(|c| c.logged_in && c.is_usable())
    }

    /// Drop the credential and every cached identity key.
    pub fn clear(&self) {
        {
            let mut inner = self.inner.write();
            inner.credential = None;
            inner.identity = None;
            inner.login_id = None;
        }
        for key in [TOKEN_KEY, TOKEN_NAME_KEY, LOGIN_ID_KEY, IS_LOGIN_KEY] {
            self.store.remove(key);
        }
        info!("session cleared");
    }

    /// Claim the redirect guard. Returns `false` if an invalidation is
    /// already in progress.
    pub fn try_begin_invalidation(&self) -> bool {
        let won = self
            .redirecting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if won {
            self.store.set(REDIRECTING_KEY, "true");
        }
        won
    }

    pub fn end_invalidation(&self) {
        self.redirecting.store(false, Ordering::Release);
        self.store.remove(REDIRECTING_KEY);
    }

    pub fn is_invalidating(&self) -> bool {
        self.redirecting.load(Ordering::Acquire)
    }
}
