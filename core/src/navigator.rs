//! The navigation collaborator: where the UI is and how to move it.

use parking_lot::Mutex;

pub trait Navigator: Send + Sync {
    fn current_path(&self) -> String;
    fn navigate(&self, path: &str);
    fn reload(&self);
}

/// A navigation action, as recorded by `MemoryNavigator`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavAction {
    Navigate(String),
    Reload,
}

/// Headless navigator that tracks the current path and records actions.
#[derive(Debug)]
pub struct MemoryNavigator {
    state: Mutex<NavState>,
}

#[derive(Debug)]
struct NavState {
    path: String,
    history: Vec<NavAction>,
}

impl MemoryNavigator {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            state: Mutex::new(NavState {
                path: path.into(),
                history: Vec::new(),
            }),
        }
    }

    /// Move without recording, as a user clicking a link would.
    pub fn set_path(&self, path: impl Into<String>) {
        self.state.lock().path = path.into();
    }

    pub fn actions(&self) -> Vec<NavAction> {
        self.state.lock().history.clone()
    }
}

impl Navigator for MemoryNavigator {
    fn current_path(&self) -> String {
        self.state.lock().path.clone()
    }

    fn navigate(&self, path: &str) {
        let mut state = self.state.lock();
        state.path = path.to_string();
        state.history.push(NavAction::Navigate(path.to_string()));
    }

    fn reload(&self) {
        self.state.lock().history.push(NavAction::Reload);
    }
}
