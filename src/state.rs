use std::sync::Arc;

use crate::config::SessionConfig;
use crate::session::SessionStore;
use crate::store::Store;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, session: &SessionConfig) -> Self {
        Self {
            store,
            sessions: Arc::new(SessionStore::new(session)),
        }
    }

    /// In-memory store and a fixed session secret.
    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::store::teststore::TestStore;

        Self::new(
            Arc::new(TestStore::new()),
            &SessionConfig {
                secret: "test-secret".into(),
            },
        )
    }
}
