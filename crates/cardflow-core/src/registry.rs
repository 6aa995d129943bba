//! Session registry keyed by client identity.
//!
//! Each connecting client gets exactly one [`SessionController`];
//! reconnecting with the same id resumes the same session state.

use std::collections::HashMap;
use std::sync::Arc;

use cardflow_game::engine::EngineFactory;
use cardflow_game::select::MoveSelector;
use cardflow_types::SessionId;
use tokio::sync::Mutex;
use tracing::info;

use crate::session::{SessionConfig, SessionController};
use crate::sink::RenderSink;

/// Owns all live sessions and the collaborators new sessions are born
/// with.
pub struct SessionRegistry {
    sessions: Mutex<HashMap<SessionId, Arc<SessionController>>>,
    defaults: SessionConfig,
    engine_factory: Arc<dyn EngineFactory>,
    selector: Arc<dyn MoveSelector>,
    sink: Arc<dyn RenderSink>,
}

impl SessionRegistry {
    /// Create an empty registry.
    pub fn new(
        defaults: SessionConfig,
        engine_factory: Arc<dyn EngineFactory>,
        selector: Arc<dyn MoveSelector>,
        sink: Arc<dyn RenderSink>,
    ) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            defaults,
            engine_factory,
            selector,
            sink,
        }
    }

    /// Fetch the session for `id`, creating an idle one with the
    /// registry defaults on first contact.
    pub async fn get_or_create(&self, id: SessionId) -> Arc<SessionController> {
        let mut sessions = self.sessions.lock().await;
        if let Some(existing) = sessions.get(&id) {
            return Arc::clone(existing);
        }
        info!(session = %id, "session created");
        let controller = Arc::new(SessionController::new(
            id,
            self.defaults.clone(),
            Arc::clone(&self.engine_factory),
            Arc::clone(&self.selector),
            Arc::clone(&self.sink),
        ));
        sessions.insert(id, Arc::clone(&controller));
        controller
    }

    /// Fetch the session for `id` without creating one.
    pub async fn get(&self, id: SessionId) -> Option<Arc<SessionController>> {
        self.sessions.lock().await.get(&id).map(Arc::clone)
    }

    /// Remove the session for `id`, tearing down its worker.
    ///
    /// Returns whether a session existed.
    pub async fn remove(&self, id: SessionId) -> bool {
        let removed = self.sessions.lock().await.remove(&id);
        match removed {
            Some(controller) => {
                controller.on_disconnect().await;
                info!(session = %id, "session removed");
                true
            }
            None => false,
        }
    }

    /// Ids of all live sessions.
    pub async fn ids(&self) -> Vec<SessionId> {
        self.sessions.lock().await.keys().copied().collect()
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Whether the registry holds no sessions.
    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }
}
