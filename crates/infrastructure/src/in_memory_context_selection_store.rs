use std::collections::HashMap;

use async_trait::async_trait;
use presensi_application::{ContextSelectionStore, ContextSessionId};
use presensi_core::AppResult;
use presensi_domain::ActiveContextSelection;
use tokio::sync::RwLock;


/// Process-local selection store; selections vanish on restart.
#[derive(Debug, Default)]
pub struct InMemoryContextSelectionStore {
    selections: RwLock<HashMap<ContextSessionId, ActiveContextSelection>>,
}

impl InMemoryContextSelectionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContextSelectionStore for InMemoryContextSelectionStore {
    async fn find_selection(
        &self,
        session_id: ContextSessionId,
    ) -> AppResult<Option<ActiveContextSelection>> {
        Ok(self.selections.read().await.get(&session_id).cloned())
    }

    async fn initialize_selection(
        &self,
        session_id: ContextSessionId,
        selection: ActiveContextSelection,
    ) -> AppResult<ActiveContextSelection> {
        Ok(self
            .selections
            .write()
            .await
            .entry(session_id)
            .or_insert(selection)
            .clone())
    }

    async fn save_selection(
        &self,
        session_id: ContextSessionId,
        selection: ActiveContextSelection,
    ) -> AppResult<()> {
        self.selections.write().await.insert(session_id, selection);
        Ok(())
    }

    async fn delete_selection(&self, session_id: ContextSessionId) -> AppResult<()> {
        self.selections.write().await.remove(&session_id);
        Ok(())
    }
}
