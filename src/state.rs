use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::core::config::{AppPaths, Settings};
use crate::index::DocIndex;
use crate::llm::{LlmProvider, OpenAiProvider};
use crate::rag::{QaService, SqliteVectorStore, VectorStore};

/// Shared application state.
///
/// Every collaborator is constructed explicitly at startup and handed
/// to request handlers through the router; nothing here is a global.
#[derive(Clone)]
pub struct AppState {
    pub paths: Arc<AppPaths>,
    pub settings: Settings,
    pub index: DocIndex,
    pub store: Arc<dyn VectorStore>,
    pub llm: Arc<dyn LlmProvider>,
    pub qa: QaService,
    #[allow(dead_code)]
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub async fn initialize() -> anyhow::Result<Arc<Self>> {
        let paths = Arc::new(AppPaths::new());
        let settings = Settings::from_env();
        let llm: Arc<dyn LlmProvider> = Arc::new(OpenAiProvider::from_settings(&settings)?);
        Self::with_provider(paths, settings, llm).await
    }

    /// Build state around an injected provider. Tests use this to run
    /// the full HTTP surface against a stub LLM.
    pub async fn with_provider(
        paths: Arc<AppPaths>,
        settings: Settings,
        llm: Arc<dyn LlmProvider>,
    ) -> anyhow::Result<Arc<Self>> {
        let index = DocIndex::with_path(paths.index_db_path.clone()).await?;
        let store: Arc<dyn VectorStore> =
            Arc::new(SqliteVectorStore::with_path(paths.vector_db_path.clone()).await?);
        let qa = QaService::new(store.clone(), llm.clone(), settings.clone());
        let started_at = Utc::now();

        Ok(Arc::new(AppState {
            paths,
            settings,
            index,
            store,
            llm,
            qa,
            started_at,
        }))
    }
}
