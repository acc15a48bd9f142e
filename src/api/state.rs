use std::sync::Arc;

use crate::application::{ChatService, DocumentService, RagService};
use crate::infrastructure::Config;

#[derive(Clone)]
pub struct AppState {
    pub document_service: Arc<DocumentService>,
    pub rag_service: Arc<RagService>,
    pub chat_service: Arc<ChatService>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(
        document_service: Arc<DocumentService>,
        rag_service: Arc<RagService>,
        chat_service: Arc<ChatService>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            document_service,
            rag_service,
            chat_service,
            config,
        }
    }
}
