use std::sync::Arc;
use std::time::Duration;

use tracing::instrument;
use uuid::Uuid;

use crate::application::services::rag::RagService;
use crate::domain::{
    ports::{DocumentStore, LlmService},
    DomainError, Message,
};

/// Clients resend the conversation with every request; only this many of the
/// most recent messages are forwarded to the model.
const MAX_HISTORY_MESSAGES: usize = 50;

#[derive(Debug, Clone)]
pub struct ChatAnswer {
    pub answer: String,
    /// Number of retrieved chunks that grounded the answer. Zero means the
    /// whole document text was used instead.
    pub context_chunks: usize,
    pub grounded: bool,
}

/// Context-grounded chat over a single document.
///
/// Retrieved chunks feed the model prompt. When a document has no indexed
/// chunks at all, the whole raw text is used instead; a query-time embedding
/// failure is surfaced to the caller rather than silently answered without
/// context.
pub struct ChatService {
    documents: Arc<dyn DocumentStore>,
    rag: Arc<RagService>,
    llm: Arc<dyn LlmService>,
    system_prompt: String,
    timeout: Duration,
}

impl ChatService {
    pub fn new(
        documents: Arc<dyn DocumentStore>,
        rag: Arc<RagService>,
        llm: Arc<dyn LlmService>,
        system_prompt: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            documents,
            rag,
            llm,
            system_prompt: system_prompt.into(),
            timeout,
        }
    }

    #[instrument(skip(self, message, history), fields(document_id = %document_id))]
    pub async fn ask(
        &self,
        document_id: Uuid,
        message: &str,
        history: &[Message],
    ) -> Result<ChatAnswer, DomainError> {
        let doc = self
            .documents
            .get(document_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("document {document_id}")))?;

        let results = self.rag.retrieve(document_id, message).await?;

        let (context, context_chunks) = if results.is_empty() {
            tracing::debug!("no indexed chunks matched, falling back to whole document");
            (doc.content.clone(), 0)
        } else {
            let block = results
                .iter()
                .enumerate()
                .map(|(i, r)| format!("[{}] {}", i + 1, r.chunk.content))
                .collect::<Vec<_>>()
                .join("\n\n");
            (block, results.len())
        };

        let prompt = self.build_prompt(&context, history, message);

        let answer = tokio::time::timeout(
            self.timeout,
            self.llm.complete_with_system(&self.system_prompt, &prompt),
        )
        .await
        .map_err(|_| DomainError::timeout("chat completion timed out"))??;

        Ok(ChatAnswer {
            answer,
            context_chunks,
            grounded: context_chunks > 0,
        })
    }

    fn build_prompt(&self, context: &str, history: &[Message], message: &str) -> String {
        let recent = if history.len() > MAX_HISTORY_MESSAGES {
            &history[history.len() - MAX_HISTORY_MESSAGES..]
        } else {
            history
        };

        let mut prompt = format!("Document content:\n{context}\n");

        if !recent.is_empty() {
            let lines = recent
                .iter()
                .map(|m| format!("{}: {}", m.role.as_str(), m.content))
                .collect::<Vec<_>>()
                .join("\n");
            prompt.push_str(&format!("\nPrevious conversation:\n{lines}\n"));
        }

        prompt.push_str(&format!("\nCurrent message from user: {message}"));
        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{EmbeddingService, SearchParams, VectorStore};
    use crate::domain::{Document, DocumentChunk, Embedding, MessageRole, SearchResult};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct UnitEmbeddings;

    #[async_trait]
    impl EmbeddingService for UnitEmbeddings {
        async fn embed(&self, _text: &str) -> Result<Embedding, DomainError> {
            Ok(Embedding::new(vec![1.0, 0.0]))
        }

        async fn embed_batch(
            &self,
            texts: &[&str],
        ) -> Result<Vec<Option<Embedding>>, DomainError> {
            Ok(vec![Some(Embedding::new(vec![1.0, 0.0])); texts.len()])
        }

        fn dimension(&self) -> usize {
            2
        }
    }

    struct CannedStore {
        hits: Vec<String>,
    }

    #[async_trait]
    impl VectorStore for CannedStore {
        async fn insert(
            &self,
            chunk: &DocumentChunk,
            _embedding: &Embedding,
        ) -> Result<Uuid, DomainError> {
            Ok(chunk.id)
        }

        async fn search(
            &self,
            document_id: Uuid,
            _query: &Embedding,
            _params: SearchParams,
        ) -> Result<Vec<SearchResult>, DomainError> {
            Ok(self
                .hits
                .iter()
                .enumerate()
                .map(|(i, text)| SearchResult {
                    chunk: DocumentChunk::new(document_id, text.as_str(), i),
                    score: 0.9 - i as f32 * 0.1,
                })
                .collect())
        }

        async fn delete_by_document(&self, _document_id: Uuid) -> Result<(), DomainError> {
            Ok(())
        }
    }

    struct OneDocStore {
        doc: Document,
    }

    #[async_trait]
    impl DocumentStore for OneDocStore {
        async fn save(&self, _doc: &Document) -> Result<(), DomainError> {
            Ok(())
        }

        async fn get(&self, id: Uuid) -> Result<Option<Document>, DomainError> {
            Ok((self.doc.id == id).then(|| self.doc.clone()))
        }

        async fn list(&self) -> Result<Vec<Document>, DomainError> {
            Ok(vec![self.doc.clone()])
        }

        async fn delete(&self, _id: Uuid) -> Result<(), DomainError> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct CapturingLlm {
        last_prompt: Mutex<Option<String>>,
        delay: Option<Duration>,
    }

    #[async_trait]
    impl LlmService for CapturingLlm {
        async fn complete(&self, prompt: &str) -> Result<String, DomainError> {
            self.complete_with_system("", prompt).await
        }

        async fn complete_with_system(
            &self,
            _system: &str,
            prompt: &str,
        ) -> Result<String, DomainError> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
            Ok("the answer".to_string())
        }
    }

    fn service_with(
        doc: Document,
        hits: Vec<String>,
        llm: Arc<CapturingLlm>,
        timeout: Duration,
    ) -> ChatService {
        let rag = Arc::new(RagService::new(
            Arc::new(UnitEmbeddings),
            Arc::new(CannedStore { hits }),
            SearchParams {
                top_k: 10,
                min_similarity: 0.2,
            },
        ));
        ChatService::new(
            Arc::new(OneDocStore { doc }),
            rag,
            llm,
            "You answer questions about one document.",
            timeout,
        )
    }

    #[tokio::test]
    async fn test_retrieved_chunks_feed_the_prompt() {
        let doc = Document::new("manual.pdf", "full manual text");
        let doc_id = doc.id;
        let llm = Arc::new(CapturingLlm::default());
        let chat = service_with(
            doc,
            vec!["warranty covers two years".into(), "returns in 30 days".into()],
            llm.clone(),
            Duration::from_secs(5),
        );

        let answer = chat.ask(doc_id, "how long is the warranty?", &[]).await.unwrap();

        assert_eq!(answer.answer, "the answer");
        assert!(answer.grounded);
        assert_eq!(answer.context_chunks, 2);

        let prompt = llm.last_prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.contains("[1] warranty covers two years"));
        assert!(prompt.contains("[2] returns in 30 days"));
        assert!(!prompt.contains("full manual text"));
    }

    #[tokio::test]
    async fn test_empty_index_falls_back_to_whole_document() {
        let doc = Document::new("manual.pdf", "full manual text");
        let doc_id = doc.id;
        let llm = Arc::new(CapturingLlm::default());
        let chat = service_with(doc, Vec::new(), llm.clone(), Duration::from_secs(5));

        let answer = chat.ask(doc_id, "anything", &[]).await.unwrap();

        assert!(!answer.grounded);
        assert_eq!(answer.context_chunks, 0);
        let prompt = llm.last_prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.contains("full manual text"));
    }

    #[tokio::test]
    async fn test_history_is_windowed_to_last_fifty_messages() {
        let doc = Document::new("manual.pdf", "text");
        let doc_id = doc.id;
        let llm = Arc::new(CapturingLlm::default());
        let chat = service_with(doc, vec!["a chunk".into()], llm.clone(), Duration::from_secs(5));

        let history: Vec<Message> = (0..60)
            .map(|i| Message::new(MessageRole::User, format!("msg-{i}")))
            .collect();

        chat.ask(doc_id, "question", &history).await.unwrap();

        let prompt = llm.last_prompt.lock().unwrap().clone().unwrap();
        assert!(!prompt.contains("msg-9\n"));
        assert!(prompt.contains("msg-10"));
        assert!(prompt.contains("msg-59"));
    }

    #[tokio::test]
    async fn test_unknown_document_is_not_found() {
        let doc = Document::new("manual.pdf", "text");
        let llm = Arc::new(CapturingLlm::default());
        let chat = service_with(doc, Vec::new(), llm, Duration::from_secs(5));

        let err = chat.ask(Uuid::new_v4(), "hi", &[]).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_slow_completion_times_out() {
        let doc = Document::new("manual.pdf", "text");
        let doc_id = doc.id;
        let llm = Arc::new(CapturingLlm {
            last_prompt: Mutex::new(None),
            delay: Some(Duration::from_millis(200)),
        });
        let chat = service_with(doc, Vec::new(), llm, Duration::from_millis(20));

        let err = chat.ask(doc_id, "hi", &[]).await.unwrap_err();
        assert!(matches!(err, DomainError::Timeout(_)));
    }
}
