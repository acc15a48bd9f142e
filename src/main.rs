use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use docchat::api::{create_router, AppState};
use docchat::application::{ChatService, DocumentService, IngestionPipeline, RagService};
use docchat::domain::ports::{EmbeddingService, LlmService, SearchParams, VectorStore};
use docchat::domain::TextChunker;
use docchat::infrastructure::{
    Config, GeminiEmbedding, GeminiLlm, InMemoryDocumentStore, InMemoryVectorStore,
    QdrantVectorStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=debug,docchat=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let mut config = match std::env::var("DOCCHAT_CONFIG") {
        Ok(path) => Config::from_yaml_file(&path)?,
        Err(_) => Config::default(),
    };
    if let Ok(host) = std::env::var("SERVER_HOST") {
        config.server.host = host;
    }
    if let Ok(port) = std::env::var("SERVER_PORT") {
        config.server.port = port.parse()?;
    }
    if let Ok(url) = std::env::var("QDRANT_URL") {
        config.vector_store.url = url;
    }
    if let Ok(backend) = std::env::var("VECTOR_STORE_BACKEND") {
        config.vector_store.backend = backend;
    }

    let chunker = TextChunker::new(config.chunking.chunk_size, config.chunking.chunk_overlap)?;

    let embedding: Arc<dyn EmbeddingService> =
        Arc::new(GeminiEmbedding::from_config(&config.embedding));

    let vector_store: Arc<dyn VectorStore> = match config.vector_store.backend.as_str() {
        "qdrant" => {
            let store = QdrantVectorStore::new(
                &config.vector_store.url,
                &config.vector_store.collection,
                config.embedding.dimension,
            )
            .await?;
            info!(url = %config.vector_store.url, collection = %config.vector_store.collection, "Qdrant connected");
            Arc::new(store)
        }
        _ => {
            info!("using in-memory vector store");
            Arc::new(InMemoryVectorStore::new(config.embedding.dimension))
        }
    };

    let document_store = Arc::new(InMemoryDocumentStore::new());
    let llm: Arc<dyn LlmService> = Arc::new(GeminiLlm::new(config.llm.model.clone()));

    let ingestion = Arc::new(IngestionPipeline::new(
        chunker,
        embedding.clone(),
        vector_store.clone(),
    ));

    let document_service = Arc::new(
        DocumentService::new(document_store.clone(), vector_store.clone(), ingestion)
            .with_summarizer(llm.clone(), config.prompts.summary_system.clone()),
    );

    let rag_service = Arc::new(RagService::new(
        embedding,
        vector_store,
        SearchParams {
            top_k: config.retrieval.top_k,
            min_similarity: config.retrieval.min_similarity,
        },
    ));

    let chat_service = Arc::new(ChatService::new(
        document_store,
        rag_service.clone(),
        llm,
        config.prompts.chat_system.clone(),
        Duration::from_secs(config.llm.timeout_seconds),
    ));

    let host = config.server.host.clone();
    let port = config.server.port;

    let state = AppState::new(document_service, rag_service, chat_service, Arc::new(config));
    let app = create_router(state);

    let addr = SocketAddr::new(host.parse()?, port);
    info!("API server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
