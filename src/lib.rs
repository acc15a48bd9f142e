//! Docchat - chat with your documents, grounded by retrieval.
//!
//! Layers:
//! - [`domain`] - entities, the text chunker, error taxonomy, and ports
//! - [`application`] - ingestion, retrieval, document, and chat services
//! - [`infrastructure`] - Gemini embedding/LLM adapters, vector and document
//!   stores, configuration
//! - [`api`] - axum router, state, and route handlers

pub mod api;
pub mod application;
pub mod domain;
pub mod infrastructure;
