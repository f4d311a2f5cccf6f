//! Sitat - Transcript Q&A with timestamp citations
//!
//! Ingest timestamped transcripts, build a per-transcript vector index,
//! and answer questions grounded in the transcript with citations back to
//! the time ranges that contributed.
//!
//! The name "Sitat" is the Norwegian word for "quotation."
//!
//! # Overview
//!
//! Sitat allows you to:
//! - Ingest plain-text transcripts with `[HH:MM:SS]` markers
//! - Split them into overlapping chunks that keep their timestamp ranges
//! - Ask questions and get AI-generated answers with timestamp citations
//! - Cache answers and keep a per-user query history
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management and prompt templates
//! - `transcript` - Timestamp marker parsing into segments
//! - `chunking` - Timestamp-preserving chunking of segments
//! - `embedding` - Embedding generation
//! - `vector_store` - Vector database abstraction
//! - `store` - Metadata, cache, and history persistence
//! - `rag` - Retrieval-augmented answering
//! - `pipeline` - Ingest and query coordination
//! - `ingest` - Background ingestion queue
//!
//! # Example
//!
//! ```rust,no_run
//! use sitat::config::Settings;
//! use sitat::pipeline::Pipeline;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let pipeline = Pipeline::new(settings)?;
//!
//!     let chunks = pipeline
//!         .process_transcript("[00:00:00] Hello world.", "alice", "t1", "demo")
//!         .await?;
//!     println!("Indexed {} chunks", chunks);
//!
//!     let result = pipeline.query("alice", "t1", "What was said?").await?;
//!     println!("{}", result.answer);
//!
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod ingest;
pub mod openai;
pub mod pipeline;
pub mod rag;
pub mod store;
pub mod transcript;
pub mod vector_store;

pub use error::{Result, SitatError};
