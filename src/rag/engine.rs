//! RAG answer generation.

use super::{QueryResult, TimestampRange};
use crate::config::prompts::{render_rag_prompt, RAG_SYSTEM_PROMPT};
use crate::embedding::Embedder;
use crate::error::{Result, SitatError};
use crate::openai::create_client;
use crate::vector_store::{SearchResult, VectorStore};
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Number of nearest chunks retrieved per query.
pub const DEFAULT_TOP_K: usize = 4;

/// RAG engine for question answering over a single transcript collection.
pub struct RagEngine {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    embedder: Arc<dyn Embedder>,
    vector_store: Arc<dyn VectorStore>,
    top_k: usize,
}

impl RagEngine {
    /// Create a new RAG engine.
    pub fn new(
        vector_store: Arc<dyn VectorStore>,
        embedder: Arc<dyn Embedder>,
        model: &str,
        top_k: usize,
    ) -> Self {
        Self {
            client: create_client(),
            model: model.to_string(),
            embedder,
            vector_store,
            top_k,
        }
    }

    /// Answer a query against a transcript's chunk collection.
    ///
    /// The query is embedded in the same space the chunks were stored in,
    /// the nearest chunks are retrieved, and the answer is generated from
    /// their concatenated texts. Timestamps and source texts come back in
    /// retrieval-rank order.
    #[instrument(skip(self), fields(collection = %collection))]
    pub async fn answer(&self, collection: &str, query: &str) -> Result<QueryResult> {
        info!("Processing query");

        let query_embedding = self.embedder.embed(query).await?;
        let results = self
            .vector_store
            .search(collection, &query_embedding, self.top_k)
            .await?;

        if results.is_empty() {
            return Ok(QueryResult {
                answer: "I don't know. The transcript contains no indexed content for this question."
                    .to_string(),
                timestamps: Vec::new(),
                source_chunks: Vec::new(),
            });
        }

        let context = format_context(&results);
        let answer = self.generate(&context, query).await?;

        debug!("Generated answer from {} source chunks", results.len());

        Ok(QueryResult {
            answer,
            timestamps: results
                .iter()
                .map(|r| TimestampRange {
                    start: r.document.start_time.clone(),
                    end: r.document.end_time.clone(),
                })
                .collect(),
            source_chunks: results
                .into_iter()
                .map(|r| r.document.content)
                .collect(),
        })
    }

    async fn generate(&self, context: &str, question: &str) -> Result<String> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(RAG_SYSTEM_PROMPT)
                .build()
                .map_err(|e| SitatError::Rag(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(render_rag_prompt(context, question))
                .build()
                .map_err(|e| SitatError::Rag(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(0.0)
            .build()
            .map_err(|e| SitatError::Rag(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| SitatError::OpenAI(format!("Failed to generate response: {}", e)))?;

        response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .cloned()
            .ok_or_else(|| SitatError::Rag("Empty response from LLM".to_string()))
    }
}

/// Format retrieved chunks for the prompt, timestamp ranges included so
/// the model can cite them.
fn format_context(results: &[SearchResult]) -> String {
    results
        .iter()
        .map(|r| {
            format!(
                "[{} - {}] {}",
                r.document.start_time, r.document.end_time, r.document.content
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_store::Document;

    #[test]
    fn test_context_formatting_includes_timestamps() {
        let results = vec![SearchResult {
            document: Document::new(
                "alice_t1".to_string(),
                "Hello world.".to_string(),
                "00:00:00".to_string(),
                "00:00:05".to_string(),
                vec![1.0],
                0,
            ),
            score: 0.9,
        }];

        let context = format_context(&results);
        assert_eq!(context, "[00:00:00 - 00:00:05] Hello world.");
    }
}
