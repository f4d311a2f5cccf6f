//! Prompt templates for answer generation.
//!
//! The instruction wording is part of the answering contract: the model is
//! told to use only the supplied context, to admit when it doesn't know,
//! and to cite timestamps. Keep changes here deliberate.

/// System prompt for the answering model.
pub const RAG_SYSTEM_PROMPT: &str =
    "You answer questions about a transcript using only the context provided by the user.";

/// User prompt template. `{context}` and `{question}` are substituted.
pub const RAG_USER_TEMPLATE: &str = "\
Use the following pieces of context to answer the question at the end.
If you don't know the answer, just say that you don't know, don't try to make up an answer.
Include timestamps from the context in your answer where relevant.

{context}

Question: {question}
Answer with timestamps:";

/// Render the user prompt from the retrieved context and the question.
pub fn render_rag_prompt(context: &str, question: &str) -> String {
    RAG_USER_TEMPLATE
        .replace("{context}", context)
        .replace("{question}", question)
}
