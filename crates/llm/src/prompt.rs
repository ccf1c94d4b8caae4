//! Prompt assembly for the RAG path (§4.7.1, §6.3): joins the retrieved
//! chunks into a context block and combines it with the question under the
//! template the original used verbatim.

use query_engine_core::ScoredChunk;

/// Builds the `Context:\n...\n\nQuestion:\n...\n\nAnswer:` user-turn prompt
/// from ranked chunks and the question (§4.7.1).
pub fn build_user_prompt(chunks: &[ScoredChunk], question: &str) -> String {
    let context = chunks
        .iter()
        .map(|c| c.chunk.body.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    format!("Context:\n{context}\n\nQuestion:\n{question}\n\nAnswer:")
}

#[cfg(test)]
mod tests {
    use super::*;
    use query_engine_core::{DocumentChunk, ScoreBreakdown};

    fn chunk(body: &str) -> ScoredChunk {
        ScoredChunk {
            chunk: DocumentChunk::new("1", "src", 0, body),
            distance: 0.1,
            exact_match: false,
            score: ScoreBreakdown::new(0.8).finalize(),
        }
    }

    #[test]
    fn joins_chunk_bodies_with_blank_line() {
        let prompt = build_user_prompt(&[chunk("first passage"), chunk("second passage")], "who is the director?");
        assert!(prompt.contains("first passage\n\nsecond passage"));
        assert!(prompt.starts_with("Context:\n"));
        assert!(prompt.ends_with("Question:\nwho is the director?\n\nAnswer:"));
    }

    #[test]
    fn handles_no_retrieved_chunks() {
        let prompt = build_user_prompt(&[], "who is the director?");
        assert!(prompt.starts_with("Context:\n\n\nQuestion:"));
    }
}
