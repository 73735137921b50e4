//! System prompt templates and context assembly.
//!
//! Exact wording is swappable configuration as far as the rest of the core
//! is concerned; these constants capture the grounding rules the assistant
//! relies on.

use crate::types::{ScoredChunk, Turn};
use crate::traits::MaterialSummary;

/// Grounding rules for the chat call. The context block and auxiliary
/// summaries are appended per request.
const CHAT_SYSTEM_TEMPLATE: &str = "\
You are Sarthi, an academic assistant that helps students learn complex material efficiently.

Rules:
- Use only the information in the provided context snippets and summaries.
- If a snippet is not in English, translate it to clear English in your answer.
- Answer in clean, well-structured Markdown: headings, bullet notes, and tables where they help.
- If the context does not contain the requested information, say: \"The provided context does not contain this information.\"
- Never invent facts that are not in the context.";

/// Instruction for the one-shot summarization call.
pub const SUMMARY_SYSTEM_PROMPT: &str = "\
You are an expert academic summarizer. You will receive study material such as a video transcript, PDF content, or text extracted from an image.
Produce a clear, structured, student-friendly Markdown summary with: a high-level overview, a detailed section-by-section summary, bullet-point notes of key facts and definitions, tables where they organize comparisons or terms, and learning takeaways.
If any of the material is not in English, translate it to clear English. Be accurate and complete; avoid filler.";

/// Context block used when retrieval was skipped or disabled.
pub const NO_RETRIEVAL_CONTEXT: &str =
    "No new study material retrieved - rely on conversation history.";

/// Join retrieved chunks into the context block fed to the model.
pub fn context_block(chunks: &[ScoredChunk]) -> String {
    if chunks.is_empty() {
        return NO_RETRIEVAL_CONTEXT.to_string();
    }
    let snippets: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
    format!(
        "Here are the relevant study material snippets:\n{}",
        snippets.join("\n---\n")
    )
}

/// Join stored material summaries into the auxiliary context section.
pub fn summaries_block(summaries: &[MaterialSummary]) -> String {
    summaries
        .iter()
        .map(|s| format!("Title: {}\nSummary: {}", s.title, s.summary))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Assemble the full prompt: system turn (rules + context + summaries),
/// conversation history, then the new user query.
pub fn build_chat_turns(
    query: &str,
    context: &str,
    summaries: &str,
    history: &[Turn],
) -> Vec<Turn> {
    let system = format!(
        "{CHAT_SYSTEM_TEMPLATE}\n\n# Context snippets\n{context}\n\n# Summaries of uploaded materials\n{summaries}",
        summaries = if summaries.is_empty() { "(none)" } else { summaries },
    );

    let mut turns = Vec::with_capacity(history.len() + 2);
    turns.push(Turn::system(system));
    turns.extend(history.iter().cloned());
    turns.push(Turn::user(query));
    turns
}

/// Assemble the two-turn prompt for the summarization call.
pub fn build_summary_turns(material_text: &str) -> Vec<Turn> {
    vec![
        Turn::system(SUMMARY_SYSTEM_PROMPT),
        Turn::user(material_text),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChatRole;

    #[test]
    fn empty_retrieval_states_fallback() {
        assert_eq!(context_block(&[]), NO_RETRIEVAL_CONTEXT);
    }

    #[test]
    fn chat_turns_order_is_system_history_query() {
        let history = vec![Turn::user("earlier question"), Turn::assistant("earlier answer")];
        let turns = build_chat_turns("new question", "ctx", "", &history);
        assert_eq!(turns.len(), 4);
        assert_eq!(turns[0].role, ChatRole::System);
        assert!(turns[0].content.contains("ctx"));
        assert!(turns[0].content.contains("(none)"));
        assert_eq!(turns[1].content, "earlier question");
        assert_eq!(turns[3].role, ChatRole::User);
        assert_eq!(turns[3].content, "new question");
    }

    #[test]
    fn summaries_are_labeled_by_title() {
        let block = summaries_block(&[
            MaterialSummary {
                title: "Cells".into(),
                summary: "About cells.".into(),
            },
            MaterialSummary {
                title: "Mitosis".into(),
                summary: "About mitosis.".into(),
            },
        ]);
        assert!(block.contains("Title: Cells"));
        assert!(block.contains("Title: Mitosis"));
    }
}
