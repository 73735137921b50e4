//! Retrieval gate: decides whether a chat query warrants a vector search.
//!
//! A cheap heuristic short-circuit that skips retrieval latency/cost for
//! filler acknowledgments while erring toward retrieval for anything
//! ambiguous.

/// Exact-match filler phrases that never need retrieval.
const FILLERS: [&str; 16] = [
    "ok", "okay", "yes", "no", "continue", "go on", "thanks", "thank you", "great", "cool",
    "nice", "alright", "hmm", "huh", "right", "sure",
];

/// Prefixes that mark a query as explicitly knowledge-seeking.
const KNOWLEDGE_KEYWORDS: [&str; 16] = [
    "what", "why", "how", "when", "where", "explain", "define", "difference", "example",
    "project", "give me", "steps", "concept", "compare", "vs", "summarize",
];

/// Pure decision function: `true` means run a vector search before answering.
///
/// Policy, in priority order: filler phrases and very short non-questions
/// skip retrieval; knowledge-seeking prefixes and trailing question marks
/// force it; everything else defaults to retrieval.
pub fn should_retrieve(query: &str) -> bool {
    let text = query.trim().to_lowercase();
    if text.is_empty() {
        return false;
    }

    if FILLERS.contains(&text.as_str()) {
        return false;
    }

    let word_count = text.split_whitespace().count();
    if word_count <= 2 && !text.contains('?') {
        return false;
    }

    if KNOWLEDGE_KEYWORDS.iter().any(|kw| text.starts_with(kw)) {
        return true;
    }

    if text.ends_with('?') {
        return true;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fillers_skip_retrieval() {
        assert!(!should_retrieve("ok"));
        assert!(!should_retrieve("thanks"));
        assert!(!should_retrieve("  Thank You  "));
        assert!(!should_retrieve("go on"));
    }

    #[test]
    fn short_non_questions_skip_retrieval() {
        assert!(!should_retrieve("hi"));
        assert!(!should_retrieve("hello there"));
        assert!(!should_retrieve(""));
    }

    #[test]
    fn knowledge_keywords_force_retrieval() {
        assert!(should_retrieve("explain transformers"));
        assert!(should_retrieve("what is a vector?"));
        assert!(should_retrieve("difference between TCP and UDP"));
        assert!(should_retrieve("compare mitosis and meiosis"));
    }

    #[test]
    fn question_mark_forces_retrieval() {
        assert!(should_retrieve("photosynthesis?"));
        assert!(should_retrieve("so the membrane is selective?"));
    }

    #[test]
    fn default_is_retrieval() {
        assert!(should_retrieve("tell me about the krebs cycle"));
    }

    #[test]
    fn gate_is_idempotent() {
        for query in ["ok", "what is dna", "hmm", "summarize chapter 3"] {
            let first = should_retrieve(query);
            for _ in 0..5 {
                assert_eq!(should_retrieve(query), first);
            }
        }
    }
}
