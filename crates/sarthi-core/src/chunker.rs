//! Recursive boundary-aware text chunker.
//!
//! Splits extracted text into bounded, overlapping segments for embedding.
//! Prefers breaking at paragraph, then line, then sentence, then word
//! boundaries before falling back to hard character splits. Deterministic
//! for identical input.

use crate::config::ChunkerConfig;

/// Separator cascade tried in order; a hard character split is the final
/// fallback when a fragment has no usable boundary.
const SEPARATORS: [&str; 4] = ["\n\n", "\n", ". ", " "];

/// Boundary-aware splitter with a fixed maximum chunk size and fixed overlap
/// between consecutive chunks.
#[derive(Debug, Clone)]
pub struct RecursiveTextChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl RecursiveTextChunker {
    pub fn new(config: &ChunkerConfig) -> Self {
        // Overlap must leave room for fresh content in every chunk.
        let chunk_overlap = config.chunk_overlap.min(config.chunk_size / 2);
        Self {
            chunk_size: config.chunk_size.max(1),
            chunk_overlap,
        }
    }

    /// Split `text` into ordered chunks. Every chunk is at most
    /// `chunk_size` characters unless a single unbreakable token exceeds the
    /// bound, in which case it is hard-split anyway.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        let text = text.trim();
        if text.is_empty() {
            return Vec::new();
        }
        self.split_recursive(text, &SEPARATORS)
            .into_iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect()
    }

    fn split_recursive(&self, text: &str, separators: &[&str]) -> Vec<String> {
        if char_len(text) <= self.chunk_size {
            return vec![text.to_string()];
        }

        let Some((sep, rest)) = separators.split_first() else {
            return self.hard_split(text);
        };

        if !text.contains(sep) {
            return self.split_recursive(text, rest);
        }

        // Split on this separator, re-attaching it to the preceding piece so
        // the merged output reproduces the source text.
        let mut pieces = Vec::new();
        let mut remainder = text;
        while let Some(pos) = remainder.find(sep) {
            let end = pos + sep.len();
            pieces.push(&remainder[..end]);
            remainder = &remainder[end..];
        }
        if !remainder.is_empty() {
            pieces.push(remainder);
        }

        // Pieces still too large descend to finer separators.
        let mut atoms = Vec::new();
        for piece in pieces {
            if char_len(piece) > self.chunk_size {
                atoms.extend(self.split_recursive(piece, rest));
            } else {
                atoms.push(piece.to_string());
            }
        }

        self.merge(atoms)
    }

    /// Greedily pack atoms into chunks, carrying `chunk_overlap` characters
    /// of trailing atoms into the next chunk.
    fn merge(&self, atoms: Vec<String>) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut window: Vec<String> = Vec::new();
        let mut window_len = 0usize;

        for atom in atoms {
            let atom_len = char_len(&atom);
            if window_len + atom_len > self.chunk_size && !window.is_empty() {
                chunks.push(window.concat());
                // Retain a tail of atoms as the overlap prefix.
                while window_len > self.chunk_overlap
                    || (window_len + atom_len > self.chunk_size && !window.is_empty())
                {
                    let removed = window.remove(0);
                    window_len -= char_len(&removed);
                    if window.is_empty() {
                        break;
                    }
                }
            }
            window_len += atom_len;
            window.push(atom);
        }

        if !window.is_empty() {
            chunks.push(window.concat());
        }
        chunks
    }

    /// Character-window fallback for text with no usable boundary.
    fn hard_split(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        let step = self.chunk_size - self.chunk_overlap;
        let mut chunks = Vec::new();
        let mut start = 0;
        while start < chars.len() {
            let end = (start + self.chunk_size).min(chars.len());
            chunks.push(chars[start..end].iter().collect());
            if end == chars.len() {
                break;
            }
            start += step;
        }
        chunks
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}
