//! Recursive separator-priority splitter
//!
//! The text is cut at the first separator (in priority order) that occurs in
//! it. Pieces shorter than the chunk size are merged greedily; longer pieces
//! are split again with the remaining separators. Separators stay attached to
//! the start of the piece that follows them, so merged chunks reproduce the
//! source text exactly (apart from trimming).

use super::strategy::SplitterConfig;
use crate::error::ChunkFailure;
use regex::Regex;
use std::collections::VecDeque;

/// Length in characters, the unit all chunk sizes are measured in
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

enum Separator {
    Literal(String),
    Pattern(Regex),
}

impl Separator {
    fn is_empty(&self) -> bool {
        matches!(self, Self::Literal(s) if s.is_empty())
    }

    fn found_in(&self, text: &str) -> bool {
        match self {
            Self::Literal(s) => !s.is_empty() && text.contains(s.as_str()),
            Self::Pattern(re) => re.find_iter(text).any(|m| !m.is_empty()),
        }
    }

    /// Split keeping each separator at the start of the following piece
    fn split<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let starts: Vec<usize> = match self {
            Self::Literal(s) if s.is_empty() => {
                return text
                    .char_indices()
                    .map(|(i, c)| &text[i..i + c.len_utf8()])
                    .collect();
            }
            Self::Literal(s) => text.match_indices(s.as_str()).map(|(i, _)| i).collect(),
            Self::Pattern(re) => re
                .find_iter(text)
                .filter(|m| !m.is_empty())
                .map(|m| m.start())
                .collect(),
        };

        let mut pieces = Vec::with_capacity(starts.len() + 1);
        let mut last = 0;
        for start in starts {
            if start > last {
                pieces.push(&text[last..start]);
            }
            last = start;
        }
        if last < text.len() {
            pieces.push(&text[last..]);
        }
        pieces
    }
}

/// Splitter compiled from a [`SplitterConfig`]
pub struct RecursiveSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<Separator>,
}

impl RecursiveSplitter {
    pub fn new(config: &SplitterConfig) -> Result<Self, ChunkFailure> {
        config.validate()?;

        let separators = config
            .separators
            .iter()
            .map(|s| {
                if config.separator_regex && !s.is_empty() {
                    Regex::new(s).map(Separator::Pattern).map_err(|e| {
                        ChunkFailure::InvalidStrategy(format!("bad separator {:?}: {}", s, e))
                    })
                } else {
                    Ok(Separator::Literal(s.clone()))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            chunk_size: config.chunk_size,
            chunk_overlap: config.chunk_overlap,
            separators,
        })
    }

    /// Split text into trimmed, non-empty chunks in document order
    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_with(text, &self.separators)
            .into_iter()
            .filter_map(|chunk| {
                let trimmed = chunk.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            })
            .collect()
    }

    fn split_with(&self, text: &str, separators: &[Separator]) -> Vec<String> {
        let Some(last) = separators.len().checked_sub(1) else {
            return vec![text.to_string()];
        };

        // First separator present in the text; "" always matches. When none
        // is present the last one is used and recursion stops.
        let (separator, rest) = separators
            .iter()
            .enumerate()
            .find(|(_, sep)| sep.is_empty() || sep.found_in(text))
            .map(|(i, sep)| {
                let rest = if sep.is_empty() { &[][..] } else { &separators[i + 1..] };
                (sep, rest)
            })
            .unwrap_or((&separators[last], &[][..]));

        let mut chunks = Vec::new();
        let mut fitting: Vec<&str> = Vec::new();

        for piece in separator.split(text) {
            if char_len(piece) < self.chunk_size {
                fitting.push(piece);
                continue;
            }
            if !fitting.is_empty() {
                chunks.extend(self.merge(&fitting));
                fitting.clear();
            }
            if rest.is_empty() {
                chunks.push(piece.to_string());
            } else {
                chunks.extend(self.split_with(piece, rest));
            }
        }

        if !fitting.is_empty() {
            chunks.extend(self.merge(&fitting));
        }
        chunks
    }

    /// Greedily merge pieces up to the chunk size, carrying overlap forward
    fn merge(&self, pieces: &[&str]) -> Vec<String> {
        let mut docs = Vec::new();
        let mut window: VecDeque<(&str, usize)> = VecDeque::new();
        let mut total = 0usize;

        for piece in pieces {
            let len = char_len(piece);

            if total + len > self.chunk_size && !window.is_empty() {
                push_joined(&mut docs, &window);
                while total > self.chunk_overlap || (total + len > self.chunk_size && total > 0) {
                    match window.pop_front() {
                        Some((_, front_len)) => total -= front_len,
                        None => break,
                    }
                }
            }

            window.push_back((piece, len));
            total += len;
        }

        push_joined(&mut docs, &window);
        docs
    }
}

fn push_joined(docs: &mut Vec<String>, window: &VecDeque<(&str, usize)>) {
    let joined: String = window.iter().map(|(piece, _)| *piece).collect();
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        docs.push(trimmed.to_string());
    }
}
