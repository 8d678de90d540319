//! Deterministic document chunking.
//!
//! This module provides the [`Chunker`] trait and [`FixedSizeChunker`],
//! a sliding-window splitter with configurable overlap. Chunking is the
//! first purely local step of index construction, so it must be
//! deterministic: identical text and parameters always produce an
//! identical chunk sequence.

/// A strategy for splitting extracted document text into chunks.
///
/// Implementations return chunk texts only; sequence numbers and document
/// ids are attached by the engine.
pub trait Chunker: Send + Sync {
    /// Split text into an ordered sequence of chunk texts.
    ///
    /// Returns an empty `Vec` for empty input.
    fn chunk(&self, text: &str) -> Vec<String>;
}

/// Splits text into fixed-size chunks by character count with overlap.
///
/// The window starts at offset 0 and advances by `chunk_size - chunk_overlap`
/// characters per step; the final chunk is clipped to the end of the text and
/// may be shorter than `chunk_size`. Sizes are measured in characters, not
/// bytes, so multi-byte text never splits inside a code point.
#[derive(Debug, Clone)]
pub struct FixedSizeChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl FixedSizeChunker {
    /// Create a new `FixedSizeChunker`.
    ///
    /// `chunk_overlap` is expected to be less than `chunk_size`; the
    /// engine's configuration enforces this before construction.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self { chunk_size, chunk_overlap }
    }
}

impl Chunker for FixedSizeChunker {
    fn chunk(&self, text: &str) -> Vec<String> {
        if text.is_empty() || self.chunk_size == 0 {
            return Vec::new();
        }

        // Byte offset of every character boundary, plus the end of text.
        let boundaries: Vec<usize> =
            text.char_indices().map(|(offset, _)| offset).chain(std::iter::once(text.len())).collect();
        let total_chars = boundaries.len() - 1;

        let mut chunks = Vec::new();
        let mut start = 0;

        while start < total_chars {
            let end = (start + self.chunk_size).min(total_chars);
            chunks.push(text[boundaries[start]..boundaries[end]].to_string());
            if end == total_chars {
                break;
            }
            let step = self.chunk_size.saturating_sub(self.chunk_overlap);
            if step == 0 {
                break;
            }
            start += step;
        }

        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_boundaries_match_fixture() {
        let chunker = FixedSizeChunker::new(10, 2);
        // starts 0, 8, 16 for size 10 / overlap 2
        let chunks = chunker.chunk("AAAA BBBB CCCC DDDD");
        assert_eq!(chunks, vec!["AAAA BBBB ", "B CCCC DDD", "DDD"]);
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        let chunker = FixedSizeChunker::new(10, 2);
        assert!(chunker.chunk("").is_empty());
    }

    #[test]
    fn text_not_longer_than_window_is_a_single_chunk() {
        let chunker = FixedSizeChunker::new(10, 2);
        assert_eq!(chunker.chunk("short"), vec!["short"]);
        assert_eq!(chunker.chunk("exactly10!"), vec!["exactly10!"]);
    }

    #[test]
    fn multibyte_text_splits_on_character_boundaries() {
        let chunker = FixedSizeChunker::new(4, 1);
        let chunks = chunker.chunk("héllø wörld");
        assert_eq!(chunks[0], "héll");
        let rebuilt: String = chunks
            .iter()
            .enumerate()
            .map(|(i, c)| {
                if i == 0 { c.clone() } else { c.chars().skip(1).collect() }
            })
            .collect();
        assert_eq!(rebuilt, "héllø wörld");
    }
}
