//! Text chunking with configurable size and overlap.
//!
//! Splitting is delegated to the `text-splitter` crate, which prefers
//! paragraph, then sentence, then word boundaries and only cuts inside a word
//! when nothing else fits. Chunks are left untrimmed, so every chunk is an
//! exact slice of the input and removing the overlap between consecutive
//! chunks gives back the original text.

use crate::types::TextChunk;
use docqa_core::{AppError, AppResult};
use text_splitter::{Characters, ChunkConfig, TextSplitter};

/// Splits text into overlapping, size-bounded chunks.
pub struct Chunker {
    splitter: TextSplitter<Characters>,
    chunk_size: usize,
    chunk_overlap: usize,
}

impl Chunker {
    /// Build a chunker. Requires `chunk_size > chunk_overlap` and `chunk_size > 0`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> AppResult<Self> {
        if chunk_size == 0 {
            return Err(AppError::Config(
                "chunk size must be greater than zero".to_string(),
            ));
        }

        if chunk_overlap >= chunk_size {
            return Err(AppError::Config(format!(
                "chunk overlap ({}) must be smaller than chunk size ({})",
                chunk_overlap, chunk_size
            )));
        }

        let config = ChunkConfig::new(chunk_size)
            .with_overlap(chunk_overlap)
            .map_err(|e| AppError::Config(format!("Invalid chunk configuration: {}", e)))?
            .with_trim(false);

        Ok(Self {
            splitter: TextSplitter::new(config),
            chunk_size,
            chunk_overlap,
        })
    }

    /// Split `text` into ordered chunks. Empty input yields no chunks.
    pub fn split(&self, text: &str) -> Vec<TextChunk> {
        if text.is_empty() {
            return Vec::new();
        }

        let chunks: Vec<TextChunk> = self
            .splitter
            .chunk_indices(text)
            .enumerate()
            .map(|(position, (offset, chunk))| TextChunk {
                text: chunk.to_string(),
                position,
                offset,
            })
            .collect();

        tracing::debug!(
            "Chunked {} bytes into {} chunks (size: {}, overlap: {})",
            text.len(),
            chunks.len(),
            self.chunk_size,
            self.chunk_overlap
        );

        chunks
    }
}

/// Split text in one call.
pub fn split(text: &str, chunk_size: usize, chunk_overlap: usize) -> AppResult<Vec<TextChunk>> {
    Ok(Chunker::new(chunk_size, chunk_overlap)?.split(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_document() -> String {
        let paragraphs = [
            "Apples are red and grow on trees in orchards. Farmers pick them in autumn.",
            "Cars are fast machines with four wheels. They need fuel or electricity to run.",
            "The river flows through the valley toward the sea. Fish swim against the current.",
            "Libraries keep books on shelves sorted by subject. Readers borrow them for weeks.",
        ];
        paragraphs.repeat(6).join("\n\n")
    }

    /// Drop the overlapping prefix of every chunk and concatenate the rest.
    fn reassemble(chunks: &[TextChunk]) -> String {
        let mut output = String::new();
        let mut covered = 0;

        for chunk in chunks {
            assert!(
                chunk.offset <= covered || covered == 0,
                "gap before chunk {}",
                chunk.position
            );
            if chunk.end() > covered {
                let skip = covered.saturating_sub(chunk.offset);
                output.push_str(&chunk.text[skip..]);
                covered = chunk.end();
            }
        }

        output
    }

    #[test]
    fn test_empty_input() {
        let chunks = split("", 100, 10).unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_short_input_is_single_chunk() {
        let text = "Apples are red.";
        let chunks = split(text, 100, 10).unwrap();

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, text);
        assert_eq!(chunks[0].offset, 0);
        assert_eq!(chunks[0].position, 0);
    }

    #[test]
    fn test_input_of_exactly_chunk_size() {
        let text = "a".repeat(50);
        let chunks = split(&text, 50, 5).unwrap();

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, text);
    }

    #[test]
    fn test_chunks_respect_size_limit() {
        let text = sample_document();
        let chunks = split(&text, 120, 20).unwrap();

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(
                chunk.text.chars().count() <= 120,
                "chunk {} has {} chars",
                chunk.position,
                chunk.text.chars().count()
            );
        }
    }

    #[test]
    fn test_chunks_are_exact_slices() {
        let text = sample_document();
        let chunks = split(&text, 120, 20).unwrap();

        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.position, i);
            assert_eq!(&text[chunk.offset..chunk.end()], chunk.text);
        }
    }

    #[test]
    fn test_offsets_strictly_increase() {
        let text = sample_document();
        let chunks = split(&text, 120, 20).unwrap();

        for pair in chunks.windows(2) {
            assert!(pair[1].offset > pair[0].offset);
            assert!(pair[1].end() > pair[0].end());
        }
    }

    #[test]
    fn test_overlap_removal_reconstructs_input() {
        let text = sample_document();

        for (size, overlap) in [(120, 20), (200, 0), (64, 30)] {
            let chunks = split(&text, size, overlap).unwrap();
            assert_eq!(reassemble(&chunks), text, "size {} overlap {}", size, overlap);
        }
    }

    #[test]
    fn test_consecutive_chunks_share_text() {
        let text = sample_document();
        let chunks = split(&text, 100, 30).unwrap();

        assert!(chunks.windows(2).any(|pair| pair[1].offset < pair[0].end()));
    }

    #[test]
    fn test_long_word_is_hard_cut() {
        let text = "x".repeat(250);
        let chunks = split(&text, 100, 0).unwrap();

        assert_eq!(chunks.len(), 3);
        assert_eq!(reassemble(&chunks), text);
    }

    #[test]
    fn test_utf8_input() {
        let text = "Gamedex é um aplicativo 🎮 com acentuação: ã, õ, ç. ".repeat(20);
        let chunks = split(&text, 80, 10).unwrap();

        assert!(!chunks.is_empty());
        for chunk in &chunks {
            assert!(chunk.text.chars().count() <= 80);
        }
        assert_eq!(reassemble(&chunks), text);
    }

    #[test]
    fn test_deterministic() {
        let text = sample_document();
        let first = split(&text, 150, 25).unwrap();
        let second = split(&text, 150, 25).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(matches!(split("text", 0, 0), Err(AppError::Config(_))));
        assert!(matches!(split("text", 10, 10), Err(AppError::Config(_))));
        assert!(matches!(split("text", 10, 20), Err(AppError::Config(_))));
    }
}
