use crate::domain::errors::{DomainError, Result};

/// Splits document text into overlapping chunks for embedding.
///
/// Consumes up to `chunk_size` characters at a time, breaking at the latest
/// natural boundary inside the window (paragraph, then sentence, then word,
/// then a hard cut). Each subsequent chunk starts exactly `chunk_overlap`
/// characters before the previous chunk's end, so no semantic unit is fully
/// orphaned across a split.
#[derive(Debug, Clone)]
pub struct TextChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextChunker {
    /// Fails if `chunk_overlap >= chunk_size` or `chunk_size` is zero.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(DomainError::configuration("chunk_size must be positive"));
        }
        if chunk_overlap >= chunk_size {
            return Err(DomainError::configuration(format!(
                "chunk_overlap ({chunk_overlap}) must be smaller than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    /// Split `text` into ordered, overlapping chunks.
    ///
    /// Empty input yields no chunks; input of at most `chunk_size` characters
    /// yields a single chunk equal to the input. Every chunk is a contiguous
    /// substring of the input.
    pub fn split(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        if chars.is_empty() {
            return Vec::new();
        }
        if chars.len() <= self.chunk_size {
            return vec![text.to_string()];
        }

        let mut chunks = Vec::new();
        let mut start = 0;
        loop {
            let window_end = (start + self.chunk_size).min(chars.len());
            let end = if window_end == chars.len() {
                window_end
            } else {
                self.break_point(&chars, start, window_end)
            };

            chunks.push(chars[start..end].iter().collect());

            if end == chars.len() {
                break;
            }
            // break_point guarantees end > start + chunk_overlap, so the
            // rewound start always moves forward.
            start = end - self.chunk_overlap;
        }
        chunks
    }

    /// Pick where the current chunk ends, scanning backwards from the window
    /// limit. Boundaries closer to `start` than the overlap rewind are
    /// rejected so the splitter cannot stall.
    fn break_point(&self, chars: &[char], start: usize, window_end: usize) -> usize {
        let min_end = start + self.chunk_overlap + 1;

        // Paragraph break: cut just after a blank line.
        let mut i = window_end;
        while i >= min_end {
            if i >= 2 && chars[i - 1] == '\n' && chars[i - 2] == '\n' {
                return i;
            }
            i -= 1;
        }

        // Sentence break: punctuation followed by whitespace.
        let mut i = window_end;
        while i >= min_end {
            if matches!(chars[i - 1], '.' | '!' | '?') && chars[i].is_whitespace() {
                return i;
            }
            i -= 1;
        }

        // Word break.
        let mut i = window_end;
        while i >= min_end {
            if chars[i - 1].is_whitespace() {
                return i;
            }
            i -= 1;
        }

        window_end
    }
}
