//! Paragraph-aware text chunking with overlap.
//!
//! [`ParagraphChunker`] splits normalized document text into overlapping
//! segments suitable for embedding. Paragraph boundaries are preferred
//! split points; a trailing overlap from each flushed chunk seeds the next
//! one so context survives the split. Oversized paragraphs are sliced by
//! raw character count.

use std::sync::LazyLock;

use regex::Regex;

/// Blank-line paragraph separator (one or more empty/whitespace lines).
static PARAGRAPH_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").expect("paragraph break regex is valid"));

/// Splits text into overlapping chunks, preferring paragraph boundaries.
///
/// Lengths are measured in characters (not bytes); all slicing is
/// char-boundary-safe. Chunking is deterministic: the same input and
/// parameters always yield the same chunk sequence.
///
/// # Example
///
/// ```rust,ignore
/// use docrag::ParagraphChunker;
///
/// let chunker = ParagraphChunker::new(1200, 200);
/// let chunks = chunker.chunk(&text);
/// ```
#[derive(Debug, Clone)]
pub struct ParagraphChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl ParagraphChunker {
    /// Create a new `ParagraphChunker`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size` — target chunk size in characters
    /// * `chunk_overlap` — characters carried from the tail of one chunk
    ///   into the start of the next (must be less than `chunk_size`)
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self { chunk_size, chunk_overlap }
    }

    /// Split `text` into trimmed, non-empty chunks.
    ///
    /// Returns an empty `Vec` for empty or whitespace-only input; the
    /// caller treats zero chunks as "no extractable text".
    pub fn chunk(&self, text: &str) -> Vec<String> {
        let normalized = normalize(text);
        let mut chunks: Vec<String> = Vec::new();
        let mut current = String::new();

        for paragraph in PARAGRAPH_BREAK.split(&normalized) {
            let joined_len = if current.is_empty() {
                char_len(paragraph)
            } else {
                char_len(&current) + 2 + char_len(paragraph)
            };

            if joined_len <= self.chunk_size {
                if !current.is_empty() {
                    current.push_str("\n\n");
                }
                current.push_str(paragraph);
                continue;
            }

            // Flush the full buffer and seed the next one with its tail.
            let overlap = tail_chars(&current, self.chunk_overlap).to_string();
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            current = if overlap.is_empty() {
                paragraph.to_string()
            } else {
                format!("{overlap}\n\n{paragraph}")
            };

            // A single oversized paragraph: slice by raw character count,
            // resuming each time from chunk_size - chunk_overlap.
            let step = self.chunk_size.saturating_sub(self.chunk_overlap);
            while char_len(&current) > self.chunk_size {
                if step == 0 {
                    break;
                }
                chunks.push(head_chars(&current, self.chunk_size).to_string());
                current = skip_chars(&current, step).to_string();
            }
        }

        if !current.is_empty() {
            chunks.push(current);
        }

        chunks
            .into_iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect()
    }
}

/// Normalize line endings to `\n` and tabs to spaces.
fn normalize(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n").replace('\t', " ")
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Byte offset of the `n`-th character, or `s.len()` past the end.
fn char_boundary(s: &str, n: usize) -> usize {
    s.char_indices().nth(n).map_or(s.len(), |(i, _)| i)
}

/// The first `n` characters of `s`.
fn head_chars(s: &str, n: usize) -> &str {
    &s[..char_boundary(s, n)]
}

/// Everything after the first `n` characters of `s`.
fn skip_chars(s: &str, n: usize) -> &str {
    &s[char_boundary(s, n)..]
}

/// The last `n` characters of `s` (all of `s` if it is shorter).
fn tail_chars(s: &str, n: usize) -> &str {
    let len = char_len(s);
    if len <= n { s } else { skip_chars(s, len - n) }
}
