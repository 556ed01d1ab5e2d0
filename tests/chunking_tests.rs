//! Property tests for the paragraph chunker.

use proptest::prelude::*;

use docrag::chunking::ParagraphChunker;

/// Strip all whitespace, keeping remaining characters in order.
fn squash(s: &str) -> Vec<char> {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

/// True if `needle` is a subsequence of `haystack`.
fn is_subsequence(needle: &[char], haystack: &[char]) -> bool {
    let mut it = haystack.iter();
    needle.iter().all(|c| it.any(|h| h == c))
}

/// Text made of word-ish paragraphs with occasional blank lines.
fn arb_text() -> impl Strategy<Value = String> {
    "[a-z ]{0,120}(\n\n[a-z ]{0,120}){0,6}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Every non-whitespace character of the input survives chunking, in
    /// order. Overlap duplicates characters but never drops them.
    #[test]
    fn no_characters_are_dropped(
        text in arb_text(),
        chunk_size in 10usize..120,
        chunk_overlap in 0usize..10,
    ) {
        let chunker = ParagraphChunker::new(chunk_size, chunk_overlap);
        let chunks = chunker.chunk(&text);

        let input = squash(&text);
        let output = squash(&chunks.concat());
        prop_assert!(
            is_subsequence(&input, &output),
            "input characters lost: {} input vs {} output chars",
            input.len(),
            output.len(),
        );
    }

    /// No trimmed chunk exceeds the target size.
    #[test]
    fn chunks_respect_the_size_bound(
        text in arb_text(),
        chunk_size in 10usize..120,
        chunk_overlap in 0usize..10,
    ) {
        let chunker = ParagraphChunker::new(chunk_size, chunk_overlap);
        for chunk in chunker.chunk(&text) {
            prop_assert!(chunk.chars().count() <= chunk_size);
        }
    }

    /// Chunking the same input twice yields the same sequence.
    #[test]
    fn chunking_is_deterministic(
        text in arb_text(),
        chunk_size in 10usize..120,
        chunk_overlap in 0usize..10,
    ) {
        let chunker = ParagraphChunker::new(chunk_size, chunk_overlap);
        prop_assert_eq!(chunker.chunk(&text), chunker.chunk(&text));
    }

    /// Chunks are trimmed and non-empty.
    #[test]
    fn chunks_are_trimmed_and_non_empty(
        text in arb_text(),
        chunk_size in 10usize..120,
        chunk_overlap in 0usize..10,
    ) {
        let chunker = ParagraphChunker::new(chunk_size, chunk_overlap);
        for chunk in chunker.chunk(&text) {
            prop_assert!(!chunk.is_empty());
            prop_assert_eq!(chunk.trim(), &chunk);
        }
    }
}

/// Consecutive slice-path chunks share exactly the configured overlap.
#[test]
fn sliced_chunks_share_the_overlap_region() {
    let chunker = ParagraphChunker::new(100, 20);
    let text: String = ('a'..='z').cycle().take(450).collect();
    let chunks = chunker.chunk(&text);

    assert!(chunks.len() >= 2);
    for window in chunks.windows(2) {
        let tail: String = {
            let rev: String = window[0].chars().rev().take(20).collect();
            rev.chars().rev().collect()
        };
        assert!(
            window[1].starts_with(&tail),
            "expected {:?} to start with {tail:?}",
            &window[1][..40.min(window[1].len())],
        );
    }
}
