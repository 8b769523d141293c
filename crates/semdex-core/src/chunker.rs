//! Heading-aware markdown chunker.
//!
//! Splits a document's text into [`TextChunk`]s that respect heading
//! boundaries, a maximum size, and an inter-chunk overlap window. Sizes
//! are measured in an approximate token unit (`ceil(chars / 4)`).
//!
//! # Algorithm
//!
//! The document is scanned line by line while tracking the most recent
//! level-1..3 heading and an open line buffer:
//!
//! 1. Fenced code blocks (delimited by lines whose trimmed content starts
//!    with three backticks) are appended to the buffer atomically. No
//!    heading or size processing happens inside a fence, so a block is
//!    never split across chunks.
//! 2. A heading line outside a fence flushes the buffer as a chunk tagged
//!    with the *previous* heading, then starts a new buffer seeded with
//!    the heading line.
//! 3. Any other line is appended; once the buffer's token estimate reaches
//!    `max_chunk_size` it is flushed and the next buffer is seeded with an
//!    overlap window of whole trailing lines worth at most `chunk_overlap`
//!    tokens.
//! 4. End of input flushes whatever remains, including an unterminated
//!    fence.
//!
//! Chunks whose trimmed text is empty are dropped. A single line larger
//! than `max_chunk_size` is emitted as one oversized chunk; lines are
//! never split internally.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{ChunkMetadata, Document, TextChunk};

/// Approximate characters-per-token ratio (4 chars ≈ 1 token).
const CHARS_PER_TOKEN: usize = 4;

static HEADING_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#{1,3}\s+(.+)$").unwrap());

/// Estimate the token count of `text` as `ceil(chars / 4)`.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(CHARS_PER_TOKEN)
}

/// Derive the URL-anchor slug for a heading.
///
/// Lowercase, whitespace runs become single hyphens, everything outside
/// `[a-z0-9_-]` is stripped, hyphen runs collapse, and leading/trailing
/// hyphens are trimmed. This must stay bit-exact with the heading-anchor
/// generator of the site renderer or citation deep-links break.
pub fn heading_slug(heading: &str) -> String {
    static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
    static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9_-]").unwrap());
    static HYPHEN_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"-+").unwrap());

    let slug = heading.to_lowercase();
    let slug = WHITESPACE.replace_all(&slug, "-");
    let slug = NON_WORD.replace_all(&slug, "");
    let slug = HYPHEN_RUN.replace_all(&slug, "-");
    slug.trim_matches('-').to_string()
}

/// Split one document into ordered, overlap-aware chunks.
///
/// `max_chunk_size` and `chunk_overlap` are measured in approximate
/// tokens (see [`estimate_tokens`]).
pub fn chunk_document(
    document: &Document,
    max_chunk_size: usize,
    chunk_overlap: usize,
) -> Vec<TextChunk> {
    let lines: Vec<&str> = document.text.lines().collect();
    let mut chunks: Vec<TextChunk> = Vec::new();
    let mut buffer: Vec<&str> = Vec::new();
    let mut buffer_start: u32 = 1;
    let mut heading: Option<String> = None;
    let mut in_fence = false;

    for (idx, &line) in lines.iter().enumerate() {
        let line_no = idx as u32 + 1;

        if line.trim().starts_with("```") {
            in_fence = !in_fence;
            if buffer.is_empty() {
                buffer_start = line_no;
            }
            buffer.push(line);
            continue;
        }

        if in_fence {
            buffer.push(line);
            continue;
        }

        if let Some(caps) = HEADING_RE.captures(line) {
            if !buffer.is_empty() {
                push_chunk(
                    &mut chunks,
                    document,
                    heading.as_deref(),
                    &buffer,
                    buffer_start,
                    line_no - 1,
                );
            }
            heading = Some(caps[1].trim().to_string());
            buffer.clear();
            buffer.push(line);
            buffer_start = line_no;
            continue;
        }

        if buffer.is_empty() {
            buffer_start = line_no;
        }
        buffer.push(line);

        if estimate_tokens(&buffer.join("\n")) >= max_chunk_size {
            push_chunk(
                &mut chunks,
                document,
                heading.as_deref(),
                &buffer,
                buffer_start,
                line_no,
            );
            let window = overlap_window(&buffer, chunk_overlap);
            buffer_start = line_no + 1 - window.len() as u32;
            buffer = window;
        }
    }

    if !buffer.is_empty() {
        push_chunk(
            &mut chunks,
            document,
            heading.as_deref(),
            &buffer,
            buffer_start,
            lines.len() as u32,
        );
    }

    chunks
}

/// Collect whole trailing lines of `lines` whose combined token estimate
/// stays within `chunk_overlap`. Stops before the line that would cross
/// the threshold; never takes a partial line.
fn overlap_window<'a>(lines: &[&'a str], chunk_overlap: usize) -> Vec<&'a str> {
    if chunk_overlap == 0 {
        return Vec::new();
    }
    let mut window: Vec<&'a str> = Vec::new();
    for &line in lines.iter().rev() {
        let mut candidate: Vec<&str> = vec![line];
        candidate.extend_from_slice(&window);
        if estimate_tokens(&candidate.join("\n")) > chunk_overlap {
            break;
        }
        window.insert(0, line);
    }
    window
}

fn push_chunk(
    chunks: &mut Vec<TextChunk>,
    document: &Document,
    heading: Option<&str>,
    lines: &[&str],
    start_line: u32,
    end_line: u32,
) {
    let text = lines.join("\n");
    if text.trim().is_empty() {
        return;
    }
    let heading_id = heading.map(heading_slug).filter(|slug| !slug.is_empty());
    chunks.push(TextChunk {
        text,
        metadata: ChunkMetadata {
            source_file: document.path.clone(),
            title: document.title.clone(),
            heading: heading.map(str::to_string),
            heading_id,
            url: document.url.clone(),
            start_line: Some(start_line),
            end_line: Some(end_line),
            content_hash: None,
        },
    });
}
