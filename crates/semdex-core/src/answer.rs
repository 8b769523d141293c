//! Deterministic answer formatting for retrieval results.
//!
//! Turns a ranked result list into a citation-bearing markdown answer
//! without any generative model: the system only reformats retrieved
//! excerpts, it never synthesizes prose. The framing prefix varies with a
//! cheap query-intent classification that is purely cosmetic and never
//! affects ranking.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::search::SearchResult;

/// Number of results rendered in the answer body.
const MAX_SHOWN: usize = 3;
/// Score above which a result is annotated as highly relevant.
const HIGH_RELEVANCE: f32 = 0.7;
/// Previews longer than this get smart truncation.
const PREVIEW_CHARS: usize = 400;
/// Prose kept on each side of a preserved code block.
const PROSE_CONTEXT_CHARS: usize = 150;

/// A formatted answer plus its deduplicated source citations.
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub answer: String,
    pub sources: Vec<Source>,
}

/// One cited source page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Source {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum QueryIntent {
    Instructional,
    Explanatory,
    Rationale,
    Single,
    General,
}

fn classify_intent(query: &str, result_count: usize) -> QueryIntent {
    static HOW: Lazy<Regex> = Lazy::new(|| Regex::new(r"^how\s+(to|do|can)\b").unwrap());
    static WHAT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^what\s+(is|are)\b").unwrap());
    static WHY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^why\b").unwrap());

    let q = query.trim().to_lowercase();
    if HOW.is_match(&q) {
        QueryIntent::Instructional
    } else if WHAT.is_match(&q) {
        QueryIntent::Explanatory
    } else if WHY.is_match(&q) {
        QueryIntent::Rationale
    } else if result_count == 1 {
        QueryIntent::Single
    } else {
        QueryIntent::General
    }
}

/// Format ranked results into an answer with citations.
///
/// Pure function of its inputs. An empty result list produces a fixed
/// "nothing found" answer; this is a normal outcome, not an error.
pub fn format_answer(query: &str, results: &[SearchResult]) -> Answer {
    if results.is_empty() {
        return Answer {
            answer: "I couldn't find anything in the documentation matching your question. \
                     Try rephrasing it or using different keywords."
                .to_string(),
            sources: Vec::new(),
        };
    }

    let mut answer = String::new();
    match classify_intent(query, results.len()) {
        QueryIntent::Instructional => {
            answer.push_str("Here's how to do that, according to the documentation:\n\n")
        }
        QueryIntent::Explanatory => answer.push_str("Here's what the documentation says:\n\n"),
        QueryIntent::Rationale => {
            answer.push_str("Here's the reasoning given in the documentation:\n\n")
        }
        QueryIntent::Single => answer.push_str("I found one relevant section:\n\n"),
        QueryIntent::General => answer.push_str(&format!(
            "I found {} relevant sections in the documentation:\n\n",
            results.len()
        )),
    }

    for result in results.iter().take(MAX_SHOWN) {
        let meta = &result.chunk.metadata;
        let heading = meta.heading.as_deref().unwrap_or(&meta.title);
        answer.push_str(&format!("### {heading}"));
        if result.score > HIGH_RELEVANCE {
            answer.push_str(" *(highly relevant)*");
        }
        answer.push_str("\n\n");
        answer.push_str(&preview(&result.chunk.text));
        answer.push_str("\n\n");
        let link = match &meta.heading_id {
            Some(id) => format!("{}#{}", meta.url, id),
            None => meta.url.clone(),
        };
        answer.push_str(&format!("[Read more]({link})\n\n"));
    }

    if results.len() > MAX_SHOWN {
        answer.push_str(&format!(
            "*{} more related sections matched this query.*\n",
            results.len() - MAX_SHOWN
        ));
    }

    Answer {
        answer,
        sources: collect_sources(results),
    }
}

/// Deduplicate sources by URL, first occurrence wins, order preserved.
fn collect_sources(results: &[SearchResult]) -> Vec<Source> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut sources = Vec::new();
    for result in results {
        let meta = &result.chunk.metadata;
        if !seen.insert(meta.url.as_str()) {
            continue;
        }
        let title = match &meta.heading {
            Some(heading) => format!("{} → {}", meta.title, heading),
            None => meta.title.clone(),
        };
        sources.push(Source {
            title,
            url: meta.url.clone(),
        });
    }
    sources
}

/// Build a bounded preview of chunk text.
///
/// Short text passes through verbatim. Longer text keeps its first fenced
/// code block intact with a little prose context on each side; text
/// without a complete fence is hard-truncated.
fn preview(text: &str) -> String {
    if text.chars().count() <= PREVIEW_CHARS {
        return text.to_string();
    }

    if let Some((start, end)) = first_code_block(text) {
        let before = text[..start].trim();
        let block = text[start..end].trim_end();
        let after = text[end..].trim();

        let mut out = String::new();
        if !before.is_empty() {
            out.push_str(&tail_chars(before, PROSE_CONTEXT_CHARS));
            out.push_str("\n\n");
        }
        out.push_str(block);
        if !after.is_empty() {
            out.push_str("\n\n");
            out.push_str(&head_chars(after, PROSE_CONTEXT_CHARS));
        }
        return out;
    }

    let truncated: String = text.chars().take(PREVIEW_CHARS).collect();
    format!("{}…", truncated.trim_end())
}

/// Byte range of the first complete fenced code block, fences included.
fn first_code_block(text: &str) -> Option<(usize, usize)> {
    let mut open: Option<usize> = None;
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        if line.trim().starts_with("```") {
            match open {
                None => open = Some(offset),
                Some(start) => return Some((start, offset + line.len())),
            }
        }
        offset += line.len();
    }
    None
}

fn head_chars(s: &str, n: usize) -> String {
    if s.chars().count() <= n {
        return s.to_string();
    }
    let kept: String = s.chars().take(n).collect();
    format!("{}…", kept.trim_end())
}

fn tail_chars(s: &str, n: usize) -> String {
    let total = s.chars().count();
    if total <= n {
        return s.to_string();
    }
    let kept: String = s.chars().skip(total - n).collect();
    format!("…{}", kept.trim_start())
}
