//! Build progress reporting.
//!
//! Reports observable progress during `semdex build` so users see how
//! much of the corpus was reused from cache and how embedding is
//! advancing. Progress is emitted on **stderr** so stdout remains
//! parseable for scripts.

use std::io::Write;

/// A single progress event for a build.
#[derive(Clone, Debug)]
pub enum ProgressEvent {
    /// Corpus scan finished.
    Scanned { documents: u64 },
    /// Cache classification outcome for the corpus.
    Classified { unchanged: u64, changed: u64 },
    /// Embedding progress, reported after each completed batch.
    Embedding { done: u64, total: u64 },
}

/// Reports build progress. Implementations write to stderr (human or JSON).
pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// Human-friendly progress on stderr: "build  embedding  12 / 480 chunks".
pub struct StderrProgress;

impl ProgressReporter for StderrProgress {
    fn report(&self, event: ProgressEvent) {
        let line = match &event {
            ProgressEvent::Scanned { documents } => {
                format!("build  scanned  {} documents\n", format_number(*documents))
            }
            ProgressEvent::Classified { unchanged, changed } => format!(
                "build  cache  {} unchanged, {} to re-embed\n",
                format_number(*unchanged),
                format_number(*changed)
            ),
            ProgressEvent::Embedding { done, total } => format!(
                "build  embedding  {} / {} chunks\n",
                format_number(*done),
                format_number(*total)
            ),
        };
        let _ = std::io::stderr().lock().write_all(line.as_bytes());
        let _ = std::io::stderr().lock().flush();
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl ProgressReporter for JsonProgress {
    fn report(&self, event: ProgressEvent) {
        let obj = match &event {
            ProgressEvent::Scanned { documents } => serde_json::json!({
                "event": "progress",
                "phase": "scanned",
                "documents": documents
            }),
            ProgressEvent::Classified { unchanged, changed } => serde_json::json!({
                "event": "progress",
                "phase": "classified",
                "unchanged": unchanged,
                "changed": changed
            }),
            ProgressEvent::Embedding { done, total } => serde_json::json!({
                "event": "progress",
                "phase": "embedding",
                "done": done,
                "total": total
            }),
        };
        if let Ok(line) = serde_json::to_string(&obj) {
            let _ = writeln!(std::io::stderr().lock(), "{}", line);
            let _ = std::io::stderr().lock().flush();
        }
    }
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&self, _event: ProgressEvent) {}
}

fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + (s.len() - 1) / 3);
    let chars: Vec<char> = s.chars().rev().collect();
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(*c);
    }
    result.chars().rev().collect()
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Default: human progress when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    /// Build a reporter for this mode.
    pub fn reporter(&self) -> Box<dyn ProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}
