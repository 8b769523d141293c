//! # semdex core
//!
//! Shared, I/O-free logic for semdex: data models, the heading-aware
//! chunker, cosine-similarity ranking, and the answer formatter.
//!
//! This crate contains no tokio, filesystem, or network dependencies.
//! Everything in it is a pure function of its inputs, which is what makes
//! the build pipeline deterministic and the query path testable without
//! an inference engine.

pub mod answer;
pub mod chunker;
pub mod models;
pub mod search;
pub mod similarity;
