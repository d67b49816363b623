//! The document-to-structured-record pipeline stages.
//!
//! Each stage is a small module with one public operation, kept pure where
//! possible so the interesting logic (grid rendering, splicing, prompt
//! assembly, fence stripping) is unit-testable without any remote service:
//!
//! - [`tables`]    — render detected tables into deterministic text
//! - [`figures`]   — fetch/upload figure images, map captions to URLs
//! - [`linearize`] — flatten pages with tables and image URLs spliced in
//! - [`prompt`]    — wrap the text into a bounded few-shot message sequence
//! - [`parse`]     — strict JSON parse of the (possibly fenced) completion
//!
//! Orchestration across stages lives in [`crate::extract`].

pub mod figures;
pub mod linearize;
pub mod parse;
pub mod prompt;
pub mod tables;
