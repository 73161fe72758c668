//! # media-prep
//!
//! Prepares user photos for upload: applies pending geometric edits, plans
//! output dimensions under a bounding box and aspect ratio policy, and
//! re-encodes as JPEG at descending quality until the file fits a byte
//! budget.
//!
//! # Pipeline
//!
//! ```text
//! original ──manipulate──▶ cropped ──compress──▶ compressed ──▶ upload
//!              (geometry,              (quality ladder,
//!               full quality)           geometry fixed)
//! ```
//!
//! Geometry is always re-applied to the untouched original, never to a
//! previous result, so repeated edits do not compound JPEG loss.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Dimension planning, quality ladder, and the file / inline backends |
//! | [`transform`] | Pending edit state and the ordered op list built from it |
//! | [`model`] | [`PendingImage`](model::PendingImage): asset slots, undo snapshot, change events |
//! | [`crop`] | Interactive crop-editor capability |
//! | [`fetch`] | Remote downloads with timeout, `download_and_resize` |
//! | [`config`] | `media-prep.toml` loading and validation |
//! | [`error`] | Crate-level [`PrepError`](error::PrepError) |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Planning Is Pure
//!
//! Every dimension and op decision is made by plain functions over
//! [`Dimensions`](imaging::Dimensions). Backends only execute an op list, so
//! both backends plan identically and the planning code is tested without
//! decoding a single pixel.
//!
//! ## Budgets Are Strict
//!
//! An encode is accepted only when its size is strictly below the budget.
//! Running out of quality steps is an error
//! ([`PrepError::CompressionExhausted`](error::PrepError::CompressionExhausted)),
//! never an oversized success.
//!
//! ## Two Backends, One Enum
//!
//! [`Backend`](imaging::Backend) is chosen once from configuration:
//! `file` writes content-addressed JPEGs to disk, `inline` returns
//! `data:image/jpeg;base64` URIs and measures the decoded payload.

pub mod config;
pub mod crop;
pub mod error;
pub mod fetch;
pub mod imaging;
pub mod model;
pub mod output;
pub mod transform;

#[cfg(test)]
pub(crate) mod test_helpers;
