//! Output generation for the static JSON artifacts.
//!
//! # Output Structure
//!
//! ```text
//! public/data/
//! ├── latest.json          # all records + generation timestamp
//! ├── summary.json         # counts, highlights, blurbs
//! └── resorts/
//!     ├── mt-rose.json     # one record per resort
//!     └── ...
//! ```
//!
//! The per-resort files double as the last-known-good store: the next
//! run reads them back when a fresh fetch fails.

pub mod json;
