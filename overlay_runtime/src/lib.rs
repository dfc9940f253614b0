//! Shared runtime utilities for the tactical overlay.
//!
//! This crate re-exports the data contracts from `overlay_schema` and holds
//! text helpers that operate on those types without depending on the
//! classification engine in `core_overlay`.

pub use overlay_schema::*;

mod sector_text;

pub use sector_text::{normalize_description, parse_sector_text, render_sector_text, SectorTextMap};
