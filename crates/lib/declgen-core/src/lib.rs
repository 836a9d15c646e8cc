//! Core parsers and formatting for declgen.
//!
//! This crate turns Lua enum listings and Doxygen HTML reference pages into
//! `declare` blocks, and exposes control-plane helpers that load sources from
//! disk and write the rendered declarations back out.

pub mod control;
pub mod format;
pub mod markup;
pub mod normalize;
pub mod parsers;
