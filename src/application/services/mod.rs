//! Application services
//!
//! Expansion builds the membership tree, rendering turns it into lines.

pub mod expander;
pub mod renderer;

pub use expander::{ExpandOptions, GraphExpander};
pub use renderer::{GlyphSet, RenderedLine, StyleHint, TreeRenderer};
