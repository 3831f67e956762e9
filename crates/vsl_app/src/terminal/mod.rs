//! Line-oriented terminal front-end: input parsing and view rendering.
pub mod input;
pub mod render;
