#![forbid(unsafe_code)]

//! Token-based string segmentation.
//!
//! Splits a string into alternating plain-text and matched segments so that
//! rich fragments (highlights, links) can be spliced into translated phrases.
//!
//! - [`Matcher`]: locate tokens (literals, chars, ASCII case-insensitive
//!   literals, delimited runs, and `regex::Regex` with the `regex` feature)
//! - [`segment`]: lazy, restartable iterator of [`TextSegment`]s
//! - [`replace_with`]: build caller-defined nodes for each match

pub mod matcher;
pub mod segment;

pub use matcher::{CaseInsensitive, Delimited, Literal, Matcher};
pub use segment::{Fragment, Segments, TextSegment, replace_with, segment};
