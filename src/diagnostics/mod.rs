//! Rendering of analysis reports
//!
//! Reports can be printed as human-readable text, as one line per finding, or
//! as JSON.

#![warn(missing_docs)]

pub mod formatter;

pub use formatter::{Format, ReportFormatter};
