//! Figures and tables for random-variate-generator benchmark output.
//!
//! Three passes share one record model: bound-narrowing diagrams from
//! `bounds.ran` / `bounds.cdf`, the `_ext` ratio comparison chart, and the
//! LaTeX rate table.

pub mod cli;
pub mod config;
pub mod error;
pub mod load;
pub mod metrics;
pub mod pipeline;
pub mod render;
pub mod table;

pub use error::{FigureError, Result};
