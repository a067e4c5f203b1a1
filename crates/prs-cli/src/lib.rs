//! Library components of the `prs` command line.

pub mod logging;
pub mod pipeline;
pub mod settings;
