//! ggrama command-line entry point
//!
//! Parses arguments, layers the configuration, assembles the prompt, runs the
//! generation pipeline and writes the JSON result.

pub mod cli;
pub mod input;
pub mod logging;
pub mod output;
pub mod run;
