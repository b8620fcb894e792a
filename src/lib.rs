#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

mod bundle;
mod compile;
mod error;
mod minify;
mod output;
mod report;
#[cfg(feature = "server")]
mod server;
mod styles;
mod utils;
#[cfg(feature = "live")]
mod watch;

pub use crate::bundle::{Bundle, BundleConfig, BundleReport};
pub use crate::compile::{
    CompilationResult, CompilationTask, OutputStyle, compile, compile_str,
};
pub use crate::error::{BundleError, CssError, SourceLocation, StyleError};
pub use crate::minify::{Minified, MinificationJob, MinifyLevel, minify, minify_file};
pub use crate::output::BuildOutput;
pub use crate::report::report;
pub use crate::styles::{StyleReport, Styles, StylesConfig};
