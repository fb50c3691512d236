//! Object-code loading for the `pep8` command-line runner.

use env_logger as _;
#[cfg(test)]
use tempfile as _;

/// Hexadecimal object-code loader.
pub mod loader;
pub use loader::{load_object_file, parse_object_code, LoadError};
