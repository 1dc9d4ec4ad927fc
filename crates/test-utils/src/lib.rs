//! Shared test utilities for the Argo profile workspace.
//!
//! This crate provides common testing infrastructure including:
//! - An in-memory profile store with failure injection
//! - Synthetic profile files and profiles
//! - Test data path helpers and a skip macro for optional sample files
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```

pub mod fixtures;
pub mod memory_store;
pub mod paths;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use memory_store::{FailPoint, MeasurementRecord, MemoryStore, MemoryTransaction};
pub use paths::*;

/// Macro to skip a test if the required file is not found.
///
/// Sample NetCDF profiles are not checked in; point `TEST_DATA_DIR` at a
/// directory of Argo files to run the file-backed tests.
///
/// ```ignore
/// use test_utils::require_test_file;
///
/// #[test]
/// fn test_real_profile() {
///     let path = require_test_file!("R5904567_001.nc");
///     // Test code using path...
/// }
/// ```
#[macro_export]
macro_rules! require_test_file {
    ($name:expr) => {{
        match $crate::find_test_file($name) {
            Some(path) => path,
            None => {
                eprintln!(
                    "SKIPPED: Test file '{}' not found. Set TEST_DATA_DIR to run it.",
                    $name
                );
                return;
            }
        }
    }};
}
