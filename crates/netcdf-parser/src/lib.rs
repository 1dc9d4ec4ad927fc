//! NetCDF parser for Argo float profile files.
//!
//! Reading is split in two: [`native`] turns a NetCDF file into an
//! in-memory [`ProfileFile`] catalog, and the remaining modules normalize
//! that catalog into a [`Profile`](argo_common::Profile):
//!
//! - [`resolver`]: find logical variables by alias or `standard_name`
//! - [`sanitize`]: fill/missing values and non-finite readings become absent
//! - [`time`]: Julian-day and "units since" time encodings
//! - [`channels`]: auxiliary per-level channels, excluding QC/error fields
//! - [`assemble`]: per-level measurement records plus profile metadata
//!
//! Everything after the file open is pure and synchronous.

pub mod assemble;
pub mod catalog;
pub mod channels;
pub mod error;
pub mod native;
pub mod resolver;
pub mod sanitize;
pub mod time;

pub use assemble::{assemble_profile, coerce_platform_id};
pub use catalog::{AttrValue, ProfileFile, VarData, Variable};
pub use error::{NetCdfError, NetCdfResult};
pub use native::{open_profile_file, silence_hdf5_errors};
pub use time::{decode_epoch_days, decode_profile_time, decode_units_since};
