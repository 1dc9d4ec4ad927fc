//! Native NetCDF reading using the netcdf library.
//!
//! Converts every variable of a file into the in-memory [`ProfileFile`]
//! catalog. Numeric data of any width is widened to f64; character and
//! string variables are kept as text so platform identifiers survive.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Once;

use netcdf::types::NcVariableType;
use tracing::{debug, trace};

use crate::catalog::{AttrValue, ProfileFile, VarData, Variable};
use crate::error::{NetCdfError, NetCdfResult};

/// Silence HDF5's automatic error printing to stderr.
///
/// The HDF5 C library prints verbose diagnostics even when errors are
/// handled gracefully by the Rust code, e.g. when an optional attribute
/// is missing. Call once before any
/// NetCDF operation; repeated calls are no-ops.
pub fn silence_hdf5_errors() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // SAFETY: H5Eset_auto2 is thread-safe and we're passing null pointers
        // to disable error output, which is a documented valid use.
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(
                hdf5_metno_sys::h5e::H5E_DEFAULT,
                None,
                std::ptr::null_mut(),
            );
        }
    });
}

/// Open a NetCDF file and read all variables into a [`ProfileFile`].
///
/// The catalog's `path` is the path as given, which becomes the
/// profile's `source_file`.
pub fn open_profile_file<P: AsRef<Path>>(path: P) -> NetCdfResult<ProfileFile> {
    silence_hdf5_errors();

    let path = path.as_ref();
    let nc_file = netcdf::open(path).map_err(|e| {
        NetCdfError::InvalidFormat(format!("Failed to open {}: {}", path.display(), e))
    })?;

    let variables: Vec<Variable> = nc_file.variables().map(|var| read_variable(&var)).collect();

    debug!(
        path = %path.display(),
        variables = variables.len(),
        "Read NetCDF variable catalog"
    );

    Ok(ProfileFile::new(path.to_string_lossy(), variables))
}

fn read_variable(var: &netcdf::Variable) -> Variable {
    let name = var.name();
    let shape: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();

    let attributes: BTreeMap<String, AttrValue> = var
        .attributes()
        .filter_map(|attr| {
            let value = attr.value().ok().and_then(convert_attribute)?;
            Some((attr.name().to_string(), value))
        })
        .collect();

    Variable {
        data: read_data(var, &name),
        name,
        shape,
        attributes,
    }
}

/// Dispatch on the stored type so string and variable-length data are
/// never reinterpreted as raw bytes.
fn read_data(var: &netcdf::Variable, name: &str) -> VarData {
    match var.vartype() {
        NcVariableType::Int(_) | NcVariableType::Float(_) => {
            match var.get_values::<f64, _>(..) {
                Ok(values) => VarData::Numeric(values),
                Err(e) => unreadable(name, &e),
            }
        }
        NcVariableType::Char => match var.get_raw_values(..) {
            Ok(bytes) => VarData::Chars(bytes),
            Err(e) => unreadable(name, &e),
        },
        NcVariableType::String => match read_strings(var) {
            Ok(strings) => VarData::Text(strings),
            Err(e) => unreadable(name, &e),
        },
        NcVariableType::Vlen(_)
        | NcVariableType::Compound(_)
        | NcVariableType::Opaque(_)
        | NcVariableType::Enum(_) => {
            trace!(variable = %name, "Skipping variable of unsupported type");
            VarData::Numeric(Vec::new())
        }
    }
}

/// Read an NC_STRING array element by element in row-major order.
fn read_strings(var: &netcdf::Variable) -> netcdf::Result<Vec<String>> {
    let shape: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();
    if shape.is_empty() {
        return Ok(vec![var.get_string(..)?]);
    }

    (0..var.len())
        .map(|flat| var.get_string(unravel_index(flat, &shape)))
        .collect()
}

fn unravel_index(mut flat: usize, shape: &[usize]) -> Vec<usize> {
    let mut index = vec![0; shape.len()];
    for (slot, &len) in index.iter_mut().zip(shape).rev() {
        if len > 0 {
            *slot = flat % len;
            flat /= len;
        }
    }
    index
}

fn unreadable(name: &str, error: &netcdf::Error) -> VarData {
    trace!(variable = %name, error = %error, "Unreadable variable data");
    VarData::Numeric(Vec::new())
}

fn convert_attribute(value: netcdf::AttributeValue) -> Option<AttrValue> {
    use netcdf::AttributeValue as A;

    let attr = match value {
        A::Uchar(v) => AttrValue::Number(v as f64),
        A::Schar(v) => AttrValue::Number(v as f64),
        A::Ushort(v) => AttrValue::Number(v as f64),
        A::Short(v) => AttrValue::Number(v as f64),
        A::Uint(v) => AttrValue::Number(v as f64),
        A::Int(v) => AttrValue::Number(v as f64),
        A::Ulonglong(v) => AttrValue::Number(v as f64),
        A::Longlong(v) => AttrValue::Number(v as f64),
        A::Float(v) => AttrValue::Number(v as f64),
        A::Double(v) => AttrValue::Number(v),
        A::Uchars(v) => AttrValue::Numbers(v.into_iter().map(f64::from).collect()),
        A::Schars(v) => AttrValue::Numbers(v.into_iter().map(f64::from).collect()),
        A::Ushorts(v) => AttrValue::Numbers(v.into_iter().map(f64::from).collect()),
        A::Shorts(v) => AttrValue::Numbers(v.into_iter().map(f64::from).collect()),
        A::Uints(v) => AttrValue::Numbers(v.into_iter().map(f64::from).collect()),
        A::Ints(v) => AttrValue::Numbers(v.into_iter().map(f64::from).collect()),
        A::Ulonglongs(v) => AttrValue::Numbers(v.into_iter().map(|x| x as f64).collect()),
        A::Longlongs(v) => AttrValue::Numbers(v.into_iter().map(|x| x as f64).collect()),
        A::Floats(v) => AttrValue::Numbers(v.into_iter().map(f64::from).collect()),
        A::Doubles(v) => AttrValue::Numbers(v),
        A::Str(s) => AttrValue::Text(s),
        A::Strs(v) => AttrValue::Text(v.join(" ")),
        #[allow(unreachable_patterns)]
        _ => return None,
    };
    Some(attr)
}
