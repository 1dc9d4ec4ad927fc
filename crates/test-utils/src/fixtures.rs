//! Synthetic profile files and profiles.
//!
//! Files are built as in-memory [`ProfileFile`] catalogs so pipeline tests
//! need no NetCDF files on disk.

use std::collections::BTreeMap;

use argo_common::{FloatId, Measurement, Profile};
use chrono::{TimeZone, Utc};
use netcdf_parser::{ProfileFile, Variable};

/// Fill value used by the synthetic Argo channels.
pub const FILL: f64 = 99999.0;

/// Platform number carried by [`five_level_file`].
pub const PLATFORM: &str = "5904567";

pub const LATITUDE: f64 = -42.375;
pub const LONGITUDE: f64 = 147.125;

/// JULD of 2021-12-25T12:00:00Z.
pub const JULD_CHRISTMAS_NOON: f64 = 26291.5;

/// An Argo-style core profile with five levels.
///
/// Temperature at level 3 equals the fill value; everything else is valid.
/// Also carries QC and adjusted-error channels that must never become
/// extras, and one dissolved-oxygen channel that must.
pub fn five_level_file(path: &str) -> ProfileFile {
    let mut platform = PLATFORM.as_bytes().to_vec();
    platform.resize(8, 0);

    ProfileFile::new(
        path,
        vec![
            Variable::chars("PLATFORM_NUMBER", &platform).with_shape(vec![1, 8]),
            Variable::numeric("JULD", vec![JULD_CHRISTMAS_NOON])
                .with_attr("units", "days since 1950-01-01 00:00:00 UTC")
                .with_attr("_FillValue", 999999.0),
            Variable::numeric("LATITUDE", vec![LATITUDE]).with_attr("_FillValue", FILL),
            Variable::numeric("LONGITUDE", vec![LONGITUDE]).with_attr("_FillValue", FILL),
            channel("PRES", vec![5.0, 10.0, 20.0, 50.0, 100.0]),
            channel("TEMP", vec![18.25, 18.125, 17.5, FILL, 12.0]),
            channel("PSAL", vec![35.125, 35.25, 35.375, 35.5, 35.625]),
            Variable::chars("TEMP_QC", b"11141"),
            channel("PSAL_ADJUSTED_ERROR", vec![0.01; 5]),
            channel("DOXY", vec![220.0, 219.5, FILL, 210.0, 205.25]),
        ],
    )
}

/// Same layout as [`five_level_file`] without any latitude variable.
pub fn file_without_latitude(path: &str) -> ProfileFile {
    let variables = five_level_file(path)
        .variables()
        .iter()
        .filter(|v| v.name != "LATITUDE")
        .cloned()
        .collect();
    ProfileFile::new(path, variables)
}

/// A generic CF-style file: `time` in seconds, `depth` instead of `PRES`.
pub fn cf_style_file(path: &str, levels: usize) -> ProfileFile {
    let depth: Vec<f64> = (0..levels).map(|i| i as f64 * 2.5).collect();
    let temperature: Vec<f64> = (0..levels).map(|i| 25.0 - i as f64 * 0.125).collect();

    ProfileFile::new(
        path,
        vec![
            Variable::numeric("lat", vec![10.5]).with_attr("standard_name", "latitude"),
            Variable::numeric("lon", vec![-30.0]).with_attr("standard_name", "longitude"),
            Variable::numeric("time", vec![3600.0]).with_attr("units", "seconds since 2020-01-01 00:00:00"),
            Variable::numeric("depth", depth),
            Variable::numeric("temperature", temperature),
        ],
    )
}

fn channel(name: &str, values: Vec<f64>) -> Variable {
    Variable::numeric(name, values).with_attr("_FillValue", FILL)
}

/// An assembled profile with `levels` measurements and increasing depth.
pub fn sample_profile(source_file: &str, float_id: Option<&str>, levels: usize) -> Profile {
    let measurements = (0..levels)
        .map(|i| {
            let mut extras = BTreeMap::new();
            if i % 2 == 0 {
                extras.insert("doxy".to_string(), 200.0 + i as f64);
            }
            Measurement {
                depth: Some(i as f64),
                temperature: Some(20.0 - i as f64 * 0.01),
                salinity: Some(35.0),
                extras,
            }
        })
        .collect();

    Profile {
        float_id: float_id.map(FloatId::from),
        profile_time: Utc.with_ymd_and_hms(2021, 12, 25, 12, 0, 0).single(),
        latitude: LATITUDE,
        longitude: LONGITUDE,
        source_file: source_file.to_string(),
        measurements,
    }
}
