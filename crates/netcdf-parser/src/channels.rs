//! Discovery of auxiliary per-level channels beyond pressure/temperature/salinity.

use tracing::debug;

use crate::catalog::{ProfileFile, Variable};
use crate::sanitize::Channel;

/// Structural and adjusted-copy variables that are never auxiliary channels.
const RESERVED_NAMES: &[&str] = &[
    "LATITUDE",
    "LONGITUDE",
    "LAT",
    "LON",
    "JULD",
    "TIME",
    "CYCLE_NUMBER",
    "N_PROF",
    "N_LEVELS",
    "PRES",
    "TEMP",
    "PSAL",
    "PRESSURE",
    "TEMPERATURE",
    "SALINITY",
    "DEPTH",
    "PRES_ADJUSTED",
    "TEMP_ADJUSTED",
    "PSAL_ADJUSTED",
];

/// Quality-control and error channels, by naming convention.
pub fn is_quality_control(name: &str) -> bool {
    let upper = name.to_ascii_uppercase();
    upper.ends_with("_QC")
        || upper.contains("_QC_")
        || upper.ends_with("_ADJUSTED_ERROR")
        || upper.ends_with("_ERROR")
}

fn is_reserved(name: &str) -> bool {
    RESERVED_NAMES.iter().any(|r| r.eq_ignore_ascii_case(name))
}

/// An accepted auxiliary channel.
#[derive(Debug, Clone)]
pub struct AuxChannel<'a> {
    /// Lower-cased variable name, used as the extras key.
    pub key: String,
    pub channel: Channel<'a>,
}

/// Collect numeric channels whose length is exactly `levels`.
///
/// `claimed` holds the names of variables already resolved as primary
/// logical variables. Returns nothing when `levels` is zero.
pub fn collect_aux_channels<'a>(
    file: &'a ProfileFile,
    claimed: &[&str],
    levels: usize,
) -> Vec<AuxChannel<'a>> {
    if levels == 0 {
        return Vec::new();
    }

    file.variables()
        .iter()
        .filter(|v| !claimed.contains(&v.name.as_str()))
        .filter(|v| !is_reserved(&v.name) && !is_quality_control(&v.name))
        .filter_map(|v| accept(v, levels))
        .collect()
}

fn accept(variable: &Variable, levels: usize) -> Option<AuxChannel<'_>> {
    let channel = Channel::from_variable(variable)?;
    if channel.len() != levels {
        debug!(
            variable = %variable.name,
            len = channel.len(),
            levels = levels,
            "Skipping channel with mismatched length"
        );
        return None;
    }

    Some(AuxChannel {
        key: variable.name.to_lowercase(),
        channel,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(channels: &[AuxChannel<'_>]) -> Vec<String> {
        channels.iter().map(|c| c.key.clone()).collect()
    }

    #[test]
    fn test_quality_control_names() {
        assert!(is_quality_control("TEMP_QC"));
        assert!(is_quality_control("PROFILE_TEMP_QC"));
        assert!(is_quality_control("TEMP_QC_FLAG"));
        assert!(is_quality_control("PSAL_ADJUSTED_ERROR"));
        assert!(is_quality_control("DOXY_ERROR"));
        assert!(is_quality_control("doxy_qc"));
        assert!(!is_quality_control("DOXY"));
        assert!(!is_quality_control("QCLCOUNT"));
    }

    #[test]
    fn test_collects_matching_numeric_channels() {
        let file = ProfileFile::new(
            "f.nc",
            vec![
                Variable::numeric("PRES", vec![1.0, 2.0, 3.0]),
                Variable::numeric("DOXY", vec![200.0, 201.0, 202.0]),
                Variable::numeric("CHLA", vec![0.1, 0.2]),
                Variable::numeric("TEMP_QC", vec![1.0, 1.0, 1.0]),
                Variable::numeric("PSAL_ADJUSTED_ERROR", vec![0.01, 0.01, 0.01]),
                Variable::numeric("TEMP_ADJUSTED", vec![5.0, 4.0, 3.0]),
                Variable::chars("DATA_MODE", b"RRR"),
                Variable::numeric("Nitrate", vec![7.0, 7.5, 8.0]),
            ],
        );

        let channels = collect_aux_channels(&file, &["PRES"], 3);
        assert_eq!(keys(&channels), vec!["doxy", "nitrate"]);
    }

    #[test]
    fn test_claimed_names_are_excluded() {
        let file = ProfileFile::new(
            "f.nc",
            vec![
                Variable::numeric("sea_water_temp", vec![1.0, 2.0]),
                Variable::numeric("CNDC", vec![3.0, 4.0]),
            ],
        );
        let channels = collect_aux_channels(&file, &["sea_water_temp"], 2);
        assert_eq!(keys(&channels), vec!["cndc"]);
    }

    #[test]
    fn test_zero_levels_collects_nothing() {
        let file = ProfileFile::new("f.nc", vec![Variable::numeric("DOXY", vec![])]);
        assert!(collect_aux_channels(&file, &[], 0).is_empty());
    }
}
