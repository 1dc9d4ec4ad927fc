//! Locating logical variables among arbitrarily named file variables.
//!
//! Each logical variable carries an ordered list of strategies. The first
//! strategy that finds a variable wins; later strategies are not consulted.

use crate::catalog::{ProfileFile, Variable};
use crate::error::{NetCdfError, NetCdfResult};

/// One way of finding a variable in a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Case-insensitive match of the variable name against any alias.
    Alias(&'static [&'static str]),
    /// Case-insensitive match of the `standard_name` attribute.
    StandardName(&'static str),
}

impl Strategy {
    /// First variable in file order that satisfies this strategy.
    pub fn find<'a>(&self, file: &'a ProfileFile) -> Option<&'a Variable> {
        match *self {
            Strategy::Alias(aliases) => file
                .variables()
                .iter()
                .find(|v| aliases.iter().any(|a| a.eq_ignore_ascii_case(&v.name))),
            Strategy::StandardName(term) => file.variables().iter().find(|v| {
                v.standard_name()
                    .map_or(false, |s| s.eq_ignore_ascii_case(term))
            }),
        }
    }
}

/// A physical quantity the pipeline looks for, with its resolution policy.
#[derive(Debug, Clone, Copy)]
pub struct LogicalVariable {
    pub name: &'static str,
    pub strategies: &'static [Strategy],
}

/// A successful resolution, tagged with the strategy that produced it.
#[derive(Debug, Clone, Copy)]
pub struct Resolved<'a> {
    pub variable: &'a Variable,
    pub strategy: Strategy,
}

impl LogicalVariable {
    pub fn resolve<'a>(&self, file: &'a ProfileFile) -> Option<Resolved<'a>> {
        self.strategies.iter().find_map(|strategy| {
            strategy.find(file).map(|variable| Resolved {
                variable,
                strategy: *strategy,
            })
        })
    }

    /// Resolve, failing the whole file when nothing matches.
    pub fn require<'a>(&self, file: &'a ProfileFile) -> NetCdfResult<Resolved<'a>> {
        self.resolve(file)
            .ok_or(NetCdfError::MissingVariable(self.name))
    }
}

pub const LATITUDE: LogicalVariable = LogicalVariable {
    name: "latitude",
    strategies: &[
        Strategy::Alias(&["LATITUDE", "latitude", "Lat"]),
        Strategy::StandardName("latitude"),
    ],
};

pub const LONGITUDE: LogicalVariable = LogicalVariable {
    name: "longitude",
    strategies: &[
        Strategy::Alias(&["LONGITUDE", "longitude", "Lon"]),
        Strategy::StandardName("longitude"),
    ],
};

/// Julian day count since 1950-01-01.
pub const EPOCH_DAYS_TIME: LogicalVariable = LogicalVariable {
    name: "juld",
    strategies: &[Strategy::Alias(&["JULD"])],
};

/// A time variable with a "<unit> since <date>" units attribute.
pub const UNITS_SINCE_TIME: LogicalVariable = LogicalVariable {
    name: "time",
    strategies: &[Strategy::Alias(&["time"]), Strategy::StandardName("time")],
};

pub const PLATFORM_ID: LogicalVariable = LogicalVariable {
    name: "platform_number",
    strategies: &[Strategy::Alias(&[
        "PLATFORM_NUMBER",
        "PLATFORM_NUMBER:STRING",
        "WMO_ID",
    ])],
};

pub const PRESSURE: LogicalVariable = LogicalVariable {
    name: "pressure",
    strategies: &[
        Strategy::Alias(&["PRES", "pressure"]),
        Strategy::Alias(&["Depth", "depth"]),
    ],
};

pub const TEMPERATURE: LogicalVariable = LogicalVariable {
    name: "temperature",
    strategies: &[Strategy::Alias(&["TEMP", "temperature"])],
};

pub const SALINITY: LogicalVariable = LogicalVariable {
    name: "salinity",
    strategies: &[Strategy::Alias(&["PSAL", "salinity"])],
};

#[cfg(test)]
mod tests {
    use super::*;

    fn file(vars: Vec<Variable>) -> ProfileFile {
        ProfileFile::new("test.nc", vars)
    }

    #[test]
    fn test_alias_is_case_insensitive() {
        let f = file(vec![Variable::numeric("Latitude", vec![10.0])]);
        let resolved = LATITUDE.resolve(&f).unwrap();
        assert_eq!(resolved.variable.name, "Latitude");
        assert!(matches!(resolved.strategy, Strategy::Alias(_)));
    }

    #[test]
    fn test_alias_follows_file_order() {
        let f = file(vec![
            Variable::numeric("lat", vec![1.0]),
            Variable::numeric("latitude", vec![2.0]),
            Variable::numeric("LATITUDE", vec![3.0]),
        ]);
        assert_eq!(LATITUDE.resolve(&f).unwrap().variable.name, "latitude");
    }

    #[test]
    fn test_standard_name_fallback() {
        let f = file(vec![
            Variable::numeric("y_coord", vec![45.0]).with_attr("standard_name", "Latitude"),
        ]);
        let resolved = LATITUDE.resolve(&f).unwrap();
        assert_eq!(resolved.variable.name, "y_coord");
        assert_eq!(resolved.strategy, Strategy::StandardName("latitude"));
    }

    #[test]
    fn test_alias_beats_standard_name() {
        let f = file(vec![
            Variable::numeric("y_coord", vec![45.0]).with_attr("standard_name", "latitude"),
            Variable::numeric("LATITUDE", vec![46.0]),
        ]);
        assert_eq!(LATITUDE.resolve(&f).unwrap().variable.name, "LATITUDE");
    }

    #[test]
    fn test_pressure_falls_back_to_depth() {
        let f = file(vec![Variable::numeric("DEPTH", vec![1.0, 2.0])]);
        assert_eq!(PRESSURE.resolve(&f).unwrap().variable.name, "DEPTH");

        let f = file(vec![
            Variable::numeric("depth", vec![1.0]),
            Variable::numeric("PRES", vec![2.0]),
        ]);
        assert_eq!(PRESSURE.resolve(&f).unwrap().variable.name, "PRES");
    }

    #[test]
    fn test_require_missing() {
        let f = file(vec![Variable::numeric("TEMP", vec![1.0])]);
        match LONGITUDE.require(&f) {
            Err(NetCdfError::MissingVariable(name)) => assert_eq!(name, "longitude"),
            other => panic!("unexpected: {:?}", other.map(|r| r.variable.name.clone())),
        }
    }
}
