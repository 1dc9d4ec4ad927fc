//! In-memory view of a profile file: named variables with attributes.
//!
//! The native reader fills this from a NetCDF file; every normalization
//! step works on it, so the pipeline itself never touches the C library.

use std::collections::BTreeMap;

use crate::sanitize::sanitize;

/// An attribute value, widened to the three shapes the pipeline cares about.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Number(f64),
    Numbers(Vec<f64>),
    Text(String),
}

impl AttrValue {
    /// Numeric value of the attribute, using the first element of a list.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::Number(v) => Some(*v),
            AttrValue::Numbers(v) => v.first().copied(),
            AttrValue::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        AttrValue::Number(v)
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Text(s.to_string())
    }
}

/// Variable payload, flattened in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub enum VarData {
    /// Any numeric type, widened to f64.
    Numeric(Vec<f64>),
    /// NC_CHAR arrays.
    Chars(Vec<u8>),
    /// NC_STRING values.
    Text(Vec<String>),
}

impl VarData {
    pub fn len(&self) -> usize {
        match self {
            VarData::Numeric(v) => v.len(),
            VarData::Chars(v) => v.len(),
            VarData::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A named variable with its attributes and data.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    /// Dimension lengths; a 1-D variable has a single entry.
    pub shape: Vec<usize>,
    pub attributes: BTreeMap<String, AttrValue>,
    pub data: VarData,
}

impl Variable {
    /// Create a one-dimensional variable without attributes.
    pub fn new(name: impl Into<String>, data: VarData) -> Self {
        Self {
            name: name.into(),
            shape: vec![data.len()],
            attributes: BTreeMap::new(),
            data,
        }
    }

    pub fn numeric(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self::new(name, VarData::Numeric(values))
    }

    pub fn chars(name: impl Into<String>, bytes: &[u8]) -> Self {
        Self::new(name, VarData::Chars(bytes.to_vec()))
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_shape(mut self, shape: Vec<usize>) -> Self {
        self.shape = shape;
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&AttrValue> {
        self.attributes.get(name)
    }

    /// Sentinel for "no data": `_FillValue`, else `missing_value`.
    pub fn fill_value(&self) -> Option<f64> {
        self.attribute("_FillValue")
            .or_else(|| self.attribute("missing_value"))
            .and_then(AttrValue::as_f64)
    }

    pub fn standard_name(&self) -> Option<&str> {
        self.attribute("standard_name").and_then(AttrValue::as_str)
    }

    pub fn units(&self) -> Option<&str> {
        self.attribute("units")
            .or_else(|| self.attribute("Units"))
            .and_then(AttrValue::as_str)
    }

    pub fn values(&self) -> Option<&[f64]> {
        match &self.data {
            VarData::Numeric(v) => Some(v),
            _ => None,
        }
    }

    /// First element of a numeric variable that is finite and not the fill value.
    pub fn first_valid(&self) -> Option<f64> {
        let fill = self.fill_value();
        self.values()?.iter().find_map(|&v| sanitize(Some(v), fill))
    }
}

/// All variables of one source file, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileFile {
    pub path: String,
    pub variables: Vec<Variable>,
}

impl ProfileFile {
    pub fn new(path: impl Into<String>, variables: Vec<Variable>) -> Self {
        Self {
            path: path.into(),
            variables,
        }
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// Exact-name lookup.
    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.name == name)
    }
}
