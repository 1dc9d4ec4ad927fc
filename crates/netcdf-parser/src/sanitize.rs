//! Turning raw readings into present/absent values.

use crate::catalog::Variable;

/// Absent if the raw value is missing, non-finite, or equal to the fill value.
pub fn sanitize(raw: Option<f64>, fill: Option<f64>) -> Option<f64> {
    let value = raw?;
    if !value.is_finite() || fill == Some(value) {
        return None;
    }
    Some(value)
}

/// A numeric per-level series paired with its fill value.
#[derive(Debug, Clone, Copy)]
pub struct Channel<'a> {
    values: &'a [f64],
    fill: Option<f64>,
}

impl<'a> Channel<'a> {
    pub fn new(values: &'a [f64], fill: Option<f64>) -> Self {
        Self { values, fill }
    }

    /// Channel view of a numeric variable; `None` for character data.
    pub fn from_variable(variable: &'a Variable) -> Option<Self> {
        variable
            .values()
            .map(|values| Self::new(values, variable.fill_value()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Sanitized value at `level`; indices past the end are absent.
    pub fn value_at(&self, level: usize) -> Option<f64> {
        sanitize(self.values.get(level).copied(), self.fill)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize(Some(12.5), None), Some(12.5));
        assert_eq!(sanitize(Some(12.5), Some(99999.0)), Some(12.5));
        assert_eq!(sanitize(Some(99999.0), Some(99999.0)), None);
        assert_eq!(sanitize(Some(f64::NAN), None), None);
        assert_eq!(sanitize(Some(f64::NEG_INFINITY), None), None);
        assert_eq!(sanitize(None, Some(1.0)), None);
    }

    #[test]
    fn test_fill_only_hits_matching_level() {
        let values = [10.1, 99999.0, 10.3];
        let channel = Channel::new(&values, Some(99999.0));
        assert_eq!(channel.value_at(0), Some(10.1));
        assert_eq!(channel.value_at(1), None);
        assert_eq!(channel.value_at(2), Some(10.3));
        assert_eq!(channel.value_at(3), None);
    }

    #[test]
    fn test_nan_fill_does_not_mask_values() {
        let values = [1.0, 2.0];
        let channel = Channel::new(&values, Some(f64::NAN));
        assert_eq!(channel.value_at(0), Some(1.0));
    }
}
