use serde::{Deserialize, Serialize};

use crate::validate::{FieldRules, Rule, Validate};

const YEAR_RULES: &[Rule] = &[Rule::Required, Rule::Len(4), Rule::Numeric];
const COUNTRY_RULES: &[Rule] = &[Rule::Required, Rule::Len(3), Rule::Alpha];

/// Arguments for an annual rainfall query.
///
/// Years are carried as text so they can be checked before any request is
/// built. A reversed range is passed through as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryArgs {
    pub from_year: String,
    pub to_year: String,
    /// ISO 3166-1 alpha-3 code, any case.
    pub country_code: String,
}

impl QueryArgs {
    pub fn new(
        from_year: impl Into<String>,
        to_year: impl Into<String>,
        country_code: impl Into<String>,
    ) -> Self {
        Self {
            from_year: from_year.into(),
            to_year: to_year.into(),
            country_code: country_code.into(),
        }
    }

    pub fn from_years(from_year: i64, to_year: i64, country_code: &str) -> Self {
        Self::new(from_year.to_string(), to_year.to_string(), country_code)
    }

    /// Upstream path for this query, e.g. `/country/annualavg/pr/1980/1999/GBR`.
    pub fn rainfall_path(&self) -> String {
        format!(
            "/country/annualavg/pr/{}/{}/{}",
            self.from_year,
            self.to_year,
            self.country_code.to_uppercase()
        )
    }
}

impl Validate for QueryArgs {
    fn field_rules(&self) -> Vec<FieldRules<'_>> {
        vec![
            FieldRules { field: "from_year", value: &self.from_year, rules: YEAR_RULES },
            FieldRules { field: "to_year", value: &self.to_year, rules: YEAR_RULES },
            FieldRules { field: "country_code", value: &self.country_code, rules: COUNTRY_RULES },
        ]
    }
}

/// One decoded observation: the average for a model run over a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClimateDataPoint {
    pub gcm: Option<String>,
    pub from_year: Option<i64>,
    pub to_year: Option<i64>,
    /// Decimal text exactly as received.
    pub value: String,
}

impl ClimateDataPoint {
    pub fn new(value: impl Into<String>) -> Self {
        Self { gcm: None, from_year: None, to_year: None, value: value.into() }
    }

    pub fn with_period(mut self, from_year: i64, to_year: i64) -> Self {
        self.from_year = Some(from_year);
        self.to_year = Some(to_year);
        self
    }

    pub fn with_gcm(mut self, gcm: impl Into<String>) -> Self {
        self.gcm = Some(gcm.into());
        self
    }

    pub fn year(&self) -> Option<i64> {
        self.from_year
    }

    /// Whether the point's period touches `[from, to]`.
    ///
    /// Points without period information always overlap.
    pub fn overlaps(&self, from: i64, to: i64) -> bool {
        let start = self.from_year.or(self.to_year);
        let end = self.to_year.or(self.from_year);
        match (start, end) {
            (Some(start), Some(end)) => start <= to && end >= from,
            _ => true,
        }
    }
}

/// Decoded observations in wire order. Empty means "no data".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClimateDataList {
    pub points: Vec<ClimateDataPoint>,
}

impl ClimateDataList {
    pub fn new(points: Vec<ClimateDataPoint>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ClimateDataPoint> {
        self.points.iter()
    }
}

impl FromIterator<ClimateDataPoint> for ClimateDataList {
    fn from_iter<I: IntoIterator<Item = ClimateDataPoint>>(iter: I) -> Self {
        Self { points: iter.into_iter().collect() }
    }
}

impl<'a> IntoIterator for &'a ClimateDataList {
    type Item = &'a ClimateDataPoint;
    type IntoIter = std::slice::Iter<'a, ClimateDataPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::{RuleValidator, Validator};

    #[test]
    fn rainfall_path_uppercases_country() {
        let args = QueryArgs::new("1980", "1999", "gbr");
        assert_eq!(args.rainfall_path(), "/country/annualavg/pr/1980/1999/GBR");
    }

    #[test]
    fn valid_args_pass_rule_validator() {
        assert!(RuleValidator.validate(&QueryArgs::from_years(1980, 1999, "GBR")).is_ok());
    }

    #[test]
    fn two_letter_country_is_rejected() {
        let err = RuleValidator.validate(&QueryArgs::new("1980", "1999", "GB")).unwrap_err();
        assert!(err.has_field("country_code"));
        assert!(!err.has_field("from_year"));
    }

    #[test]
    fn malformed_years_are_rejected() {
        let err = RuleValidator.validate(&QueryArgs::from_years(-980, 19999, "GBR")).unwrap_err();
        assert!(err.has_field("from_year"));
        assert!(err.has_field("to_year"));
    }

    #[test]
    fn missing_fields_are_required() {
        let err = RuleValidator.validate(&QueryArgs::new("", "1999", " ")).unwrap_err();
        assert_eq!(err.violations().len(), 2);
        assert!(err.to_string().contains("is required"));
    }

    #[test]
    fn reversed_range_is_not_a_validation_error() {
        assert!(RuleValidator.validate(&QueryArgs::from_years(1999, 1980, "FRA")).is_ok());
    }

    #[test]
    fn overlap_uses_known_period() {
        let point = ClimateDataPoint::new("1").with_period(1980, 1999);
        assert!(point.overlaps(1980, 1999));
        assert!(point.overlaps(1999, 2020));
        assert!(!point.overlaps(2000, 2020));
        assert!(!point.overlaps(1960, 1979));
        assert!(ClimateDataPoint::new("1").overlaps(2000, 2020));
    }
}
