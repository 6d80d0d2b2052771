use std::str::FromStr;

use rust_decimal::{Decimal, prelude::ToPrimitive};
use tracing::debug;

use crate::{error::ClimateError, model::ClimateDataList};

/// Exact decimal mean of the points whose period overlaps `[from, to]`.
///
/// Points without period information are trusted to be in range. Values are
/// summed as decimals, so inputs like `0.1` accumulate without binary
/// rounding. Values with more significant digits than `Decimal` holds are
/// rejected rather than rounded, and a sum past `Decimal::MAX` is an error.
/// The final division rounds to 28 significant digits when the mean does not
/// terminate. An empty selection is an error, never a zero.
pub fn average_in_range(
    list: &ClimateDataList,
    from: i64,
    to: i64,
) -> Result<Decimal, ClimateError> {
    let mut sum = Decimal::ZERO;
    let mut count: usize = 0;

    for point in list {
        if !point.overlaps(from, to) {
            debug!(
                from_year = ?point.from_year,
                to_year = ?point.to_year,
                "skipping data point outside {from}-{to}"
            );
            continue;
        }
        let value = parse_decimal(&point.value)?;
        sum = sum.checked_add(value).ok_or(ClimateError::Overflow { from, to })?;
        count += 1;
    }

    if count == 0 {
        return Err(ClimateError::EmptyDataset { from, to });
    }

    Ok(sum / Decimal::from(count))
}

/// Narrows an exact average to `f64`. This is the only lossy step.
pub fn to_f64(average: Decimal) -> Result<f64, ClimateError> {
    average.to_f64().ok_or(ClimateError::Conversion(average))
}

fn parse_decimal(text: &str) -> Result<Decimal, ClimateError> {
    let text = text.trim();
    let parsed = if text.contains(['e', 'E']) {
        Decimal::from_scientific(text)
    } else {
        Decimal::from_str_exact(text)
    };
    parsed.map_err(|source| ClimateError::NumericParse { value: text.to_string(), source })
}
