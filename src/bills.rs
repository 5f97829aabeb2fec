//! Historical electricity bills: records, bulk text parsing, and
//! normalization of a partial year to a full 12-month series.

use serde::{Deserialize, Serialize};

use crate::production::normalize_factors;

/// One monthly electricity bill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bill {
    /// Calendar month, 1 through 12.
    pub month: u32,
    /// Billed consumption in kWh.
    pub consumption_kwh: f64,
    /// Whether the value came from extrapolation rather than user entry.
    #[serde(default)]
    pub is_estimated: bool,
}

/// Outcome of parsing a bulk-pasted block of bill lines.
///
/// Unparsable lines are skipped individually and counted; a bad line never
/// aborts the whole import.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkParseResult {
    /// Successfully parsed bills, in input order, one per month
    /// (a later line for the same month replaces the earlier one).
    pub bills: Vec<Bill>,
    /// Number of non-empty lines that did not match `<month> <kwh>`.
    pub skipped_lines: usize,
}

/// Parses bulk-entered bill text, one `<month> <kwh>` pair per line.
///
/// The month may be numeric (1-12) or an English month name or
/// three-letter abbreviation, case-insensitive. Blank lines are ignored.
pub fn parse_bulk_bills(text: &str) -> BulkParseResult {
    let mut bills: Vec<Bill> = Vec::new();
    let mut skipped_lines = 0;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match parse_line(line) {
            Some((month, consumption_kwh)) => {
                if let Some(existing) = bills.iter_mut().find(|b| b.month == month) {
                    existing.consumption_kwh = consumption_kwh;
                } else {
                    bills.push(Bill {
                        month,
                        consumption_kwh,
                        is_estimated: false,
                    });
                }
            }
            None => skipped_lines += 1,
        }
    }

    BulkParseResult {
        bills,
        skipped_lines,
    }
}

fn parse_line(line: &str) -> Option<(u32, f64)> {
    let mut parts = line.split_whitespace();
    let month = parse_month(parts.next()?)?;
    let consumption: f64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() || !consumption.is_finite() || consumption < 0.0 {
        return None;
    }
    Some((month, consumption))
}

fn parse_month(token: &str) -> Option<u32> {
    if let Ok(n) = token.parse::<u32>() {
        return (1..=12).contains(&n).then_some(n);
    }
    let names = [
        "january",
        "february",
        "march",
        "april",
        "may",
        "june",
        "july",
        "august",
        "september",
        "october",
        "november",
        "december",
    ];
    let lower = token.to_ascii_lowercase();
    names
        .iter()
        .position(|name| *name == lower || (lower.len() == 3 && name.starts_with(&lower)))
        .map(|i| i as u32 + 1)
}

/// Expands up to 12 bills into a full 12-month series by seasonal
/// extrapolation.
///
/// The seasonal base is estimated from the months that are present
/// (mean of `consumption / factor`); missing months are filled with
/// `base × factor` and flagged `is_estimated`. Seasonal factors are
/// normalized before use. An empty input yields twelve zero bills.
pub fn normalize_to_full_year(bills: &[Bill], seasonal_factors: &[f64; 12]) -> Vec<Bill> {
    let factors = normalize_factors(seasonal_factors);

    let mut present: [Option<&Bill>; 12] = [None; 12];
    for bill in bills {
        if (1..=12).contains(&bill.month) {
            present[(bill.month - 1) as usize] = Some(bill);
        }
    }

    let mut base_sum = 0.0;
    let mut base_count = 0;
    for (m, slot) in present.iter().enumerate() {
        if let Some(bill) = slot {
            if factors[m] > 0.0 {
                base_sum += bill.consumption_kwh / factors[m];
                base_count += 1;
            }
        }
    }
    let base = if base_count > 0 {
        base_sum / f64::from(base_count)
    } else {
        0.0
    };

    (0..12)
        .map(|m| match present[m] {
            Some(bill) => bill.clone(),
            None => Bill {
                month: m as u32 + 1,
                consumption_kwh: base * factors[m],
                is_estimated: true,
            },
        })
        .collect()
}

/// Extracts the monthly consumption series from a full-year bill set.
pub fn monthly_consumption(bills: &[Bill]) -> [f64; 12] {
    let mut out = [0.0; 12];
    for bill in bills {
        if (1..=12).contains(&bill.month) {
            out[(bill.month - 1) as usize] = bill.consumption_kwh.max(0.0);
        }
    }
    out
}
