//! CSV export for the 25-year yearly breakdown.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::sim::types::YearlyResult;

/// Schema v1 column header for the yearly-breakdown export.
const HEADER: &str = "year,degradation_factor,savings_aed,cash_flow_aed,\
                      cumulative_cash_flow_aed,direct_use_kwh,stored_kwh,\
                      drawn_kwh,expired_kwh,rollover_kwh,rollover_value_aed,\
                      unused_solar_kwh";

/// Exports the yearly breakdown to a CSV file at the given path.
///
/// Writes a header row followed by one data row per simulated year using
/// the schema v1 column layout. Produces deterministic output for
/// identical inputs.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(yearly: &[YearlyResult], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(yearly, buf)
}

/// Writes the yearly breakdown as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(yearly: &[YearlyResult], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(',').map(str::trim))?;

    for y in yearly {
        wtr.write_record(&[
            y.year.to_string(),
            format!("{:.6}", y.degradation_factor),
            format!("{:.2}", y.savings_aed),
            format!("{:.2}", y.cash_flow_aed),
            format!("{:.2}", y.cumulative_cash_flow_aed),
            format!("{:.2}", y.direct_use_kwh),
            format!("{:.2}", y.stored_kwh),
            format!("{:.2}", y.drawn_kwh),
            format!("{:.2}", y.expired_kwh),
            format!("{:.2}", y.rollover_kwh),
            format!("{:.2}", y.rollover_value_aed),
            format!("{:.2}", y.unused_solar_kwh),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
