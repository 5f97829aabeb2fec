//! Forecast input snapshot and result records.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::sizing::{BatteryConfig, MeteringRegime, SizingResult};
use crate::tariff::TariffConfig;

/// Simulation horizon in years.
pub const HORIZON_YEARS: u32 = 25;

/// Degradation, escalation, and cost parameters of the 25-year forecast.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RoiParams {
    /// One-off output loss applied from year 1 (light-induced degradation).
    pub first_year_degradation: f64,
    /// Compounding year-over-year output loss.
    pub annual_degradation_rate: f64,
    /// Assumed annual tariff escalation rate.
    pub annual_escalation_rate: f64,
    /// Whether the fuel surcharge escalates along with tier rates.
    pub escalate_fuel_surcharge: bool,
    /// Export credits expire once their age reaches this many months.
    pub credit_expiry_months: u32,
    /// Explicit yearly maintenance deduction from cash flow. Default 0;
    /// set it rather than baking maintenance into the savings.
    pub annual_maintenance_aed: f64,
}

impl Default for RoiParams {
    fn default() -> Self {
        Self {
            first_year_degradation: 0.02,
            annual_degradation_rate: 0.005,
            annual_escalation_rate: 0.02,
            escalate_fuel_surcharge: false,
            credit_expiry_months: 12,
            annual_maintenance_aed: 0.0,
        }
    }
}

impl RoiParams {
    /// Production degradation factor for a 1-based simulation year:
    /// `(1 - first_year) × (1 - annual)^(year - 1)`.
    pub fn degradation_factor(&self, year: u32) -> f64 {
        (1.0 - self.first_year_degradation)
            * (1.0 - self.annual_degradation_rate).powi(year as i32 - 1)
    }
}

/// Immutable input snapshot of one forecast run.
///
/// The whole pipeline recomputes deterministically from this value; there
/// is no cross-call state.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastInput {
    /// Normalized 12-month consumption series (kWh).
    pub monthly_consumption_kwh: [f64; 12],
    /// Share of consumption that happens while the sun is up (0.0-1.0).
    pub daytime_fraction: f64,
    /// Active tariff.
    pub tariff: TariffConfig,
    /// Active metering regime (selects ledger vs. battery dispatch).
    pub regime: MeteringRegime,
    /// Battery parameters (regime B).
    pub battery: BatteryConfig,
    /// Sizing outcome feeding production into the forecast.
    pub sizing: SizingResult,
    /// Degradation/escalation/maintenance parameters.
    pub roi: RoiParams,
    /// Installed system price (currency units).
    pub system_cost_aed: f64,
    /// Grid CO2 intensity for the environmental figures (kg/kWh).
    pub emission_factor_kg_per_kwh: f64,
}

/// One simulated year of the forecast.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlyResult {
    /// Simulation year, 1 through 25.
    pub year: u32,
    /// Production degradation factor applied this year.
    pub degradation_factor: f64,
    /// Billed-amount reduction achieved this year.
    pub savings_aed: f64,
    /// Savings minus the maintenance deduction.
    pub cash_flow_aed: f64,
    /// Running cash position; starts at `-system_cost`.
    pub cumulative_cash_flow_aed: f64,
    /// Production consumed directly by daytime load (kWh).
    pub direct_use_kwh: f64,
    /// Regime A: energy banked as new credits. Regime B: energy stored
    /// into the battery (kWh).
    pub stored_kwh: f64,
    /// Regime A only: credits drawn against deficits (kWh).
    pub drawn_kwh: f64,
    /// Regime A only: credits lost to expiry (kWh).
    pub expired_kwh: f64,
    /// Regime A only: undrawn credit carried past year end (kWh).
    pub rollover_kwh: f64,
    /// Rollover valued at the escalated top-tier rate.
    pub rollover_value_aed: f64,
    /// Regime B only: production lost with nowhere to go (kWh).
    pub unused_solar_kwh: f64,
}

/// Aggregate financial outcome of the 25-year horizon.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialSummary {
    /// Savings achieved in year 1.
    pub first_year_savings_aed: f64,
    /// Fractional years until cumulative cash flow crosses zero;
    /// 0.0 when payback is not reached within the horizon.
    pub payback_period_years: f64,
    /// Cumulative cash flow at year 25 (net of system cost).
    pub net_profit_25yr_aed: f64,
    /// Total savings over the horizon (cost added back).
    pub net_value_25yr_aed: f64,
    /// Net profit as a percentage of system cost.
    pub roi_percent: f64,
    /// Year-1 savings as a percentage of the year-1 original bill.
    pub bill_offset_percent: f64,
    /// Per-year breakdown, exactly [`HORIZON_YEARS`] entries.
    pub yearly: Vec<YearlyResult>,
}

impl fmt::Display for FinancialSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Financial Forecast ---")?;
        writeln!(
            f,
            "First-year savings:  {:.2} AED",
            self.first_year_savings_aed
        )?;
        if self.payback_period_years > 0.0 {
            writeln!(
                f,
                "Payback period:      {:.1} years",
                self.payback_period_years
            )?;
        } else {
            writeln!(f, "Payback period:      not reached")?;
        }
        writeln!(f, "25-year net profit:  {:.2} AED", self.net_profit_25yr_aed)?;
        writeln!(f, "25-year net value:   {:.2} AED", self.net_value_25yr_aed)?;
        writeln!(f, "ROI:                 {:.1}%", self.roi_percent)?;
        write!(f, "Bill offset:         {:.1}%", self.bill_offset_percent)
    }
}
