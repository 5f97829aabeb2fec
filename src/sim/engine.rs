//! 25-year financial forecast: the pure orchestration of tariff, ledger
//! or battery dispatch, degradation, and escalation.
//!
//! Months are processed in strict chronological (year-major, month-minor)
//! order; the credit ledger's FIFO draws and age expiry depend on it.

use crate::config::InputSnapshot;
use crate::impact::EnvironmentalImpact;
use crate::production::{DAYS_IN_MONTH, SeasonalFactorTable};
use crate::sizing::{MeteringRegime, SizingResult, size_system};
use crate::tariff::{Escalation, bill_amount};

use super::battery::dispatch_month;
use super::ledger::CreditLedger;
use super::types::{FinancialSummary, ForecastInput, HORIZON_YEARS, YearlyResult};

/// Complete forecast outcome handed to report and persistence adapters.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastOutput {
    /// Sizing the forecast was computed for.
    pub sizing: SizingResult,
    /// 25-year financial summary and yearly breakdown.
    pub summary: FinancialSummary,
    /// Environmental-equivalence figures.
    pub impact: EnvironmentalImpact,
}

/// Runs the 25-year simulation over one immutable input snapshot.
///
/// Never fails on numerically valid input: degenerate snapshots (no
/// bills, zero production, zero cost) produce a zero/neutral summary.
pub fn compute_forecast(input: &ForecastInput) -> ForecastOutput {
    let mut ledger = CreditLedger::new(input.roi.credit_expiry_months);
    let mut yearly = Vec::with_capacity(HORIZON_YEARS as usize);

    let mut cumulative = -input.system_cost_aed;
    let mut payback_years = 0.0;
    let mut first_year_savings = 0.0;
    let mut first_year_original_bill = 0.0;

    for year in 1..=HORIZON_YEARS {
        let degradation = input.roi.degradation_factor(year);
        let escalation = Escalation::for_year(
            year,
            input.roi.annual_escalation_rate,
            input.roi.escalate_fuel_surcharge,
        );

        let mut savings = 0.0;
        let mut direct_use = 0.0;
        let mut stored = 0.0;
        let mut drawn = 0.0;
        let mut expired = 0.0;
        let mut unused = 0.0;

        for m in 0..12 {
            let consumption = input.monthly_consumption_kwh[m];
            let production = input.sizing.monthly_production_kwh[m] * degradation;
            let daytime_load = input.daytime_fraction * consumption;
            let nighttime_load = consumption - daytime_load;

            let original_bill = bill_amount(consumption, &input.tariff, escalation);
            if year == 1 {
                first_year_original_bill += original_bill;
            }

            let offset_bill = match input.regime {
                MeteringRegime::NetMetering => {
                    let month_index = (year as usize - 1) * 12 + m;
                    let outcome = ledger.process_month(
                        month_index,
                        production,
                        daytime_load,
                        nighttime_load,
                    );
                    direct_use += outcome.direct_use_kwh;
                    stored += outcome.exported_kwh;
                    drawn += outcome.drawn_kwh;
                    expired += outcome.expired_kwh;
                    bill_amount(outcome.residual_deficit_kwh, &input.tariff, escalation)
                }
                MeteringRegime::SelfConsumption => {
                    let outcome = dispatch_month(
                        production,
                        daytime_load,
                        nighttime_load,
                        input.sizing.battery_capacity_kwh,
                        &input.battery,
                        DAYS_IN_MONTH[m],
                    );
                    direct_use += outcome.direct_use_kwh;
                    stored += outcome.stored_kwh;
                    unused += outcome.unused_kwh;
                    let saved = outcome.saved_kwh.min(consumption);
                    bill_amount(consumption - saved, &input.tariff, escalation)
                }
            };

            savings += original_bill - offset_bill;
        }

        if year == 1 {
            first_year_savings = savings;
        }

        let rollover_kwh = match input.regime {
            MeteringRegime::NetMetering => ledger.total_kwh(),
            MeteringRegime::SelfConsumption => 0.0,
        };
        let rollover_value_aed =
            rollover_kwh * input.tariff.top_tier_rate() * escalation.factor;

        let cash_flow = savings - input.roi.annual_maintenance_aed;
        let previous_cumulative = cumulative;
        cumulative += cash_flow;

        if payback_years == 0.0 && previous_cumulative < 0.0 && cumulative >= 0.0 {
            // Fractional year by linear interpolation across the crossing.
            payback_years = if cash_flow > 0.0 {
                f64::from(year - 1) + (-previous_cumulative) / cash_flow
            } else {
                f64::from(year)
            };
        }

        yearly.push(YearlyResult {
            year,
            degradation_factor: degradation,
            savings_aed: savings,
            cash_flow_aed: cash_flow,
            cumulative_cash_flow_aed: cumulative,
            direct_use_kwh: direct_use,
            stored_kwh: stored,
            drawn_kwh: drawn,
            expired_kwh: expired,
            rollover_kwh,
            rollover_value_aed,
            unused_solar_kwh: unused,
        });
    }

    let roi_percent = if input.system_cost_aed > 0.0 {
        cumulative / input.system_cost_aed * 100.0
    } else {
        0.0
    };
    let bill_offset_percent = if first_year_original_bill > 0.0 {
        first_year_savings / first_year_original_bill * 100.0
    } else {
        0.0
    };

    let summary = FinancialSummary {
        first_year_savings_aed: first_year_savings,
        payback_period_years: payback_years,
        net_profit_25yr_aed: cumulative,
        net_value_25yr_aed: cumulative + input.system_cost_aed,
        roi_percent,
        bill_offset_percent,
        yearly,
    };

    let impact = EnvironmentalImpact::from_annual_production(
        input.sizing.annual_production_kwh,
        &input.roi,
        input.emission_factor_kg_per_kwh,
    );

    ForecastOutput {
        sizing: input.sizing.clone(),
        summary,
        impact,
    }
}

/// Full pipeline over a configuration snapshot: normalize the bills, size
/// the system, then run the forecast.
///
/// The snapshot is sanitized (out-of-range parameters clamped) before the
/// engine sees it, so the computation itself never validates ranges.
pub fn run_snapshot(snapshot: &InputSnapshot) -> ForecastOutput {
    let snapshot = snapshot.sanitized();
    let factors = SeasonalFactorTable::builtin().normalized(&snapshot.city);

    let bills = crate::bills::normalize_to_full_year(&snapshot.bills, &factors);
    let monthly_consumption = crate::bills::monthly_consumption(&bills);

    let sizing = size_system(
        &monthly_consumption,
        snapshot.daytime_consumption_fraction,
        snapshot.regime,
        &snapshot.battery,
        &snapshot.system,
        &factors,
    );

    let input = ForecastInput {
        monthly_consumption_kwh: monthly_consumption,
        daytime_fraction: snapshot.daytime_consumption_fraction,
        tariff: snapshot.tariff.clone(),
        regime: snapshot.regime,
        battery: snapshot.battery,
        sizing,
        roi: snapshot.roi,
        system_cost_aed: snapshot.system_cost_aed,
        emission_factor_kg_per_kwh: snapshot.emission_factor_kg_per_kwh,
    };
    compute_forecast(&input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sizing::{BatteryConfig, SizingResult};
    use crate::tariff::{TariffConfig, TariffTier};

    fn flat_tariff(rate: f64) -> TariffConfig {
        TariffConfig {
            tiers: vec![TariffTier {
                from_kwh: 1,
                to_kwh: None,
                rate_per_kwh: rate,
            }],
            fuel_surcharge_per_kwh: 0.0,
            fixed_monthly_charge: 0.0,
        }
    }

    fn sizing_with_production(monthly_kwh: f64) -> SizingResult {
        SizingResult {
            panel_count: 10,
            actual_system_size_kwp: 5.5,
            inverter_capacity_kw: 5.0,
            area_required_m2: 26.0,
            monthly_production_kwh: [monthly_kwh; 12],
            annual_production_kwh: monthly_kwh * 12.0,
            battery_capacity_kwh: 0.0,
            area_exceeds_available: false,
        }
    }

    fn base_input() -> ForecastInput {
        ForecastInput {
            monthly_consumption_kwh: [1000.0; 12],
            daytime_fraction: 0.5,
            tariff: flat_tariff(0.30),
            regime: MeteringRegime::NetMetering,
            battery: BatteryConfig::default(),
            sizing: sizing_with_production(1000.0),
            roi: RoiParams {
                first_year_degradation: 0.0,
                annual_degradation_rate: 0.0,
                annual_escalation_rate: 0.0,
                escalate_fuel_surcharge: false,
                credit_expiry_months: 12,
                annual_maintenance_aed: 0.0,
            },
            system_cost_aed: 18_000.0,
            emission_factor_kg_per_kwh: 0.7,
        }
    }

    use crate::sim::types::RoiParams;

    #[test]
    fn full_offset_under_net_metering_with_matching_production() {
        // Production equals consumption every month: the ledger covers the
        // whole nighttime deficit, the offset bill is zero.
        let input = base_input();
        let output = compute_forecast(&input);
        let expected_yearly = 12.0 * 1000.0 * 0.30;
        assert!((output.summary.first_year_savings_aed - expected_yearly).abs() < 1e-6);
        assert!((output.summary.bill_offset_percent - 100.0).abs() < 1e-9);
    }

    #[test]
    fn payback_is_first_year_cumulative_crosses_zero() {
        let input = base_input();
        let output = compute_forecast(&input);
        // 3600/year against 18,000: payback exactly 5 years.
        assert!((output.summary.payback_period_years - 5.0).abs() < 1e-9);
        for result in &output.summary.yearly {
            if f64::from(result.year) < output.summary.payback_period_years {
                assert!(result.cumulative_cash_flow_aed < 0.0);
            } else {
                assert!(result.cumulative_cash_flow_aed >= -1e-9);
            }
        }
    }

    #[test]
    fn fractional_payback_interpolates_between_years() {
        let mut input = base_input();
        input.system_cost_aed = 9_000.0;
        let output = compute_forecast(&input);
        // 3600/year: crosses during year 3 at 9000/3600 = 2.5.
        assert!((output.summary.payback_period_years - 2.5).abs() < 1e-9);
    }

    #[test]
    fn roi_and_net_value_are_consistent() {
        let input = base_input();
        let output = compute_forecast(&input);
        let last = output.summary.yearly.last().unwrap();
        assert!(
            (output.summary.net_profit_25yr_aed - last.cumulative_cash_flow_aed).abs() < 1e-9
        );
        assert!(
            (output.summary.net_value_25yr_aed
                - (output.summary.net_profit_25yr_aed + input.system_cost_aed))
                .abs()
                < 1e-9
        );
        let expected_roi =
            output.summary.net_profit_25yr_aed / input.system_cost_aed * 100.0;
        assert!((output.summary.roi_percent - expected_roi).abs() < 1e-9);
    }

    #[test]
    fn maintenance_reduces_cash_flow_not_savings() {
        let mut input = base_input();
        input.roi.annual_maintenance_aed = 500.0;
        let output = compute_forecast(&input);
        let first = &output.summary.yearly[0];
        assert!((first.savings_aed - 3600.0).abs() < 1e-9);
        assert!((first.cash_flow_aed - 3100.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_zero_everything_is_neutral() {
        let mut input = base_input();
        input.monthly_consumption_kwh = [0.0; 12];
        input.sizing = sizing_with_production(0.0);
        input.system_cost_aed = 0.0;
        let output = compute_forecast(&input);
        assert_eq!(output.summary.first_year_savings_aed, 0.0);
        assert_eq!(output.summary.payback_period_years, 0.0);
        assert_eq!(output.summary.net_profit_25yr_aed, 0.0);
        assert_eq!(output.summary.roi_percent, 0.0);
        assert_eq!(output.summary.bill_offset_percent, 0.0);
        assert_eq!(output.summary.yearly.len(), 25);
    }

    #[test]
    fn unreached_payback_reports_zero() {
        let mut input = base_input();
        input.system_cost_aed = 1_000_000.0;
        let output = compute_forecast(&input);
        assert_eq!(output.summary.payback_period_years, 0.0);
        assert!(output.summary.net_profit_25yr_aed < 0.0);
    }

    #[test]
    fn self_consumption_without_battery_saves_daytime_only() {
        let mut input = base_input();
        input.regime = MeteringRegime::SelfConsumption;
        let output = compute_forecast(&input);
        // Daytime fraction 0.5: only 500 kWh/month displaced.
        let expected_yearly = 12.0 * 500.0 * 0.30;
        assert!((output.summary.first_year_savings_aed - expected_yearly).abs() < 1e-6);
        let first = &output.summary.yearly[0];
        assert!(first.unused_solar_kwh > 0.0);
        assert_eq!(first.rollover_kwh, 0.0);
    }

    #[test]
    fn net_metering_outperforms_self_consumption_without_battery() {
        let net = compute_forecast(&base_input());
        let mut self_input = base_input();
        self_input.regime = MeteringRegime::SelfConsumption;
        let selfc = compute_forecast(&self_input);
        assert!(
            net.summary.first_year_savings_aed > selfc.summary.first_year_savings_aed
        );
    }

    #[test]
    fn escalation_grows_savings_year_over_year() {
        let mut input = base_input();
        input.roi.annual_escalation_rate = 0.03;
        let output = compute_forecast(&input);
        let y1 = output.summary.yearly[0].savings_aed;
        let y2 = output.summary.yearly[1].savings_aed;
        assert!(y2 > y1);
        assert!((y2 / y1 - 1.03).abs() < 1e-6);
    }

    #[test]
    fn rollover_appears_when_production_exceeds_consumption() {
        let mut input = base_input();
        input.sizing = sizing_with_production(1500.0);
        input.roi.credit_expiry_months = 48;
        let output = compute_forecast(&input);
        let first = &output.summary.yearly[0];
        assert!(first.rollover_kwh > 0.0);
        let expected_value = first.rollover_kwh * 0.30;
        assert!((first.rollover_value_aed - expected_value).abs() < 1e-9);
    }

    #[test]
    fn yearly_energy_accounting_balances_under_net_metering() {
        let mut input = base_input();
        input.sizing = sizing_with_production(1200.0);
        let output = compute_forecast(&input);
        // Across the whole horizon: everything exported was either drawn,
        // expired, or still on the ledger at the end.
        let total_stored: f64 = output.summary.yearly.iter().map(|y| y.stored_kwh).sum();
        let total_drawn: f64 = output.summary.yearly.iter().map(|y| y.drawn_kwh).sum();
        let total_expired: f64 = output.summary.yearly.iter().map(|y| y.expired_kwh).sum();
        let final_rollover = output.summary.yearly.last().unwrap().rollover_kwh;
        assert!(
            (total_stored - total_drawn - total_expired - final_rollover).abs() < 1e-6
        );
    }
}
