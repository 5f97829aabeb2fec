//! Daily solar/battery/grid dispatch for the self-consumption regime.
//!
//! Unlike net metering, excess beyond what the battery can absorb is lost;
//! the lost energy feeds the "unused solar" advisory on the quote.

use crate::sizing::BatteryConfig;

/// Energy flows of one dispatched day (or one month scaled to days).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DispatchOutcome {
    /// Production consumed directly by the daytime load (kWh).
    pub direct_use_kwh: f64,
    /// Energy banked into the battery, net of round-trip loss (kWh).
    pub stored_kwh: f64,
    /// Energy discharged into the nighttime load (kWh).
    pub discharged_kwh: f64,
    /// Grid energy displaced: direct use plus discharge (kWh).
    pub saved_kwh: f64,
    /// Production that found no use and was lost (kWh).
    pub unused_kwh: f64,
}

/// Dispatches one day of production against daytime and nighttime load.
///
/// Round-trip loss is applied once, at charge time (`stored = excess ×
/// rte`), so the discharge side is loss-free. Storage is capped by
/// `capacity × usable DoD`; energy the battery cannot absorb is lost.
pub fn dispatch_day(
    production_kwh: f64,
    daytime_load_kwh: f64,
    nighttime_load_kwh: f64,
    capacity_kwh: f64,
    battery: &BatteryConfig,
) -> DispatchOutcome {
    let direct_use_kwh = production_kwh.min(daytime_load_kwh).max(0.0);
    let excess = (production_kwh - direct_use_kwh).max(0.0);

    let (stored_kwh, discharged_kwh, unused_kwh) = if battery.enabled && capacity_kwh > 0.0 {
        let rte = battery.round_trip_efficiency;
        let usable = capacity_kwh * battery.usable_depth_of_discharge;
        let stored = (excess * rte).min(usable);
        let discharged = nighttime_load_kwh.min(stored);
        // The charge-side loss means stored/rte of raw excess was consumed.
        let absorbed = if rte > 0.0 { stored / rte } else { 0.0 };
        (stored, discharged, (excess - absorbed).max(0.0))
    } else {
        (0.0, 0.0, excess)
    };

    DispatchOutcome {
        direct_use_kwh,
        stored_kwh,
        discharged_kwh,
        saved_kwh: direct_use_kwh + discharged_kwh,
        unused_kwh,
    }
}

/// Dispatches one month as a daily average scaled back to month totals.
pub fn dispatch_month(
    production_kwh: f64,
    daytime_load_kwh: f64,
    nighttime_load_kwh: f64,
    capacity_kwh: f64,
    battery: &BatteryConfig,
    days_in_month: f64,
) -> DispatchOutcome {
    if days_in_month <= 0.0 {
        return DispatchOutcome::default();
    }
    let daily = dispatch_day(
        production_kwh / days_in_month,
        daytime_load_kwh / days_in_month,
        nighttime_load_kwh / days_in_month,
        capacity_kwh,
        battery,
    );
    DispatchOutcome {
        direct_use_kwh: daily.direct_use_kwh * days_in_month,
        stored_kwh: daily.stored_kwh * days_in_month,
        discharged_kwh: daily.discharged_kwh * days_in_month,
        saved_kwh: daily.saved_kwh * days_in_month,
        unused_kwh: daily.unused_kwh * days_in_month,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sizing::BatteryMode;

    fn battery(dod: f64, rte: f64) -> BatteryConfig {
        BatteryConfig {
            enabled: true,
            mode: BatteryMode::NightBackup,
            usable_depth_of_discharge: dod,
            round_trip_efficiency: rte,
        }
    }

    #[test]
    fn worked_example_night_backup_day() {
        // Production 50, day 30, night 20, capacity 15, DoD 0.9, rte 0.95:
        // stored = min(20×0.95, 13.5) = 13.5; discharged = 13.5;
        // saved = 30 + 13.5 = 43.5.
        let outcome = dispatch_day(50.0, 30.0, 20.0, 15.0, &battery(0.9, 0.95));
        assert_eq!(outcome.direct_use_kwh, 30.0);
        assert!((outcome.stored_kwh - 13.5).abs() < 1e-12);
        assert!((outcome.discharged_kwh - 13.5).abs() < 1e-12);
        assert!((outcome.saved_kwh - 43.5).abs() < 1e-12);
    }

    #[test]
    fn unused_solar_accounts_for_charge_loss() {
        // Same day: battery absorbed 13.5/0.95 of the 20 kWh excess.
        let outcome = dispatch_day(50.0, 30.0, 20.0, 15.0, &battery(0.9, 0.95));
        let expected_unused = 20.0 - 13.5 / 0.95;
        assert!((outcome.unused_kwh - expected_unused).abs() < 1e-12);
    }

    #[test]
    fn without_battery_all_excess_is_lost() {
        let disabled = BatteryConfig::default();
        let outcome = dispatch_day(50.0, 30.0, 20.0, 0.0, &disabled);
        assert_eq!(outcome.direct_use_kwh, 30.0);
        assert_eq!(outcome.stored_kwh, 0.0);
        assert_eq!(outcome.saved_kwh, 30.0);
        assert_eq!(outcome.unused_kwh, 20.0);
    }

    #[test]
    fn storage_limited_by_excess_not_capacity() {
        // Excess 5 × 0.95 = 4.75 < usable 13.5: energy-limited.
        let outcome = dispatch_day(35.0, 30.0, 20.0, 15.0, &battery(0.9, 0.95));
        assert!((outcome.stored_kwh - 4.75).abs() < 1e-12);
        assert!((outcome.unused_kwh - 0.0).abs() < 1e-12);
    }

    #[test]
    fn discharge_limited_by_night_load() {
        let outcome = dispatch_day(50.0, 30.0, 5.0, 15.0, &battery(0.9, 0.95));
        assert_eq!(outcome.discharged_kwh, 5.0);
        assert!((outcome.saved_kwh - 35.0).abs() < 1e-12);
    }

    #[test]
    fn production_below_day_load_never_charges() {
        let outcome = dispatch_day(20.0, 30.0, 10.0, 15.0, &battery(0.9, 0.95));
        assert_eq!(outcome.direct_use_kwh, 20.0);
        assert_eq!(outcome.stored_kwh, 0.0);
        assert_eq!(outcome.unused_kwh, 0.0);
    }

    #[test]
    fn month_dispatch_scales_daily_figures() {
        let day = dispatch_day(50.0, 30.0, 20.0, 15.0, &battery(0.9, 0.95));
        let month = dispatch_month(
            50.0 * 30.0,
            30.0 * 30.0,
            20.0 * 30.0,
            15.0,
            &battery(0.9, 0.95),
            30.0,
        );
        assert!((month.saved_kwh - day.saved_kwh * 30.0).abs() < 1e-9);
        assert!((month.unused_kwh - day.unused_kwh * 30.0).abs() < 1e-9);
    }
}
