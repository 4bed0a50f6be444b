//! Carrier phase wind-up
use std::f64::consts::PI;

use log::error;

use crate::{
    constants::ASTRONOMICAL_UNIT_M,
    position::ReferencePosition,
    prelude::{Epoch, Vector3},
    system::{System, NUM_SYSTEMS},
};

/// Low precision Sun position in ECEF (m), at `t`.
pub(crate) fn sun_position(t: Epoch) -> Vector3<f64> {
    let n = t.to_jde_utc_days() - 2451545.0;

    let l = (280.460 + 0.9856474 * n).to_radians();
    let g = (357.528 + 0.9856003 * n).to_radians();

    let ecliptic_long = l + (1.915 * g.sin() + 0.020 * (2.0 * g).sin()).to_radians();
    let obliquity = (23.439 - 4.0E-7 * n).to_radians();
    let distance_m =
        (1.00014 - 0.01671 * g.cos() - 0.00014 * (2.0 * g).cos()) * ASTRONOMICAL_UNIT_M;

    let (sin_lambda, cos_lambda) = ecliptic_long.sin_cos();
    let (sin_eps, cos_eps) = obliquity.sin_cos();
    let eci = Vector3::new(
        distance_m * cos_lambda,
        distance_m * cos_eps * sin_lambda,
        distance_m * sin_eps * sin_lambda,
    );

    let gmst = (280.46061837 + 360.98564736629 * n)
        .rem_euclid(360.0)
        .to_radians();
    let (sin_gmst, cos_gmst) = gmst.sin_cos();

    Vector3::new(
        cos_gmst * eci[0] + sin_gmst * eci[1],
        -sin_gmst * eci[0] + cos_gmst * eci[1],
        eci[2],
    )
}

/// Phase wind-up (cycles) for satellite located at `sat_tx` (ECEF, m),
/// continuous with the `previous` value.
/// Uses the nominal yaw attitude, and a north oriented receiver antenna.
pub(crate) fn windup_cycles(
    t: Epoch,
    rx: &ReferencePosition,
    sat_tx: Vector3<f64>,
    previous: f64,
) -> f64 {
    let ek = (rx.ecef() - sat_tx).normalize();

    // satellite body frame
    let ez = -sat_tx.normalize();
    let esun = (sun_position(t) - sat_tx).normalize();
    let ey = ez.cross(&esun).normalize();
    let ex = ey.cross(&ez);

    // receiver antenna frame
    let (east, north, _) = rx.enu_axes();
    let exr = north;
    let eyr = -east;

    let ds = ex - ek * ek.dot(&ex) - ek.cross(&ey);
    let dr = exr - ek * ek.dot(&exr) + ek.cross(&eyr);

    let cosp = (ds.dot(&dr) / ds.norm() / dr.norm()).clamp(-1.0, 1.0);
    let mut ph = cosp.acos() / 2.0 / PI;
    if ek.dot(&ds.cross(&dr)) < 0.0 {
        ph = -ph;
    }

    ph + (previous - ph + 0.5).floor()
}

/// [PhaseWindUpTracker] retains the accumulated wind-up (cycles)
/// of every vehicle, across epochs.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseWindUpTracker {
    systems: [Vec<f64>; NUM_SYSTEMS],
}

impl Default for PhaseWindUpTracker {
    fn default() -> Self {
        Self {
            systems: System::ALL.map(|system| vec![0.0; system.max_prn() as usize + 1]),
        }
    }
}

impl PhaseWindUpTracker {
    /// Accumulated wind-up (cycles) of this vehicle
    pub fn value(&self, system: System, prn: u8) -> f64 {
        self.systems[system.index()]
            .get(prn as usize)
            .copied()
            .unwrap_or_default()
    }

    /// Resets this vehicle
    pub fn reset(&mut self, system: System, prn: u8) {
        self.set(system, prn, 0.0);
    }

    /// Resets all vehicles of all systems
    pub fn reset_all(&mut self) {
        for table in self.systems.iter_mut() {
            table.iter_mut().for_each(|value| *value = 0.0);
        }
    }

    fn set(&mut self, system: System, prn: u8, value: f64) {
        if let Some(slot) = self.systems[system.index()].get_mut(prn as usize) {
            *slot = value;
        }
    }

    /// Updates this vehicle's wind-up with the satellite position at
    /// transmission time. A NaN outcome is logged and zeroed.
    pub fn update(
        &mut self,
        t: Epoch,
        system: System,
        prn: u8,
        rx: &ReferencePosition,
        sat_tx: Vector3<f64>,
    ) -> f64 {
        let value = windup_cycles(t, rx, sat_tx, self.value(system, prn));
        if value.is_nan() {
            error!("{}({}{:02}) - phase windup is not a number", t, system, prn);
            self.reset(system, prn);
            0.0
        } else {
            self.set(system, prn, value);
            value
        }
    }

    /// True if every vehicle of every system has a null wind-up
    pub fn is_null(&self) -> bool {
        self.systems
            .iter()
            .all(|table| table.iter().all(|value| *value == 0.0))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn sun_distance_and_declination() {
        // June solstice
        let t = Epoch::from_gregorian_utc_at_midnight(2024, 6, 21);
        let sun = sun_position(t);
        assert!((sun.norm() / ASTRONOMICAL_UNIT_M - 1.016).abs() < 5.0E-3);
        let declination = (sun[2] / sun.norm()).asin().to_degrees();
        assert!((declination - 23.44).abs() < 0.1);

        // December solstice
        let t = Epoch::from_gregorian_utc_at_midnight(2024, 12, 21);
        let sun = sun_position(t);
        assert!((sun.norm() / ASTRONOMICAL_UNIT_M - 0.984).abs() < 5.0E-3);
        let declination = (sun[2] / sun.norm()).asin().to_degrees();
        assert!((declination + 23.44).abs() < 0.1);
    }

    #[test]
    fn windup_is_continuous() {
        let t = Epoch::from_gregorian_utc_at_midnight(2024, 3, 1);
        let rx = ReferencePosition::from_ecef(Vector3::new(6378137.0, 0.0, 0.0));
        let sat = Vector3::new(15000.0E3, 10000.0E3, 18000.0E3);

        let first = windup_cycles(t, &rx, sat, 0.0);
        assert!(first.abs() <= 0.5);

        let wrapped = windup_cycles(t, &rx, sat, 3.0);
        assert!((wrapped - (first + 3.0)).abs() < 1.0E-9);
    }

    #[test]
    fn tracker_states() {
        let t = Epoch::from_gregorian_utc_at_midnight(2024, 3, 1);
        let rx = ReferencePosition::from_ecef(Vector3::new(6378137.0, 0.0, 0.0));
        let sat = Vector3::new(15000.0E3, 10000.0E3, 18000.0E3);

        let mut tracker = PhaseWindUpTracker::default();
        assert!(tracker.is_null());

        let value = tracker.update(t, System::Galileo, 5, &rx, sat);
        assert_eq!(tracker.value(System::Galileo, 5), value);
        assert_eq!(tracker.value(System::GPS, 5), 0.0);

        tracker.set(System::BeiDou, 63, 1.5);
        assert_eq!(tracker.value(System::BeiDou, 63), 1.5);
        tracker.reset(System::BeiDou, 63);
        assert_eq!(tracker.value(System::BeiDou, 63), 0.0);

        // out of range PRNs are ignored
        tracker.set(System::GPS, 40, 1.0);
        assert_eq!(tracker.value(System::GPS, 40), 0.0);

        tracker.set(System::GPS, 1, 0.25);
        tracker.reset_all();
        assert!(tracker.is_null());
    }

    #[test]
    fn not_a_number_is_zeroed() {
        let t = Epoch::from_gregorian_utc_at_midnight(2024, 3, 1);
        let rx = ReferencePosition::from_ecef(Vector3::new(6378137.0, 0.0, 0.0));

        let mut tracker = PhaseWindUpTracker::default();
        tracker.set(System::GPS, 7, 2.25);
        tracker.set(System::GPS, 8, -1.5);

        let value = tracker.update(t, System::GPS, 7, &rx, Vector3::new(f64::NAN, 0.0, 0.0));
        assert_eq!(value, 0.0);
        assert_eq!(tracker.value(System::GPS, 7), 0.0);
        assert_eq!(tracker.value(System::GPS, 8), -1.5);
    }
}
