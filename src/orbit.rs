//! Precise satellite position and clock, at signal transmission time
use log::{error, warn};
use nalgebra::Matrix3;

use crate::{
    constants::SPEED_OF_LIGHT_M_S,
    correction::{ClockCorrection, OrbitCorrection},
    ephemeris::Ephemeris,
    prelude::{Epoch, Vector3},
    system::System,
};

use hifitime::Unit;

/// Initial guess of the propagation time (s)
const PROPAGATION_GUESS_S: f64 = 0.075;

/// Light time iteration convergence criteria (s)
const PROPAGATION_TOLERANCE_S: f64 = 1.0E-12;

/// Maximal number of light time iterations
const PROPAGATION_MAX_ITER: usize = 10;

/// Precise satellite state, corrected by SSR orbit and clock products.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PreciseState {
    /// Position at transmission time, rotated into the
    /// receiver frame at reception time (m)
    pub position: Vector3<f64>,
    /// Position at transmission time, before Earth rotation (m)
    pub position_tx: Vector3<f64>,
    /// Satellite clock bias, broadcast and SSR corrections applied (m)
    pub clock_bias_m: f64,
    /// Signal propagation time (s)
    pub propagation_s: f64,
}

impl PreciseState {
    /// Geometric range to this position (m)
    pub fn range_m(&self, rx: Vector3<f64>) -> f64 {
        (rx - self.position).norm()
    }

    /// True if any field is not a number
    pub fn is_nan(&self) -> bool {
        self.position.iter().any(|x| x.is_nan())
            || self.position_tx.iter().any(|x| x.is_nan())
            || self.clock_bias_m.is_nan()
            || self.propagation_s.is_nan()
    }
}

/// Rotates an ECEF position by the Earth rotation during `dt` seconds
fn earth_rotation(position: Vector3<f64>, omega_e: f64, dt: f64) -> Vector3<f64> {
    let (we_sin, we_cos) = (omega_e * dt).sin_cos();
    let dcm3 = Matrix3::new(we_cos, we_sin, 0.0, -we_sin, we_cos, 0.0, 0.0, 0.0, 1.0);
    dcm3 * position
}

/// [PreciseSolver] combines the broadcast [Ephemeris] with the SSR
/// [OrbitCorrection] and [ClockCorrection] that refer to it.
#[derive(Debug, Clone)]
pub(crate) struct PreciseSolver<'a> {
    /// [System] of this vehicle
    pub system: System,
    /// Matching broadcast frame
    pub ephemeris: &'a Ephemeris,
    /// Orbit correction and its reference time
    pub orbit: (&'a OrbitCorrection, Epoch),
    /// Clock correction and its reference time
    pub clock: (&'a ClockCorrection, Epoch),
}

impl<'a> PreciseSolver<'a> {
    /// Corrected position (m) and clock bias (m) at transmission time
    fn corrected_state(&self, t_tx: Epoch) -> Option<(Vector3<f64>, f64)> {
        let state = self.ephemeris.resolve_state(t_tx, self.system)?;

        let (orbit, t_orbit) = self.orbit;
        let (clock, t_clock) = self.clock;

        let ea = state.velocity.try_normalize(0.0)?;
        let ec = state.position.cross(&state.velocity).try_normalize(0.0)?;
        let er = ea.cross(&ec);

        let delta = orbit.delta_at((t_tx - t_orbit).to_seconds());
        let dant = er * delta[0] + ea * delta[1] + ec * delta[2];

        let clock_bias_m = state.clock_s * SPEED_OF_LIGHT_M_S
            + clock.correction_m((t_tx - t_clock).to_seconds());

        Some((state.position - dant, clock_bias_m))
    }

    /// Solves the light time equation between the satellite and `rx`,
    /// for a signal received at `t`.
    pub fn solve(&self, t: Epoch, rx: Vector3<f64>) -> Option<PreciseState> {
        let omega_e = self.system.earth_rotation_rad_s();
        let sv = self.ephemeris.sv;

        let mut tau = PROPAGATION_GUESS_S;
        let mut converged = false;

        for _ in 0..PROPAGATION_MAX_ITER {
            let (position_tx, _) = self.corrected_state(t - tau * Unit::Second)?;
            let rotated = earth_rotation(position_tx, omega_e, tau);
            let next = (rotated - rx).norm() / SPEED_OF_LIGHT_M_S;

            if next.is_nan() {
                error!("{}({}) - propagation time is not a number", t, sv);
                return None;
            }

            let delta = (next - tau).abs();
            tau = next;

            if delta < PROPAGATION_TOLERANCE_S {
                converged = true;
                break;
            }
        }

        if !converged {
            warn!("{}({}) - light time did not converge (tau={}s)", t, sv, tau);
        }

        let (position_tx, clock_bias_m) = self.corrected_state(t - tau * Unit::Second)?;

        Some(PreciseState {
            position: earth_rotation(position_tx, omega_e, tau),
            position_tx,
            clock_bias_m,
            propagation_s: tau,
        })
    }
}
