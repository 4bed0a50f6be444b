use log::error;
use nalgebra::{Rotation3, Vector3};

use crate::{
    constants::RELATIVISTIC_F,
    ephemeris::Ephemeris,
    prelude::Epoch,
    system::System,
};

/// Kepler solver convergence criteria (radians)
const KEPLER_TOLERANCE: f64 = 1.0E-13;

/// Maximal number of Kepler iterations
const KEPLER_MAX_ITER: usize = 30;

/// Time step used to derive the instantaneous velocity (s)
const VELOCITY_STEP_S: f64 = 1.0E-3;

/// Broadcast state of one vehicle, in ECEF at epoch of evaluation.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct KeplerState {
    /// Position (meters)
    pub position: Vector3<f64>,
    /// Velocity (m/s)
    pub velocity: Vector3<f64>,
    /// Broadcast clock offset, relativistic effect included (s)
    pub clock_s: f64,
}

impl Ephemeris {
    /// Returns ToE in seconds of week, in the [System] timescale
    pub fn weekly_toe_seconds(&self, system: System) -> f64 {
        let toe = self.toe.to_time_scale(system.timescale());
        (toe.to_time_of_week().1 as f64) / 1.0E9
    }

    /// Solves Kepler's equation, returns eccentric anomaly (radians)
    fn eccentric_anomaly(&self, system: System, t_k: f64) -> Option<f64> {
        let a = self.semi_major_axis_m;
        let n0 = (system.gm_m3_s2() / a.powi(3)).sqrt();
        let m_k = self.m0_rad + (n0 + self.dn_rad) * t_k;

        let e = self.eccentricity;
        let mut e_k = m_k;

        for _ in 0..KEPLER_MAX_ITER {
            let e_prev = e_k;
            e_k -= (e_k - e * e_k.sin() - m_k) / (1.0 - e * e_k.cos());
            if (e_k - e_prev).abs() < KEPLER_TOLERANCE {
                return Some(e_k);
            }
        }

        error!("{} - kepler solver in failure (t_k={})", self.sv, t_k);
        None
    }

    /// ECEF position (m) and eccentric anomaly at `t`
    fn position_at(&self, t: Epoch, system: System) -> Option<(Vector3<f64>, f64)> {
        let t_k = (t - self.toe).to_seconds();
        let e_k = self.eccentric_anomaly(system, t_k)?;

        let e = self.eccentricity;
        let a = self.semi_major_axis_m;
        let omega_e = system.earth_rotation_rad_s();

        let (cus, cuc) = self.cus_cuc_rad;
        let (cis, cic) = self.cis_cic_rad;
        let (crs, crc) = self.crs_crc_m;

        let (sin_e_k, cos_e_k) = e_k.sin_cos();
        let v_k = ((1.0 - e.powi(2)).sqrt() * sin_e_k).atan2(cos_e_k - e);

        let phi = v_k + self.omega_rad;
        let (sin_2phi, cos_2phi) = (2.0 * phi).sin_cos();

        let u_k = phi + cuc * cos_2phi + cus * sin_2phi;
        let r_k = a * (1.0 - e * cos_e_k) + crc * cos_2phi + crs * sin_2phi;
        let i_k = self.i0_rad + self.idot_rad_s * t_k + cic * cos_2phi + cis * sin_2phi;
        let omega_k = self.omega0_rad + (self.omega_dot_rad_s - omega_e) * t_k
            - omega_e * self.weekly_toe_seconds(system);

        let orbital = Vector3::new(r_k * u_k.cos(), r_k * u_k.sin(), 0.0);

        // MEO orbit to ECEF rotation matrix
        let rot_x3 = Rotation3::from_axis_angle(&Vector3::x_axis(), i_k);
        let rot_z3 = Rotation3::from_axis_angle(&Vector3::z_axis(), omega_k);

        Some((rot_z3 * rot_x3 * orbital, e_k))
    }

    /// Resolves broadcast position, velocity and clock offset at `t`.
    pub(crate) fn resolve_state(&self, t: Epoch, system: System) -> Option<KeplerState> {
        let (position, e_k) = self.position_at(t, system)?;
        let (next, _) = self.position_at(t + VELOCITY_STEP_S * hifitime::Unit::Second, system)?;
        let velocity = (next - position) / VELOCITY_STEP_S;

        let mut dt = (t - self.toc).to_seconds();
        for _ in 0..2 {
            dt -= self.af0 + self.af1 * dt + self.af2 * dt.powi(2);
        }

        let relativistic =
            RELATIVISTIC_F * self.eccentricity * self.semi_major_axis_m.sqrt() * e_k.sin();

        let clock_s = self.af0 + self.af1 * dt + self.af2 * dt.powi(2) + relativistic;

        Some(KeplerState {
            position,
            velocity,
            clock_s,
        })
    }
}
