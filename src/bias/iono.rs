use std::f64::consts::PI;

use crate::{
    constants::{EARTH_MEAN_RADIUS_M, IONOSPHERE_K, SECONDS_PER_DAY},
    position::ReferencePosition,
    prelude::{Epoch, TimeScale, Vector3},
};

/// One layer of the SSR VTEC spherical harmonics model
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VtecLayer {
    /// Layer height (meters)
    pub height_m: f64,
    /// Cosine coefficients C[n][m] (TECu), for 0 <= m <= n
    pub cosine: Vec<Vec<f64>>,
    /// Sine coefficients S[n][m] (TECu), for 0 <= m <= n
    pub sine: Vec<Vec<f64>>,
}

impl VtecLayer {
    /// Builds a single coefficient layer, describing a uniform
    /// VTEC (in TECu) at given height.
    pub fn uniform(height_m: f64, vtec_tecu: f64) -> Self {
        Self {
            height_m,
            cosine: vec![vec![vtec_tecu]],
            sine: vec![vec![0.0]],
        }
    }

    fn coefficient(table: &[Vec<f64>], n: usize, m: usize) -> f64 {
        table
            .get(n)
            .and_then(|row| row.get(m))
            .copied()
            .unwrap_or_default()
    }

    /// VTEC (TECu) at this pierce point
    fn vtec(&self, lat_pp: f64, long_sun_fixed: f64) -> f64 {
        let degree = self.cosine.len().max(self.sine.len());
        if degree == 0 {
            return 0.0;
        }
        let legendre = normalized_legendre(degree - 1, lat_pp.sin());
        let mut vtec = 0.0;
        for (n, row) in legendre.iter().enumerate() {
            for (m, p_nm) in row.iter().enumerate() {
                let (sin_ml, cos_ml) = (m as f64 * long_sun_fixed).sin_cos();
                let c_nm = Self::coefficient(&self.cosine, n, m);
                let s_nm = Self::coefficient(&self.sine, n, m);
                vtec += (c_nm * cos_ml + s_nm * sin_ml) * p_nm;
            }
        }
        vtec
    }
}

/// Fully normalized associated Legendre functions P[n][m](x), 0 <= m <= n <= degree
fn normalized_legendre(degree: usize, x: f64) -> Vec<Vec<f64>> {
    let mut p = vec![vec![0.0_f64; degree + 1]; degree + 1];
    let u = (1.0 - x * x).max(0.0).sqrt();

    for m in 0..=degree {
        // P(m, m) = (2m-1)!! u^m
        let mut p_mm = 1.0;
        for k in 0..m {
            p_mm *= (2 * k + 1) as f64 * u;
        }
        p[m][m] = p_mm;
        if m < degree {
            p[m + 1][m] = x * (2 * m + 1) as f64 * p_mm;
        }
        for n in (m + 2)..=degree {
            p[n][m] = ((2 * n - 1) as f64 * x * p[n - 1][m] - (n + m - 1) as f64 * p[n - 2][m])
                / (n - m) as f64;
        }
    }

    for (n, row) in p.iter_mut().enumerate() {
        for (m, p_nm) in row.iter_mut().enumerate().take(n + 1) {
            // (n-m)! / (n+m)!
            let ratio = ((n - m + 1)..=(n + m)).fold(1.0_f64, |acc, k| acc / k as f64);
            let delta = if m == 0 { 1.0 } else { 2.0 };
            *p_nm *= (delta * (2 * n + 1) as f64 * ratio).sqrt();
        }
    }
    p
}

/// IGS SSR single layer VTEC model
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SsrVtec {
    /// Model layers
    pub layers: Vec<VtecLayer>,
}

impl SsrVtec {
    /// Slant TEC (TECu) along the line of sight from `rx` to a satellite
    /// located at `sat_ecef` (meters), at epoch `t`.
    pub fn stec_tecu(&self, t: Epoch, rx: &ReferencePosition, sat_ecef: Vector3<f64>) -> f64 {
        let (elev, azim) = rx.elevation_azimuth_rad(sat_ecef);
        if elev <= 0.0 {
            return 0.0;
        }

        let geo = rx.geodetic();
        let (lat, long) = (geo[0], geo[1]);

        let tow_s = t.to_time_scale(TimeScale::GPST).to_time_of_week().1 as f64 / 1.0E9;
        let t_s = tow_s % SECONDS_PER_DAY;

        let mut stec = 0.0;
        for layer in self.layers.iter() {
            let psi = PI / 2.0
                - elev
                - (EARTH_MEAN_RADIUS_M / (EARTH_MEAN_RADIUS_M + layer.height_m) * elev.cos())
                    .asin();

            let lat_pp = (lat.sin() * psi.cos() + lat.cos() * psi.sin() * azim.cos()).asin();

            let arg = (psi.sin() * azim.sin() / lat_pp.cos()).asin();
            let crosses_pole = (lat >= 0.0 && psi.tan() * azim.cos() > (PI / 2.0 - lat).tan())
                || (lat < 0.0 && -psi.tan() * azim.cos() > (PI / 2.0 + lat).tan());

            let long_pp = if crosses_pole {
                long + PI - arg
            } else {
                long + arg
            };

            let long_sun_fixed = (long_pp + (t_s - 50400.0) * PI / 43200.0).rem_euclid(2.0 * PI);

            stec += layer.vtec(lat_pp, long_sun_fixed) / (elev + psi).sin();
        }
        stec
    }

    /// Ionospheric delay (meters) at `frequency_hz`, along the line of sight
    /// from `rx` to a satellite located at `sat_ecef` (meters), at epoch `t`.
    pub fn slant_delay_m(
        &self,
        t: Epoch,
        rx: &ReferencePosition,
        sat_ecef: Vector3<f64>,
        frequency_hz: f64,
    ) -> f64 {
        IONOSPHERE_K * self.stec_tecu(t, rx, sat_ecef) / frequency_hz.powi(2)
    }
}

/// Timestamped [SsrVtec] model, as received from the correction stream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VtecSnapshot {
    /// Reference time of this snapshot
    pub time: Epoch,
    /// True once the model was actually received
    pub received: bool,
    /// Model
    pub model: SsrVtec,
}

impl VtecSnapshot {
    /// Age of this snapshot with respect to `now`, in seconds
    pub fn age_s(&self, now: Epoch) -> f64 {
        (now - self.time).to_seconds()
    }
}
