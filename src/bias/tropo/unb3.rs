use super::TropoRuntime;
use log::trace;
use std::f64::consts::PI;

#[derive(Copy, Clone, Debug)]
enum UNB3Param {
    // pressure in mBar
    Pressure = 0,
    // temperature in Kelvin
    Temperature = 1,
    // water vapour pressure in mBar
    WaterVapourPressure = 2,
    // beta is temperature lapse rate (Kelvin/m)
    Beta = 3,
    // lambda is wvp height factor (N/A)
    Lambda = 4,
}

/// Latitude bands of the UNB3 tables (degrees)
const LAT_BANDS: [f64; 5] = [15.0, 30.0, 45.0, 60.0, 75.0];

const AVERAGE: [[f64; 5]; 5] = [
    [1013.25, 299.65, 26.31, 6.30E-3, 2.77],
    [1017.25, 294.15, 21.79, 6.05E-3, 3.15],
    [1015.75, 283.15, 11.66, 5.58E-3, 2.57],
    [1011.75, 272.15, 6.78, 5.39E-3, 1.81],
    [1013.00, 263.65, 4.11, 4.53E-3, 1.55],
];

const AMPLITUDE: [[f64; 5]; 5] = [
    [0.0, 0.0, 0.0, 0.0, 0.0],
    [-3.75, 7.0, 8.85, 0.25E-3, 0.33],
    [-2.25, 11.0, 7.24, 0.32E-3, 0.46],
    [-1.75, 15.0, 5.36, 0.81E-3, 0.74],
    [-0.50, 14.5, 3.39, 0.62E-3, 0.3],
];

/// Linear interpolation of one table column, at absolute latitude
fn interpolate(table: &[[f64; 5]; 5], prm: UNB3Param, abs_lat_deg: f64) -> f64 {
    let col = prm as usize;
    if abs_lat_deg <= LAT_BANDS[0] {
        return table[0][col];
    }
    if abs_lat_deg >= LAT_BANDS[4] {
        return table[4][col];
    }
    let upper = LAT_BANDS
        .iter()
        .position(|band| *band > abs_lat_deg)
        .unwrap_or(4);
    let lower = upper - 1;
    table[lower][col]
        + (table[upper][col] - table[lower][col]) / 15.0_f64 * (abs_lat_deg - LAT_BANDS[lower])
}

fn unb3_parameter(prm: UNB3Param, lat_deg: f64, day_of_year: f64) -> f64 {
    let dmin = if lat_deg.is_sign_negative() {
        211.0_f64
    } else {
        28.0_f64
    };
    let annual = interpolate(&AVERAGE, prm, lat_deg.abs());
    let amplitude = interpolate(&AMPLITUDE, prm, lat_deg.abs());
    annual - amplitude * ((day_of_year - dmin) * 2.0_f64 * PI / 365.25_f64).cos()
}

/// Evaluates (ZWD, ZDD) in meters, at given day of year, latitude and height.
/// Works at any date, for any latitude.
pub(crate) fn unb3_model(rtm: &TropoRuntime) -> (f64, f64) {
    const K_1: f64 = 77.604;
    const K_2: f64 = 382000.0_f64;
    const R_D: f64 = 287.054;
    const G: f64 = 9.80665_f64;
    const G_M: f64 = 9.784_f64;

    let (lat_deg, doy) = (rtm.lat_deg, rtm.day_of_year);
    let h = rtm.height_km * 1.0E3;

    let beta = unb3_parameter(UNB3Param::Beta, lat_deg, doy);
    let p = unb3_parameter(UNB3Param::Pressure, lat_deg, doy);
    let lambda = unb3_parameter(UNB3Param::Lambda, lat_deg, doy);
    let temp = unb3_parameter(UNB3Param::Temperature, lat_deg, doy);
    let e = unb3_parameter(UNB3Param::WaterVapourPressure, lat_deg, doy);

    let z0_zdd = 1.0E-6 * K_1 * R_D * p / G_M;
    let denom = (lambda + 1.0_f64) * G_M - beta * R_D;
    let z0_zwd = 1.0E-6 * K_2 * R_D * e / temp / denom;
    let value = 1.0_f64 - beta * h / temp;

    let zdd = value.powf(G / R_D / beta) * z0_zdd;
    let zwd = value.powf((lambda + 1.0_f64) * G / R_D / beta - 1.0_f64) * z0_zwd;

    trace!(
        "unb3 - [beta: {:.3}, p: {:.3}, temp: {:.3}, e: {:.3}, lambda: {:.3}] zdd(h={:.3}) {:.3} zwd {:.3}",
        beta, p, temp, e, lambda, h, zdd, zwd,
    );

    (zwd, zdd)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn band_interpolation() {
        let p = interpolate(&AVERAGE, UNB3Param::Pressure, 37.5);
        assert!((p - (1017.25 + 1015.75) / 2.0).abs() < 1.0E-9);
        assert_eq!(interpolate(&AVERAGE, UNB3Param::Pressure, 0.0), 1013.25);
        assert_eq!(interpolate(&AVERAGE, UNB3Param::Pressure, 89.0), 1013.00);
        assert_eq!(interpolate(&AVERAGE, UNB3Param::Pressure, 30.0), 1017.25);
    }

    #[test]
    fn height_reduces_delay() {
        let mut rtm = TropoRuntime {
            lat_deg: 45.0,
            day_of_year: 200.0,
            elevation_deg: 90.0,
            ..Default::default()
        };
        let (zwd0, zdd0) = unb3_model(&rtm);
        assert!(zdd0 > 2.2 && zdd0 < 2.4);
        assert!(zwd0 > 0.0 && zwd0 < 0.5);

        rtm.height_km = 2.0;
        let (zwd, zdd) = unb3_model(&rtm);
        assert!(zdd < zdd0);
        assert!(zwd < zwd0);
    }
}
