//! BeiDou-2 satellite induced code bias (elevation dependent multipath
//! of the IGSO and MEO vehicles), tabulated every 10° of elevation.
use crate::signal::{BeidouBand, SignalCode};

/// BDS-2 IGSO vehicles
const IGSO: [u8; 7] = [6, 7, 8, 9, 10, 13, 16];

/// BDS-2 MEO vehicles
const MEO: [u8; 3] = [11, 12, 14];

const IGSO_B1: [f64; 10] = [-0.55, -0.40, -0.34, -0.23, -0.15, -0.04, 0.09, 0.19, 0.27, 0.35];
const IGSO_B2: [f64; 10] = [-0.71, -0.36, -0.33, -0.19, -0.14, -0.03, 0.08, 0.17, 0.24, 0.33];
const IGSO_B3: [f64; 10] = [-0.27, -0.23, -0.21, -0.15, -0.11, -0.04, 0.05, 0.14, 0.19, 0.32];

const MEO_B1: [f64; 10] = [-0.47, -0.38, -0.32, -0.23, -0.11, 0.06, 0.34, 0.69, 0.97, 1.05];
const MEO_B2: [f64; 10] = [-0.40, -0.31, -0.26, -0.18, -0.06, 0.09, 0.28, 0.48, 0.64, 0.69];
const MEO_B3: [f64; 10] = [-0.22, -0.15, -0.13, -0.10, -0.04, 0.05, 0.14, 0.27, 0.36, 0.47];

fn table(prn: u8, band: BeidouBand) -> Option<&'static [f64; 10]> {
    if IGSO.contains(&prn) {
        Some(match band {
            BeidouBand::B1 => &IGSO_B1,
            BeidouBand::B2 => &IGSO_B2,
            BeidouBand::B3 => &IGSO_B3,
        })
    } else if MEO.contains(&prn) {
        Some(match band {
            BeidouBand::B1 => &MEO_B1,
            BeidouBand::B2 => &MEO_B2,
            BeidouBand::B3 => &MEO_B3,
        })
    } else {
        None
    }
}

/// Code correction (meters) of this BeiDou vehicle, at given elevation
/// (degrees), on this signal. Null for BDS-3 vehicles and other systems.
pub fn beidou_code_correction_m(prn: u8, elevation_deg: f64, code: SignalCode) -> f64 {
    let Some(band) = code.beidou_band() else {
        return 0.0;
    };
    let Some(table) = table(prn, band) else {
        return 0.0;
    };

    let x = elevation_deg / 10.0;
    if x <= 0.0 {
        return table[0];
    }
    if x >= 9.0 {
        return table[9];
    }

    let i = x.floor() as usize;
    let frac = x - i as f64;
    table[i] * (1.0 - frac) + table[i + 1] * frac
}
