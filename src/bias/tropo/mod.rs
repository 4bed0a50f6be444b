use crate::cfg::Error;
use map_3d::deg2rad;

mod igg;
mod unb3;

pub use igg::{IggTropGrid, IggTropNode};

/// Geometry and date of one troposphere evaluation
#[derive(Default, Copy, Clone, Debug, PartialEq)]
pub struct TropoRuntime {
    /// Receiver longitude in [0, 360) degrees
    pub long_deg: f64,
    /// Receiver latitude (degrees)
    pub lat_deg: f64,
    /// Receiver orthometric height (km)
    pub height_km: f64,
    /// Day of year, starting at 1
    pub day_of_year: f64,
    /// Satellite elevation (degrees)
    pub elevation_deg: f64,
}

/// Troposphere delay provider.
pub trait TroposphereModel {
    /// Slant delay (meters) for this evaluation
    fn delay_m(&self, rtm: &TropoRuntime) -> f64;
}

/// Zenith to slant mapping function
pub(crate) fn mapping(elevation_deg: f64) -> f64 {
    1.001_f64 / (0.002001_f64 + deg2rad(elevation_deg).sin().powi(2)).sqrt()
}

/// Empirical troposphere models that do not need any external data
#[derive(Default, Copy, Clone, Debug, PartialEq)]
pub enum TropoModel {
    #[default]
    Niel,
    UNB3,
}

impl std::str::FromStr for TropoModel {
    type Err = Error;
    fn from_str(s: &str) -> Result<TropoModel, Error> {
        let c = s.trim().to_lowercase();
        match c.as_str() {
            "niel" => Ok(TropoModel::Niel),
            "unb3" => Ok(TropoModel::UNB3),
            _ => Err(Error::UnknownTropoModel(c.to_string())),
        }
    }
}

fn niel_model(rtm: &TropoRuntime) -> f64 {
    const NS: f64 = 324.8;

    let elev = deg2rad(rtm.elevation_deg);
    let h_km = rtm.height_km;

    let f = if rtm.elevation_deg < 90.0 {
        1.0_f64 / (elev.sin() + 0.00143 / (elev.tan() + 0.0455))
    } else {
        1.0
    };

    let delta_n = -7.32 * (0.005577 * NS).exp();

    let delta_r =
        (NS + 0.5 * delta_n - NS * h_km - 0.5 * delta_n * h_km.powi(2) + 1430.0 + 732.0) * 0.001;

    f * delta_r
}

impl TroposphereModel for TropoModel {
    fn delay_m(&self, rtm: &TropoRuntime) -> f64 {
        match self {
            Self::Niel => niel_model(rtm),
            Self::UNB3 => {
                let (zwd, zdd) = unb3::unb3_model(rtm);
                (zwd + zdd) * mapping(rtm.elevation_deg)
            },
        }
    }
}
