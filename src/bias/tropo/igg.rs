use std::f64::consts::PI;

use super::{mapping, TropoRuntime, TroposphereModel};
use crate::cfg::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Mean tropical year (days)
const YEAR_DAYS: f64 = 365.25;

/// One node of the [IggTropGrid]: sea level zenith delay expressed
/// as annual and semi-annual harmonics, and its height scaling.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IggTropNode {
    /// Mean zenith delay (m)
    pub a0: f64,
    /// Annual cosine term (m)
    pub a1: f64,
    /// Annual sine term (m)
    pub b1: f64,
    /// Semi-annual cosine term (m)
    pub a2: f64,
    /// Semi-annual sine term (m)
    pub b2: f64,
    /// Exponential scale height (km)
    pub scale_height_km: f64,
}

impl IggTropNode {
    /// Zenith delay (m) at this day of year and height (km)
    pub fn zenith_delay_m(&self, day_of_year: f64, height_km: f64) -> f64 {
        let w = 2.0 * PI * day_of_year / YEAR_DAYS;
        let sea_level = self.a0
            + self.a1 * w.cos()
            + self.b1 * w.sin()
            + self.a2 * (2.0 * w).cos()
            + self.b2 * (2.0 * w).sin();

        if self.scale_height_km > 0.0 {
            sea_level * (-height_km / self.scale_height_km).exp()
        } else {
            sea_level
        }
    }
}

/// Regional empirical troposphere grid. Nodes are stored latitude major,
/// starting at the south west corner. Positions outside of the grid use
/// the closest edge.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "IggTropGridFields"))]
pub struct IggTropGrid {
    /// Southern latitude (degrees)
    lat0_deg: f64,
    /// Western longitude in [0, 360) degrees
    long0_deg: f64,
    /// Grid spacing (degrees)
    step_deg: f64,
    /// Number of latitude rows
    n_lat: usize,
    /// Number of longitude columns
    n_long: usize,
    nodes: Vec<IggTropNode>,
}

/// Serialized form of the [IggTropGrid], validated on deserialization
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct IggTropGridFields {
    lat0_deg: f64,
    long0_deg: f64,
    step_deg: f64,
    n_lat: usize,
    n_long: usize,
    nodes: Vec<IggTropNode>,
}

#[cfg(feature = "serde")]
impl TryFrom<IggTropGridFields> for IggTropGrid {
    type Error = Error;
    fn try_from(fields: IggTropGridFields) -> Result<Self, Self::Error> {
        Self::new(
            fields.lat0_deg,
            fields.long0_deg,
            fields.step_deg,
            fields.n_lat,
            fields.n_long,
            fields.nodes,
        )
    }
}

impl IggTropGrid {
    /// Builds a new [IggTropGrid]
    pub fn new(
        lat0_deg: f64,
        long0_deg: f64,
        step_deg: f64,
        n_lat: usize,
        n_long: usize,
        nodes: Vec<IggTropNode>,
    ) -> Result<Self, Error> {
        let expected = n_lat * n_long;
        if expected == 0 || nodes.len() != expected || step_deg <= 0.0 {
            return Err(Error::InvalidTropoGrid(expected, nodes.len()));
        }
        Ok(Self {
            lat0_deg,
            long0_deg: long0_deg.rem_euclid(360.0),
            step_deg,
            n_lat,
            n_long,
            nodes,
        })
    }

    /// Single node grid, that applies everywhere
    pub fn uniform(node: IggTropNode) -> Self {
        Self {
            lat0_deg: 0.0,
            long0_deg: 0.0,
            step_deg: 1.0,
            n_lat: 1,
            n_long: 1,
            nodes: vec![node],
        }
    }

    fn node(&self, row: usize, col: usize) -> Option<&IggTropNode> {
        self.nodes.get(row * self.n_long + col)
    }

    /// Fractional grid coordinate, clamped to [0, n-1]
    fn axis(offset_deg: f64, step_deg: f64, n: usize) -> (usize, usize, f64) {
        let last = n.saturating_sub(1);
        let x = (offset_deg / step_deg).clamp(0.0, last as f64);
        if !x.is_finite() {
            return (0, 0, 0.0);
        }
        let i = (x.floor() as usize).min(last);
        let j = (i + 1).min(last);
        (i, j, x - i as f64)
    }

    /// Bilinear interpolation of the zenith delay (m).
    /// NaN when the grid has no node to interpolate.
    pub fn zenith_delay_m(&self, rtm: &TropoRuntime) -> f64 {
        let (r0, r1, fr) = Self::axis(rtm.lat_deg - self.lat0_deg, self.step_deg, self.n_lat);
        let long_offset = (rtm.long_deg - self.long0_deg).rem_euclid(360.0);
        let (c0, c1, fc) = Self::axis(long_offset, self.step_deg, self.n_long);

        let z = |row, col| {
            self.node(row, col)
                .map(|node| node.zenith_delay_m(rtm.day_of_year, rtm.height_km))
                .unwrap_or(f64::NAN)
        };

        (1.0 - fr) * ((1.0 - fc) * z(r0, c0) + fc * z(r0, c1))
            + fr * ((1.0 - fc) * z(r1, c0) + fc * z(r1, c1))
    }
}

impl TroposphereModel for IggTropGrid {
    fn delay_m(&self, rtm: &TropoRuntime) -> f64 {
        self.zenith_delay_m(rtm) * mapping(rtm.elevation_deg)
    }
}
