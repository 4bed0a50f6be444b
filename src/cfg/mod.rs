use thiserror::Error;

use crate::{signal::SignalCode, system::System};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

mod request;
pub use request::{SignalRequest, SystemRequest};

/// Configuration Error
#[derive(Debug, PartialEq, Error)]
pub enum Error {
    #[error("unknown tropo model \"{0}\"")]
    UnknownTropoModel(String),
    #[error("unknown signal code \"{0}\"")]
    UnknownSignalCode(String),
    #[error("troposphere grid expects {0} nodes, got {1}")]
    InvalidTropoGrid(usize, usize),
    #[error("{0} signal requested for {1}")]
    SignalSystemMismatch(SignalCode, System),
}

fn default_ssr_latency() -> f64 {
    200.0
}

fn default_vtec_latency() -> f64 {
    600.0
}

fn default_ephemeris_age() -> f64 {
    7200.0 + 120.0
}

fn default_elevation_mask() -> f64 {
    10.0
}

fn default_ambiguity() -> f64 {
    15.0
}

fn default_secondary_phase_offset() -> f64 {
    2.0
}

fn default_phase_observations() -> bool {
    false
}

fn default_secondary_frequency() -> bool {
    false
}

fn default_phase_windup() -> bool {
    false
}

fn default_min_satellites() -> usize {
    4
}

fn default_status_period() -> u32 {
    60
}

fn default_max_observations() -> usize {
    96
}

/// BeiDou GEO and IGSO vehicles we never synthesize. This is a fixed
/// constellation rule, it does not depend on the correction products.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BeidouExclusion {
    /// PRNs lower or equal to this are excluded
    pub max_geo_low: u8,
    /// Individually excluded PRNs
    pub single: Vec<u8>,
    /// PRNs greater or equal to this are excluded
    pub min_geo_high: u8,
}

impl Default for BeidouExclusion {
    fn default() -> Self {
        Self {
            max_geo_low: 5,
            single: vec![18],
            min_geo_high: 59,
        }
    }
}

impl BeidouExclusion {
    /// True if this BeiDou PRN must be excluded
    pub fn excludes(&self, prn: u8) -> bool {
        prn <= self.max_geo_low || prn >= self.min_geo_high || self.single.contains(&prn)
    }
}

/// Engine configuration.
/// Default values match the production service.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    /// Maximal age of SSR clock and orbit corrections, in seconds.
    #[cfg_attr(feature = "serde", serde(default = "default_ssr_latency"))]
    pub ssr_max_latency_s: f64,
    /// Maximal age of the VTEC snapshot, in seconds.
    /// Older ionosphere data aborts the whole epoch.
    #[cfg_attr(feature = "serde", serde(default = "default_vtec_latency"))]
    pub vtec_max_latency_s: f64,
    /// Maximal distance between the epoch and the ephemeris time of clock, in seconds.
    #[cfg_attr(feature = "serde", serde(default = "default_ephemeris_age"))]
    pub ephemeris_max_age_s: f64,
    /// Elevation mask, in degrees. Satellites at or below this angle are rejected.
    #[cfg_attr(feature = "serde", serde(default = "default_elevation_mask"))]
    pub elevation_mask_deg: f64,
    /// Integer ambiguity (cycles) added to synthesized phase observations.
    #[cfg_attr(feature = "serde", serde(default = "default_ambiguity"))]
    pub phase_ambiguity_cycles: f64,
    /// Extra ambiguity offset (cycles) on the secondary frequency.
    #[cfg_attr(feature = "serde", serde(default = "default_secondary_phase_offset"))]
    pub secondary_phase_offset_cycles: f64,
    /// Synthesize carrier phase observations. When turned off,
    /// phase and lock time are zeroed and the encoder disregards them.
    #[cfg_attr(feature = "serde", serde(default = "default_phase_observations"))]
    pub enable_phase_observations: bool,
    /// Synthesize observations on the secondary frequency as well.
    #[cfg_attr(feature = "serde", serde(default = "default_secondary_frequency"))]
    pub enable_secondary_frequency: bool,
    /// Evaluate the phase wind-up model for accepted satellites.
    /// When turned off, wind-up terms remain null.
    #[cfg_attr(feature = "serde", serde(default = "default_phase_windup"))]
    pub phase_windup: bool,
    /// Minimal number of accepted satellites for one epoch to be published.
    #[cfg_attr(feature = "serde", serde(default = "default_min_satellites"))]
    pub min_satellites: usize,
    /// Status report period, in epochs.
    #[cfg_attr(feature = "serde", serde(default = "default_status_period"))]
    pub status_period: u32,
    /// Capacity of the observation buffer.
    #[cfg_attr(feature = "serde", serde(default = "default_max_observations"))]
    pub max_observations: usize,
    /// BeiDou static exclusion rule
    #[cfg_attr(feature = "serde", serde(default))]
    pub beidou_exclusion: BeidouExclusion,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ssr_max_latency_s: default_ssr_latency(),
            vtec_max_latency_s: default_vtec_latency(),
            ephemeris_max_age_s: default_ephemeris_age(),
            elevation_mask_deg: default_elevation_mask(),
            phase_ambiguity_cycles: default_ambiguity(),
            secondary_phase_offset_cycles: default_secondary_phase_offset(),
            enable_phase_observations: default_phase_observations(),
            enable_secondary_frequency: default_secondary_frequency(),
            phase_windup: default_phase_windup(),
            min_satellites: default_min_satellites(),
            status_period: default_status_period(),
            max_observations: default_max_observations(),
            beidou_exclusion: BeidouExclusion::default(),
        }
    }
}

impl Config {
    /// Returns [Config] with carrier phase synthesis turned on,
    /// on both frequencies, including phase wind-up modeling.
    pub fn phase_preset() -> Self {
        Self {
            enable_phase_observations: true,
            enable_secondary_frequency: true,
            phase_windup: true,
            ..Default::default()
        }
    }
}
