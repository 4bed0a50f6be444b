//! Synthesized observations and their handoff to the protocol encoder
use std::f64::consts::PI;

use crate::{
    position::ReferencePosition,
    prelude::{Epoch, SV},
    signal::RtcmCode,
    system::{System, NUM_SYSTEMS},
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Lock time indicator of synthesized phase observations
pub const LOCK_TIME_ENABLED: u16 = 1000;

/// Highest SNR indicator we publish
pub const MAX_SNR: u8 = 200;

/// Maps elevation (radians) to the published SNR indicator
pub fn snr_from_elevation(elevation_rad: f64) -> u8 {
    let snr = ((72.0 * elevation_rad / (3.0 * PI)).floor() + 41.0) * 4.0;
    snr.clamp(0.0, MAX_SNR as f64) as u8
}

/// One signal of an [ObservationRecord]
#[derive(Debug, Copy, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SignalObservation {
    /// Pseudo range (m)
    pub pseudo_range_m: f64,
    /// Carrier phase (cycles), null when phase is not synthesized
    pub phase_cycles: f64,
    /// Doppler (Hz), never synthesized
    pub doppler_hz: f64,
    /// SNR indicator
    pub snr: u8,
    /// Loss of lock indicator, never set
    pub lli: u8,
    /// Lock time indicator: 0 without phase, [LOCK_TIME_ENABLED] otherwise
    pub lock_time: u16,
    /// Protocol code identifier
    pub code: RtcmCode,
}

/// Synthesized observations of one vehicle
#[derive(Debug, Copy, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ObservationRecord {
    /// [SV]
    pub sv: SV,
    /// Epoch of observation
    pub epoch: Epoch,
    /// Primary and secondary frequency signals
    pub signals: [SignalObservation; 2],
    /// Receiver index: always the single virtual receiver
    pub rcv: u8,
}

impl ObservationRecord {
    /// True when no code nor phase of this record is NaN or infinite
    pub fn is_finite(&self) -> bool {
        self.signals
            .iter()
            .all(|signal| signal.pseudo_range_m.is_finite() && signal.phase_cycles.is_finite())
    }
}

/// Correction terms that contributed to one [ObservationRecord]
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct CorrectionTerms {
    /// Geometric range (m)
    pub range_m: f64,
    /// Satellite clock bias (m)
    pub clock_bias_m: f64,
    /// Primary frequency code bias (m)
    pub code_bias_m: f64,
    /// Ionospheric delay on the primary frequency (m)
    pub iono_f1_m: f64,
    /// Ionospheric delay on the secondary frequency (m)
    pub iono_f2_m: f64,
    /// Tropospheric delay (m)
    pub tropo_m: f64,
    /// BeiDou satellite induced code bias (m)
    pub bds_m: f64,
    /// Phase wind-up (cycles)
    pub windup_cycles: f64,
    /// Elevation (radians)
    pub elevation_rad: f64,
}

/// Outgoing message types
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MessageType {
    /// Reference station and antenna
    Station,
    /// Observations of one [System]
    Observation(System),
}

impl MessageType {
    /// Protocol message number
    pub fn id(&self) -> u16 {
        match self {
            Self::Station => 1005,
            Self::Observation(System::GPS) => 1074,
            Self::Observation(System::Galileo) => 1094,
            Self::Observation(System::BeiDou) => 1124,
        }
    }
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Accepted satellites of one epoch
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EpochSummary {
    /// Total number of accepted satellites
    pub total: usize,
    /// Accepted satellites per [System]
    pub per_system: [usize; NUM_SYSTEMS],
}

impl EpochSummary {
    /// Accepted satellites of this [System]
    pub fn count(&self, system: System) -> usize {
        self.per_system[system.index()]
    }

    pub(crate) fn accept(&mut self, system: System) {
        self.total += 1;
        self.per_system[system.index()] += 1;
    }

    /// Message types to publish: one station message, then
    /// one observation message per [System] with at least one satellite.
    pub fn message_types(&self) -> Vec<MessageType> {
        let mut types = vec![MessageType::Station];
        types.extend(
            System::ALL
                .iter()
                .filter(|system| self.count(**system) > 0)
                .map(|system| MessageType::Observation(*system)),
        );
        types
    }
}

/// Downstream protocol encoder, that serializes one epoch.
pub trait ObservationEncoder {
    /// Encodes one successful epoch.
    fn encode(
        &mut self,
        message_types: &[MessageType],
        summary: &EpochSummary,
        records: &[ObservationRecord],
        reference: &ReferencePosition,
    );
}
