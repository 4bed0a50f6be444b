#![doc = include_str!("../README.md")]
#![cfg_attr(docrs, feature(doc_cfg))]

extern crate gnss_rs as gnss;

// private modules
mod bias;
mod cfg;
mod constants;
mod correction;
mod eligibility;
mod engine;
mod ephemeris;
mod error;
mod freshness;
mod observation;
mod orbit;
mod position;
mod signal;
mod system;
mod windup;

#[cfg(test)]
mod tests;

// prelude
pub mod prelude {
    pub use crate::bias::{
        beidou_code_correction_m, bias_ns_to_m, BiasTable, IggTropGrid, IggTropNode,
        SsrBiasSnapshot, SsrVtec, TropoModel, TropoRuntime, TroposphereModel, VtecLayer,
        VtecSnapshot,
    };
    pub use crate::cfg::{BeidouExclusion, Config, SignalRequest, SystemRequest};
    pub use crate::constants::SPEED_OF_LIGHT_M_S;
    pub use crate::correction::{
        ClockCorrection, CorrectionCache, CorrectionSource, OrbitCorrection, SsrEpoch,
        SystemSnapshot, MAX_SSR_EPOCHS,
    };
    pub use crate::eligibility::Rejection;
    pub use crate::engine::Engine;
    pub use crate::ephemeris::{Ephemeris, EphemerisVersion, PrnTable, MAX_EPHEMERIS_VERSIONS};
    pub use crate::error::Error;
    pub use crate::freshness::{freshness_gate, FreshnessReport};
    pub use crate::observation::{
        snr_from_elevation, CorrectionTerms, EpochSummary, MessageType, ObservationEncoder,
        ObservationRecord, SignalObservation, LOCK_TIME_ENABLED, MAX_SNR,
    };
    pub use crate::orbit::PreciseState;
    pub use crate::position::{ConstantUndulation, GeoidModel, NullGeoid, ReferencePosition};
    pub use crate::signal::{BeidouBand, RtcmCode, SignalCode};
    pub use crate::system::{System, NUM_SYSTEMS};
    pub use crate::windup::PhaseWindUpTracker;
    // re-export
    pub use gnss::prelude::{Constellation, SV};
    pub use hifitime::{Duration, Epoch, TimeScale};
    pub use nalgebra::Vector3;
}

// pub export
pub use cfg::Error as ConfigError;
pub use error::Error;
