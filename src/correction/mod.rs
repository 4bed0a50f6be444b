//! Correction products cache
use log::debug;

use crate::{
    bias::{iono::VtecSnapshot, BiasTable, SsrBiasSnapshot},
    ephemeris::{Ephemeris, EphemerisVersion, PrnTable, MAX_EPHEMERIS_VERSIONS},
    prelude::{Epoch, Vector3},
    signal::SignalCode,
    system::{System, NUM_SYSTEMS},
};

mod source;
pub use source::CorrectionSource;

/// Number of SSR clock and orbit epochs we retain
pub const MAX_SSR_EPOCHS: usize = 3;

/// SSR orbit correction of one vehicle, in the radial,
/// along-track and cross-track frame.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct OrbitCorrection {
    /// Issue of data of the broadcast ephemeris this correction applies to
    pub iod: u16,
    /// Radial, along-track, cross-track position deltas (m)
    pub delta_rac_m: Vector3<f64>,
    /// Radial, along-track, cross-track velocity deltas (m/s)
    pub rate_rac_m_s: Vector3<f64>,
}

impl OrbitCorrection {
    /// Position deltas at `dt` seconds from the snapshot reference time
    pub fn delta_at(&self, dt: f64) -> Vector3<f64> {
        self.delta_rac_m + self.rate_rac_m_s * dt
    }
}

/// SSR clock correction of one vehicle, as a second order polynomial.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ClockCorrection {
    /// c0 (m), c1 (m/s), c2 (m/s²)
    pub poly_m: (f64, f64, f64),
}

impl ClockCorrection {
    /// Correction at `dt` seconds from the snapshot reference time (m)
    pub fn correction_m(&self, dt: f64) -> f64 {
        let (c0, c1, c2) = self.poly_m;
        c0 + c1 * dt + c2 * dt.powi(2)
    }
}

/// Per vehicle SSR data of one [System], at one reference time.
#[derive(Debug, Clone, PartialEq)]
pub struct SystemSnapshot<T> {
    /// Reference time of these corrections
    pub time: Epoch,
    /// Per vehicle corrections
    pub data: PrnTable<T>,
}

impl<T: Clone> SystemSnapshot<T> {
    /// Builds an empty [SystemSnapshot] for this [System]
    pub fn new(system: System, time: Epoch) -> Self {
        Self {
            time,
            data: PrnTable::new(system),
        }
    }

    /// Adds data for this PRN
    pub fn with(mut self, prn: u8, value: T) -> Self {
        self.data.insert(prn, value);
        self
    }
}

impl<T> SystemSnapshot<T> {
    /// Age of this snapshot with respect to `now`, in seconds
    pub fn age_s(&self, now: Epoch) -> f64 {
        (now - self.time).to_seconds()
    }
}

/// One SSR epoch: a [SystemSnapshot] per [System], each may be missing.
#[derive(Debug, Clone, PartialEq)]
pub struct SsrEpoch<T> {
    systems: [Option<SystemSnapshot<T>>; NUM_SYSTEMS],
}

impl<T> Default for SsrEpoch<T> {
    fn default() -> Self {
        Self {
            systems: [None, None, None],
        }
    }
}

impl<T> SsrEpoch<T> {
    /// Stores this [SystemSnapshot]
    pub fn with_system(mut self, system: System, snapshot: SystemSnapshot<T>) -> Self {
        self.systems[system.index()] = Some(snapshot);
        self
    }

    /// [SystemSnapshot] for this [System]
    pub fn system(&self, system: System) -> Option<&SystemSnapshot<T>> {
        self.systems[system.index()].as_ref()
    }
}

/// Searches every retained epoch, in storage order, for data of this vehicle
/// that is younger than `max_latency_s`. Returns the first match.
fn select<T>(
    epochs: &[SsrEpoch<T>],
    system: System,
    prn: u8,
    now: Epoch,
    max_latency_s: f64,
) -> Option<(&T, Epoch)> {
    epochs.iter().find_map(|epoch| {
        let snapshot = epoch.system(system)?;
        let data = snapshot.data.get(prn)?;
        if snapshot.age_s(now) < max_latency_s {
            Some((data, snapshot.time))
        } else {
            None
        }
    })
}

/// Youngest snapshot age of this [System], in seconds
fn freshest_age_s<T>(epochs: &[SsrEpoch<T>], system: System, now: Epoch) -> Option<f64> {
    epochs
        .iter()
        .filter_map(|epoch| epoch.system(system))
        .map(|snapshot| snapshot.age_s(now))
        .reduce(f64::min)
}

/// [CorrectionCache] stores the latest correction products, as provided
/// by the [CorrectionSource]. The engine only reads from it.
#[derive(Debug, Clone, Default)]
pub struct CorrectionCache {
    /// SSR clock corrections
    clock: Vec<SsrEpoch<ClockCorrection>>,
    /// SSR orbit corrections
    orbit: Vec<SsrEpoch<OrbitCorrection>>,
    /// Broadcast ephemeris versions
    ephemerides: Vec<EphemerisVersion>,
    /// Code biases
    code_bias: BiasTable,
    /// Phase biases
    phase_bias: BiasTable,
    /// SSR code biases: retained but not applied
    ssr_code_bias: Option<SsrBiasSnapshot>,
    /// SSR phase biases: retained but not applied
    ssr_phase_bias: Option<SsrBiasSnapshot>,
    /// Ionosphere model
    vtec: Option<VtecSnapshot>,
}

impl CorrectionCache {
    /// Fetches all products from the [CorrectionSource].
    /// Blocks for as long as the source does.
    pub fn refresh(&mut self, source: &mut dyn CorrectionSource) {
        self.vtec = source.vtec();
        self.clock = source.clock_corrections();
        self.clock.truncate(MAX_SSR_EPOCHS);
        self.orbit = source.orbit_corrections();
        self.orbit.truncate(MAX_SSR_EPOCHS);
        self.code_bias = source.code_biases();
        self.phase_bias = source.phase_biases();
        self.ssr_code_bias = source.ssr_code_biases();
        self.ssr_phase_bias = source.ssr_phase_biases();
        self.ephemerides = source.ephemerides();
        self.ephemerides.truncate(MAX_EPHEMERIS_VERSIONS);
        debug!(
            "correction cache: {} clock, {} orbit, {} ephemeris epochs",
            self.clock.len(),
            self.orbit.len(),
            self.ephemerides.len()
        );
    }

    /// Replaces the ionosphere snapshot
    pub fn with_vtec(mut self, vtec: VtecSnapshot) -> Self {
        self.vtec = Some(vtec);
        self
    }

    /// Appends one SSR clock epoch. Extra epochs are dropped.
    pub fn with_clock_epoch(mut self, epoch: SsrEpoch<ClockCorrection>) -> Self {
        if self.clock.len() < MAX_SSR_EPOCHS {
            self.clock.push(epoch);
        }
        self
    }

    /// Appends one SSR orbit epoch. Extra epochs are dropped.
    pub fn with_orbit_epoch(mut self, epoch: SsrEpoch<OrbitCorrection>) -> Self {
        if self.orbit.len() < MAX_SSR_EPOCHS {
            self.orbit.push(epoch);
        }
        self
    }

    /// Appends one ephemeris version. Extra versions are dropped.
    pub fn with_ephemeris_version(mut self, version: EphemerisVersion) -> Self {
        if self.ephemerides.len() < MAX_EPHEMERIS_VERSIONS {
            self.ephemerides.push(version);
        }
        self
    }

    /// Replaces the code bias table
    pub fn with_code_biases(mut self, table: BiasTable) -> Self {
        self.code_bias = table;
        self
    }

    /// Replaces the phase bias table
    pub fn with_phase_biases(mut self, table: BiasTable) -> Self {
        self.phase_bias = table;
        self
    }

    /// Ionosphere snapshot
    pub fn vtec(&self) -> Option<&VtecSnapshot> {
        self.vtec.as_ref()
    }

    /// Retained SSR code biases
    pub fn ssr_code_biases(&self) -> Option<&SsrBiasSnapshot> {
        self.ssr_code_bias.as_ref()
    }

    /// Retained SSR phase biases
    pub fn ssr_phase_biases(&self) -> Option<&SsrBiasSnapshot> {
        self.ssr_phase_bias.as_ref()
    }

    /// Youngest clock snapshot age of this [System], in seconds
    pub fn clock_age_s(&self, system: System, now: Epoch) -> Option<f64> {
        freshest_age_s(&self.clock, system, now)
    }

    /// Youngest orbit snapshot age of this [System], in seconds
    pub fn orbit_age_s(&self, system: System, now: Epoch) -> Option<f64> {
        freshest_age_s(&self.orbit, system, now)
    }

    /// Selects the [OrbitCorrection] of this vehicle and its reference time
    pub fn select_orbit(
        &self,
        system: System,
        prn: u8,
        now: Epoch,
        max_latency_s: f64,
    ) -> Option<(&OrbitCorrection, Epoch)> {
        select(&self.orbit, system, prn, now, max_latency_s)
    }

    /// Selects the [ClockCorrection] of this vehicle and its reference time
    pub fn select_clock(
        &self,
        system: System,
        prn: u8,
        now: Epoch,
        max_latency_s: f64,
    ) -> Option<(&ClockCorrection, Epoch)> {
        select(&self.clock, system, prn, now, max_latency_s)
    }

    /// Returns the first ephemeris version whose IODE matches `iod`
    pub fn match_ephemeris(&self, system: System, prn: u8, iod: u16) -> Option<&Ephemeris> {
        self.ephemerides
            .iter()
            .filter_map(|version| version.get(system, prn))
            .find(|eph| eph.iode == iod)
    }

    /// IODE of every retained version for this vehicle
    pub fn ephemeris_iodes(&self, system: System, prn: u8) -> Vec<Option<u16>> {
        self.ephemerides
            .iter()
            .map(|version| version.get(system, prn).map(|eph| eph.iode))
            .collect()
    }

    /// Code bias (ns) of this signal for this vehicle
    pub fn code_bias_ns(&self, code: SignalCode, prn: u8) -> Option<f64> {
        self.code_bias.bias_ns(code, prn)
    }

    /// Phase bias (ns) of this signal for this vehicle
    pub fn phase_bias_ns(&self, code: SignalCode, prn: u8) -> Option<f64> {
        self.phase_bias.bias_ns(code, prn)
    }
}
