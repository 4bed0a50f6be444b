//! Epoch wide freshness gate
use log::{debug, warn};

use crate::{
    cfg::Config,
    correction::CorrectionCache,
    error::Error,
    prelude::Epoch,
    system::{System, NUM_SYSTEMS},
};

/// Outcome of the [freshness_gate], when the epoch may proceed.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct FreshnessReport {
    /// Age of the ionosphere model (s)
    pub vtec_age_s: f64,
    /// Youngest SSR clock snapshot age, per [System] (s)
    pub clock_age_s: [Option<f64>; NUM_SYSTEMS],
    /// Youngest SSR orbit snapshot age, per [System] (s)
    pub orbit_age_s: [Option<f64>; NUM_SYSTEMS],
    /// True when both clock and orbit corrections of this [System] are fresh
    pub viable: [bool; NUM_SYSTEMS],
}

impl FreshnessReport {
    /// True when this [System] may produce satellites
    pub fn is_viable(&self, system: System) -> bool {
        self.viable[system.index()]
    }
}

/// Decides whether the epoch at `now` may proceed, from the age of the
/// correction products currently cached.
/// The ionosphere model must be received and not older than
/// [Config::vtec_max_latency_s]. At least one [System] must have both
/// clock and orbit corrections within [Config::ssr_max_latency_s].
pub fn freshness_gate(
    cfg: &Config,
    cache: &CorrectionCache,
    now: Epoch,
) -> Result<FreshnessReport, Error> {
    let vtec = cache
        .vtec()
        .filter(|vtec| vtec.received)
        .ok_or(Error::IonosphereNotReceived)?;

    let vtec_age_s = vtec.age_s(now);
    if vtec_age_s > cfg.vtec_max_latency_s {
        warn!("{} - ionosphere model too old ({:.1}s)", now, vtec_age_s);
        return Err(Error::StaleIonosphere(vtec_age_s));
    }

    let mut report = FreshnessReport {
        vtec_age_s,
        ..Default::default()
    };

    for system in System::ALL {
        let i = system.index();
        let clock = cache.clock_age_s(system, now);
        let orbit = cache.orbit_age_s(system, now);

        report.clock_age_s[i] = clock;
        report.orbit_age_s[i] = orbit;

        report.viable[i] = match (clock, orbit) {
            (Some(clock), Some(orbit)) => {
                clock <= cfg.ssr_max_latency_s && orbit <= cfg.ssr_max_latency_s
            },
            _ => false,
        };

        if !report.viable[i] {
            debug!(
                "{} - {} ssr corrections too old (clock={:?}s, orbit={:?}s)",
                now, system, clock, orbit
            );
        }
    }

    if report.viable.iter().all(|viable| !viable) {
        return Err(Error::StaleCorrections);
    }

    Ok(report)
}
