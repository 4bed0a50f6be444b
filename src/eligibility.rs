//! Per satellite eligibility filter
use itertools::Itertools;
use thiserror::Error;

use crate::{
    cfg::Config,
    correction::{ClockCorrection, CorrectionCache, OrbitCorrection},
    ephemeris::Ephemeris,
    prelude::Epoch,
    signal::SignalCode,
    system::System,
};

/// Reasons for one satellite to be excluded from one epoch.
/// These never abort the epoch: the satellite is skipped
/// and its phase wind-up is reset.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Rejection {
    #[error("beidou geo/igso vehicle")]
    BeidouExcluded,
    #[error("no fresh ssr orbit and clock corrections")]
    NoCorrection,
    #[error("no code bias for {0}")]
    NoCodeBias(SignalCode),
    #[error("iod {iod} does not match any ephemeris (iode: {iodes})")]
    IodMismatch { iod: u16, iodes: String },
    #[error("ephemeris too old: toc is {0:.1}s away")]
    EphemerisTooOld(f64),
    #[error("unhealthy vehicle (health={0})")]
    Unhealthy(u8),
    #[error("below elevation mask ({0:.2}°)")]
    BelowElevationMask(f64),
    #[error("invalid geometry")]
    InvalidGeometry,
    #[error("invalid observation")]
    InvalidObservation,
}

/// Satellite that passed every data driven filter stage,
/// with the products it will be synthesized from.
#[derive(Debug, Clone)]
pub(crate) struct Candidate<'a> {
    pub system: System,
    pub prn: u8,
    pub ephemeris: &'a Ephemeris,
    pub orbit: (&'a OrbitCorrection, Epoch),
    pub clock: (&'a ClockCorrection, Epoch),
    pub code_bias_ns: f64,
}

/// Runs the static exclusion, correction match, bias availability
/// and ephemeris stages, in that order.
pub(crate) fn screen<'a>(
    cfg: &Config,
    cache: &'a CorrectionCache,
    system: System,
    prn: u8,
    primary: SignalCode,
    now: Epoch,
) -> Result<Candidate<'a>, Rejection> {
    if system == System::BeiDou && cfg.beidou_exclusion.excludes(prn) {
        return Err(Rejection::BeidouExcluded);
    }

    let orbit = cache.select_orbit(system, prn, now, cfg.ssr_max_latency_s);
    let clock = cache.select_clock(system, prn, now, cfg.ssr_max_latency_s);
    let (Some(orbit), Some(clock)) = (orbit, clock) else {
        return Err(Rejection::NoCorrection);
    };

    let code_bias_ns = cache
        .code_bias_ns(primary, prn)
        .ok_or(Rejection::NoCodeBias(primary))?;

    let iod = orbit.0.iod;
    let ephemeris = cache
        .match_ephemeris(system, prn, iod)
        .ok_or_else(|| Rejection::IodMismatch {
            iod,
            iodes: cache
                .ephemeris_iodes(system, prn)
                .iter()
                .map(|iode| match iode {
                    Some(iode) => iode.to_string(),
                    None => "-".to_string(),
                })
                .join(" "),
        })?;

    let age_s = ephemeris.toc_age_s(now);
    if age_s > cfg.ephemeris_max_age_s {
        return Err(Rejection::EphemerisTooOld(age_s));
    }

    if !ephemeris.is_healthy() {
        return Err(Rejection::Unhealthy(ephemeris.health));
    }

    Ok(Candidate {
        system,
        prn,
        ephemeris,
        orbit,
        clock,
        code_bias_ns,
    })
}

/// Elevation mask stage: satellites at or below the mask are rejected.
pub(crate) fn elevation_mask(cfg: &Config, elevation_rad: f64) -> Result<(), Rejection> {
    let elevation_deg = elevation_rad.to_degrees();
    if elevation_deg <= cfg.elevation_mask_deg {
        Err(Rejection::BelowElevationMask(elevation_deg))
    } else {
        Ok(())
    }
}
