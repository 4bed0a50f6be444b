//! Epoch generation engine
use log::{debug, error, info, trace, warn};

use crate::{
    bias::{
        beidou_code_correction_m, bias_ns_to_m, SsrVtec, TropoRuntime, TroposphereModel,
    },
    cfg::{Config, SignalRequest, SystemRequest},
    constants::SPEED_OF_LIGHT_M_S,
    correction::{CorrectionCache, CorrectionSource},
    eligibility::{elevation_mask, screen, Candidate, Rejection},
    error::Error,
    freshness::freshness_gate,
    observation::{
        snr_from_elevation, CorrectionTerms, EpochSummary, ObservationEncoder, ObservationRecord,
        LOCK_TIME_ENABLED,
    },
    orbit::PreciseSolver,
    position::{GeoidModel, ReferencePosition},
    prelude::{Epoch, TimeScale},
    signal::{RtcmCode, SignalCode},
    system::System,
    windup::PhaseWindUpTracker,
};

use hifitime::Unit;

/// Day of year, starting at 1 on January 1st
fn day_of_year(t: Epoch) -> f64 {
    let (year, _, _, _, _, _, _) = t.to_gregorian_utc();
    let start = Epoch::from_gregorian_utc_at_midnight(year, 1, 1);
    (t - start).to_unit(Unit::Day).floor() + 1.0
}

/// Everything one satellite is synthesized from, that does not
/// depend on the satellite itself.
struct EpochContext<'a> {
    cfg: &'a Config,
    now: Epoch,
    reference: &'a ReferencePosition,
    cache: &'a CorrectionCache,
    vtec: &'a SsrVtec,
    tropo: &'a dyn TroposphereModel,
    site: TropoRuntime,
}

impl EpochContext<'_> {
    /// Observed code (m): both atmospheric delays are added
    fn code_m(&self, terms: &CorrectionTerms, bias_m: f64, iono_m: f64) -> f64 {
        terms.range_m - terms.clock_bias_m + bias_m + iono_m + terms.tropo_m
    }

    /// Observed phase (cycles): ionosphere advances the carrier
    fn phase_cycles(
        &self,
        terms: &CorrectionTerms,
        bias_m: f64,
        iono_m: f64,
        frequency_hz: f64,
        offset_cycles: f64,
    ) -> f64 {
        let wavelength_m = SPEED_OF_LIGHT_M_S / frequency_hz;
        (terms.range_m - terms.clock_bias_m + bias_m - iono_m + terms.tropo_m) / wavelength_m
            + self.cfg.phase_ambiguity_cycles
            + offset_cycles
            + terms.windup_cycles
    }

    /// Synthesizes one accepted satellite
    fn synthesize(
        &self,
        candidate: &Candidate,
        request: &SystemRequest,
        primary: SignalCode,
        windup: &mut PhaseWindUpTracker,
    ) -> Result<(ObservationRecord, CorrectionTerms), Rejection> {
        let (system, prn) = (candidate.system, candidate.prn);
        let sv = system.sv(prn);
        let rx = self.reference.ecef();

        let solver = PreciseSolver {
            system,
            ephemeris: candidate.ephemeris,
            orbit: candidate.orbit,
            clock: candidate.clock,
        };

        let state = solver
            .solve(self.now, rx)
            .ok_or(Rejection::InvalidGeometry)?;

        let range_m = state.range_m(rx);
        if state.is_nan() || range_m.is_nan() {
            error!(
                "{}({}) - invalid precise state: position={:?} clock={}m (orbit ref={}, clock ref={})",
                self.now, sv, state.position, state.clock_bias_m, candidate.orbit.1, candidate.clock.1,
            );
            return Err(Rejection::InvalidGeometry);
        }

        let (elevation_rad, _) = self.reference.elevation_azimuth_rad(state.position);
        elevation_mask(self.cfg, elevation_rad)?;
        let elevation_deg = elevation_rad.to_degrees();

        let (f1, f2) = (system.f1_hz(), system.f2_hz());
        let iono_f1_m = self
            .vtec
            .slant_delay_m(self.now, self.reference, state.position, f1);

        let tropo_m = self.tropo.delay_m(&TropoRuntime {
            elevation_deg,
            ..self.site
        });

        let bds_m = if system == System::BeiDou {
            beidou_code_correction_m(prn, elevation_deg, primary)
        } else {
            0.0
        };

        let windup_cycles = if self.cfg.phase_windup {
            windup.update(self.now, system, prn, self.reference, state.position_tx)
        } else {
            windup.value(system, prn)
        };

        let terms = CorrectionTerms {
            range_m,
            clock_bias_m: state.clock_bias_m,
            code_bias_m: bias_ns_to_m(candidate.code_bias_ns),
            iono_f1_m,
            iono_f2_m: iono_f1_m * (f1 * f1 / (f2 * f2)),
            tropo_m,
            bds_m,
            windup_cycles,
            elevation_rad,
        };

        let snr = snr_from_elevation(elevation_rad);

        let mut record = ObservationRecord {
            sv,
            epoch: self.now,
            ..Default::default()
        };

        let l1 = &mut record.signals[0];
        l1.pseudo_range_m = self.code_m(&terms, terms.code_bias_m, iono_f1_m) - bds_m;
        l1.snr = snr;
        l1.code = RtcmCode::from_request(Some(primary), system, prn);

        if self.cfg.enable_phase_observations {
            if let Some(bias_ns) = self.cache.phase_bias_ns(primary, prn) {
                l1.phase_cycles =
                    self.phase_cycles(&terms, bias_ns_to_m(bias_ns), iono_f1_m, f1, 0.0);
                l1.lock_time = LOCK_TIME_ENABLED;
            }
        }

        if self.cfg.enable_secondary_frequency {
            let secondary = request
                .secondary
                .filter(|code| code.system() == system);

            if let Some(secondary) = secondary {
                if let Some(bias_ns) = self.cache.code_bias_ns(secondary, prn) {
                    let l2 = &mut record.signals[1];
                    l2.pseudo_range_m =
                        self.code_m(&terms, bias_ns_to_m(bias_ns), terms.iono_f2_m);
                    l2.snr = snr;
                    l2.code = RtcmCode::from_request(Some(secondary), system, prn);

                    if self.cfg.enable_phase_observations {
                        if let Some(bias_ns) = self.cache.phase_bias_ns(secondary, prn) {
                            l2.phase_cycles = self.phase_cycles(
                                &terms,
                                bias_ns_to_m(bias_ns),
                                terms.iono_f2_m,
                                f2,
                                self.cfg.secondary_phase_offset_cycles,
                            );
                            l2.lock_time = LOCK_TIME_ENABLED;
                        }
                    }
                }
            }
        }

        if !record.is_finite() {
            error!(
                "{}({}) - invalid observation: P1={}m tropo={}m iono={}m bds={}m windup={}",
                self.now, sv, record.signals[0].pseudo_range_m, tropo_m, iono_f1_m, bds_m, windup_cycles,
            );
            return Err(Rejection::InvalidObservation);
        }

        Ok((record, terms))
    }
}

/// [Engine] synthesizes the observations a physical receiver would make at
/// a fixed reference position, from the correction products it caches.
/// One [Engine] serves one reference position: it owns the phase wind-up
/// states and the observation buffer of that position.
#[derive(Debug, Clone)]
pub struct Engine {
    /// [Config]
    cfg: Config,
    /// [ReferencePosition]
    reference: ReferencePosition,
    /// Latest correction products
    cache: CorrectionCache,
    /// Phase wind-up states
    windup: PhaseWindUpTracker,
    /// Observation buffer, zeroed on every epoch
    buffer: Vec<ObservationRecord>,
    /// Correction terms of each accepted satellite
    terms: Vec<CorrectionTerms>,
    /// Accepted satellites
    summary: EpochSummary,
    /// Epoch counter
    epochs: u32,
    /// True when the latest epoch may be published
    publishable: bool,
}

impl Engine {
    /// Builds a new [Engine] for this [ReferencePosition].
    pub fn new(reference: ReferencePosition, cfg: Config) -> Self {
        info!("new engine at {}", reference);
        Self {
            buffer: vec![ObservationRecord::default(); cfg.max_observations],
            terms: Vec::with_capacity(cfg.max_observations),
            cfg,
            reference,
            cache: CorrectionCache::default(),
            windup: PhaseWindUpTracker::default(),
            summary: EpochSummary::default(),
            epochs: 0,
            publishable: false,
        }
    }

    /// Resets all internal states. The cached correction products are kept.
    pub fn reset(&mut self) {
        self.windup.reset_all();
        self.clear_buffer();
        self.epochs = 0;
    }

    fn clear_buffer(&mut self) {
        self.buffer
            .iter_mut()
            .for_each(|record| *record = ObservationRecord::default());
        self.terms.clear();
        self.summary = EpochSummary::default();
        self.publishable = false;
    }

    /// Fetches the latest correction products. Blocks for as long
    /// as the [CorrectionSource] does.
    pub fn refresh(&mut self, source: &mut dyn CorrectionSource) {
        self.cache.refresh(source);
    }

    /// Cached correction products
    pub fn cache(&self) -> &CorrectionCache {
        &self.cache
    }

    /// [Config] of this [Engine]
    pub fn cfg(&self) -> &Config {
        &self.cfg
    }

    /// [ReferencePosition] of this [Engine]
    pub fn reference(&self) -> &ReferencePosition {
        &self.reference
    }

    /// Observations of the latest epoch, in acceptance order.
    pub fn observations(&self) -> &[ObservationRecord] {
        &self.buffer[..self.summary.total]
    }

    /// Complete observation buffer: slots past the accepted
    /// satellites are zeroed.
    pub fn buffer(&self) -> &[ObservationRecord] {
        &self.buffer
    }

    /// Correction terms of each record returned by [Self::observations].
    pub fn corrections(&self) -> &[CorrectionTerms] {
        &self.terms
    }

    /// Accepted satellites of the latest epoch
    pub fn summary(&self) -> &EpochSummary {
        &self.summary
    }

    /// Current phase wind-up (cycles) of this vehicle
    pub fn windup(&self, system: System, prn: u8) -> f64 {
        self.windup.value(system, prn)
    }

    /// Runs one epoch at current system time, see [Self::run_epoch_at].
    pub fn run_epoch(
        &mut self,
        request: &SignalRequest,
        tropo: &dyn TroposphereModel,
        geoid: &dyn GeoidModel,
    ) -> Result<EpochSummary, Error> {
        let now = Epoch::now()
            .map_err(Error::SystemTime)?
            .to_time_scale(TimeScale::GPST);
        self.run_epoch_at(now, request, tropo, geoid)
    }

    fn is_status_epoch(&self) -> bool {
        self.cfg.status_period <= 1 || self.epochs % self.cfg.status_period == 1
    }

    /// Runs one epoch at `now`: freshness gate, then every requested
    /// satellite goes through the filter stages, is synthesized and
    /// stored in acceptance order.
    /// The epoch is publishable when at least [Config::min_satellites]
    /// were accepted. Phase wind-up states are updated either way.
    pub fn run_epoch_at(
        &mut self,
        now: Epoch,
        request: &SignalRequest,
        tropo: &dyn TroposphereModel,
        geoid: &dyn GeoidModel,
    ) -> Result<EpochSummary, Error> {
        self.epochs = self.epochs.wrapping_add(1);
        let status = self.is_status_epoch();

        self.clear_buffer();

        if status {
            info!("{} - epoch #{}", now, self.epochs);
        }

        if let Err(e) = request.validate() {
            error!("{} - {}", now, e);
            return Err(Error::InvalidRequest(e));
        }

        let report = match freshness_gate(&self.cfg, &self.cache, now) {
            Ok(report) => report,
            Err(e) => {
                match &e {
                    Error::IonosphereNotReceived | Error::StaleIonosphere(_) => {
                        warn!("{} - {}: phase windup reset", now, e);
                        self.windup.reset_all();
                    },
                    _ => {
                        if status {
                            info!("{} - {}", now, e);
                        }
                    },
                }
                return Err(e);
            },
        };

        if status {
            info!("{} - vtec age: {:.1}s", now, report.vtec_age_s);
            for system in System::ALL {
                if !report.is_viable(system) {
                    info!("{} - {} ssr corrections too old", now, system);
                }
            }
        }

        let (lat, long, height_m) = self.reference.orthometric(geoid);
        let site = TropoRuntime {
            long_deg: long.rem_euclid(2.0 * std::f64::consts::PI).to_degrees(),
            lat_deg: lat.to_degrees(),
            height_km: height_m / 1.0E3,
            day_of_year: day_of_year(now),
            elevation_deg: 0.0,
        };

        // gate guarantees a received model
        let empty = SsrVtec::default();
        let vtec = self.cache.vtec().map(|vtec| &vtec.model).unwrap_or(&empty);

        let ctx = EpochContext {
            cfg: &self.cfg,
            now,
            reference: &self.reference,
            cache: &self.cache,
            vtec,
            tropo,
            site,
        };

        let capacity = self.buffer.len();
        let mut full = false;

        for system in System::ALL {
            let sys_request = request.system(system);
            let primary = match sys_request.primary {
                Some(primary) if sys_request.is_active() => primary,
                _ => {
                    debug!("{} - {} not requested", now, system);
                    continue;
                },
            };

            for prn in system.prns() {
                if self.summary.total == capacity {
                    if !full {
                        warn!(
                            "{} - observation buffer is full ({}): skipping remaining satellites",
                            now, capacity
                        );
                        full = true;
                    }
                    self.windup.reset(system, prn);
                    continue;
                }

                let outcome = screen(&self.cfg, &self.cache, system, prn, primary, now)
                    .and_then(|candidate| {
                        ctx.synthesize(&candidate, sys_request, primary, &mut self.windup)
                    });

                match outcome {
                    Ok((record, terms)) => {
                        if status {
                            debug!(
                                "{}({}) - P1={:.3}m range={:.3}m clk={:.3}m tropo={:.4}m iono={:.5}m elev={:.2}°",
                                now,
                                record.sv,
                                record.signals[0].pseudo_range_m,
                                terms.range_m,
                                terms.clock_bias_m,
                                terms.tropo_m,
                                terms.iono_f1_m,
                                terms.elevation_rad.to_degrees(),
                            );
                        }

                        self.buffer[self.summary.total] = record;
                        self.terms.push(terms);
                        self.summary.accept(system);
                    },
                    Err(rejection) => {
                        self.windup.reset(system, prn);
                        if status {
                            debug!("{}({}{:02}) - {}", now, system, prn, rejection);
                        } else {
                            trace!("{}({}{:02}) - {}", now, system, prn, rejection);
                        }
                    },
                }
            }
        }

        if status {
            info!(
                "{} - GPS: {} GAL: {} BDS: {}",
                now,
                self.summary.count(System::GPS),
                self.summary.count(System::Galileo),
                self.summary.count(System::BeiDou)
            );
        }

        if self.summary.total < self.cfg.min_satellites {
            if status {
                info!("{} - not enough satellites ({})", now, self.summary.total);
            }
            return Err(Error::NotEnoughSatellites(self.summary.total));
        }

        self.publishable = true;
        Ok(self.summary)
    }

    /// Hands the latest epoch over to the [ObservationEncoder], when it
    /// is publishable. Returns true when the encoder was invoked.
    pub fn dispatch(&self, encoder: &mut dyn ObservationEncoder) -> bool {
        if !self.publishable {
            return false;
        }
        encoder.encode(
            &self.summary.message_types(),
            &self.summary,
            self.observations(),
            &self.reference,
        );
        true
    }
}
