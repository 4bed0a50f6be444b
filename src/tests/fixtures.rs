//! Synthetic correction products: circular equatorial orbits
//! observed from an equatorial reference station.
use crate::{
    bias::{BiasTable, SsrVtec, VtecLayer, VtecSnapshot},
    cfg::{Config, SignalRequest},
    correction::{
        ClockCorrection, CorrectionSource, OrbitCorrection, SsrEpoch, SystemSnapshot,
    },
    engine::Engine,
    ephemeris::{Ephemeris, EphemerisVersion},
    observation::{EpochSummary, MessageType, ObservationEncoder, ObservationRecord},
    position::ReferencePosition,
    prelude::{Epoch, Vector3},
    signal::SignalCode,
    system::System,
};

use hifitime::Unit;

/// Orbital radius of every synthetic vehicle (m)
pub const ORBIT_RADIUS_M: f64 = 26_560_000.0;

/// Reference station, on the equator at Greenwich meridian
pub fn reference() -> ReferencePosition {
    ReferencePosition::from_ecef(Vector3::new(6378137.0, 0.0, 0.0))
}

/// Epoch of every scenario
pub fn scenario_epoch() -> Epoch {
    Epoch::from_gpst_seconds(2300.0 * 604800.0 + 2.0 * 86400.0 + 3600.0)
}

/// Signals we request in every scenario
pub fn request() -> SignalRequest {
    SignalRequest::triple_system()
}

/// Builds a circular equatorial [Ephemeris], that places this vehicle
/// above longitude `long_deg` at `now`.
pub fn circular_ephemeris(
    system: System,
    prn: u8,
    toe: Epoch,
    now: Epoch,
    long_deg: f64,
) -> Ephemeris {
    let mut eph = Ephemeris {
        sv: system.sv(prn),
        toe,
        toc: toe,
        semi_major_axis_m: ORBIT_RADIUS_M,
        ..Default::default()
    };

    let n = (system.gm_m3_s2() / ORBIT_RADIUS_M.powi(3)).sqrt();
    let omega_e = system.earth_rotation_rad_s();
    let t_k = (now - toe).to_seconds();

    eph.omega0_rad =
        long_deg.to_radians() - n * t_k + omega_e * t_k + omega_e * eph.weekly_toe_seconds(system);

    eph
}

/// Elevation (degrees) of a vehicle above longitude `long_deg`,
/// seen from the [reference] station.
pub fn expected_elevation_deg(long_deg: f64) -> f64 {
    let (sin_l, cos_l) = long_deg.to_radians().sin_cos();
    let ratio = 6378137.0 / ORBIT_RADIUS_M;
    (cos_l - ratio).atan2(sin_l.abs()).to_degrees()
}

/// Primary and secondary signals of this system, in every scenario
pub fn signals(system: System) -> (SignalCode, SignalCode) {
    match system {
        System::GPS => (SignalCode::GpsC1C, SignalCode::GpsC2W),
        System::Galileo => (SignalCode::GalC1C, SignalCode::GalC7Q),
        System::BeiDou => (SignalCode::BdsC2I, SignalCode::BdsC7),
    }
}

/// One synthetic vehicle and the products we publish for it
#[derive(Debug, Clone)]
pub struct SatelliteSetup {
    pub system: System,
    pub prn: u8,
    pub long_deg: f64,
    /// Broadcast IODE
    pub iode: u16,
    /// IOD the orbit correction refers to
    pub iod: u16,
    /// SSR orbit correction age, if any
    pub orbit_age_s: Option<f64>,
    /// SSR clock correction age, if any
    pub clock_age_s: Option<f64>,
    /// Distance between toc and scenario epoch
    pub toc_age_s: f64,
    pub health: u8,
    /// Publish a primary code bias
    pub code_bias: bool,
    /// Publish a secondary code bias
    pub secondary_bias: bool,
    /// Publish phase biases
    pub phase_bias: bool,
    /// SSR clock correction (m)
    pub clock_m: f64,
}

impl SatelliteSetup {
    pub fn new(system: System, prn: u8, long_deg: f64) -> Self {
        Self {
            system,
            prn,
            long_deg,
            iode: 10 + prn as u16,
            iod: 10 + prn as u16,
            orbit_age_s: Some(5.0),
            clock_age_s: Some(5.0),
            toc_age_s: 600.0,
            health: 0,
            code_bias: true,
            secondary_bias: true,
            phase_bias: true,
            clock_m: 0.5,
        }
    }

    /// Primary code bias (ns)
    pub fn code_bias_ns(&self) -> f64 {
        1.0 + self.prn as f64 * 0.1
    }

    /// Secondary code bias (ns)
    pub fn secondary_bias_ns(&self) -> f64 {
        -2.0 + self.prn as f64 * 0.05
    }

    /// Phase bias (ns), on both frequencies
    pub fn phase_bias_ns(&self) -> f64 {
        0.25
    }
}

/// One complete set of correction products
#[derive(Debug, Clone)]
pub struct Scenario {
    pub now: Epoch,
    /// Age of the ionosphere model, None when not received
    pub vtec_age_s: Option<f64>,
    pub satellites: Vec<SatelliteSetup>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            now: scenario_epoch(),
            vtec_age_s: Some(60.0),
            satellites: Vec::new(),
        }
    }
}

impl Scenario {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, setup: SatelliteSetup) -> Self {
        self.satellites.push(setup);
        self
    }

    pub fn with_satellite(self, system: System, prn: u8, long_deg: f64) -> Self {
        self.with(SatelliteSetup::new(system, prn, long_deg))
    }

    /// Two GPS, one Galileo and one BeiDou vehicles, all in sight
    pub fn nominal() -> Self {
        Self::new()
            .with_satellite(System::GPS, 1, 0.0)
            .with_satellite(System::GPS, 2, 30.0)
            .with_satellite(System::Galileo, 3, -45.0)
            .with_satellite(System::BeiDou, 30, 50.0)
    }

    /// Groups SSR data by age: one [SsrEpoch] per distinct age
    fn ssr_epochs<T: Clone>(
        &self,
        select: impl Fn(&SatelliteSetup) -> Option<(f64, T)>,
    ) -> Vec<SsrEpoch<T>> {
        let mut ages = Vec::<f64>::new();
        for sat in self.satellites.iter() {
            if let Some((age, _)) = select(sat) {
                if !ages.contains(&age) {
                    ages.push(age);
                }
            }
        }

        ages.iter()
            .map(|age| {
                let mut epoch = SsrEpoch::default();
                for system in System::ALL {
                    let t = self.now - *age * Unit::Second;
                    let mut snapshot = SystemSnapshot::new(system, t);
                    let mut populated = false;
                    for sat in self.satellites.iter().filter(|sat| sat.system == system) {
                        if let Some((sat_age, data)) = select(sat) {
                            if sat_age == *age {
                                snapshot = snapshot.with(sat.prn, data);
                                populated = true;
                            }
                        }
                    }
                    if populated {
                        epoch = epoch.with_system(system, snapshot);
                    }
                }
                epoch
            })
            .collect()
    }

    pub fn source(&self) -> FixtureSource {
        let vtec = self.vtec_age_s.map(|age| VtecSnapshot {
            time: self.now - age * Unit::Second,
            received: true,
            model: SsrVtec {
                layers: vec![VtecLayer::uniform(450.0E3, 10.0)],
            },
        });

        let orbit = self.ssr_epochs(|sat| {
            sat.orbit_age_s.map(|age| {
                (
                    age,
                    OrbitCorrection {
                        iod: sat.iod,
                        delta_rac_m: Vector3::new(0.1, -0.2, 0.05),
                        rate_rac_m_s: Vector3::new(1.0E-4, 0.0, 0.0),
                    },
                )
            })
        });

        let clock = self.ssr_epochs(|sat| {
            sat.clock_age_s.map(|age| {
                (
                    age,
                    ClockCorrection {
                        poly_m: (sat.clock_m, 1.0E-4, 0.0),
                    },
                )
            })
        });

        let mut code_biases = BiasTable::new();
        let mut phase_biases = BiasTable::new();
        let mut version = EphemerisVersion::default();

        for sat in self.satellites.iter() {
            let (primary, secondary) = signals(sat.system);
            if sat.code_bias {
                code_biases.insert(primary, sat.prn, sat.code_bias_ns());
            }
            if sat.secondary_bias {
                code_biases.insert(secondary, sat.prn, sat.secondary_bias_ns());
            }
            if sat.phase_bias {
                phase_biases.insert(primary, sat.prn, sat.phase_bias_ns());
                phase_biases.insert(secondary, sat.prn, sat.phase_bias_ns());
            }

            let toe = self.now - 600.0 * Unit::Second;
            let mut eph = circular_ephemeris(sat.system, sat.prn, toe, self.now, sat.long_deg);
            eph.iode = sat.iode;
            eph.health = sat.health;
            eph.toc = self.now - sat.toc_age_s * Unit::Second;
            version.insert(eph);
        }

        FixtureSource {
            vtec,
            clock,
            orbit,
            code_biases,
            phase_biases,
            // first version is empty: every version must be searched
            ephemerides: vec![EphemerisVersion::default(), version],
        }
    }

    /// Builds an [Engine] loaded with this scenario
    pub fn engine(&self, cfg: Config) -> Engine {
        let mut engine = Engine::new(reference(), cfg);
        engine.refresh(&mut self.source());
        engine
    }
}

/// [CorrectionSource] that serves fixed products
#[derive(Debug, Clone, Default)]
pub struct FixtureSource {
    pub vtec: Option<VtecSnapshot>,
    pub clock: Vec<SsrEpoch<ClockCorrection>>,
    pub orbit: Vec<SsrEpoch<OrbitCorrection>>,
    pub code_biases: BiasTable,
    pub phase_biases: BiasTable,
    pub ephemerides: Vec<EphemerisVersion>,
}

impl CorrectionSource for FixtureSource {
    fn vtec(&mut self) -> Option<VtecSnapshot> {
        self.vtec.clone()
    }
    fn clock_corrections(&mut self) -> Vec<SsrEpoch<ClockCorrection>> {
        self.clock.clone()
    }
    fn orbit_corrections(&mut self) -> Vec<SsrEpoch<OrbitCorrection>> {
        self.orbit.clone()
    }
    fn code_biases(&mut self) -> BiasTable {
        self.code_biases.clone()
    }
    fn phase_biases(&mut self) -> BiasTable {
        self.phase_biases.clone()
    }
    fn ephemerides(&mut self) -> Vec<EphemerisVersion> {
        self.ephemerides.clone()
    }
}

/// [ObservationEncoder] that records what it is handed
#[derive(Debug, Default)]
pub struct RecordingEncoder {
    pub message_types: Vec<MessageType>,
    pub summary: EpochSummary,
    pub records: Vec<ObservationRecord>,
    pub calls: usize,
}

impl ObservationEncoder for RecordingEncoder {
    fn encode(
        &mut self,
        message_types: &[MessageType],
        summary: &EpochSummary,
        records: &[ObservationRecord],
        _: &ReferencePosition,
    ) {
        self.message_types = message_types.to_vec();
        self.summary = *summary;
        self.records = records.to_vec();
        self.calls += 1;
    }
}

#[test]
fn fixture_geometry() {
    let now = scenario_epoch();
    let rx = reference();
    for (system, long_deg) in [
        (System::GPS, 0.0),
        (System::GPS, 30.0),
        (System::Galileo, -45.0),
        (System::BeiDou, 50.0),
        (System::GPS, 70.0),
    ] {
        let eph = circular_ephemeris(system, 1, now - 600.0 * Unit::Second, now, long_deg);
        let state = eph.resolve_state(now, system).unwrap();
        let (elev, _) = rx.elevation_azimuth_rad(state.position);
        let expected = expected_elevation_deg(long_deg);
        assert!(
            (elev.to_degrees() - expected).abs() < 0.1,
            "{}: {} != {}",
            system,
            elev.to_degrees(),
            expected
        );
    }
}
