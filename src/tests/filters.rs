use crate::prelude::{
    Config, CorrectionSource, Engine, IggTropGrid, IggTropNode, NullGeoid, OrbitCorrection,
    SsrEpoch, System, SystemSnapshot, TropoModel, TropoRuntime, TroposphereModel, Vector3,
};
use crate::tests::{init_logger, request, SatelliteSetup, Scenario};

use hifitime::Unit;
use rstest::*;

fn run(engine: &mut Engine, scenario: &Scenario) -> usize {
    let _ = engine.run_epoch_at(scenario.now, &request(), &TropoModel::Niel, &NullGeoid);
    engine.summary().total
}

fn accepted(engine: &Engine, system: System, prn: u8) -> bool {
    engine
        .observations()
        .iter()
        .any(|record| record.sv == system.sv(prn))
}

#[test]
fn beidou_exclusions() {
    init_logger();

    let scenario = Scenario::nominal()
        .with_satellite(System::BeiDou, 5, 10.0)
        .with_satellite(System::BeiDou, 18, 20.0)
        .with_satellite(System::BeiDou, 59, -10.0)
        .with_satellite(System::BeiDou, 19, -20.0);

    let mut engine = scenario.engine(Config::default());
    assert_eq!(run(&mut engine, &scenario), 5);
    assert_eq!(engine.summary().count(System::BeiDou), 2);

    assert!(accepted(&engine, System::BeiDou, 19));
    assert!(accepted(&engine, System::BeiDou, 30));
    for prn in [5, 18, 59] {
        assert!(!accepted(&engine, System::BeiDou, prn), "C{:02}", prn);
    }
}

/// One way of degrading the products of a single vehicle
#[derive(Debug, Copy, Clone)]
enum Degradation {
    MissingOrbit,
    MissingClock,
    StaleOrbit,
    StaleClock,
    LatencyLimit,
    MissingCodeBias,
    IodMismatch,
    EphemerisTooOld,
    Unhealthy,
    LowElevation,
}

impl Degradation {
    fn apply(&self, setup: &mut SatelliteSetup) {
        match self {
            Self::MissingOrbit => setup.orbit_age_s = None,
            Self::MissingClock => setup.clock_age_s = None,
            Self::StaleOrbit => setup.orbit_age_s = Some(250.0),
            Self::StaleClock => setup.clock_age_s = Some(250.0),
            Self::LatencyLimit => setup.orbit_age_s = Some(200.0),
            Self::MissingCodeBias => setup.code_bias = false,
            Self::IodMismatch => setup.iod = setup.iode + 1,
            Self::EphemerisTooOld => setup.toc_age_s = 7400.0,
            Self::Unhealthy => setup.health = 1,
            Self::LowElevation => setup.long_deg = 70.0,
        }
    }
}

#[rstest]
#[case(Degradation::MissingOrbit)]
#[case(Degradation::MissingClock)]
#[case(Degradation::StaleOrbit)]
#[case(Degradation::StaleClock)]
#[case(Degradation::LatencyLimit)]
#[case(Degradation::MissingCodeBias)]
#[case(Degradation::IodMismatch)]
#[case(Degradation::EphemerisTooOld)]
#[case(Degradation::Unhealthy)]
#[case(Degradation::LowElevation)]
fn rejection_resets_windup(#[case] degradation: Degradation) {
    init_logger();

    let mut scenario = Scenario::nominal().with_satellite(System::GPS, 4, 20.0);

    let mut engine = scenario.engine(Config::phase_preset());
    assert_eq!(run(&mut engine, &scenario), 5);
    assert!(accepted(&engine, System::GPS, 4));
    assert_ne!(engine.windup(System::GPS, 4), 0.0);

    let g02 = engine.windup(System::GPS, 2);

    for setup in scenario.satellites.iter_mut() {
        if setup.system == System::GPS && setup.prn == 4 {
            degradation.apply(setup);
        }
    }

    engine.refresh(&mut scenario.source());
    assert_eq!(run(&mut engine, &scenario), 4, "{:?}", degradation);
    assert!(!accepted(&engine, System::GPS, 4), "{:?}", degradation);
    assert_eq!(engine.windup(System::GPS, 4), 0.0, "{:?}", degradation);

    // other vehicles are not affected
    assert!(accepted(&engine, System::GPS, 2));
    assert_eq!(engine.windup(System::GPS, 2), g02);
}

#[test]
fn elevation_mask() {
    init_logger();

    // C30 is at ~27.7°
    let scenario = Scenario::nominal();

    let cfg = Config {
        elevation_mask_deg: 28.0,
        min_satellites: 1,
        ..Default::default()
    };
    let mut engine = scenario.engine(cfg);
    assert_eq!(run(&mut engine, &scenario), 3);
    assert!(!accepted(&engine, System::BeiDou, 30));

    let cfg = Config {
        elevation_mask_deg: 27.0,
        min_satellites: 1,
        ..Default::default()
    };
    let mut engine = scenario.engine(cfg);
    assert_eq!(run(&mut engine, &scenario), 4);
}

#[test]
fn ephemeris_in_future() {
    init_logger();

    let mut scenario = Scenario::nominal();
    for setup in scenario.satellites.iter_mut() {
        if setup.prn == 2 {
            // toc ahead of time, by less than tolerated
            setup.toc_age_s = -7000.0;
        }
    }

    let mut engine = scenario.engine(Config::default());
    assert_eq!(run(&mut engine, &scenario), 4);
}

#[test]
fn stale_slot_is_skipped() {
    init_logger();

    let scenario = Scenario::nominal();
    let mut source = scenario.source();

    // older correction, that would not match the broadcast IODE
    let stale = OrbitCorrection {
        iod: 99,
        ..Default::default()
    };
    source.orbit.insert(
        0,
        SsrEpoch::default().with_system(
            System::GPS,
            SystemSnapshot::new(System::GPS, scenario.now - 250.0 * Unit::Second).with(1, stale),
        ),
    );

    let mut engine = Engine::new(crate::tests::reference(), Config::default());
    engine.refresh(&mut source);
    assert_eq!(run(&mut engine, &scenario), 4);
    assert!(accepted(&engine, System::GPS, 1));

    // the first fresh slot wins
    let mut source = scenario.source();
    source.orbit.insert(
        0,
        SsrEpoch::default().with_system(
            System::GPS,
            SystemSnapshot::new(System::GPS, scenario.now - 1.0 * Unit::Second).with(1, stale),
        ),
    );

    engine.refresh(&mut source);
    assert_eq!(run(&mut engine, &scenario), 3);
    assert!(!accepted(&engine, System::GPS, 1));
}

#[test]
fn older_ephemeris_version() {
    init_logger();

    let scenario = Scenario::nominal();
    let mut source = scenario.source();

    // latest version carries another IODE for every vehicle:
    // the older version still matches
    let mut latest = source.ephemerides[1].clone();
    for setup in scenario.satellites.iter() {
        if let Some(eph) = latest.get(setup.system, setup.prn) {
            let mut eph = *eph;
            eph.iode += 100;
            latest.insert(eph);
        }
    }
    source.ephemerides = vec![latest, source.ephemerides[1].clone()];

    let mut engine = Engine::new(crate::tests::reference(), Config::default());
    engine.refresh(&mut source);
    assert_eq!(run(&mut engine, &scenario), 4);

    // missing every version
    source.ephemerides.clear();
    engine.refresh(&mut source);
    assert_eq!(run(&mut engine, &scenario), 0);
}

#[test]
fn ssr_biases_are_not_applied() {
    init_logger();

    let scenario = Scenario::nominal();
    let mut source = scenario.source();
    assert!(source.ssr_code_biases().is_none());
    assert!(source.ssr_phase_biases().is_none());

    let mut engine = Engine::new(crate::tests::reference(), Config::default());
    engine.refresh(&mut source);
    assert!(engine.cache().ssr_code_biases().is_none());
    assert_eq!(run(&mut engine, &scenario), 4);
}

/// Troposphere that cannot be evaluated below some elevation
struct UndefinedBelow(f64);

impl TroposphereModel for UndefinedBelow {
    fn delay_m(&self, rtm: &TropoRuntime) -> f64 {
        if rtm.elevation_deg < self.0 {
            f64::NAN
        } else {
            TropoModel::Niel.delay_m(rtm)
        }
    }
}

#[test]
fn invalid_observation_is_dropped() {
    init_logger();

    let scenario = Scenario::nominal();
    let cfg = Config {
        min_satellites: 1,
        ..Config::phase_preset()
    };

    let mut engine = scenario.engine(cfg);
    assert_eq!(run(&mut engine, &scenario), 4);
    assert_ne!(engine.windup(System::Galileo, 3), 0.0);
    assert_ne!(engine.windup(System::BeiDou, 30), 0.0);
    let g02 = engine.windup(System::GPS, 2);

    // E03 (~33.4°) and C30 (~27.7°) cannot be modeled
    let summary = engine
        .run_epoch_at(scenario.now, &request(), &UndefinedBelow(40.0), &NullGeoid)
        .unwrap();

    assert_eq!(summary.total, 2);
    assert!(accepted(&engine, System::GPS, 1));
    assert!(accepted(&engine, System::GPS, 2));
    assert!(!accepted(&engine, System::Galileo, 3));
    assert!(!accepted(&engine, System::BeiDou, 30));

    assert_eq!(engine.windup(System::Galileo, 3), 0.0);
    assert_eq!(engine.windup(System::BeiDou, 30), 0.0);
    assert_eq!(engine.windup(System::GPS, 2), g02);

    for record in engine.observations() {
        assert!(record.is_finite(), "{}", record.sv);
    }
}

#[test]
fn invalid_geometry_is_dropped() {
    init_logger();

    let scenario = Scenario::nominal();
    let mut engine = scenario.engine(Config::phase_preset());
    assert_eq!(run(&mut engine, &scenario), 4);
    assert_ne!(engine.windup(System::GPS, 2), 0.0);

    // freshest slot carries a corrupted orbit correction for G02
    let corrupted = OrbitCorrection {
        iod: SatelliteSetup::new(System::GPS, 2, 30.0).iod,
        delta_rac_m: Vector3::new(f64::NAN, 0.0, 0.0),
        ..Default::default()
    };

    let mut source = scenario.source();
    source.orbit.insert(
        0,
        SsrEpoch::default().with_system(
            System::GPS,
            SystemSnapshot::new(System::GPS, scenario.now - 1.0 * Unit::Second)
                .with(2, corrupted),
        ),
    );

    engine.refresh(&mut source);
    assert_eq!(run(&mut engine, &scenario), 3);
    assert!(!accepted(&engine, System::GPS, 2));
    assert!(accepted(&engine, System::GPS, 1));
    assert_eq!(engine.windup(System::GPS, 2), 0.0);
    assert_ne!(engine.windup(System::GPS, 1), 0.0);
}

#[test]
fn regional_troposphere_grid() {
    init_logger();

    let scenario = Scenario::nominal();
    let grid = IggTropGrid::uniform(IggTropNode {
        a0: 2.3,
        scale_height_km: 8.0,
        ..Default::default()
    });

    let mut engine = scenario.engine(Config::default());
    let summary = engine
        .run_epoch_at(scenario.now, &request(), &grid, &NullGeoid)
        .unwrap();
    assert_eq!(summary.total, 4);

    for terms in engine.corrections() {
        // station lies on the ellipsoid, the grid has no seasonal term
        let expected = grid.delay_m(&TropoRuntime {
            long_deg: 0.0,
            lat_deg: 0.0,
            height_km: 0.0,
            day_of_year: 1.0,
            elevation_deg: terms.elevation_rad.to_degrees(),
        });
        assert!((terms.tropo_m - expected).abs() < 1.0E-6);
        assert!(terms.tropo_m > 2.29);
    }
}
