use crate::prelude::{Config, Engine, NullGeoid, System, TropoModel, MAX_SNR};
use crate::tests::{init_logger, request, SatelliteSetup, Scenario};

use crate::observation::snr_from_elevation;

use rand::{rngs::SmallRng, Rng, SeedableRng};

/// Random constellation, some vehicles being below the horizon
fn random_scenario(rng: &mut SmallRng) -> Scenario {
    let mut scenario = Scenario::new();
    for (system, prns) in [
        (System::GPS, 1..=12),
        (System::Galileo, 1..=8),
        (System::BeiDou, 19..=30),
    ] {
        for prn in prns {
            let mut setup = SatelliteSetup::new(system, prn, rng.random_range(-80.0..80.0));
            setup.clock_m = rng.random_range(-5.0..5.0);
            setup.secondary_bias = rng.random_bool(0.8);
            setup.phase_bias = rng.random_bool(0.8);
            scenario = scenario.with(setup);
        }
    }
    scenario
}

fn run(engine: &mut Engine, scenario: &Scenario) {
    let _ = engine.run_epoch_at(scenario.now, &request(), &TropoModel::Niel, &NullGeoid);
}

#[test]
fn identical_inputs_identical_epochs() {
    init_logger();

    let mut rng = SmallRng::seed_from_u64(0x5eed);

    for _ in 0..8 {
        let scenario = random_scenario(&mut rng);

        let mut a = scenario.engine(Config::phase_preset());
        let mut b = scenario.engine(Config::phase_preset());

        run(&mut a, &scenario);
        run(&mut b, &scenario);

        assert_eq!(a.summary(), b.summary());
        assert_eq!(a.observations(), b.observations());
        assert_eq!(a.corrections(), b.corrections());
        assert!(a.summary().total > 0);

        // same epoch again: wind-up is continuous
        run(&mut a, &scenario);
        assert_eq!(a.summary(), b.summary());
        assert_eq!(a.observations(), b.observations());
    }
}

#[test]
fn signal_strength_bounds() {
    init_logger();

    let mut rng = SmallRng::seed_from_u64(42);
    let cfg = Config {
        min_satellites: 1,
        ..Default::default()
    };

    for _ in 0..8 {
        let scenario = random_scenario(&mut rng);
        let mut engine = scenario.engine(cfg.clone());
        run(&mut engine, &scenario);

        for (record, terms) in engine.observations().iter().zip(engine.corrections()) {
            let snr = record.signals[0].snr;
            assert!(snr <= MAX_SNR);
            assert_eq!(snr, snr_from_elevation(terms.elevation_rad));
            assert!(terms.elevation_rad.to_degrees() > cfg.elevation_mask_deg);
        }
    }

    for elevation_deg in (0..=90).step_by(5) {
        let snr = snr_from_elevation((elevation_deg as f64).to_radians());
        assert!(snr >= 164 && snr <= MAX_SNR, "{}° -> {}", elevation_deg, snr);
    }
}
