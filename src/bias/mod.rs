//! Atmospheric delays and hardware biases
use std::collections::HashMap;

use crate::{
    constants::SPEED_OF_LIGHT_M_S,
    ephemeris::PrnTable,
    prelude::Epoch,
    signal::SignalCode,
};

pub(crate) mod beidou;
pub(crate) mod iono;
pub(crate) mod tropo;

pub use beidou::beidou_code_correction_m;
pub use iono::{SsrVtec, VtecLayer, VtecSnapshot};
pub use tropo::{IggTropGrid, IggTropNode, TropoModel, TropoRuntime, TroposphereModel};

/// Converts a bias expressed in nanoseconds to meters of delay
pub fn bias_ns_to_m(bias_ns: f64) -> f64 {
    SPEED_OF_LIGHT_M_S * bias_ns * 1.0E-9
}

/// Code or phase bias table: per [SignalCode], per vehicle, in nanoseconds.
/// A vehicle missing from the table has no bias for that signal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BiasTable {
    inner: HashMap<SignalCode, PrnTable<f64>>,
}

impl BiasTable {
    /// Builds an empty [BiasTable]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores bias (ns) of this signal, for this vehicle
    pub fn insert(&mut self, code: SignalCode, prn: u8, bias_ns: f64) {
        self.inner
            .entry(code)
            .or_insert_with(|| PrnTable::new(code.system()))
            .insert(prn, bias_ns);
    }

    /// Stores bias (ns) of this signal, for this vehicle
    pub fn with(mut self, code: SignalCode, prn: u8, bias_ns: f64) -> Self {
        self.insert(code, prn, bias_ns);
        self
    }

    /// Bias (ns) of this signal, for this vehicle
    pub fn bias_ns(&self, code: SignalCode, prn: u8) -> Option<f64> {
        self.inner.get(&code)?.get(prn).copied()
    }
}

/// SSR bias snapshot, as broadcast in the correction stream.
#[derive(Debug, Clone, PartialEq)]
pub struct SsrBiasSnapshot {
    /// Reference time
    pub time: Epoch,
    /// Biases (ns)
    pub biases: BiasTable,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn bias_table() {
        let table = BiasTable::new()
            .with(SignalCode::GpsC1C, 3, 1.5)
            .with(SignalCode::GpsC1C, 99, 1.5);
        assert_eq!(table.bias_ns(SignalCode::GpsC1C, 3), Some(1.5));
        assert_eq!(table.bias_ns(SignalCode::GpsC1C, 4), None);
        assert_eq!(table.bias_ns(SignalCode::GpsC1C, 99), None);
        assert_eq!(table.bias_ns(SignalCode::GpsC2W, 3), None);
    }

    #[test]
    fn nanoseconds_to_meters() {
        assert!((bias_ns_to_m(1.0) - 0.299792458).abs() < 1.0E-12);
        assert_eq!(bias_ns_to_m(0.0), 0.0);
    }
}
