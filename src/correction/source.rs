use crate::{
    bias::{iono::VtecSnapshot, BiasTable, SsrBiasSnapshot},
    correction::{ClockCorrection, OrbitCorrection, SsrEpoch},
    ephemeris::EphemerisVersion,
};

/// Any correction product provider should implement the [CorrectionSource] trait.
///
/// Each method is invoked once per epoch, at the very beginning of the epoch,
/// and may block for as long as the fetch takes. Returned collections
/// replace the previously cached products.
pub trait CorrectionSource {
    /// Latest ionosphere VTEC snapshot, if any was received.
    fn vtec(&mut self) -> Option<VtecSnapshot>;

    /// Latest SSR clock correction epochs. Only the first three are retained,
    /// in the order they are provided: this does not have to be chronological.
    fn clock_corrections(&mut self) -> Vec<SsrEpoch<ClockCorrection>>;

    /// Latest SSR orbit correction epochs. Only the first three are retained,
    /// in the order they are provided: this does not have to be chronological.
    fn orbit_corrections(&mut self) -> Vec<SsrEpoch<OrbitCorrection>>;

    /// Code bias table, per signal and vehicle.
    fn code_biases(&mut self) -> BiasTable;

    /// Phase bias table, per signal and vehicle.
    fn phase_biases(&mut self) -> BiasTable;

    /// SSR code biases. These are retained but not applied at the moment.
    fn ssr_code_biases(&mut self) -> Option<SsrBiasSnapshot> {
        None
    }

    /// SSR phase biases. These are retained but not applied at the moment.
    fn ssr_phase_biases(&mut self) -> Option<SsrBiasSnapshot> {
        None
    }

    /// Retained broadcast ephemeris versions, most relevant first.
    fn ephemerides(&mut self) -> Vec<EphemerisVersion>;
}
