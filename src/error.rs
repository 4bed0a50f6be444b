use thiserror::Error;

use hifitime::HifitimeError;

use crate::cfg::Error as ConfigError;

/// Reasons for one epoch not to be published.
/// Every one of them is a regular outcome of a degraded correction stream,
/// not a programming error.
#[derive(Debug, PartialEq, Error)]
pub enum Error {
    /// The ionosphere model was never received: the whole epoch is aborted
    /// and every phase wind-up state is reset.
    #[error("ionosphere model not received")]
    IonosphereNotReceived,

    /// The ionosphere model is older than tolerated: the whole epoch is aborted
    /// and every phase wind-up state is reset.
    #[error("ionosphere model too old ({0:.1}s)")]
    StaleIonosphere(f64),

    /// SSR clock or orbit corrections are too old for every [System](crate::prelude::System):
    /// no satellite could be synthesized.
    #[error("ssr corrections too old for all systems")]
    StaleCorrections,

    /// Not enough satellites passed all filters.
    #[error("not enough satellites ({0})")]
    NotEnoughSatellites(usize),

    /// A signal was requested for a [System](crate::prelude::System) it does not belong to.
    /// Nothing is synthesized.
    #[error("invalid signal request: {0}")]
    InvalidRequest(ConfigError),

    /// Failed to determine current time from the system clock
    #[error("system time error: {0}")]
    SystemTime(HifitimeError),
}
