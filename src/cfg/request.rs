use super::Error;
use crate::{
    signal::SignalCode,
    system::{System, NUM_SYSTEMS},
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Signals requested for one [System]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SystemRequest {
    /// System is requested by the client
    pub enabled: bool,
    /// Primary frequency signal. A system without primary signal is not processed.
    pub primary: Option<SignalCode>,
    /// Secondary frequency signal
    pub secondary: Option<SignalCode>,
}

impl SystemRequest {
    /// True when this [SystemRequest] should be processed
    pub fn is_active(&self) -> bool {
        self.enabled && self.primary.is_some()
    }
}

/// [SignalRequest] describes which systems and signals the
/// client wants to receive.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SignalRequest {
    systems: [SystemRequest; NUM_SYSTEMS],
}

impl SignalRequest {
    /// Builds a new empty [SignalRequest]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests `system` with given primary and optional secondary signals.
    pub fn with_system(
        mut self,
        system: System,
        primary: SignalCode,
        secondary: Option<SignalCode>,
    ) -> Self {
        self.systems[system.index()] = SystemRequest {
            enabled: true,
            primary: Some(primary),
            secondary,
        };
        self
    }

    /// Overwrites the [SystemRequest] for `system`
    pub fn with_system_request(mut self, system: System, request: SystemRequest) -> Self {
        self.systems[system.index()] = request;
        self
    }

    /// [SystemRequest] for this [System]
    pub fn system(&self, system: System) -> &SystemRequest {
        &self.systems[system.index()]
    }

    /// Verifies that every requested signal belongs to the
    /// [System] it is requested for.
    pub fn validate(&self) -> Result<(), Error> {
        for system in System::ALL {
            let request = self.system(system);
            for code in [request.primary, request.secondary].into_iter().flatten() {
                if code.system() != system {
                    return Err(Error::SignalSystemMismatch(code, system));
                }
            }
        }
        Ok(())
    }

    /// Requests GPS C1C/C2W, Galileo C1C/C7Q and BeiDou C2I/C7.
    pub fn triple_system() -> Self {
        Self::new()
            .with_system(System::GPS, SignalCode::GpsC1C, Some(SignalCode::GpsC2W))
            .with_system(System::Galileo, SignalCode::GalC1C, Some(SignalCode::GalC7Q))
            .with_system(System::BeiDou, SignalCode::BdsC2I, Some(SignalCode::BdsC7))
    }
}
