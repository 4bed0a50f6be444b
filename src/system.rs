//! Supported satellite systems
use crate::{
    constants::{
        EARTH_ANGULAR_VEL_CGCS2000_RAD, EARTH_ANGULAR_VEL_RAD, EARTH_GRAVITATION_GPS_M3_S2,
        EARTH_GRAVITATION_M3_S2, FREQ_B1I_HZ, FREQ_B2I_HZ, FREQ_E5B_HZ, FREQ_L1_HZ, FREQ_L2_HZ,
    },
    prelude::{Constellation, TimeScale, SV},
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of [System]s we synthesize observations for.
pub const NUM_SYSTEMS: usize = 3;

/// Satellite [System]s this engine synthesizes observations for.
/// The declaration order is also the processing order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum System {
    GPS,
    Galileo,
    BeiDou,
}

impl std::fmt::Display for System {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::GPS => write!(f, "G"),
            Self::Galileo => write!(f, "E"),
            Self::BeiDou => write!(f, "C"),
        }
    }
}

impl System {
    /// All [System]s, in processing order.
    pub const ALL: [Self; NUM_SYSTEMS] = [Self::GPS, Self::Galileo, Self::BeiDou];

    /// Index of this [System] in per-system tables
    pub const fn index(&self) -> usize {
        match self {
            Self::GPS => 0,
            Self::Galileo => 1,
            Self::BeiDou => 2,
        }
    }

    /// Highest PRN number we track for this [System]
    pub const fn max_prn(&self) -> u8 {
        match self {
            Self::GPS => 32,
            Self::Galileo => 36,
            Self::BeiDou => 63,
        }
    }

    /// Primary carrier frequency (Hz) used in atmospheric modeling
    pub const fn f1_hz(&self) -> f64 {
        match self {
            Self::GPS | Self::Galileo => FREQ_L1_HZ,
            Self::BeiDou => FREQ_B1I_HZ,
        }
    }

    /// Secondary carrier frequency (Hz) used in atmospheric modeling
    pub const fn f2_hz(&self) -> f64 {
        match self {
            Self::GPS => FREQ_L2_HZ,
            Self::Galileo => FREQ_E5B_HZ,
            Self::BeiDou => FREQ_B2I_HZ,
        }
    }

    /// Earth gravitational constant defined by this [System]'s ICD
    pub(crate) const fn gm_m3_s2(&self) -> f64 {
        match self {
            Self::GPS => EARTH_GRAVITATION_GPS_M3_S2,
            Self::Galileo | Self::BeiDou => EARTH_GRAVITATION_M3_S2,
        }
    }

    /// Earth angular velocity defined by this [System]'s ICD
    pub(crate) const fn earth_rotation_rad_s(&self) -> f64 {
        match self {
            Self::GPS | Self::Galileo => EARTH_ANGULAR_VEL_RAD,
            Self::BeiDou => EARTH_ANGULAR_VEL_CGCS2000_RAD,
        }
    }

    /// [TimeScale] in which this [System] broadcasts its ephemerides
    pub const fn timescale(&self) -> TimeScale {
        match self {
            Self::GPS => TimeScale::GPST,
            Self::Galileo => TimeScale::GST,
            Self::BeiDou => TimeScale::BDT,
        }
    }

    /// Converts to [Constellation]
    pub fn constellation(&self) -> Constellation {
        match self {
            Self::GPS => Constellation::GPS,
            Self::Galileo => Constellation::Galileo,
            Self::BeiDou => Constellation::BeiDou,
        }
    }

    /// Builds [SV] identity for this PRN
    pub fn sv(&self, prn: u8) -> SV {
        SV::new(self.constellation(), prn)
    }

    /// Iterates over all PRN numbers of this [System], in ascending order.
    pub fn prns(&self) -> impl Iterator<Item = u8> {
        1..=self.max_prn()
    }
}

impl TryFrom<Constellation> for System {
    type Error = Constellation;
    fn try_from(constellation: Constellation) -> Result<Self, Self::Error> {
        match constellation {
            Constellation::GPS => Ok(Self::GPS),
            Constellation::Galileo => Ok(Self::Galileo),
            Constellation::BeiDou => Ok(Self::BeiDou),
            other => Err(other),
        }
    }
}
