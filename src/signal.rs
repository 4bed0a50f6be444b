use crate::{cfg::Error, system::System};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Signal (code) the service may be requested to synthesize.
/// This is also the key of the code and phase bias tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SignalCode {
    /// GPS L1 C/A
    GpsC1C,
    /// GPS L1 Z-tracking
    GpsC1W,
    /// GPS L2C
    GpsC2C,
    /// GPS L2 Z-tracking
    GpsC2W,
    /// GPS L2C (L)
    GpsC2L,
    /// Galileo E1 C
    GalC1C,
    /// Galileo E1 B+C
    GalC1X,
    /// Galileo E6 C
    GalC6C,
    /// Galileo E5a Q
    GalC5Q,
    /// Galileo E5a I+Q
    GalC5X,
    /// Galileo E5b Q
    GalC7Q,
    /// Galileo E5b I+Q
    GalC7X,
    /// BeiDou B1I
    BdsC2I,
    /// BeiDou B3I
    BdsC6I,
    /// BeiDou B2I (BDS-2) or B2b (BDS-3)
    BdsC7,
}

impl std::fmt::Display for SignalCode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::GpsC1C | Self::GalC1C => write!(f, "C1C"),
            Self::GpsC1W => write!(f, "C1W"),
            Self::GpsC2C => write!(f, "C2C"),
            Self::GpsC2W => write!(f, "C2W"),
            Self::GpsC2L => write!(f, "C2L"),
            Self::GalC1X => write!(f, "C1X"),
            Self::GalC6C => write!(f, "C6C"),
            Self::GalC5Q => write!(f, "C5Q"),
            Self::GalC5X => write!(f, "C5X"),
            Self::GalC7Q => write!(f, "C7Q"),
            Self::GalC7X => write!(f, "C7X"),
            Self::BdsC2I => write!(f, "C2I"),
            Self::BdsC6I => write!(f, "C6I"),
            Self::BdsC7 => write!(f, "C7"),
        }
    }
}

impl std::str::FromStr for SignalCode {
    type Err = Error;
    /// Parses "G:C1C", "E:C7Q", "C:C2I" like descriptors.
    fn from_str(s: &str) -> Result<Self, Error> {
        let c = s.trim().to_uppercase();
        match c.as_str() {
            "G:C1C" => Ok(Self::GpsC1C),
            "G:C1W" => Ok(Self::GpsC1W),
            "G:C2C" => Ok(Self::GpsC2C),
            "G:C2W" => Ok(Self::GpsC2W),
            "G:C2L" => Ok(Self::GpsC2L),
            "E:C1C" => Ok(Self::GalC1C),
            "E:C1X" => Ok(Self::GalC1X),
            "E:C6C" => Ok(Self::GalC6C),
            "E:C5Q" => Ok(Self::GalC5Q),
            "E:C5X" => Ok(Self::GalC5X),
            "E:C7Q" => Ok(Self::GalC7Q),
            "E:C7X" => Ok(Self::GalC7X),
            "C:C2I" => Ok(Self::BdsC2I),
            "C:C6I" => Ok(Self::BdsC6I),
            "C:C7" | "C:C7I" => Ok(Self::BdsC7),
            _ => Err(Error::UnknownSignalCode(c)),
        }
    }
}

/// BeiDou frequency band, used by the satellite induced code bias tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeidouBand {
    B1,
    B2,
    B3,
}

impl SignalCode {
    /// [System] this signal belongs to
    pub fn system(&self) -> System {
        match self {
            Self::GpsC1C | Self::GpsC1W | Self::GpsC2C | Self::GpsC2W | Self::GpsC2L => {
                System::GPS
            },
            Self::GalC1C
            | Self::GalC1X
            | Self::GalC6C
            | Self::GalC5Q
            | Self::GalC5X
            | Self::GalC7Q
            | Self::GalC7X => System::Galileo,
            Self::BdsC2I | Self::BdsC6I | Self::BdsC7 => System::BeiDou,
        }
    }

    /// BeiDou frequency band, when this is a BeiDou signal
    pub(crate) fn beidou_band(&self) -> Option<BeidouBand> {
        match self {
            Self::BdsC2I => Some(BeidouBand::B1),
            Self::BdsC7 => Some(BeidouBand::B2),
            Self::BdsC6I => Some(BeidouBand::B3),
            _ => None,
        }
    }

    /// Maps this signal to the [RtcmCode] identifier used on the wire.
    /// BeiDou C7 is L7I for BDS-2 vehicles (PRN <= 18), L7Z otherwise.
    pub fn rtcm_code(&self, prn: u8) -> RtcmCode {
        match self {
            Self::GpsC1C | Self::GalC1C => RtcmCode::L1C,
            Self::GpsC1W => RtcmCode::L1W,
            Self::GpsC2C => RtcmCode::L2C,
            Self::GpsC2W => RtcmCode::L2W,
            Self::GpsC2L => RtcmCode::L2L,
            Self::GalC1X => RtcmCode::L1X,
            Self::GalC6C => RtcmCode::L6C,
            Self::GalC5Q => RtcmCode::L5Q,
            Self::GalC5X => RtcmCode::L5X,
            Self::GalC7Q => RtcmCode::L7Q,
            Self::GalC7X => RtcmCode::L7X,
            Self::BdsC2I => RtcmCode::L2I,
            Self::BdsC6I => RtcmCode::L6I,
            Self::BdsC7 => {
                if prn <= 18 {
                    RtcmCode::L7I
                } else {
                    RtcmCode::L7Z
                }
            },
        }
    }
}

/// Observation code identifiers of the outgoing protocol.
/// Discriminants are the encoder's numeric identifiers and must not change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum RtcmCode {
    #[default]
    None = 0,
    L1C = 1,
    L1W = 3,
    L1X = 12,
    L2C = 14,
    L2L = 17,
    L2W = 20,
    L5Q = 25,
    L5X = 26,
    L7I = 27,
    L7Q = 28,
    L7X = 29,
    L6C = 32,
    L2I = 40,
    L6I = 42,
    L7Z = 63,
}

impl RtcmCode {
    /// Numeric identifier
    pub fn id(&self) -> u8 {
        *self as u8
    }

    /// Maps optional requested signal to [RtcmCode], [RtcmCode::None] when
    /// nothing was requested or the signal does not belong to `system`.
    pub fn from_request(code: Option<SignalCode>, system: System, prn: u8) -> Self {
        match code {
            Some(code) if code.system() == system => code.rtcm_code(prn),
            _ => Self::None,
        }
    }
}
