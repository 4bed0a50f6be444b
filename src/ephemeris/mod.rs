use crate::{
    prelude::{Epoch, SV},
    system::System,
};

mod kepler;
pub(crate) use kepler::KeplerState;

/// Maximal number of broadcast ephemeris versions we retain
pub const MAX_EPHEMERIS_VERSIONS: usize = 6;

/// Broadcast [Ephemeris] frame, for one [SV].
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Ephemeris {
    /// [SV]
    pub sv: SV,

    /// Issue of Data Ephemeris, that SSR orbit corrections refer to
    pub iode: u16,

    /// SV health flag, 0 means healthy
    pub health: u8,

    /// Time of Issue of [Ephemeris] that must be expressed in correct timescale
    pub toe: Epoch,

    /// Time of Clock that must be expressed in correct timescale
    pub toc: Epoch,

    /// Clock bias (s)
    pub af0: f64,

    /// Clock drift (s.s⁻¹)
    pub af1: f64,

    /// Clock drift rate (s.s⁻²)
    pub af2: f64,

    /// Semi-major axis (in meters)
    pub semi_major_axis_m: f64,

    /// Eccentricity
    pub eccentricity: f64,

    /// m0 (in radians)
    pub m0_rad: f64,

    /// (in radians)
    pub i0_rad: f64,

    /// (in radians/s)
    pub idot_rad_s: f64,

    /// (in radians)
    pub dn_rad: f64,

    /// (in radians)
    pub omega0_rad: f64,

    /// (in radians)
    pub omega_rad: f64,

    /// (in radians/s)
    pub omega_dot_rad_s: f64,

    /// Sine Cosine (in radians)
    pub cus_cuc_rad: (f64, f64),

    /// Sine / Cosine (in radians)
    pub cis_cic_rad: (f64, f64),

    /// Sine / Cosine (in meters)
    pub crs_crc_m: (f64, f64),
}

impl Ephemeris {
    /// True if this [Ephemeris] declares a healthy vehicle
    pub fn is_healthy(&self) -> bool {
        self.health == 0
    }

    /// Absolute distance between `now` and the time of clock, in seconds
    pub fn toc_age_s(&self, now: Epoch) -> f64 {
        (now - self.toc).abs().to_seconds()
    }
}

/// Table indexed by PRN number, where each slot may be empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrnTable<T> {
    slots: Vec<Option<T>>,
}

impl<T: Clone> PrnTable<T> {
    /// Builds an empty [PrnTable] for this [System]
    pub fn new(system: System) -> Self {
        Self {
            slots: vec![None; system.max_prn() as usize + 1],
        }
    }
}

impl<T> PrnTable<T> {
    /// Stores value for this PRN. Out of range PRNs are ignored.
    pub fn insert(&mut self, prn: u8, value: T) {
        if let Some(slot) = self.slots.get_mut(prn as usize) {
            *slot = Some(value);
        }
    }

    /// Returns value for this PRN, if any
    pub fn get(&self, prn: u8) -> Option<&T> {
        self.slots.get(prn as usize).and_then(|slot| slot.as_ref())
    }
}

/// One version of the broadcast ephemerides, for all systems.
#[derive(Debug, Clone, PartialEq)]
pub struct EphemerisVersion {
    systems: [PrnTable<Ephemeris>; 3],
}

impl Default for EphemerisVersion {
    fn default() -> Self {
        Self {
            systems: System::ALL.map(PrnTable::new),
        }
    }
}

impl EphemerisVersion {
    /// Stores this [Ephemeris]. Frames of unsupported constellations are dropped.
    pub fn insert(&mut self, eph: Ephemeris) {
        if let Ok(system) = System::try_from(eph.sv.constellation) {
            self.systems[system.index()].insert(eph.sv.prn, eph);
        }
    }

    /// Returns [Ephemeris] of this vehicle
    pub fn get(&self, system: System, prn: u8) -> Option<&Ephemeris> {
        self.systems[system.index()].get(prn)
    }
}

impl FromIterator<Ephemeris> for EphemerisVersion {
    fn from_iter<I: IntoIterator<Item = Ephemeris>>(iter: I) -> Self {
        let mut version = Self::default();
        for eph in iter {
            version.insert(eph);
        }
        version
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use hifitime::Unit;

    #[test]
    fn prn_table_slots() {
        let mut table = PrnTable::new(System::GPS);
        table.insert(5, 1.5);
        table.insert(200, 2.0);
        assert_eq!(table.get(5), Some(&1.5));
        assert_eq!(table.get(6), None);
        assert_eq!(table.get(200), None);
    }

    #[test]
    fn version_lookup() {
        let now = Epoch::from_gregorian_utc_at_midnight(2024, 3, 1);
        let eph = Ephemeris {
            sv: System::Galileo.sv(3),
            toc: now + 30.0 * Unit::Second,
            health: 0,
            ..Default::default()
        };

        let version = [eph].into_iter().collect::<EphemerisVersion>();
        let found = version.get(System::Galileo, 3).unwrap();
        assert!(found.is_healthy());
        assert!((found.toc_age_s(now) - 30.0).abs() < 1.0E-9);
        assert!(version.get(System::GPS, 3).is_none());
    }
}
