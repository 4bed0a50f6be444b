//! Reference station coordinates
use crate::prelude::Vector3;
use map_3d::{ecef2geodetic, rad2deg, Ellipsoid};
use nalgebra::Matrix3;

/// [GeoidModel] provides the geoid undulation (separation between the
/// WGS84 ellipsoid and the geoid) used to express heights above mean sea level.
pub trait GeoidModel {
    /// Geoid undulation in meters, at given latitude and longitude (radians).
    fn undulation_m(&self, lat_rad: f64, long_rad: f64) -> f64;
}

/// Null [GeoidModel]: orthometric height equals ellipsoidal height.
#[derive(Debug, Default, Copy, Clone)]
pub struct NullGeoid;

impl GeoidModel for NullGeoid {
    fn undulation_m(&self, _: f64, _: f64) -> f64 {
        0.0
    }
}

/// Constant undulation [GeoidModel], for sites where the local
/// undulation is known and the geoid is locally flat.
#[derive(Debug, Default, Copy, Clone)]
pub struct ConstantUndulation(pub f64);

impl GeoidModel for ConstantUndulation {
    fn undulation_m(&self, _: f64, _: f64) -> f64 {
        self.0
    }
}

/// Fixed reference position we synthesize observations for.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferencePosition {
    /// ECEF coordinates in meters
    ecef: Vector3<f64>,
    /// Geodetic latitude, longitude (radians) and ellipsoidal height (meters)
    geodetic: Vector3<f64>,
}

impl ReferencePosition {
    /// Builds new [ReferencePosition] from ECEF coordinates expressed in meter.
    pub fn from_ecef(ecef: Vector3<f64>) -> Self {
        let (x, y, z) = (ecef[0], ecef[1], ecef[2]);
        let (lat, lon, h) = ecef2geodetic(x, y, z, Ellipsoid::WGS84);
        Self {
            ecef,
            geodetic: Vector3::new(lat, lon, h),
        }
    }

    /// Returns ECEF coordinates, in meters.
    pub fn ecef(&self) -> Vector3<f64> {
        self.ecef
    }

    /// Returns geodetic coordinates
    /// - latitude [rad]
    /// - longitude [rad]
    /// - ellipsoidal height [m]
    pub fn geodetic(&self) -> Vector3<f64> {
        self.geodetic
    }

    /// Returns latitude [rad], longitude [rad] and orthometric height [m]
    /// using the provided [GeoidModel].
    pub fn orthometric(&self, geoid: &dyn GeoidModel) -> (f64, f64, f64) {
        let (lat, lon, h) = (self.geodetic[0], self.geodetic[1], self.geodetic[2]);
        (lat, lon, h - geoid.undulation_m(lat, lon))
    }

    /// ECEF to local ENU rotation matrix at this position
    fn enu_rotation(&self) -> Matrix3<f64> {
        let (sin_lat, cos_lat) = self.geodetic[0].sin_cos();
        let (sin_lon, cos_lon) = self.geodetic[1].sin_cos();
        Matrix3::new(
            -sin_lon,
            cos_lon,
            0.0,
            -sin_lat * cos_lon,
            -sin_lat * sin_lon,
            cos_lat,
            cos_lat * cos_lon,
            cos_lat * sin_lon,
            sin_lat,
        )
    }

    /// Projects an ECEF vector to local ENU frame
    pub(crate) fn to_enu(&self, ecef: Vector3<f64>) -> Vector3<f64> {
        self.enu_rotation() * ecef
    }

    /// Local east, north, up unit vectors expressed in ECEF
    pub(crate) fn enu_axes(&self) -> (Vector3<f64>, Vector3<f64>, Vector3<f64>) {
        let rot = self.enu_rotation();
        (
            rot.row(0).transpose(),
            rot.row(1).transpose(),
            rot.row(2).transpose(),
        )
    }

    /// Returns (elevation, azimuth) in radians of a satellite
    /// located at `sat_ecef` (meters).
    pub fn elevation_azimuth_rad(&self, sat_ecef: Vector3<f64>) -> (f64, f64) {
        let los = sat_ecef - self.ecef;
        let norm = los.norm();
        let enu = self.to_enu(los / norm);
        let elevation = enu[2].clamp(-1.0, 1.0).asin();
        let mut azimuth = enu[0].atan2(enu[1]);
        if azimuth < 0.0 {
            azimuth += 2.0 * std::f64::consts::PI;
        }
        (elevation, azimuth)
    }
}

impl std::fmt::Display for ReferencePosition {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "lat={:.6}°, lon={:.6}°, h={:.3}m",
            rad2deg(self.geodetic[0]),
            rad2deg(self.geodetic[1]),
            self.geodetic[2]
        )
    }
}
