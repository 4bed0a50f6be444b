use anise::constants::SPEED_OF_LIGHT_KM_S;

/// Speed of light in m.s⁻¹
pub const SPEED_OF_LIGHT_M_S: f64 = SPEED_OF_LIGHT_KM_S * 1000.0;

/// Earth angular velocity, in WGS84 frame rad/s
pub const EARTH_ANGULAR_VEL_RAD: f64 = 7.2921151467E-5;

/// Earth angular velocity, in CGCS2000 frame rad/s
pub const EARTH_ANGULAR_VEL_CGCS2000_RAD: f64 = 7.292115E-5;

/// Earth gravitational constant, GPS ICD (m^3 s-2)
pub const EARTH_GRAVITATION_GPS_M3_S2: f64 = 3.986005E14;

/// Earth gravitational constant, Galileo and BeiDou ICD (m^3 s-2)
pub const EARTH_GRAVITATION_M3_S2: f64 = 3.986004418E14;

/// Relativistic clock correction constant F = -2 sqrt(mu) / c² (s.m^-1/2)
pub const RELATIVISTIC_F: f64 = -4.442807633E-10;

/// Mean Earth radius used by single layer ionosphere models (meters)
pub const EARTH_MEAN_RADIUS_M: f64 = 6370.0E3;

/// Ionospheric refraction constant: delay[m] = K * STEC[TECu] / f²
pub const IONOSPHERE_K: f64 = 40.3E16;

/// Astronomical unit (meters)
pub const ASTRONOMICAL_UNIT_M: f64 = 149597870691.0;

/// Seconds in one day
pub const SECONDS_PER_DAY: f64 = 86400.0;

/// GPS L1 / Galileo E1 frequency (Hz)
pub const FREQ_L1_HZ: f64 = 1575.42E6;

/// GPS L2 frequency (Hz)
pub const FREQ_L2_HZ: f64 = 1227.60E6;

/// Galileo E5b frequency (Hz)
pub const FREQ_E5B_HZ: f64 = 1207.14E6;

/// BeiDou B1I frequency (Hz)
pub const FREQ_B1I_HZ: f64 = 1561.098E6;

/// BeiDou B2I frequency (Hz)
pub const FREQ_B2I_HZ: f64 = 1207.14E6;
