//! Spherical geometry primitives.
//!
//! Positions on the sky are spherical polar coordinates in degrees
//! ([`LonLat`]), converted once at the input boundary into unit vectors
//! ([`Vec3`]). All distance comparisons inside the crate are squared
//! Euclidean distances between unit vectors, so that an angular radius is
//! converted to chord space once (see [`squared_euclidean_for_angle`]) and
//! no trigonometry runs per comparison.

use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::error::{Error, Result};

/// Radians per degree.
pub const RAD_PER_DEG: f64 = 0.017_453_292_519_943_295;
/// Degrees per radian.
pub const DEG_PER_RAD: f64 = 57.295_779_513_082_32;

/// A vector in R³.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    /// The x, y and z components.
    pub coords: [f64; 3],
}

impl Vec3 {
    /// Create a vector from its components.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { coords: [x, y, z] }
    }

    /// The x component.
    #[inline]
    pub fn x(&self) -> f64 {
        self.coords[0]
    }

    /// The y component.
    #[inline]
    pub fn y(&self) -> f64 {
        self.coords[1]
    }

    /// The z component.
    #[inline]
    pub fn z(&self) -> f64 {
        self.coords[2]
    }

    /// Dot product.
    #[inline]
    pub fn dot(&self, other: &Vec3) -> f64 {
        self.x() * other.x() + self.y() * other.y() + self.z() * other.z()
    }

    /// Cross product.
    pub fn cross(&self, other: &Vec3) -> Vec3 {
        Vec3::new(
            self.y() * other.z() - self.z() * other.y(),
            self.z() * other.x() - self.x() * other.z(),
            self.x() * other.y() - self.y() * other.x(),
        )
    }

    /// Component-wise minimum.
    #[inline]
    pub fn min(&self, other: &Vec3) -> Vec3 {
        Vec3::new(
            self.x().min(other.x()),
            self.y().min(other.y()),
            self.z().min(other.z()),
        )
    }

    /// Component-wise maximum.
    #[inline]
    pub fn max(&self, other: &Vec3) -> Vec3 {
        Vec3::new(
            self.x().max(other.x()),
            self.y().max(other.y()),
            self.z().max(other.z()),
        )
    }

    /// The vector scaled to unit length.
    pub fn normalized(&self) -> Vec3 {
        *self / self.dot(self).sqrt()
    }

    /// Convert a unit vector back to spherical coordinates.
    ///
    /// Longitude is normalized to `[0, 360)` and latitude clamped to
    /// `[-90, 90]` against rounding past the poles.
    pub fn lon_lat(&self) -> LonLat {
        let mut lon = DEG_PER_RAD * self.y().atan2(self.x());
        if lon < 0.0 {
            lon += 360.0;
        }
        let lat = (DEG_PER_RAD * self.z().asin()).clamp(-90.0, 90.0);
        LonLat { lon, lat }
    }
}

impl Neg for Vec3 {
    type Output = Vec3;

    fn neg(self) -> Vec3 {
        Vec3::new(-self.x(), -self.y(), -self.z())
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    fn add(self, other: Vec3) -> Vec3 {
        Vec3::new(
            self.x() + other.x(),
            self.y() + other.y(),
            self.z() + other.z(),
        )
    }
}

impl Sub for Vec3 {
    type Output = Vec3;

    fn sub(self, other: Vec3) -> Vec3 {
        Vec3::new(
            self.x() - other.x(),
            self.y() - other.y(),
            self.z() - other.z(),
        )
    }
}

impl Mul for Vec3 {
    type Output = Vec3;

    fn mul(self, other: Vec3) -> Vec3 {
        Vec3::new(
            self.x() * other.x(),
            self.y() * other.y(),
            self.z() * other.z(),
        )
    }
}

impl Div for Vec3 {
    type Output = Vec3;

    fn div(self, other: Vec3) -> Vec3 {
        Vec3::new(
            self.x() / other.x(),
            self.y() / other.y(),
            self.z() / other.z(),
        )
    }
}

impl Mul<f64> for Vec3 {
    type Output = Vec3;

    fn mul(self, s: f64) -> Vec3 {
        Vec3::new(self.x() * s, self.y() * s, self.z() * s)
    }
}

impl Mul<Vec3> for f64 {
    type Output = Vec3;

    fn mul(self, v: Vec3) -> Vec3 {
        v * self
    }
}

impl Div<f64> for Vec3 {
    type Output = Vec3;

    fn div(self, s: f64) -> Vec3 {
        Vec3::new(self.x() / s, self.y() / s, self.z() / s)
    }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, other: Vec3) {
        *self = *self + other;
    }
}

impl SubAssign for Vec3 {
    fn sub_assign(&mut self, other: Vec3) {
        *self = *self - other;
    }
}

impl MulAssign<f64> for Vec3 {
    fn mul_assign(&mut self, s: f64) {
        *self = *self * s;
    }
}

impl DivAssign<f64> for Vec3 {
    fn div_assign(&mut self, s: f64) {
        *self = *self / s;
    }
}

/// A point on the unit sphere (sky), in spherical polar coordinates.
///
/// All angles, stored or passed to methods, are in units of degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LonLat {
    /// Longitude (or right ascension) in degrees.
    pub lon: f64,
    /// Latitude (or declination) in degrees.
    pub lat: f64,
}

impl LonLat {
    /// Create a position from angles in degrees.
    pub fn from_degrees(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Create a position from angles in radians.
    pub fn from_radians(lon: f64, lat: f64) -> Self {
        Self {
            lon: DEG_PER_RAD * lon,
            lat: DEG_PER_RAD * lat,
        }
    }

    /// Pick a point uniformly at random on the unit sphere.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let lon = rng.random_range(0.0..360.0);
        let z: f64 = rng.random_range(-1.0..=1.0);
        Self {
            lon,
            lat: DEG_PER_RAD * z.asin(),
        }
    }

    /// Pick a point uniformly at random in the given latitude band.
    pub fn random_in_band<R: Rng + ?Sized>(
        rng: &mut R,
        lat_min: f64,
        lat_max: f64,
    ) -> Result<Self> {
        let lon = rng.random_range(0.0..360.0);
        let lat = random_lat(rng, lat_min, lat_max)?;
        Ok(Self { lon, lat })
    }

    /// Pick a point uniformly at random in the given longitude/latitude box.
    ///
    /// A box with `lon_min > lon_max` wraps around the 0/360 meridian.
    pub fn random_in_box<R: Rng + ?Sized>(
        rng: &mut R,
        lon_min: f64,
        lon_max: f64,
        lat_min: f64,
        lat_max: f64,
    ) -> Result<Self> {
        check_lon(lon_min)?;
        check_lon(lon_max)?;
        let lat = random_lat(rng, lat_min, lat_max)?;
        let lon = if lon_min < lon_max {
            rng.random_range(lon_min..lon_max)
        } else if lon_min == lon_max {
            lon_min
        } else {
            let lon = rng.random_range(lon_min - 360.0..lon_max);
            if lon < 0.0 {
                lon + 360.0
            } else {
                lon
            }
        };
        Ok(Self { lon, lat })
    }

    /// Parse the leading `lon<delim>lat` fields of a CSV record.
    ///
    /// Values must be in degrees and unquoted. Longitudes in `[-360, 0)`
    /// are normalized by adding 360; latitudes must be in `[-90, 90]`.
    pub fn from_csv(record: &str, delim: char) -> Result<Self> {
        let record = record.strip_suffix('\n').unwrap_or(record);
        let mut fields = record.splitn(3, delim);

        let lon_field = fields.next().unwrap_or("");
        let has_more = fields.clone().next().is_some();
        if !has_more {
            return Err(Error::MalformedRecord(format!(
                "record {record:?} does not begin with lon{delim}lat fields"
            )));
        }
        let mut lon: f64 = lon_field.parse().map_err(|_| {
            Error::MalformedRecord(format!("first field of record {record:?} is not a number"))
        })?;
        if !(-360.0..=360.0).contains(&lon) {
            return Err(Error::InvalidCoordinate {
                name: "longitude",
                value: lon,
            });
        }
        if lon < 0.0 {
            lon += 360.0;
        }

        let lat_field = fields.next().unwrap_or("");
        let lat: f64 = lat_field.parse().map_err(|_| {
            Error::MalformedRecord(format!("second field of record {record:?} is not a number"))
        })?;
        if !(-90.0..=90.0).contains(&lat) {
            return Err(Error::InvalidCoordinate {
                name: "latitude",
                value: lat,
            });
        }

        Ok(Self { lon, lat })
    }

    /// Randomly perturb this position.
    ///
    /// The result is normally distributed around the original position with
    /// a standard deviation of `sigma` degrees.
    pub fn perturb<R: Rng + ?Sized>(&self, rng: &mut R, sigma: f64) -> Result<Self> {
        let position_angle = rng.random_range(0.0..360.0);
        self.perturb_along(rng, sigma, position_angle)
    }

    /// Randomly perturb this position along a fixed position angle.
    ///
    /// The angular distance to the original position is normally distributed
    /// with a standard deviation of `sigma` degrees.
    pub fn perturb_along<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        sigma: f64,
        position_angle: f64,
    ) -> Result<Self> {
        let v = Vec3::from(*self);
        let n = north_of(self);
        let e = east_of(self);

        // rotate the north vector at v by -position_angle
        let t = (RAD_PER_DEG * position_angle).sin() * e + (RAD_PER_DEG * position_angle).cos() * n;

        let normal =
            Normal::new(0.0, RAD_PER_DEG * sigma).map_err(|_| Error::InvalidParameter {
                name: "sigma",
                message: "must be finite and non-negative",
            })?;
        let mag = normal.sample(rng);
        let p = mag.cos() * v + mag.sin() * t;
        Ok(p.lon_lat())
    }

    /// The angle between this position and `other`, in degrees.
    pub fn distance(&self, other: &LonLat) -> f64 {
        let v0 = Vec3::from(*self);
        let v1 = Vec3::from(*other);
        DEG_PER_RAD * v0.dot(&v1).clamp(-1.0, 1.0).acos()
    }
}

impl From<LonLat> for Vec3 {
    fn from(p: LonLat) -> Vec3 {
        let (sin_lon, cos_lon) = (RAD_PER_DEG * p.lon).sin_cos();
        let (sin_lat, cos_lat) = (RAD_PER_DEG * p.lat).sin_cos();
        Vec3::new(cos_lon * cos_lat, sin_lon * cos_lat, sin_lat)
    }
}

/// The unit vector pointing due east at `p`.
pub fn east_of(p: &LonLat) -> Vec3 {
    let (sin_lon, cos_lon) = (RAD_PER_DEG * p.lon).sin_cos();
    Vec3::new(-sin_lon, cos_lon, 0.0)
}

/// The unit vector pointing due north at `p`.
pub fn north_of(p: &LonLat) -> Vec3 {
    let (sin_lon, cos_lon) = (RAD_PER_DEG * p.lon).sin_cos();
    let (sin_lat, cos_lat) = (RAD_PER_DEG * p.lat).sin_cos();
    Vec3::new(-cos_lon * sin_lat, -sin_lon * sin_lat, cos_lat)
}

/// The squared Euclidean distance between `a` and `b`.
#[inline]
pub fn squared_euclidean(a: &Vec3, b: &Vec3) -> f64 {
    let v = *a - *b;
    v.dot(&v)
}

/// The squared Euclidean distance between two unit vectors separated by the
/// given angle in degrees.
#[inline]
pub fn squared_euclidean_for_angle(angle: f64) -> f64 {
    let d = (0.5 * angle * RAD_PER_DEG).sin();
    4.0 * d * d
}

/// The minimum squared Euclidean distance achievable between two unit
/// vectors whose k-th coordinates are fixed at `s` and `t`.
#[inline]
pub fn min_squared_euclidean(s: f64, t: f64) -> f64 {
    2.0 * (1.0 - s * t - ((1.0 - s * s) * (1.0 - t * t)).sqrt())
}

/// The width in longitude of minimal lon/lat bounding boxes for small
/// circles with the given radius and center latitude (both in degrees).
pub fn longitude_extent(radius: f64, lat: f64) -> Result<f64> {
    const POLE_EPSILON: f64 = 1e-6;

    if !(0.0..=90.0).contains(&radius) {
        return Err(Error::InvalidCoordinate {
            name: "radius",
            value: radius,
        });
    }
    if radius == 0.0 {
        return Ok(0.0);
    }
    let lat = lat.clamp(-90.0, 90.0);
    if lat.abs() + radius > 90.0 - POLE_EPSILON {
        return Ok(360.0);
    }
    let y = (RAD_PER_DEG * radius).sin();
    let x = ((RAD_PER_DEG * (lat - radius)).cos() * (RAD_PER_DEG * (lat + radius)).cos())
        .abs()
        .sqrt();
    Ok(2.0 * DEG_PER_RAD * (y / x).atan().abs())
}

fn check_lat(lat: f64) -> Result<()> {
    if !(-90.0..=90.0).contains(&lat) {
        return Err(Error::InvalidCoordinate {
            name: "latitude",
            value: lat,
        });
    }
    Ok(())
}

fn check_lon(lon: f64) -> Result<()> {
    if !(0.0..=360.0).contains(&lon) {
        return Err(Error::InvalidCoordinate {
            name: "longitude",
            value: lon,
        });
    }
    Ok(())
}

fn random_lat<R: Rng + ?Sized>(rng: &mut R, lat_min: f64, lat_max: f64) -> Result<f64> {
    check_lat(lat_min)?;
    check_lat(lat_max)?;
    if lat_min > lat_max {
        return Err(Error::InvalidParameter {
            name: "lat_min",
            message: "must not exceed lat_max",
        });
    }
    let z_min = (RAD_PER_DEG * lat_min).sin();
    let z_max = (RAD_PER_DEG * lat_max).sin();
    let z = if z_min == z_max {
        z_min
    } else {
        rng.random_range(z_min..z_max)
    };
    let lat = DEG_PER_RAD * z.asin();
    Ok(lat.clamp(lat_min, lat_max))
}
