//! Coordinate reference systems used by Finnish municipality maps.
//!
//! ETRS-TM35FIN uses the Krüger series for the transverse Mercator projection
//! on the GRS80 ellipsoid (four terms, sub-millimetre inside Finland).
//! ETRS89 and WGS84 are treated as the same datum.

use std::fmt;

use serde::Serialize;

use crate::error::{Error, Result};

/// A planar or geographic point. For geographic systems `x` is longitude
/// and `y` is latitude, both in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crs {
    /// EPSG:4326, longitude/latitude degrees.
    Wgs84,
    /// EPSG:3067, metres.
    EtrsTm35Fin,
    /// EPSG:3857, metres.
    WebMercator,
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg())
    }
}

// GRS80
const A: f64 = 6_378_137.0;
const F: f64 = 1.0 / 298.257_222_101;

const TM35_K0: f64 = 0.9996;
const TM35_LON0_DEG: f64 = 27.0;
const TM35_FALSE_EASTING: f64 = 500_000.0;

const WEB_MERCATOR_RADIUS: f64 = 6_378_137.0;

impl Crs {
    pub fn epsg(self) -> u32 {
        match self {
            Crs::Wgs84 => 4326,
            Crs::EtrsTm35Fin => 3067,
            Crs::WebMercator => 3857,
        }
    }

    /// Accepts `EPSG:3067`, `3067`, `urn:ogc:def:crs:EPSG::3067` and the
    /// `CRS84` URN used by RFC 7946 GeoJSON.
    pub fn from_code(code: &str) -> Result<Crs> {
        let code = code.trim();
        if code.ends_with("CRS84") {
            return Ok(Crs::Wgs84);
        }
        let number = code.rsplit(':').next().unwrap_or(code);
        match number.parse::<u32>() {
            Ok(4326) => Ok(Crs::Wgs84),
            Ok(3067) => Ok(Crs::EtrsTm35Fin),
            Ok(3857) | Ok(900913) => Ok(Crs::WebMercator),
            _ => Err(Error::Geo {
                message: format!("unsupported coordinate reference system '{}'", code),
            }),
        }
    }

    /// Re-expresses `point` from `self` in `target`.
    pub fn transform(self, point: Point, target: Crs) -> Point {
        if self == target {
            return point;
        }
        let geographic = match self {
            Crs::Wgs84 => point,
            Crs::EtrsTm35Fin => tm35fin_inverse(point),
            Crs::WebMercator => web_mercator_inverse(point),
        };
        match target {
            Crs::Wgs84 => geographic,
            Crs::EtrsTm35Fin => tm35fin_forward(geographic),
            Crs::WebMercator => web_mercator_forward(geographic),
        }
    }
}

// ---------------------------------------------------------------------------
// Transverse Mercator (ETRS-TM35FIN)
// ---------------------------------------------------------------------------

struct KruegerTerms {
    e: f64,
    a1: f64,
    forward: [f64; 4],
    inverse: [f64; 4],
}

fn krueger() -> KruegerTerms {
    let n = F / (2.0 - F);
    let (n2, n3, n4) = (n * n, n * n * n, n * n * n * n);
    KruegerTerms {
        e: (F * (2.0 - F)).sqrt(),
        a1: A / (1.0 + n) * (1.0 + n2 / 4.0 + n4 / 64.0),
        forward: [
            n / 2.0 - 2.0 / 3.0 * n2 + 5.0 / 16.0 * n3 + 41.0 / 180.0 * n4,
            13.0 / 48.0 * n2 - 3.0 / 5.0 * n3 + 557.0 / 1440.0 * n4,
            61.0 / 240.0 * n3 - 103.0 / 140.0 * n4,
            49561.0 / 161280.0 * n4,
        ],
        inverse: [
            n / 2.0 - 2.0 / 3.0 * n2 + 37.0 / 96.0 * n3 - 1.0 / 360.0 * n4,
            1.0 / 48.0 * n2 + 1.0 / 15.0 * n3 - 437.0 / 1440.0 * n4,
            17.0 / 480.0 * n3 - 37.0 / 840.0 * n4,
            4397.0 / 161280.0 * n4,
        ],
    }
}

fn tm35fin_forward(p: Point) -> Point {
    let t = krueger();
    let lat = p.y.to_radians();
    let dlon = (p.x - TM35_LON0_DEG).to_radians();

    let q = lat.tan().asinh() - t.e * (t.e * lat.sin()).atanh();
    let beta = q.sinh().atan();
    let eta0 = (beta.cos() * dlon.sin()).atanh();
    let zeta0 = (beta.sin() * eta0.cosh()).asin();

    let mut zeta = zeta0;
    let mut eta = eta0;
    for (i, h) in t.forward.iter().enumerate() {
        let k = 2.0 * (i + 1) as f64;
        zeta += h * (k * zeta0).sin() * (k * eta0).cosh();
        eta += h * (k * zeta0).cos() * (k * eta0).sinh();
    }

    Point {
        x: t.a1 * eta * TM35_K0 + TM35_FALSE_EASTING,
        y: t.a1 * zeta * TM35_K0,
    }
}

fn tm35fin_inverse(p: Point) -> Point {
    let t = krueger();
    let zeta = p.y / (t.a1 * TM35_K0);
    let eta = (p.x - TM35_FALSE_EASTING) / (t.a1 * TM35_K0);

    let mut zeta1 = zeta;
    let mut eta1 = eta;
    for (i, h) in t.inverse.iter().enumerate() {
        let k = 2.0 * (i + 1) as f64;
        zeta1 -= h * (k * zeta).sin() * (k * eta).cosh();
        eta1 -= h * (k * zeta).cos() * (k * eta).sinh();
    }

    let beta = (zeta1.sin() / eta1.cosh()).asin();
    let dlon = (eta1.tanh() / beta.cos()).asin();
    let q = beta.tan().asinh();
    let mut q1 = q;
    for _ in 0..6 {
        q1 = q + t.e * (t.e * q1.tanh()).atanh();
    }

    Point {
        x: TM35_LON0_DEG + dlon.to_degrees(),
        y: q1.sinh().atan().to_degrees(),
    }
}

// ---------------------------------------------------------------------------
// Spherical Mercator
// ---------------------------------------------------------------------------

fn web_mercator_forward(p: Point) -> Point {
    let lat = p.y.to_radians();
    Point {
        x: WEB_MERCATOR_RADIUS * p.x.to_radians(),
        y: WEB_MERCATOR_RADIUS * (std::f64::consts::FRAC_PI_4 + lat / 2.0).tan().ln(),
    }
}

fn web_mercator_inverse(p: Point) -> Point {
    Point {
        x: (p.x / WEB_MERCATOR_RADIUS).to_degrees(),
        y: (2.0 * (p.y / WEB_MERCATOR_RADIUS).exp().atan() - std::f64::consts::FRAC_PI_2).to_degrees(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_central_meridian_maps_to_false_easting() {
        let p = Crs::Wgs84.transform(Point::new(27.0, 60.0), Crs::EtrsTm35Fin);
        assert!((p.x - 500_000.0).abs() < 1e-6, "easting was {}", p.x);
        // Scaled GRS80 meridian arc length to 60°N.
        assert!((p.y - 6_651_411.19).abs() < 1.0, "northing was {}", p.y);
    }

    #[test]
    fn test_helsinki_projects_into_expected_square() {
        let p = Crs::Wgs84.transform(Point::new(24.94, 60.17), Crs::EtrsTm35Fin);
        assert!((p.x - 385_700.4).abs() < 1.0, "easting was {}", p.x);
        assert!((p.y - 6_672_126.7).abs() < 1.0, "northing was {}", p.y);
    }

    #[test]
    fn test_tm35fin_round_trip() {
        for (lon, lat) in [(24.94, 60.17), (29.76, 62.60), (21.0, 69.0), (27.0, 60.0)] {
            let there = Crs::Wgs84.transform(Point::new(lon, lat), Crs::EtrsTm35Fin);
            let back = Crs::EtrsTm35Fin.transform(there, Crs::Wgs84);
            assert!((back.x - lon).abs() < 1e-8, "lon {} came back as {}", lon, back.x);
            assert!((back.y - lat).abs() < 1e-8, "lat {} came back as {}", lat, back.y);
        }
    }

    #[test]
    fn test_web_mercator_round_trip() {
        let there = Crs::Wgs84.transform(Point::new(25.47, 65.01), Crs::WebMercator);
        let back = Crs::WebMercator.transform(there, Crs::Wgs84);
        assert!((back.x - 25.47).abs() < 1e-9);
        assert!((back.y - 65.01).abs() < 1e-9);
    }

    #[test]
    fn test_crs_codes() {
        assert_eq!(Crs::from_code("EPSG:3067").unwrap(), Crs::EtrsTm35Fin);
        assert_eq!(Crs::from_code("urn:ogc:def:crs:EPSG::3067").unwrap(), Crs::EtrsTm35Fin);
        assert_eq!(Crs::from_code("4326").unwrap(), Crs::Wgs84);
        assert_eq!(Crs::from_code("urn:ogc:def:crs:OGC:1.3:CRS84").unwrap(), Crs::Wgs84);
        assert!(Crs::from_code("EPSG:2393").is_err());
        assert_eq!(Crs::EtrsTm35Fin.to_string(), "EPSG:3067");
    }
}
