//! Coordinate reprojection between ETRS89 / UTM and latitude/longitude
//!
//! Implements the standard Transverse Mercator series (Snyder, "Map
//! Projections — A Working Manual", USGS PP 1395) on the GRS80 ellipsoid.
//! EPSG:25831 (UTM zone 31N) is the campus dataset's reference system;
//! ETRS89 geographic coordinates are treated as WGS84 for plotting, which
//! is exact well below heatmap resolution.

use geo::Point;

/// GRS80 semi-major axis, metres
const GRS80_A: f64 = 6_378_137.0;
/// GRS80 flattening
const GRS80_F: f64 = 1.0 / 298.257_222_101;
/// UTM central scale factor
const UTM_K0: f64 = 0.9996;
/// UTM false easting, metres
const UTM_FALSE_EASTING: f64 = 500_000.0;

/// Converts projected UTM coordinates to geographic ones and back.
///
/// Out-of-domain input maps to `None`; a point that cannot be converted is
/// excluded from spatial output, never defaulted to an arbitrary location.
#[derive(Debug, Clone)]
pub struct Reprojector {
    /// Central meridian of the zone, radians
    lon0: f64,
    /// First eccentricity squared
    e2: f64,
    /// Second eccentricity squared
    ep2: f64,
}

impl Default for Reprojector {
    /// EPSG:25831, the campus dataset's reference system.
    fn default() -> Self {
        Self::etrs89_utm_zone(31)
    }
}

impl Reprojector {
    /// Northern-hemisphere ETRS89 / UTM reprojector for the given zone.
    pub fn etrs89_utm_zone(zone: u8) -> Self {
        let e2 = GRS80_F * (2.0 - GRS80_F);
        Self {
            lon0: (f64::from(zone) * 6.0 - 183.0).to_radians(),
            e2,
            ep2: e2 / (1.0 - e2),
        }
    }

    /// Convert a projected (easting, northing) point to (latitude, longitude)
    /// in degrees. Returns `None` for coordinates outside the projection
    /// domain or when the series fails to produce a finite result.
    pub fn to_lat_lon(&self, projected: Point<f64>) -> Option<(f64, f64)> {
        let (easting, northing) = (projected.x(), projected.y());
        if !easting.is_finite() || !northing.is_finite() {
            return None;
        }
        if !(0.0..1_000_000.0).contains(&easting) || !(0.0..10_000_000.0).contains(&northing) {
            return None;
        }

        let e2 = self.e2;
        let ep2 = self.ep2;

        // Footpoint latitude from the meridian arc (Snyder eq. 3-26, 7-19).
        let m = northing / UTM_K0;
        let mu = m
            / (GRS80_A
                * (1.0 - e2 / 4.0 - 3.0 * e2 * e2 / 64.0 - 5.0 * e2 * e2 * e2 / 256.0));
        let e1 = (1.0 - (1.0 - e2).sqrt()) / (1.0 + (1.0 - e2).sqrt());

        let phi1 = mu
            + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
            + (21.0 * e1 * e1 / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
            + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin()
            + (1097.0 * e1.powi(4) / 512.0) * (8.0 * mu).sin();

        let sin_phi1 = phi1.sin();
        let cos_phi1 = phi1.cos();
        let tan_phi1 = phi1.tan();

        let c1 = ep2 * cos_phi1 * cos_phi1;
        let t1 = tan_phi1 * tan_phi1;
        let n1 = GRS80_A / (1.0 - e2 * sin_phi1 * sin_phi1).sqrt();
        let r1 = GRS80_A * (1.0 - e2) / (1.0 - e2 * sin_phi1 * sin_phi1).powf(1.5);
        let d = (easting - UTM_FALSE_EASTING) / (n1 * UTM_K0);

        let lat = phi1
            - (n1 * tan_phi1 / r1)
                * (d * d / 2.0
                    - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * ep2) * d.powi(4) / 24.0
                    + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1
                        - 252.0 * ep2
                        - 3.0 * c1 * c1)
                        * d.powi(6)
                        / 720.0);
        let lon = self.lon0
            + (d - (1.0 + 2.0 * t1 + c1) * d.powi(3) / 6.0
                + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * ep2 + 24.0 * t1 * t1)
                    * d.powi(5)
                    / 120.0)
                / cos_phi1;

        let lat_deg = lat.to_degrees();
        let lon_deg = lon.to_degrees();
        if !lat_deg.is_finite() || !lon_deg.is_finite() || lat_deg.abs() > 90.0 {
            return None;
        }
        Some((lat_deg, lon_deg))
    }

    /// Convert (latitude, longitude) in degrees back to a projected
    /// (easting, northing) point. Inverse of [`Self::to_lat_lon`].
    pub fn to_projected(&self, lat_deg: f64, lon_deg: f64) -> Option<Point<f64>> {
        if !lat_deg.is_finite() || !lon_deg.is_finite() {
            return None;
        }
        // UTM is undefined near the poles; stay well inside the zone band.
        if lat_deg.abs() > 84.0 {
            return None;
        }
        let lon = lon_deg.to_radians();
        if (lon - self.lon0).abs() > 45f64.to_radians() {
            return None;
        }

        let e2 = self.e2;
        let ep2 = self.ep2;
        let phi = lat_deg.to_radians();
        let (sin_phi, cos_phi) = phi.sin_cos();
        let tan_phi = phi.tan();

        let n = GRS80_A / (1.0 - e2 * sin_phi * sin_phi).sqrt();
        let t = tan_phi * tan_phi;
        let c = ep2 * cos_phi * cos_phi;
        let a = (lon - self.lon0) * cos_phi;

        // Meridian arc length (Snyder eq. 3-21).
        let m = GRS80_A
            * ((1.0 - e2 / 4.0 - 3.0 * e2 * e2 / 64.0 - 5.0 * e2 * e2 * e2 / 256.0) * phi
                - (3.0 * e2 / 8.0 + 3.0 * e2 * e2 / 32.0 + 45.0 * e2 * e2 * e2 / 1024.0)
                    * (2.0 * phi).sin()
                + (15.0 * e2 * e2 / 256.0 + 45.0 * e2 * e2 * e2 / 1024.0) * (4.0 * phi).sin()
                - (35.0 * e2 * e2 * e2 / 3072.0) * (6.0 * phi).sin());

        let easting = UTM_FALSE_EASTING
            + UTM_K0
                * n
                * (a + (1.0 - t + c) * a.powi(3) / 6.0
                    + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * ep2) * a.powi(5) / 120.0);
        let northing = UTM_K0
            * (m + n
                * tan_phi
                * (a * a / 2.0
                    + (5.0 - t + 9.0 * c + 4.0 * c * c) * a.powi(4) / 24.0
                    + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * ep2) * a.powi(6) / 720.0));

        if !easting.is_finite() || !northing.is_finite() {
            return None;
        }
        Some(Point::new(easting, northing))
    }
}
