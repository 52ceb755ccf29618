//! British National Grid to WGS84 latitude/longitude.
//!
//! Inverse transverse Mercator on the Airy 1830 ellipsoid, then a
//! seven-parameter Helmert transform from OSGB36 to WGS84. Accurate to a few
//! metres, which is plenty for postcode centroids.

use std::f64::consts::PI;

struct Ellipsoid {
  a: f64,
  b: f64,
}

impl Ellipsoid {
  fn e2(&self) -> f64 { 1.0 - (self.b * self.b) / (self.a * self.a) }
}

const AIRY_1830: Ellipsoid = Ellipsoid {
  a: 6_377_563.396,
  b: 6_356_256.909,
};

const WGS84: Ellipsoid = Ellipsoid {
  a: 6_378_137.0,
  b: 6_356_752.3142,
};

// National Grid projection.
const F0: f64 = 0.999_601_271_7;
const LAT0_DEG: f64 = 49.0;
const LON0_DEG: f64 = -2.0;
const N0: f64 = -100_000.0;
const E0: f64 = 400_000.0;

// OSGB36 -> WGS84 Helmert parameters (metres, ppm, arc-seconds).
const TX: f64 = 446.448;
const TY: f64 = -125.157;
const TZ: f64 = 542.060;
const SCALE_PPM: f64 = -20.4894;
const RX_SEC: f64 = 0.1502;
const RY_SEC: f64 = 0.2470;
const RZ_SEC: f64 = 0.8421;

fn arcsec_to_rad(sec: f64) -> f64 { sec / 3600.0 * PI / 180.0 }

/// Convert National Grid eastings/northings to WGS84 `(latitude, longitude)`
/// in decimal degrees.
pub fn osgb36_to_wgs84(eastings: f64, northings: f64) -> (f64, f64) {
  let (lat, lon) = grid_to_latlon_rad(eastings, northings);
  let (x, y, z) = to_cartesian(&AIRY_1830, lat, lon);
  let (x, y, z) = helmert(x, y, z);
  let (lat, lon) = from_cartesian(&WGS84, x, y, z);
  (lat.to_degrees(), lon.to_degrees())
}

/// Convert National Grid eastings/northings to OSGB36 `(latitude,
/// longitude)` in decimal degrees, without the datum shift.
pub fn osgb36_grid_to_latlon(eastings: f64, northings: f64) -> (f64, f64) {
  let (lat, lon) = grid_to_latlon_rad(eastings, northings);
  (lat.to_degrees(), lon.to_degrees())
}

fn meridional_arc(b: f64, n: f64, lat: f64, lat0: f64) -> f64 {
  let (n2, n3) = (n * n, n * n * n);
  let d = lat - lat0;
  let s = lat + lat0;
  b * F0
    * ((1.0 + n + 1.25 * n2 + 1.25 * n3) * d
      - (3.0 * n + 3.0 * n2 + 21.0 / 8.0 * n3) * d.sin() * s.cos()
      + (15.0 / 8.0 * n2 + 15.0 / 8.0 * n3) * (2.0 * d).sin() * (2.0 * s).cos()
      - 35.0 / 24.0 * n3 * (3.0 * d).sin() * (3.0 * s).cos())
}

fn grid_to_latlon_rad(e: f64, n_grid: f64) -> (f64, f64) {
  let Ellipsoid { a, b } = AIRY_1830;
  let e2 = AIRY_1830.e2();
  let n = (a - b) / (a + b);
  let lat0 = LAT0_DEG.to_radians();
  let lon0 = LON0_DEG.to_radians();

  let mut lat = lat0;
  let mut m = 0.0;
  // Converges in a handful of steps; the cap only guards non-finite input.
  for _ in 0..64 {
    lat += (n_grid - N0 - m) / (a * F0);
    m = meridional_arc(b, n, lat, lat0);
    if (n_grid - N0 - m).abs() < 1e-5 {
      break;
    }
  }

  let sin_lat = lat.sin();
  let nu = a * F0 / (1.0 - e2 * sin_lat * sin_lat).sqrt();
  let rho = a * F0 * (1.0 - e2) / (1.0 - e2 * sin_lat * sin_lat).powf(1.5);
  let eta2 = nu / rho - 1.0;

  let t = lat.tan();
  let (t2, t4, t6) = (t * t, t.powi(4), t.powi(6));
  let sec = 1.0 / lat.cos();

  let vii = t / (2.0 * rho * nu);
  let viii = t / (24.0 * rho * nu.powi(3)) * (5.0 + 3.0 * t2 + eta2 - 9.0 * t2 * eta2);
  let ix = t / (720.0 * rho * nu.powi(5)) * (61.0 + 90.0 * t2 + 45.0 * t4);
  let x = sec / nu;
  let xi = sec / (6.0 * nu.powi(3)) * (nu / rho + 2.0 * t2);
  let xii = sec / (120.0 * nu.powi(5)) * (5.0 + 28.0 * t2 + 24.0 * t4);
  let xiia = sec / (5040.0 * nu.powi(7)) * (61.0 + 662.0 * t2 + 1320.0 * t4 + 720.0 * t6);

  let de = e - E0;
  let lat = lat - vii * de.powi(2) + viii * de.powi(4) - ix * de.powi(6);
  let lon = lon0 + x * de - xi * de.powi(3) + xii * de.powi(5) - xiia * de.powi(7);
  (lat, lon)
}

fn to_cartesian(ellipsoid: &Ellipsoid, lat: f64, lon: f64) -> (f64, f64, f64) {
  let e2 = ellipsoid.e2();
  let nu = ellipsoid.a / (1.0 - e2 * lat.sin().powi(2)).sqrt();
  (
    nu * lat.cos() * lon.cos(),
    nu * lat.cos() * lon.sin(),
    (1.0 - e2) * nu * lat.sin(),
  )
}

fn helmert(x: f64, y: f64, z: f64) -> (f64, f64, f64) {
  let s = 1.0 + SCALE_PPM * 1e-6;
  let (rx, ry, rz) = (
    arcsec_to_rad(RX_SEC),
    arcsec_to_rad(RY_SEC),
    arcsec_to_rad(RZ_SEC),
  );
  (
    TX + x * s - y * rz + z * ry,
    TY + x * rz + y * s - z * rx,
    TZ - x * ry + y * rx + z * s,
  )
}

fn from_cartesian(ellipsoid: &Ellipsoid, x: f64, y: f64, z: f64) -> (f64, f64) {
  let e2 = ellipsoid.e2();
  let p = (x * x + y * y).sqrt();
  let mut lat = z.atan2(p * (1.0 - e2));
  for _ in 0..16 {
    let nu = ellipsoid.a / (1.0 - e2 * lat.sin().powi(2)).sqrt();
    let next = (z + e2 * nu * lat.sin()).atan2(p);
    let done = (next - lat).abs() < 1e-12;
    lat = next;
    if done {
      break;
    }
  }
  (lat, y.atan2(x))
}
