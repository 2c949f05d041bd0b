//! Planar reference frames for road graphs.
//!
//! Clustering and Voronoi construction need metric coordinates. A graph
//! either arrives with provider-projected node coordinates (then an affine
//! fit of geographic to projected coordinates is used to map results back),
//! or without them (then a local equirectangular projection is used).

use geo::{AffineTransform, Coord, Point};

use crate::Error;

/// Mean Earth radius in metres
const EARTH_RADIUS: f64 = 6_371_008.8;

#[derive(Debug, Clone, PartialEq)]
pub enum LocalProjection {
    /// Equirectangular projection around `origin` (lon, lat)
    Equirectangular { origin: Point<f64>, cos_lat: f64 },
    /// Least squares affine fit of geographic to provider coordinates
    Affine {
        forward: AffineTransform<f64>,
        inverse: AffineTransform<f64>,
    },
}

impl LocalProjection {
    pub fn equirectangular(origin: Point<f64>) -> Self {
        Self::Equirectangular {
            origin,
            cos_lat: origin.y().to_radians().cos(),
        }
    }

    /// Equirectangular projection around the mean of `points`.
    pub fn centered_on(points: impl IntoIterator<Item = Point<f64>>) -> Self {
        let (mut sum_x, mut sum_y, mut n) = (0.0, 0.0, 0usize);
        for p in points {
            sum_x += p.x();
            sum_y += p.y();
            n += 1;
        }
        if n == 0 {
            return Self::equirectangular(Point::new(0.0, 0.0));
        }
        #[allow(clippy::cast_precision_loss)]
        let n = n as f64;
        Self::equirectangular(Point::new(sum_x / n, sum_y / n))
    }

    /// Fits geographic → planar from `(geographic, planar)` pairs.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidData` if the pairs are collinear or too few
    /// to determine the transform.
    pub fn fit_affine(pairs: &[(Point<f64>, Point<f64>)]) -> Result<Self, Error> {
        if pairs.len() < 3 {
            return Err(Error::InvalidData(
                "At least three projected nodes are required".to_string(),
            ));
        }

        #[allow(clippy::cast_precision_loss)]
        let n = pairs.len() as f64;
        let mean = |f: fn(&(Point<f64>, Point<f64>)) -> f64| pairs.iter().map(f).sum::<f64>() / n;
        let (mlon, mlat) = (mean(|p| p.0.x()), mean(|p| p.0.y()));
        let (mx, my) = (mean(|p| p.1.x()), mean(|p| p.1.y()));

        let (mut s_uu, mut s_uv, mut s_vv) = (0.0, 0.0, 0.0);
        let (mut s_ux, mut s_vx, mut s_uy, mut s_vy) = (0.0, 0.0, 0.0, 0.0);
        for (geo_point, planar) in pairs {
            let u = geo_point.x() - mlon;
            let v = geo_point.y() - mlat;
            let x = planar.x() - mx;
            let y = planar.y() - my;
            s_uu += u * u;
            s_uv += u * v;
            s_vv += v * v;
            s_ux += u * x;
            s_vx += v * x;
            s_uy += u * y;
            s_vy += v * y;
        }

        let det = s_uu * s_vv - s_uv * s_uv;
        if det.abs() <= f64::EPSILON * s_uu.max(s_vv).powi(2) {
            return Err(Error::InvalidData(
                "Projected node coordinates are degenerate".to_string(),
            ));
        }

        let a = (s_ux * s_vv - s_vx * s_uv) / det;
        let b = (s_vx * s_uu - s_ux * s_uv) / det;
        let d = (s_uy * s_vv - s_vy * s_uv) / det;
        let e = (s_vy * s_uu - s_uy * s_uv) / det;

        let (tx, ty) = (mx - a * mlon - b * mlat, my - d * mlon - e * mlat);
        let forward = AffineTransform::new(a, b, tx, d, e, ty);
        let inverse = forward.inverse().ok_or_else(|| {
            Error::InvalidData("Projected node coordinates are not invertible".to_string())
        })?;

        Ok(Self::Affine { forward, inverse })
    }

    /// Geographic (lon, lat) → planar metres
    pub fn to_planar(&self, point: &Point<f64>) -> Point<f64> {
        match self {
            Self::Equirectangular { origin, cos_lat } => Point::new(
                EARTH_RADIUS * (point.x() - origin.x()).to_radians() * cos_lat,
                EARTH_RADIUS * (point.y() - origin.y()).to_radians(),
            ),
            Self::Affine { forward, .. } => forward.apply(Coord::from(*point)).into(),
        }
    }

    /// Planar metres → geographic (lon, lat)
    pub fn to_geographic(&self, point: &Point<f64>) -> Point<f64> {
        match self {
            Self::Equirectangular { origin, cos_lat } => Point::new(
                origin.x() + (point.x() / (EARTH_RADIUS * cos_lat)).to_degrees(),
                origin.y() + (point.y() / EARTH_RADIUS).to_degrees(),
            ),
            Self::Affine { inverse, .. } => inverse.apply(Coord::from(*point)).into(),
        }
    }
}
