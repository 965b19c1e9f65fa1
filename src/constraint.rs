//! Constraint surfaces.
//!
//! A constraint surface confines particles to a piece of geometry. Force
//! engines only use the surface's local outward normal: an orientation that
//! must stay on the surface is projected onto the tangent plane at the
//! particle's current position.
//!
//! # Example
//!
//! ```
//! use abpe::constraint::ConstraintSurface;
//! use glam::DVec3;
//!
//! let ellipsoid = ConstraintSurface::ellipsoid(DVec3::ZERO, 3.0, 4.0, 5.0).unwrap();
//! let n = ellipsoid.normal_at(DVec3::new(3.0, 0.0, 0.0));
//! assert!((n - DVec3::X).length() < 1e-12);
//! ```

use crate::error::ConfigError;
use glam::DVec3;

/// A geometric surface to which particle motion or orientation is confined.
///
/// Only the ellipsoid variant is accepted by the active force engine; the
/// plane variant exists for the surface abstraction itself and for callers
/// that manage their own projections.
#[derive(Clone, Debug, PartialEq)]
pub enum ConstraintSurface {
    /// Axis-aligned ellipsoid with center `center` and semi-axes `rx`, `ry`, `rz`.
    Ellipsoid {
        /// Center point.
        center: DVec3,
        /// Semi-axis along x.
        rx: f64,
        /// Semi-axis along y.
        ry: f64,
        /// Semi-axis along z.
        rz: f64,
    },
    /// Infinite plane through `point` with unit normal `normal`.
    Plane {
        /// A point on the plane.
        point: DVec3,
        /// Unit normal.
        normal: DVec3,
    },
}

impl ConstraintSurface {
    /// Create an ellipsoid surface. Semi-axes must be positive and finite.
    pub fn ellipsoid(center: DVec3, rx: f64, ry: f64, rz: f64) -> Result<Self, ConfigError> {
        for (axis, value) in [('x', rx), ('y', ry), ('z', rz)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::BadSemiAxis { axis, value });
            }
        }
        Ok(Self::Ellipsoid { center, rx, ry, rz })
    }

    /// Create a sphere, an ellipsoid with equal semi-axes.
    pub fn sphere(center: DVec3, radius: f64) -> Result<Self, ConfigError> {
        Self::ellipsoid(center, radius, radius, radius)
    }

    /// Create a plane surface. The normal is normalized here and must have
    /// nonzero length.
    pub fn plane(point: DVec3, normal: DVec3) -> Result<Self, ConfigError> {
        let length = normal.length();
        if !length.is_finite() || length < f64::EPSILON {
            return Err(ConfigError::ZeroNormal);
        }
        Ok(Self::Plane {
            point,
            normal: normal / length,
        })
    }

    /// Short name of the surface kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            ConstraintSurface::Ellipsoid { .. } => "ellipsoid",
            ConstraintSurface::Plane { .. } => "plane",
        }
    }

    /// Local outward unit normal at `position`.
    ///
    /// For the ellipsoid this is the gradient of the implicit surface
    /// function, so the position does not need to lie exactly on the surface.
    /// For a position at the ellipsoid center the normal is undefined and the
    /// zero vector is returned; callers treat that as degenerate geometry.
    pub fn normal_at(&self, position: DVec3) -> DVec3 {
        match self {
            ConstraintSurface::Ellipsoid { center, rx, ry, rz } => {
                let d = position - *center;
                let grad = DVec3::new(d.x / (rx * rx), d.y / (ry * ry), d.z / (rz * rz));
                grad.normalize_or_zero()
            }
            ConstraintSurface::Plane { normal, .. } => *normal,
        }
    }

    /// Project `v` onto the tangent plane of the surface at `position`.
    ///
    /// Subtracts the component along the local normal. The result is not
    /// renormalized; callers that need a unit vector renormalize and handle
    /// the near-zero case themselves.
    pub fn project_tangent(&self, position: DVec3, v: DVec3) -> DVec3 {
        let n = self.normal_at(position);
        v - v.dot(n) * n
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-12;

    #[test]
    fn test_sphere_normal_is_radial() {
        let s = ConstraintSurface::sphere(DVec3::ZERO, 2.0).unwrap();
        let p = DVec3::new(0.0, 2.0, 0.0);
        assert!((s.normal_at(p) - DVec3::Y).length() < TOL);

        // off-center sphere
        let s = ConstraintSurface::sphere(DVec3::new(1.0, 0.0, 0.0), 1.0).unwrap();
        let p = DVec3::new(2.0, 0.0, 0.0);
        assert!((s.normal_at(p) - DVec3::X).length() < TOL);
    }

    #[test]
    fn test_ellipsoid_normal_on_axes() {
        let e = ConstraintSurface::ellipsoid(DVec3::ZERO, 3.0, 4.0, 5.0).unwrap();
        assert!((e.normal_at(DVec3::new(3.0, 0.0, 0.0)) - DVec3::X).length() < TOL);
        assert!((e.normal_at(DVec3::new(0.0, -4.0, 0.0)) + DVec3::Y).length() < TOL);
        assert!((e.normal_at(DVec3::new(0.0, 0.0, 5.0)) - DVec3::Z).length() < TOL);
    }

    #[test]
    fn test_projection_removes_normal_component() {
        let e = ConstraintSurface::ellipsoid(DVec3::ZERO, 3.0, 4.0, 5.0).unwrap();
        // a point on the surface, off the axes
        let p = DVec3::new(3.0 / 2f64.sqrt(), 4.0 / 2f64.sqrt(), 0.0);
        let v = DVec3::new(0.3, -0.7, 0.65).normalize();
        let projected = e.project_tangent(p, v);
        assert!(projected.dot(e.normal_at(p)).abs() < TOL);
    }

    #[test]
    fn test_plane_projection() {
        let pl = ConstraintSurface::plane(DVec3::ZERO, DVec3::new(0.0, 0.0, 2.0)).unwrap();
        let v = DVec3::new(1.0, 2.0, 3.0);
        let projected = pl.project_tangent(DVec3::new(5.0, 5.0, 0.0), v);
        assert!((projected - DVec3::new(1.0, 2.0, 0.0)).length() < TOL);
    }

    #[test]
    fn test_degenerate_normal_at_center() {
        let e = ConstraintSurface::sphere(DVec3::ZERO, 1.0).unwrap();
        assert_eq!(e.normal_at(DVec3::ZERO), DVec3::ZERO);
    }

    #[test]
    fn test_bad_semi_axis_rejected() {
        let err = ConstraintSurface::ellipsoid(DVec3::ZERO, 3.0, 0.0, 5.0).unwrap_err();
        assert_eq!(
            err,
            ConfigError::BadSemiAxis {
                axis: 'y',
                value: 0.0
            }
        );
        assert!(ConstraintSurface::ellipsoid(DVec3::ZERO, f64::NAN, 1.0, 1.0).is_err());
    }

    #[test]
    fn test_zero_plane_normal_rejected() {
        let err = ConstraintSurface::plane(DVec3::ZERO, DVec3::ZERO).unwrap_err();
        assert_eq!(err, ConfigError::ZeroNormal);
    }
}
