//! Piecewise parametric curves over interchangeable polynomial
//! families.
//!
//! A [`SplineCurve`] strings 3D control points into segments through a
//! [`Generator`] (Linear, cubic Bezier, Hermite, B-Spline, Cardinal or
//! Catmull-Rom) and answers the usual curve queries: evaluation,
//! tangents and normals, curvature, flattening, arc length and its
//! inversion, axis-aligned bounds, rotation-minimizing frames, segment
//! splitting, and polyline-based intersection tests. Derived results
//! are memoized per segment and invalidated on any structural change.
//!
//! ```
//! use glam::Vec3;
//! use polyspline::{ControlPoint, Generator, SplineCurve};
//!
//! let mut spline = SplineCurve::new(
//!     Generator::Bezier,
//!     &[
//!         ControlPoint::new(Vec3::new(0.0, 0.0, 0.0)),
//!         ControlPoint::new(Vec3::new(1.0, 2.0, 0.0)),
//!         ControlPoint::new(Vec3::new(3.0, 2.0, 0.0)),
//!         ControlPoint::new(Vec3::new(4.0, 0.0, 0.0)),
//!     ],
//! )?;
//! let mid = spline.value_at(0.5)?;
//! let length = spline.get_length()?;
//! assert!(mid.y > 0.0 && length > 4.0);
//! # Ok::<(), polyspline::SplineError>(())
//! ```

mod cache;
pub mod errors;
pub mod evaluator;
pub mod extrema;
pub mod frenet;
pub mod generator;
pub mod indexing;
pub mod intersect;
pub mod line;
pub mod segmented;
pub mod spline;

pub use errors::{Result, SplineError};
pub use extrema::{Bounds, SplineExtrema};
pub use frenet::FrenetFrame;
pub use generator::Generator;
pub use segmented::SegmentedCollection;
pub use spline::{ControlPoint, CoordinateSpace, SplineCurve, DEFAULT_ACCURACY};

/// Tolerance for squared-length degeneracy checks and vanishing
/// polynomial coefficients.
pub(crate) const EPSILON: f32 = 1e-6;
