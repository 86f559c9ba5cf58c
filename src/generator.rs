//! Curve family generators.
//!
//! A [`Generator`] is a closed tagged variant over the six supported
//! cubic curve families. Each family is fully described by its window
//! shape (`segment_size` / `slide_size`), its 4x4 characteristic matrix
//! (or a closed form for Linear) and how its stored window maps onto
//! the four basis points consumed by the [`crate::evaluator`]. On top
//! of evaluation every family supplies extrema-parameter solving,
//! segment subdivision and an optional blend of per-point normal-angle
//! offsets.
//!
//! All point-consuming entry points validate the window length and
//! fail with [`SplineError::WindowSize`] naming the family.

use glam::{Mat4, Vec3};
use tinyvec::ArrayVec;

use crate::errors::{Result, SplineError};
use crate::evaluator;

/// Upper bound on extrema parameters a single window can report:
/// two quadratic roots per axis over three axes.
pub type ExtremaTs = ArrayVec<[f32; 8]>;

/// The curve families a [`crate::SplineCurve`] can be built from.
///
/// Stateless except for `Cardinal`, which carries its scale (tension)
/// parameter; `CatmullRom` is the fixed `Cardinal { scale: 0.5 }`
/// specialization and delegates all of its math to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Generator {
    /// Straight segments between consecutive points.
    Linear,
    /// Cubic Bezier; windows share one endpoint with their neighbor.
    Bezier,
    /// Cubic Hermite; windows store positions interleaved with tangent
    /// anchor points, the evaluated tangent is `anchor - position`.
    Hermite,
    /// Uniform cubic B-Spline; approximating, C2 continuous.
    BSpline,
    /// Interpolating spline with adjustable tension.
    Cardinal { scale: f32 },
    /// `Cardinal { scale: 0.5 }`.
    CatmullRom,
}

impl Default for Generator {
    fn default() -> Self {
        Generator::CatmullRom
    }
}

fn bezier_matrix() -> Mat4 {
    Mat4::from_cols_array_2d(&[
        [1.0, 0.0, 0.0, 0.0],
        [-3.0, 3.0, 0.0, 0.0],
        [3.0, -6.0, 3.0, 0.0],
        [-1.0, 3.0, -3.0, 1.0],
    ])
}

fn hermite_matrix() -> Mat4 {
    Mat4::from_cols_array_2d(&[
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [-3.0, -2.0, 3.0, -1.0],
        [2.0, 1.0, -2.0, 1.0],
    ])
}

fn bspline_matrix() -> Mat4 {
    Mat4::from_cols_array_2d(&[
        [1.0 / 6.0, 4.0 / 6.0, 1.0 / 6.0, 0.0],
        [-3.0 / 6.0, 0.0, 3.0 / 6.0, 0.0],
        [3.0 / 6.0, -6.0 / 6.0, 3.0 / 6.0, 0.0],
        [-1.0 / 6.0, 3.0 / 6.0, -3.0 / 6.0, 1.0 / 6.0],
    ])
}

/// Catmull-Rom-family matrix parametrized over the scale `s`;
/// `s = 0.5` yields the classic Catmull-Rom basis.
fn cardinal_matrix(s: f32) -> Mat4 {
    Mat4::from_cols_array_2d(&[
        [0.0, 1.0, 0.0, 0.0],
        [-s, 0.0, s, 0.0],
        [2.0 * s, s - 3.0, 3.0 - 2.0 * s, -s],
        [-s, 2.0 - s, s - 2.0, s],
    ])
}

impl Generator {
    /// Cardinal spline with the given scale (tension) parameter.
    pub fn cardinal(scale: f32) -> Self {
        Generator::Cardinal { scale }
    }

    /// Number of consecutive stored points one evaluation consumes.
    pub fn segment_size(&self) -> usize {
        match self {
            Generator::Linear => 2,
            _ => 4,
        }
    }

    /// Number of new points that must be supplied to gain one segment.
    pub fn slide_size(&self) -> usize {
        match self {
            Generator::Linear => 1,
            Generator::Bezier => 3,
            Generator::Hermite => 2,
            Generator::BSpline | Generator::Cardinal { .. } | Generator::CatmullRom => 1,
        }
    }

    /// Family name, used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Generator::Linear => "Linear",
            Generator::Bezier => "Bezier",
            Generator::Hermite => "Hermite",
            Generator::BSpline => "BSpline",
            Generator::Cardinal { .. } => "Cardinal",
            Generator::CatmullRom => "CatmullRom",
        }
    }

    /// The characteristic matrix of the family, `None` for Linear
    /// which is evaluated in closed form.
    pub fn characteristic_matrix(&self) -> Option<Mat4> {
        match self {
            Generator::Linear => None,
            Generator::Bezier => Some(bezier_matrix()),
            Generator::Hermite => Some(hermite_matrix()),
            Generator::BSpline => Some(bspline_matrix()),
            Generator::Cardinal { scale } => Some(cardinal_matrix(*scale)),
            Generator::CatmullRom => Some(cardinal_matrix(0.5)),
        }
    }

    fn check_window<T>(&self, points: &[T]) -> Result<()> {
        if points.len() != self.segment_size() {
            return Err(SplineError::WindowSize {
                family: self.name(),
                expected: self.segment_size(),
                actual: points.len(),
            });
        }
        Ok(())
    }

    /// Map a stored window onto the four basis points the evaluator
    /// consumes. Only Hermite differs from its storage: tangents are
    /// derived from the anchor points first.
    fn basis_points(&self, points: &[Vec3]) -> [Vec3; 4] {
        match self {
            Generator::Hermite => [
                points[0],
                points[1] - points[0],
                points[2],
                points[3] - points[2],
            ],
            _ => [points[0], points[1], points[2], points[3]],
        }
    }

    /// Evaluate the position on the segment at local `t` in `[0, 1]`.
    pub fn evaluate(&self, t: f32, points: &[Vec3]) -> Result<Vec3> {
        self.evaluate_derivative(t, 0, points)
    }

    /// Evaluate the `order`-th derivative (order 0 = position) at `t`.
    pub fn evaluate_derivative(&self, t: f32, order: usize, points: &[Vec3]) -> Result<Vec3> {
        self.check_window(points)?;
        match self {
            Generator::Linear => match order {
                0 => Ok(points[0].lerp(points[1], t)),
                1 => Ok(points[1] - points[0]),
                2 | 3 => Ok(Vec3::ZERO),
                n => Err(SplineError::DerivativeOrder(n)),
            },
            _ => {
                // unwrap-free: every non-linear family has a matrix
                let matrix = self
                    .characteristic_matrix()
                    .ok_or(SplineError::DerivativeOrder(order))?;
                evaluator::evaluate(t, order, &matrix, self.basis_points(points))
            }
        }
    }

    /// The window converted to its equivalent cubic Bezier window,
    /// used to share the Bezier extrema solver and subdivision.
    /// `None` for families without such an equivalent (Linear, BSpline).
    fn bezier_equivalent(&self, points: &[Vec3]) -> Option<[Vec3; 4]> {
        match self {
            Generator::Hermite => {
                let m0 = points[1] - points[0];
                let m1 = points[3] - points[2];
                Some([
                    points[0],
                    points[0] + m0 / 3.0,
                    points[2] - m1 / 3.0,
                    points[2],
                ])
            }
            Generator::Cardinal { scale } => Some(cardinal_to_bezier(points, *scale)),
            Generator::CatmullRom => Some(cardinal_to_bezier(points, 0.5)),
            _ => None,
        }
    }

    /// Parameters in `[0, 1]` where the segment may attain a per-axis
    /// extremum. Degenerate roots come back as NaN (or out of range)
    /// and are discarded by the caller; the caller always samples the
    /// endpoints in addition.
    pub fn extrema_ts(&self, points: &[Vec3]) -> Result<ExtremaTs> {
        self.check_window(points)?;
        let mut ts = ExtremaTs::new();
        match self {
            Generator::Linear => {
                ts.push(0.0);
                ts.push(1.0);
            }
            // not solved exactly; the approximating hull keeps the
            // endpoint sampling tight enough for bounds
            Generator::BSpline => ts.push(0.0),
            Generator::Bezier => {
                bezier_extrema([points[0], points[1], points[2], points[3]], &mut ts);
            }
            Generator::Hermite | Generator::Cardinal { .. } | Generator::CatmullRom => {
                // reuse the Bezier solver on the converted window
                if let Some(b) = self.bezier_equivalent(points) {
                    bezier_extrema(b, &mut ts);
                }
            }
        }
        Ok(ts)
    }

    /// Subdivide the segment at local `t`, producing the replacement
    /// run for the whole window: `segment_size + slide_size` points
    /// that, spliced over the original window, turn one segment into
    /// two meeting at the split point.
    pub fn split_segment(&self, t: f32, points: &[Vec3]) -> Result<Vec<Vec3>> {
        self.check_window(points)?;
        match self {
            Generator::Linear => {
                Ok(vec![points[0], points[0].lerp(points[1], t), points[1]])
            }
            Generator::Bezier => {
                let [b0, l1, l2, mid, r1, r2, b3] =
                    split_bezier([points[0], points[1], points[2], points[3]], t);
                Ok(vec![b0, l1, l2, mid, r1, r2, b3])
            }
            Generator::Hermite => {
                // convert to Bezier, split there, convert both halves
                // back to position/anchor form. The node at the split
                // stores a single shared tangent so the right half's
                // outgoing speed is approximated by the left half's
                // incoming one; directions agree, magnitudes match at
                // t = 0.5.
                let b = self.bezier_equivalent(points).unwrap_or_default();
                let halves = split_bezier(b, t);
                let (b0, l1, l2, mid) = (halves[0], halves[1], halves[2], halves[3]);
                let (r2, b3) = (halves[5], halves[6]);
                let m0 = (l1 - b0) * 3.0;
                let mm = (mid - l2) * 3.0;
                let m1 = (b3 - r2) * 3.0;
                Ok(vec![b0, b0 + m0, mid, mid + mm, b3, b3 + m1])
            }
            Generator::BSpline => {
                // Boehm knot insertion at local t in the middle span of
                // the uniform knot vector
                let q1 = points[0].lerp(points[1], (t + 2.0) / 3.0);
                let q2 = points[1].lerp(points[2], (t + 1.0) / 3.0);
                let q3 = points[2].lerp(points[3], t / 3.0);
                Ok(vec![points[0], q1, q2, q3, points[3]])
            }
            Generator::Cardinal { .. } | Generator::CatmullRom => {
                // the junction point of the Bezier-equivalent split is
                // the curve sample itself; inserting it as a new
                // interpolation point splits the segment in two
                let mid = self.evaluate(t, points)?;
                Ok(vec![points[0], points[1], mid, points[2], points[3]])
            }
        }
    }

    /// Blend the window's per-point normal-angle offsets (degrees) at
    /// local `t`, through the same basis the positions use.
    pub fn normals_modifier(&self, t: f32, offsets: &[f32]) -> Result<f32> {
        self.check_window(offsets)?;
        match self {
            Generator::Linear => Ok(offsets[0] + (offsets[1] - offsets[0]) * t),
            Generator::Hermite => {
                let matrix = hermite_matrix();
                let vals = [
                    offsets[0],
                    offsets[1] - offsets[0],
                    offsets[2],
                    offsets[3] - offsets[2],
                ];
                evaluator::evaluate_scalar(t, 0, &matrix, vals)
            }
            _ => {
                let matrix = self
                    .characteristic_matrix()
                    .unwrap_or_else(bezier_matrix);
                evaluator::evaluate_scalar(
                    t,
                    0,
                    &matrix,
                    [offsets[0], offsets[1], offsets[2], offsets[3]],
                )
            }
        }
    }
}

/// Bezier window equivalent to a Cardinal window: the curve runs from
/// `p1` to `p2` with tangents `s * (p2 - p0)` and `s * (p3 - p1)`.
fn cardinal_to_bezier(points: &[Vec3], s: f32) -> [Vec3; 4] {
    let m1 = (points[2] - points[0]) * s;
    let m2 = (points[3] - points[1]) * s;
    [
        points[1],
        points[1] + m1 / 3.0,
        points[2] - m2 / 3.0,
        points[2],
    ]
}

/// Unrolled de Casteljau subdivision of a cubic Bezier window at `t`.
/// Returns the seven distinct control points of the two halves
/// (windows `[0..4]` and `[3..7]` sharing the junction).
fn split_bezier(p: [Vec3; 4], t: f32) -> [Vec3; 7] {
    let ctrl_1ab = p[0].lerp(p[1], t);
    let ctrl_1bc = p[1].lerp(p[2], t);
    let ctrl_1cd = p[2].lerp(p[3], t);
    let ctrl_2ab = ctrl_1ab.lerp(ctrl_1bc, t);
    let ctrl_2bc = ctrl_1bc.lerp(ctrl_1cd, t);
    let ctrl_3ab = ctrl_2ab.lerp(ctrl_2bc, t);
    [p[0], ctrl_1ab, ctrl_2ab, ctrl_3ab, ctrl_2bc, ctrl_1cd, p[3]]
}

/// Roots of the per-axis derivative quadratic of a cubic Bezier via
/// the quadratic formula. A vanishing leading coefficient drops the
/// axis to its linear root; a negative discriminant yields NaN roots,
/// which callers filter alongside out-of-range ones.
fn bezier_extrema(p: [Vec3; 4], ts: &mut ExtremaTs) {
    // B'(t) = a t^2 + b t + c per axis
    let a = (-p[0] + p[1] * 3.0 - p[2] * 3.0 + p[3]) * 3.0;
    let b = (p[0] - p[1] * 2.0 + p[2]) * 6.0;
    let c = (p[1] - p[0]) * 3.0;
    for axis in 0..3 {
        let (a, b, c) = (a[axis], b[axis], c[axis]);
        if a.abs() < crate::EPSILON {
            if b.abs() >= crate::EPSILON {
                ts.push(-c / b);
            }
            continue;
        }
        let sq = (b * b - 4.0 * a * c).sqrt();
        ts.push((-b + sq) / (2.0 * a));
        ts.push((-b - sq) / (2.0 * a));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPS: f32 = 1e-5;

    fn quad() -> Vec<Vec3> {
        vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 2.0, 0.0),
            Vec3::new(3.0, 2.0, 0.0),
            Vec3::new(4.0, 0.0, 0.0),
        ]
    }

    #[test]
    fn window_shapes() {
        assert_eq!(Generator::Linear.segment_size(), 2);
        assert_eq!(Generator::Linear.slide_size(), 1);
        assert_eq!(Generator::Bezier.slide_size(), 3);
        assert_eq!(Generator::Hermite.slide_size(), 2);
        assert_eq!(Generator::BSpline.slide_size(), 1);
        assert_eq!(Generator::cardinal(0.3).slide_size(), 1);
        assert_eq!(Generator::CatmullRom.segment_size(), 4);
    }

    #[test]
    fn wrong_window_count_is_rejected() {
        let short = [Vec3::ZERO; 3];
        let err = Generator::Bezier.evaluate(0.5, &short).unwrap_err();
        assert_eq!(
            err,
            SplineError::WindowSize {
                family: "Bezier",
                expected: 4,
                actual: 3
            }
        );
        assert!(Generator::Linear.evaluate(0.5, &short).is_err());
    }

    /// `p(t) = (1-t) p0 + t p1` with a constant derivative `p1 - p0`.
    #[test]
    fn linear_closed_form() {
        let pts = [Vec3::new(1.0, 1.0, 0.0), Vec3::new(3.0, 5.0, 2.0)];
        for i in 0..=10 {
            let t = i as f32 / 10.0;
            let p = Generator::Linear.evaluate(t, &pts).unwrap();
            assert!((p - (pts[0] * (1.0 - t) + pts[1] * t)).length_squared() < EPS);
            let d = Generator::Linear.evaluate_derivative(t, 1, &pts).unwrap();
            assert!((d - (pts[1] - pts[0])).length_squared() < EPS);
        }
        assert_eq!(
            Generator::Linear.evaluate_derivative(0.5, 2, &pts).unwrap(),
            Vec3::ZERO
        );
        assert!(Generator::Linear
            .evaluate_derivative(0.5, 4, &pts)
            .is_err());
    }

    /// Bezier evaluation interpolates its endpoints exactly.
    #[test]
    fn bezier_endpoints() {
        let pts = quad();
        assert_eq!(Generator::Bezier.evaluate(0.0, &pts).unwrap(), pts[0]);
        assert_eq!(Generator::Bezier.evaluate(1.0, &pts).unwrap(), pts[3]);
    }

    /// Hermite runs from the first to the third stored point with
    /// tangents given by the anchor deltas.
    #[test]
    fn hermite_endpoints_and_tangents() {
        let pts = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0), // anchor: tangent (1,1,0)
            Vec3::new(4.0, 0.0, 0.0),
            Vec3::new(5.0, -1.0, 0.0), // anchor: tangent (1,-1,0)
        ];
        let g = Generator::Hermite;
        assert!((g.evaluate(0.0, &pts).unwrap() - pts[0]).length_squared() < EPS);
        assert!((g.evaluate(1.0, &pts).unwrap() - pts[2]).length_squared() < EPS);
        let d0 = g.evaluate_derivative(0.0, 1, &pts).unwrap();
        let d1 = g.evaluate_derivative(1.0, 1, &pts).unwrap();
        assert!((d0 - (pts[1] - pts[0])).length_squared() < EPS);
        assert!((d1 - (pts[3] - pts[2])).length_squared() < EPS);
    }

    /// Catmull-Rom interpolates the middle pair of its window and is
    /// exactly Cardinal(0.5).
    #[test]
    fn catmull_rom_is_cardinal_half() {
        let pts = quad();
        let cr = Generator::CatmullRom;
        let cd = Generator::cardinal(0.5);
        assert!((cr.evaluate(0.0, &pts).unwrap() - pts[1]).length_squared() < EPS);
        assert!((cr.evaluate(1.0, &pts).unwrap() - pts[2]).length_squared() < EPS);
        for i in 0..=20 {
            let t = i as f32 / 20.0;
            let a = cr.evaluate(t, &pts).unwrap();
            let b = cd.evaluate(t, &pts).unwrap();
            assert!((a - b).length_squared() < EPS);
        }
    }

    /// A B-Spline window of identical points collapses onto that point.
    #[test]
    fn bspline_partition_of_unity() {
        let p = Vec3::new(2.0, -1.0, 3.0);
        let pts = vec![p; 4];
        for i in 0..=10 {
            let t = i as f32 / 10.0;
            let q = Generator::BSpline.evaluate(t, &pts).unwrap();
            assert!((q - p).length_squared() < EPS);
        }
    }

    /// An arch-shaped Bezier has a y extremum at t = 0.5 and no
    /// interior x extremum.
    #[test]
    fn bezier_extrema_of_arch() {
        let pts = quad();
        let ts = Generator::Bezier.extrema_ts(&pts).unwrap();
        assert!(ts
            .iter()
            .any(|t| t.is_finite() && (*t - 0.5).abs() < 1e-4));
        // x is monotone: any finite x root lies outside (0, 1)
        for t in ts.iter().filter(|t| t.is_finite()) {
            if (*t - 0.5).abs() >= 1e-4 {
                assert!(*t <= 0.0 + 1e-4 || *t >= 1.0 - 1e-4);
            }
        }
    }

    /// Splitting a Bezier at t and evaluating the halves at their own
    /// boundary reproduces the original midpoint.
    #[test]
    fn bezier_split_reproduces_midpoint() {
        let pts = quad();
        let at = 0.5;
        let run = Generator::Bezier.split_segment(at, &pts).unwrap();
        assert_eq!(run.len(), 7);
        let mid = Generator::Bezier.evaluate(at, &pts).unwrap();
        let left_end = Generator::Bezier.evaluate(1.0, &run[0..4]).unwrap();
        let right_start = Generator::Bezier.evaluate(0.0, &run[3..7]).unwrap();
        assert!((left_end - mid).length_squared() < EPS);
        assert!((right_start - mid).length_squared() < EPS);
        // halves must lie on the original curve
        for i in 0..=10 {
            let t = i as f32 / 10.0;
            let l = Generator::Bezier.evaluate(t, &run[0..4]).unwrap();
            assert!((l - Generator::Bezier.evaluate(t * at, &pts).unwrap()).length_squared() < EPS);
            let r = Generator::Bezier.evaluate(t, &run[3..7]).unwrap();
            let o = Generator::Bezier.evaluate(at + t * (1.0 - at), &pts).unwrap();
            assert!((r - o).length_squared() < EPS);
        }
    }

    /// The Hermite split at t = 0.5 is exact on both halves.
    #[test]
    fn hermite_split_half() {
        let pts = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 2.0, 0.0),
            Vec3::new(4.0, 0.0, 1.0),
            Vec3::new(5.0, -2.0, 1.0),
        ];
        let g = Generator::Hermite;
        let run = g.split_segment(0.5, &pts).unwrap();
        assert_eq!(run.len(), 6);
        for i in 0..=10 {
            let t = i as f32 / 10.0;
            let l = g.evaluate(t, &run[0..4]).unwrap();
            assert!((l - g.evaluate(t * 0.5, &pts).unwrap()).length_squared() < EPS);
            let r = g.evaluate(t, &run[2..6]).unwrap();
            assert!((r - g.evaluate(0.5 + t * 0.5, &pts).unwrap()).length_squared() < 1e-4);
        }
    }

    /// Boehm insertion leaves the B-Spline junction on the original
    /// curve and keeps the replacement run inside the original hull.
    #[test]
    fn bspline_split_run() {
        let pts = quad();
        let run = Generator::BSpline.split_segment(0.5, &pts).unwrap();
        assert_eq!(run.len(), 5);
        assert_eq!(run[0], pts[0]);
        assert_eq!(run[4], pts[3]);
        // inserted points are convex combinations of the window
        for q in &run[1..4] {
            assert!(q.x >= 0.0 && q.x <= 4.0);
            assert!(q.y >= 0.0 && q.y <= 2.0);
        }
    }

    /// Cardinal splitting inserts the curve sample as a new
    /// interpolation point; the refined spline still passes through it.
    #[test]
    fn cardinal_split_interpolates_sample() {
        let pts = quad();
        let g = Generator::CatmullRom;
        let mid = g.evaluate(0.5, &pts).unwrap();
        let run = g.split_segment(0.5, &pts).unwrap();
        assert_eq!(run.len(), 5);
        // left window ends at the sample, right window starts there
        let l = g.evaluate(1.0, &run[0..4]).unwrap();
        let r = g.evaluate(0.0, &run[1..5]).unwrap();
        assert!((l - mid).length_squared() < EPS);
        assert!((r - mid).length_squared() < EPS);
    }

    #[test]
    fn normals_modifier_blends_window() {
        let lin = Generator::Linear.normals_modifier(0.25, &[0.0, 40.0]).unwrap();
        assert_relative_eq!(lin, 10.0, epsilon = 1e-5);
        // constant offsets blend to the same constant for every family
        for g in [
            Generator::Bezier,
            Generator::Hermite,
            Generator::BSpline,
            Generator::CatmullRom,
            Generator::cardinal(0.2),
        ] {
            let m = g.normals_modifier(0.37, &[15.0; 4]).unwrap();
            assert_relative_eq!(m, 15.0, epsilon = 1e-4);
        }
    }
}
