//! Ray intersection with axis-aligned quadric boundaries.
//!
//! Substituting the ray `x + m·u` into `Σ Δ_i²/axis_i² = 1` gives a quadratic
//! in `m`. Which root is the next boundary event depends on which side of the
//! surface the traveler starts on:
//! - from outside, both roots lie ahead when the surface is approached, and
//!   the nearer one is the entry point
//! - from inside, exactly one root lies ahead, and it is the exit point
//!
//! Roots within [`ROOT_SNAP`] of zero are snapped to exactly zero so that a
//! traveler sitting on the boundary is not sent back across it.

use nalgebra::{Point3, Vector3};

use crate::ellipsoid::Ellipsoid;
use crate::surface::{Step, Surface, INSIDE, OUTSIDE};

#[cfg(test)]
mod tests {

    use super::*;

    const TOL: f64 = 1e-12;

    fn unit_x() -> Ellipsoid {
        Ellipsoid::new(2.0, 1.0, 1.0, Point3::origin())
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < TOL, "a: {}, b: {}", a, b);
    }

    #[test]
    fn entry_from_outside() {
        let e = unit_x();
        let step = e.howfar(OUTSIDE, &Point3::new(-5.0, 0.0, 0.0), &Vector3::x(), 100.0);
        assert!(step.is_crossing());
        assert_eq!(step.region(), INSIDE);
        assert_close(step.distance(), 3.0);
        let normal = step.normal().unwrap();
        assert!((normal - Vector3::new(-1.0, 0.0, 0.0)).norm() < TOL);
    }

    #[test]
    fn exit_from_inside() {
        let e = unit_x();
        let step = e.howfar(INSIDE, &Point3::origin(), &Vector3::x(), 100.0);
        assert!(step.is_crossing());
        assert_eq!(step.region(), OUTSIDE);
        assert_close(step.distance(), 2.0);
        let normal = step.normal().unwrap();
        assert!((normal - Vector3::new(1.0, 0.0, 0.0)).norm() < TOL);
    }

    #[test]
    fn budget_shorter_than_boundary() {
        let e = unit_x();
        let step = e.howfar(OUTSIDE, &Point3::new(-5.0, 0.0, 0.0), &Vector3::x(), 2.5);
        assert_eq!(
            step,
            Step::Stay {
                region: OUTSIDE,
                distance: 2.5
            }
        );

        let step = e.howfar(INSIDE, &Point3::origin(), &Vector3::y(), 0.25);
        assert_eq!(
            step,
            Step::Stay {
                region: INSIDE,
                distance: 0.25
            }
        );
    }

    #[test]
    fn budget_equal_to_boundary_crosses() {
        let e = unit_x();
        let step = e.howfar(OUTSIDE, &Point3::new(0.0, 0.0, -4.0), &Vector3::z(), 3.0);
        assert!(step.is_crossing());
        assert_close(step.distance(), 3.0);
    }

    #[test]
    fn receding_ray_keeps_caller_region() {
        let e = unit_x();
        let step = e.howfar(-3, &Point3::new(-5.0, 0.0, 0.0), &-Vector3::x(), 100.0);
        assert_eq!(
            step,
            Step::Stay {
                region: -3,
                distance: 100.0
            }
        );
    }

    #[test]
    fn missing_ray() {
        let e = unit_x();
        let step = e.howfar(OUTSIDE, &Point3::new(-5.0, 2.0, 0.0), &Vector3::x(), 100.0);
        assert!(!step.is_crossing());
        assert_eq!(step.distance(), 100.0);
        assert_eq!(e.howfar_to_outside(OUTSIDE, &Point3::new(-5.0, 2.0, 0.0), &Vector3::x()), None);
    }

    #[test]
    fn leaving_boundary_point_does_not_reenter() {
        let e = unit_x();
        // just exited through the +x pole, now outside and heading away
        let step = e.howfar(OUTSIDE, &Point3::new(2.0, 0.0, 0.0), &Vector3::x(), 100.0);
        assert!(!step.is_crossing());
    }

    #[test]
    fn entering_boundary_point_exits_far_side() {
        let e = unit_x();
        // just entered through the -x pole
        let step = e.howfar(INSIDE, &Point3::new(-2.0, 0.0, 0.0), &Vector3::x(), 100.0);
        assert_eq!(step.region(), OUTSIDE);
        assert_close(step.distance(), 4.0);
    }

    #[test]
    fn roots_near_zero_snap() {
        let q = Quadratic {
            qa: 1.0,
            qb: -1.0,
            qc: 1e-9,
        };
        let (m1, m2) = q.roots().unwrap();
        assert_eq!(m1, 0.0);
        assert!((m2 - 1.0).abs() < 1e-6);
    }

    #[test]
    fn root_selection() {
        assert_eq!(select_root(OUTSIDE, 1.0, 3.0), Some(1.0));
        assert_eq!(select_root(OUTSIDE, 0.0, 3.0), Some(0.0));
        assert_eq!(select_root(OUTSIDE, -3.0, -1.0), None);
        assert_eq!(select_root(OUTSIDE, -3.0, 0.0), None);
        assert_eq!(select_root(INSIDE, -1.0, 2.0), Some(2.0));
        assert_eq!(select_root(INSIDE, 0.0, 2.0), Some(2.0));
        assert_eq!(select_root(INSIDE, -2.0, -1.0), None);
    }

    #[test]
    fn oblique_normal_is_gradient() {
        let e = Ellipsoid::new(3.0, 2.0, 1.0, Point3::new(1.0, 1.0, 1.0));
        let x = Point3::new(-6.0, 0.5, 1.2);
        let u = Vector3::new(1.0, 0.1, -0.05).normalize();
        let step = e.howfar(OUTSIDE, &x, &u, 1e3);
        let hit = x + u * step.distance();
        assert!((e.quadratic_form(&hit) - 1.0).abs() < 1e-10);

        let d = hit - e.center;
        let expected = Vector3::new(d.x / e.a2, d.y / e.b2, d.z / e.c2).normalize();
        assert!((step.normal().unwrap() - expected).norm() < 1e-10);
        // outward: points away from the center
        assert!(step.normal().unwrap().dot(&d) > 0.0);
    }

    #[test]
    fn crossing_forwards_medium() {
        let mut e = unit_x();
        e.set_medium(Some(2));
        let step = e.howfar(OUTSIDE, &Point3::new(-5.0, 0.0, 0.0), &Vector3::x(), 100.0);
        assert_eq!(step.medium(), Some(2));
        let step = e.howfar(INSIDE, &Point3::origin(), &Vector3::x(), 100.0);
        assert_eq!(step.medium(), None);
    }

    #[test]
    fn unbounded_distance() {
        let e = unit_x();
        let d = e.howfar_to_outside(OUTSIDE, &Point3::new(0.0, -7.0, 0.0), &Vector3::y());
        assert_close(d.unwrap(), 6.0);
        let d = e.howfar_to_outside(INSIDE, &Point3::new(1.0, 0.0, 0.0), &-Vector3::x());
        assert_close(d.unwrap(), 3.0);
        let d = e.howfar_to_outside(OUTSIDE, &Point3::new(0.0, -7.0, 0.0), &-Vector3::y());
        assert_eq!(d, None);
    }
}

/// Roots closer to zero than this are treated as exactly zero.
pub const ROOT_SNAP: f64 = 1e-7;

/// Coefficients of `qa·m² + qb·m + qc = 0` for a ray against an axis-aligned
/// quadric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quadratic {
    pub qa: f64,
    pub qb: f64,
    pub qc: f64,
}

impl Quadratic {
    /// Builds the quadratic for a ray starting at offset `d` from the center,
    /// with direction `u`, against the quadric whose squared semi-axes are
    /// `axes2`.
    pub fn new(axes2: &Vector3<f64>, d: &Vector3<f64>, u: &Vector3<f64>) -> Self {
        Self {
            qa: u.component_mul(u).component_div(axes2).sum(),
            qb: 2.0 * d.component_mul(u).component_div(axes2).sum(),
            qc: d.component_mul(d).component_div(axes2).sum() - 1.0,
        }
    }

    /// Both roots in ascending order, snapped near zero, or `None` when the
    /// ray misses the quadric.
    pub fn roots(&self) -> Option<(f64, f64)> {
        let radical = self.qb * self.qb - 4.0 * self.qa * self.qc;
        // also rejects NaN
        if !(radical >= 0.0) {
            return None;
        }
        let radical = radical.sqrt();
        let m1 = snap((-self.qb - radical) / (2.0 * self.qa));
        let m2 = snap((-self.qb + radical) / (2.0 * self.qa));
        Some((m1, m2))
    }
}

fn snap(m: f64) -> f64 {
    if m.abs() < ROOT_SNAP {
        0.0
    } else {
        m
    }
}

/// Picks the root marking the next boundary event for a traveler in `ireg`.
///
/// **Context**: From outside, the two roots of a ray that approaches the
/// surface are both ahead of the traveler; a negative root means the surface
/// is behind, which includes a traveler resting on the boundary and heading
/// away from it. From inside, one root is behind and one ahead.
///
/// **How it Works**: Outside, any negative root rejects the ray, otherwise the
/// smaller magnitude wins. Inside, the positive root wins, falling back to the
/// larger one when the smaller was snapped to zero. A traveler claiming to be
/// inside with both roots behind it has no boundary ahead.
pub fn select_root(ireg: i32, m1: f64, m2: f64) -> Option<f64> {
    if ireg < 0 {
        if m1 < 0.0 || m2 < 0.0 {
            None
        } else if m1 * m1 < m2 * m2 {
            Some(m1)
        } else {
            Some(m2)
        }
    } else if m1 > 0.0 {
        Some(m1)
    } else if m2 >= 0.0 {
        Some(m2)
    } else {
        None
    }
}

/// Outward unit normal of the quadric at offset `d` from its center: the
/// normalized gradient `(2d_x/a², 2d_y/b², 2d_z/c²)`.
pub fn gradient_normal(axes2: &Vector3<f64>, d: &Vector3<f64>) -> Vector3<f64> {
    (2.0 * d.component_div(axes2)).normalize()
}

/// Shared budget logic for single-region axis-aligned quadrics.
///
/// Returns the crossing for the selected root if it lies within `t`, the
/// untouched budget otherwise.
pub(crate) fn quadric_step<S: Surface + ?Sized>(
    surface: &S,
    axes2: &Vector3<f64>,
    center: &Point3<f64>,
    ireg: i32,
    x: &Point3<f64>,
    u: &Vector3<f64>,
    t: f64,
) -> Step {
    let stay = Step::Stay {
        region: ireg,
        distance: t,
    };
    let d = x - center;
    let m = match Quadratic::new(axes2, &d, u)
        .roots()
        .and_then(|(m1, m2)| select_root(ireg, m1, m2))
    {
        Some(m) => m,
        None => return stay,
    };

    let travel = u * m;
    let distance = travel.norm();
    if distance > t {
        return stay;
    }

    let region = if ireg < 0 { INSIDE } else { OUTSIDE };
    Step::Cross {
        region,
        distance,
        medium: surface.medium(region),
        normal: gradient_normal(axes2, &(d + travel)),
    }
}

/// Budget-free counterpart of [`quadric_step`].
pub(crate) fn quadric_distance(
    axes2: &Vector3<f64>,
    center: &Point3<f64>,
    ireg: i32,
    x: &Point3<f64>,
    u: &Vector3<f64>,
) -> Option<f64> {
    let d = x - center;
    Quadratic::new(axes2, &d, u)
        .roots()
        .and_then(|(m1, m2)| select_root(ireg, m1, m2))
        .map(|m| (u * m).norm())
}

impl Ellipsoid {
    /// Squared semi-axes as a vector, x first.
    pub fn axes2(&self) -> Vector3<f64> {
        Vector3::new(self.a2, self.b2, self.c2)
    }

    /// Steps along `u` from `x` in region `ireg` with budget `t`.
    ///
    /// **Context**: Called once per transport step. The answer decides whether
    /// the particle completes its step or stops on the ellipsoid surface and
    /// changes region.
    ///
    /// **How it Works**: Solves the ray/ellipsoid quadratic, selects the entry
    /// or exit root (see [`select_root`]) and compares the distance to it with
    /// the budget. A crossing within budget reports the new region, its medium
    /// and the outward normal at the crossing point.
    pub fn intersect(&self, ireg: i32, x: &Point3<f64>, u: &Vector3<f64>, t: f64) -> Step {
        quadric_step(self, &self.axes2(), &self.center, ireg, x, u, t)
    }

    /// Distance along `u` to the entry (outside) or exit (inside) point,
    /// ignoring any budget.
    pub fn distance_to_boundary(&self, ireg: i32, x: &Point3<f64>, u: &Vector3<f64>) -> Option<f64> {
        quadric_distance(&self.axes2(), &self.center, ireg, x, u)
    }
}
