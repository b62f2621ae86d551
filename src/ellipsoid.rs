//! Axis-aligned ellipsoid boundary.
//!
//! This module holds the immutable description of an ellipsoid and the
//! containment queries built on its implicit equation
//! `(Δx/a)² + (Δy/b)² + (Δz/c)² = 1`, where `Δ` is the offset from the
//! midpoint. Ray intersection lives in [`crate::intersect`] and the
//! nearest-boundary estimate in [`crate::nearest`].
//!
//! The ellipsoid has a single interior region (`0`); everything else is the
//! exterior (`-1`).

use std::fmt;

use nalgebra::{Point3, Vector3};

use crate::medium::{MediumLookup, RegionMedia};
use crate::surface::{Step, Surface, INSIDE, OUTSIDE};


/// An ellipsoid whose principal axes are aligned with x, y and z.
///
/// **Context**: The transport loop evaluates the same handful of expressions
/// for every step of every particle history, so anything that depends only on
/// the shape is computed once here.
///
/// **How it Works**: Stores the midpoint and the three semi-axes, along with
/// their squares and the smallest and largest semi-axis. The latter define an
/// inscribed and a circumscribed sphere used for cheap distance bounds.
/// Semi-axes must be positive; that is checked by whoever constructs the
/// ellipsoid (see [`crate::registry`]), never at query time.
#[derive(Debug, Clone, PartialEq)]
pub struct Ellipsoid {
    pub center: Point3<f64>,
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub a2: f64,
    pub b2: f64,
    pub c2: f64,
    pub min_axis: f64,
    pub max_axis: f64,
    pub min2: f64,
    pub max2: f64,
    name: String,
    media: RegionMedia,
}

impl Ellipsoid {
    pub const TYPE_NAME: &'static str = "ellipsoid";

    /// Creates an ellipsoid with semi-axes `a`, `b`, `c` along x, y, z,
    /// centered on `center`. All regions start out as vacuum.
    pub fn new(a: f64, b: f64, c: f64, center: Point3<f64>) -> Self {
        let min_axis = a.min(b).min(c);
        let max_axis = a.max(b).max(c);
        Self {
            center,
            a,
            b,
            c,
            a2: a * a,
            b2: b * b,
            c2: c * c,
            min_axis,
            max_axis,
            min2: min_axis * min_axis,
            max2: max_axis * max_axis,
            name: String::new(),
            media: RegionMedia::default(),
        }
    }

    /// Assigns the medium of the interior region.
    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    pub fn set_medium(&mut self, medium: Option<usize>) {
        self.media = RegionMedia::new(medium);
    }

    /// Semi-axes as a vector, x first.
    pub fn semi_axes(&self) -> Vector3<f64> {
        Vector3::new(self.a, self.b, self.c)
    }

    /// Evaluates `(Δx/a)² + (Δy/b)² + (Δz/c)²` at `x`. Less than one inside,
    /// exactly one on the surface.
    pub fn quadratic_form(&self, x: &Point3<f64>) -> f64 {
        let d = x - self.center;
        d.x * d.x / self.a2 + d.y * d.y / self.b2 + d.z * d.z / self.c2
    }
}

impl Surface for Ellipsoid {
    fn is_inside(&self, x: &Point3<f64>) -> bool {
        self.quadratic_form(x) <= 1.0
    }

    fn is_where(&self, x: &Point3<f64>) -> i32 {
        if self.quadratic_form(x) < 1.0 {
            INSIDE
        } else {
            OUTSIDE
        }
    }

    fn howfar(&self, ireg: i32, x: &Point3<f64>, u: &Vector3<f64>, t: f64) -> Step {
        self.intersect(ireg, x, u, t)
    }

    fn howfar_to_outside(&self, ireg: i32, x: &Point3<f64>, u: &Vector3<f64>) -> Option<f64> {
        self.distance_to_boundary(ireg, x, u)
    }

    fn hownear(&self, _ireg: i32, x: &Point3<f64>) -> f64 {
        self.nearest_boundary(x)
    }

    fn medium(&self, ireg: i32) -> Option<usize> {
        self.media.medium(if ireg < 0 { OUTSIDE } else { INSIDE })
    }

    fn num_regions(&self) -> usize {
        1
    }

    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Ellipsoid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            " midpoint of ellipsoid = ({},{},{})",
            self.center.x, self.center.y, self.center.z
        )?;
        write!(
            f,
            " ellipsoid equation = x^2/{}^2 + y^2/{}^2 + z^2/{}^2 = 1",
            self.a, self.b, self.c
        )
    }
}
