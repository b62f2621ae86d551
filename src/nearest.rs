//! Conservative nearest-boundary distance for the ellipsoid.
//!
//! The transport loop uses this value to take steps that cannot possibly
//! reach the boundary without asking for a full ray intersection. It must
//! therefore never exceed the true Euclidean distance to the surface; being
//! much smaller only costs extra steps.

use nalgebra::{Point3, Vector3};

use crate::ellipsoid::Ellipsoid;


impl Ellipsoid {
    /// Lower bound on the distance from `x` to the ellipsoid surface.
    ///
    /// **Context**: An exact point-to-ellipsoid distance needs an iterative
    /// root solve. Most points are far from the surface relative to its size,
    /// where the inscribed and circumscribed spheres already give a tight
    /// answer.
    ///
    /// **How it Works**: Outside the circumscribed sphere, returns the distance
    /// to that sphere. Inside the inscribed sphere, returns the distance to
    /// that one. In the shell between them, returns the closed-form proxy
    /// `‖d − (n_x a², n_y b², n_z c²)‖ / (a² b² c²)`, capped by
    /// `min_axis·|√s − 1|`. The cap holds because scaling each coordinate by
    /// `1/axis` shrinks lengths by at least `1/min_axis` and maps the surface
    /// to the unit sphere.
    pub fn nearest_boundary(&self, x: &Point3<f64>) -> f64 {
        let d = x - self.center;
        let d2 = d.norm_squared();

        if d2 >= self.max2 {
            d2.sqrt() - self.max_axis
        } else if d2 <= self.min2 {
            self.min_axis - d2.sqrt()
        } else {
            let scaled = self.min_axis * (self.quadratic_form(x).sqrt() - 1.0).abs();
            proxy(self, &d).min(scaled)
        }
    }
}

/// Closed-form shell estimate. Not a bound on its own for small semi-axes.
/// `d` is never zero here since the inscribed sphere has positive radius.
fn proxy(e: &Ellipsoid, d: &Vector3<f64>) -> f64 {
    let n = d.normalize();
    (d - n.component_mul(&e.axes2())).norm() / (e.a2 * e.b2 * e.c2)
}
