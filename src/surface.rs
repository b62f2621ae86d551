//! The query interface shared by every boundary primitive.
//!
//! A transport loop only ever talks to geometry through [`Surface`]. Each
//! primitive splits space into a small number of numbered interior regions
//! and one exterior, and answers three kinds of question about them:
//! - which region a point lies in
//! - how far a straight step can go before it crosses a boundary
//! - a distance the traveler can safely move in any direction
//!
//! # Region indices
//!
//! Interior regions are numbered from `0`. Any negative index denotes the
//! exterior; primitives collapse all negative values into a single region and
//! report [`OUTSIDE`] when a traveler leaves.

use std::fmt;

use nalgebra::{Point3, Vector3};

/// Region index of the (single) interior region.
pub const INSIDE: i32 = 0;
/// Region index reported for the exterior.
pub const OUTSIDE: i32 = -1;

/// Outcome of a budget-limited step along a ray.
///
/// **Context**: A transport step asks "can I travel `t` along `u` without
/// touching a boundary?". Either the answer is yes, or the step must be cut
/// short at the boundary and the traveler changes region.
///
/// **How it Works**: [`Step::Stay`] carries the caller's region and untouched
/// budget. [`Step::Cross`] carries the truncated distance together with the
/// region entered, its medium and the outward surface normal at the crossing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    Stay {
        region: i32,
        distance: f64,
    },
    Cross {
        region: i32,
        distance: f64,
        medium: Option<usize>,
        normal: Vector3<f64>,
    },
}

impl Step {
    /// Region occupied after travelling [`Step::distance`].
    pub fn region(&self) -> i32 {
        match self {
            Step::Stay { region, .. } => *region,
            Step::Cross { region, .. } => *region,
        }
    }

    /// Distance to travel: the full budget, or the distance to the boundary.
    pub fn distance(&self) -> f64 {
        match self {
            Step::Stay { distance, .. } => *distance,
            Step::Cross { distance, .. } => *distance,
        }
    }

    /// Outward unit normal at the crossing point, if a boundary was crossed.
    pub fn normal(&self) -> Option<Vector3<f64>> {
        match self {
            Step::Stay { .. } => None,
            Step::Cross { normal, .. } => Some(*normal),
        }
    }

    /// Medium of the region entered, if a boundary was crossed and the region
    /// is not vacuum.
    pub fn medium(&self) -> Option<usize> {
        match self {
            Step::Stay { .. } => None,
            Step::Cross { medium, .. } => *medium,
        }
    }

    pub fn is_crossing(&self) -> bool {
        matches!(self, Step::Cross { .. })
    }
}

/// A boundary primitive usable by the transport loop.
///
/// Implementations are immutable after construction, so all queries take
/// `&self` and may run concurrently from any number of threads.
pub trait Surface: Send + Sync + fmt::Display {
    /// Containment predicate. Points on the boundary count as inside.
    fn is_inside(&self, x: &Point3<f64>) -> bool;

    /// Region index of `x`. Points on the boundary count as outside.
    fn is_where(&self, x: &Point3<f64>) -> i32;

    /// Steps from `x` along the unit direction `u`, starting in region
    /// `ireg`, with a travel budget of `t`.
    fn howfar(&self, ireg: i32, x: &Point3<f64>, u: &Vector3<f64>, t: f64) -> Step;

    /// Distance to the boundary along `u` regardless of any budget, or `None`
    /// if the ray never reaches it.
    fn howfar_to_outside(&self, ireg: i32, x: &Point3<f64>, u: &Vector3<f64>) -> Option<f64>;

    /// A distance from `x` to the boundary that never exceeds the true one.
    fn hownear(&self, ireg: i32, x: &Point3<f64>) -> f64;

    /// Medium of region `ireg`; `None` is vacuum.
    fn medium(&self, ireg: i32) -> Option<usize>;

    /// Number of interior regions.
    fn num_regions(&self) -> usize;

    /// Upper bound on boundary crossings along one straight line.
    fn max_step(&self) -> usize {
        2 * self.num_regions()
    }

    /// Type tag the registry knows this primitive by.
    fn type_name(&self) -> &'static str;

    /// Label given in the scene description; may be empty.
    fn name(&self) -> &str;

    /// Human-readable multi-line summary, for logs only.
    fn describe(&self) -> String {
        format!(
            "=======================================================\n \
             type = {}\n name = {}\n{}\n=======================================================",
            self.type_name(),
            self.name(),
            self
        )
    }
}
