//! Straight-line traversal of a boundary primitive.
//!
//! This is the geometry half of a transport loop with the physics taken out:
//! a traveler moves along a straight line with an unlimited budget, stopping
//! at every boundary. It is used to check geometries and to drive batches of
//! histories from the command line.
//!
//! The batch driver traces histories in parallel. Each history draws its
//! direction from its own generator seeded with `seed + history`, so results
//! do not depend on thread scheduling.

use std::f64::consts::PI;
use std::ops::Add;
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use nalgebra::{Point3, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::Deserialize;
use tracing::{info, warn};

use crate::surface::{Step, Surface};


/// Budget used when the traveler should run until the next boundary.
pub const UNBOUNDED: f64 = 1e30;

/// Part of a track spent in one region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub region: i32,
    pub medium: Option<usize>,
    pub length: f64,
}

/// All boundary-to-boundary segments of one straight line, up to its last
/// crossing. The unbounded exterior leg after that is not recorded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Track {
    pub segments: Vec<Segment>,
}

impl Track {
    pub fn crossings(&self) -> usize {
        self.segments.len()
    }

    /// Total path length inside interior regions.
    pub fn interior_length(&self) -> f64 {
        self.segments
            .iter()
            .filter(|s| s.region >= 0)
            .map(|s| s.length)
            .sum()
    }
}

/// Walks straight lines through a surface.
pub struct Tracker<'a> {
    surface: &'a dyn Surface,
}

impl<'a> Tracker<'a> {
    pub fn new(surface: &'a dyn Surface) -> Self {
        Self { surface }
    }

    /// Traces the line from `x` along unit direction `u`.
    ///
    /// **Context**: A particle history in a transport code is a sequence of
    /// `howfar` calls; along a straight line without interactions that
    /// sequence is exactly the list of boundaries the line pierces.
    ///
    /// **How it Works**: Resolves the starting region, then asks for the next
    /// boundary with an unlimited budget, records the segment, moves onto the
    /// boundary and continues in the new region. Stops once the traveler is
    /// outside with nothing ahead, or after `max_step() + 1` steps.
    pub fn trace(&self, x: &Point3<f64>, u: &Vector3<f64>) -> Track {
        let mut track = Track::default();
        let mut position = *x;
        let mut ireg = self.surface.is_where(&position);
        let max_step = self.surface.max_step();

        for _ in 0..=max_step {
            match self.surface.howfar(ireg, &position, u, UNBOUNDED) {
                Step::Cross {
                    region, distance, ..
                } => {
                    track.segments.push(Segment {
                        region: ireg,
                        medium: self.surface.medium(ireg),
                        length: distance,
                    });
                    position += u * distance;
                    ireg = region;
                }
                Step::Stay { .. } => {
                    if ireg >= 0 {
                        warn!(
                            "no exit found from region {} at {:?} along {:?}",
                            ireg, position, u
                        );
                    }
                    return track;
                }
            }
        }

        warn!(
            "track exceeded {} boundary crossings in {} '{}', last region {}",
            max_step,
            self.surface.type_name(),
            self.surface.name(),
            ireg
        );
        track
    }
}

/// Point source for batch runs. Without a direction, emission is isotropic.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Source {
    pub position: [f64; 3],
    #[serde(default)]
    pub direction: Option<[f64; 3]>,
}

/// Accumulated results of a batch of histories.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Tally {
    pub histories: usize,
    pub hits: usize,
    pub crossings: usize,
    pub interior_length: f64,
}

impl Add for Tally {
    type Output = Tally;

    fn add(self, other: Tally) -> Tally {
        Tally {
            histories: self.histories + other.histories,
            hits: self.hits + other.hits,
            crossings: self.crossings + other.crossings,
            interior_length: self.interior_length + other.interior_length,
        }
    }
}

impl Tally {
    /// Mean interior path length over the histories that hit the geometry.
    pub fn mean_interior_length(&self) -> f64 {
        if self.hits == 0 {
            0.0
        } else {
            self.interior_length / self.hits as f64
        }
    }

    /// Fraction of histories that reached an interior region.
    pub fn hit_fraction(&self) -> f64 {
        if self.histories == 0 {
            0.0
        } else {
            self.hits as f64 / self.histories as f64
        }
    }
}

/// Draws a direction uniformly on the unit sphere.
pub fn isotropic<R: Rng>(rng: &mut R) -> Vector3<f64> {
    let cos_theta: f64 = rng.random_range(-1.0..1.0);
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
    let phi: f64 = rng.random_range(0.0..2.0 * PI);
    Vector3::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta)
}

/// Traces `histories` lines from `source` through `surface` in parallel.
pub fn run_batch(surface: &dyn Surface, source: &Source, histories: usize, seed: u64) -> Tally {
    let start = Instant::now();
    info!(
        "tracing {} histories through {} '{}'",
        histories,
        surface.type_name(),
        surface.name()
    );

    let position = Point3::from(source.position);
    let fixed = source.direction.map(|d| Vector3::from(d).normalize());

    let pb = ProgressBar::new(histories as u64);
    if let Ok(style) = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] {bar:40.green/blue} {pos:>7}/{len:7} {msg}",
    ) {
        pb.set_style(style.progress_chars("█▇▆▅▄▃▂▁"));
    }
    pb.set_message("histories");

    let tracker = Tracker::new(surface);
    let tally = (0..histories)
        .into_par_iter()
        .map(|history| {
            let u = match fixed {
                Some(u) => u,
                None => {
                    let mut rng = StdRng::seed_from_u64(seed.wrapping_add(history as u64));
                    isotropic(&mut rng)
                }
            };
            let track = tracker.trace(&position, &u);
            pb.inc(1);

            let interior_length = track.interior_length();
            Tally {
                histories: 1,
                hits: usize::from(track.segments.iter().any(|s| s.region >= 0)),
                crossings: track.crossings(),
                interior_length,
            }
        })
        .reduce(Tally::default, |acc, item| acc + item);
    pb.finish_and_clear();

    info!(
        "traced {} histories in {:.2?}, {} hit the geometry",
        tally.histories,
        start.elapsed(),
        tally.hits
    );
    tally
}
