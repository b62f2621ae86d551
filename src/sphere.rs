use std::fmt;

use nalgebra::{Point3, Vector3};

use crate::intersect::{quadric_distance, quadric_step};
use crate::medium::{MediumLookup, RegionMedia};
use crate::surface::{Step, Surface, INSIDE, OUTSIDE};


/// A single sphere, the `a = b = c` member of the quadric family.
#[derive(Debug, Clone, PartialEq)]
pub struct Sphere {
    pub center: Point3<f64>,
    pub radius: f64,
    r2: f64,
    name: String,
    media: RegionMedia,
}

impl Sphere {
    pub const TYPE_NAME: &'static str = "sphere";

    pub fn new(radius: f64, center: Point3<f64>) -> Self {
        Self {
            center,
            radius,
            r2: radius * radius,
            name: String::new(),
            media: RegionMedia::default(),
        }
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    pub fn set_medium(&mut self, medium: Option<usize>) {
        self.media = RegionMedia::new(medium);
    }

    fn axes2(&self) -> Vector3<f64> {
        Vector3::repeat(self.r2)
    }
}

impl Surface for Sphere {
    fn is_inside(&self, x: &Point3<f64>) -> bool {
        (x - self.center).norm_squared() <= self.r2
    }

    fn is_where(&self, x: &Point3<f64>) -> i32 {
        if (x - self.center).norm_squared() < self.r2 {
            INSIDE
        } else {
            OUTSIDE
        }
    }

    fn howfar(&self, ireg: i32, x: &Point3<f64>, u: &Vector3<f64>, t: f64) -> Step {
        quadric_step(self, &self.axes2(), &self.center, ireg, x, u, t)
    }

    fn howfar_to_outside(&self, ireg: i32, x: &Point3<f64>, u: &Vector3<f64>) -> Option<f64> {
        quadric_distance(&self.axes2(), &self.center, ireg, x, u)
    }

    fn hownear(&self, _ireg: i32, x: &Point3<f64>) -> f64 {
        (self.radius - (x - self.center).norm()).abs()
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

impl fmt::Display for Sphere {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            " midpoint of sphere = ({},{},{})",
            self.center.x, self.center.y, self.center.z
        )?;
        write!(f, " sphere equation = x^2 + y^2 + z^2 = {}^2", self.radius)
    }
}
