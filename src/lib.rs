pub mod ellipsoid;
pub mod intersect;
pub mod medium;
pub mod nearest;
pub mod registry;
pub mod settings;
pub mod sphere;
pub mod surface;
pub mod tracker;

pub use ellipsoid::Ellipsoid;
pub use medium::{MediaTable, MediumLookup, RegionMedia};
pub use registry::{GeometryInput, Registry};
pub use sphere::Sphere;
pub use surface::{Step, Surface, INSIDE, OUTSIDE};
pub use tracker::{Segment, Tally, Track, Tracker};
