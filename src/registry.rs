//! Construction of boundary primitives from configuration input.
//!
//! A scene description names each geometry by a type tag. The [`Registry`]
//! maps those tags onto builder functions, which validate the parameters and
//! hand back a ready-to-query [`Surface`]. Query code never re-checks what is
//! validated here.
//!
//! # Input keys
//!
//! - `type`: registry tag (`ellipsoid`, `sphere`)
//! - `name`: optional label for diagnostics
//! - `midpoint`: three reals, defaults to the origin
//! - `x_semi_axis`, `y_semi_axis`, `z_semi_axis`: ellipsoid semi-axes, also
//!   accepted as `"x semi-axis"` etc.
//! - `radius`: sphere radius
//! - `medium`: optional name of the interior medium

use std::collections::HashMap;

use anyhow::{anyhow, bail, Context, Result};
use itertools::Itertools;
use nalgebra::Point3;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::ellipsoid::Ellipsoid;
use crate::medium::MediaTable;
use crate::sphere::Sphere;
use crate::surface::Surface;

#[cfg(test)]
mod tests {

    use super::*;
    use crate::surface::{INSIDE, OUTSIDE};

    fn input(text: &str) -> GeometryInput {
        toml::from_str(text).unwrap()
    }

    #[test]
    fn builds_ellipsoid() {
        let geometry = input(
            r#"
            type = "ellipsoid"
            name = "phantom"
            midpoint = [1.0, 2.0, 3.0]
            "x semi-axis" = 2.0
            "y semi-axis" = 1.0
            z_semi_axis = 0.5
            medium = "H2O521ICRU"
            "#,
        );
        let mut media = MediaTable::new();
        let surface = Registry::default().build(&geometry, &mut media).unwrap();
        assert_eq!(surface.type_name(), "ellipsoid");
        assert_eq!(surface.name(), "phantom");
        assert!(surface.describe().contains(" name = phantom\n"));
        assert_eq!(surface.is_where(&Point3::new(1.0, 2.0, 3.0)), INSIDE);
        assert_eq!(surface.is_where(&Point3::new(1.0, 2.0, 3.6)), OUTSIDE);
        assert_eq!(media.index_of("H2O521ICRU"), Some(0));
        assert_eq!(surface.medium(INSIDE), Some(0));
        assert_eq!(surface.medium(OUTSIDE), None);
    }

    #[test]
    fn missing_midpoint_is_origin() {
        let geometry = input(
            r#"
            type = "ellipsoid"
            x_semi_axis = 1.0
            y_semi_axis = 1.0
            z_semi_axis = 1.0
            "#,
        );
        let surface = Registry::default()
            .build(&geometry, &mut MediaTable::new())
            .unwrap();
        assert_eq!(surface.hownear(INSIDE, &Point3::origin()), 1.0);
        assert_eq!(surface.medium(INSIDE), None);
    }

    #[test]
    fn malformed_midpoint_is_origin() {
        let geometry = input(
            r#"
            type = "sphere"
            midpoint = [5.0, 5.0]
            radius = 1.0
            "#,
        );
        let surface = Registry::default()
            .build(&geometry, &mut MediaTable::new())
            .unwrap();
        assert!(surface.is_inside(&Point3::origin()));
    }

    #[test]
    fn rejects_non_positive_semi_axis() {
        let geometry = input(
            r#"
            type = "ellipsoid"
            x_semi_axis = 1.0
            y_semi_axis = 0.0
            z_semi_axis = 1.0
            "#,
        );
        let err = Registry::default()
            .build(&geometry, &mut MediaTable::new())
            .err()
            .unwrap();
        assert!(format!("{:#}", err).contains("wrong/missing 'y semi-axis' input"));
    }

    #[test]
    fn rejects_missing_semi_axis() {
        let geometry = input(
            r#"
            type = "ellipsoid"
            x_semi_axis = 1.0
            y_semi_axis = 1.0
            "#,
        );
        let err = Registry::default()
            .build(&geometry, &mut MediaTable::new())
            .err()
            .unwrap();
        assert!(format!("{:#}", err).contains("'z semi-axis'"));
    }

    #[test]
    fn rejects_unknown_type() {
        let geometry = input(r#"type = "torus""#);
        let err = Registry::default()
            .build(&geometry, &mut MediaTable::new())
            .err()
            .unwrap();
        let message = format!("{}", err);
        assert!(message.contains("torus"));
        assert!(message.contains("ellipsoid, sphere"));
    }

    #[test]
    fn custom_builder() {
        fn unit_ball(_: &GeometryInput, _: &mut MediaTable) -> Result<Box<dyn Surface>> {
            Ok(Box::new(Sphere::new(1.0, Point3::origin())))
        }
        let mut registry = Registry::empty();
        assert!(registry.is_empty());
        registry.register("ball", unit_ball);
        assert_eq!(registry.types(), vec!["ball"]);
        let surface = registry
            .build(&input(r#"type = "ball""#), &mut MediaTable::new())
            .unwrap();
        assert_eq!(surface.type_name(), "sphere");
    }
}

/// Parameters for one geometry as read from a configuration file.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct GeometryInput {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub midpoint: Option<Vec<f64>>,
    #[serde(default, alias = "x semi-axis")]
    pub x_semi_axis: Option<f64>,
    #[serde(default, alias = "y semi-axis")]
    pub y_semi_axis: Option<f64>,
    #[serde(default, alias = "z semi-axis")]
    pub z_semi_axis: Option<f64>,
    #[serde(default)]
    pub radius: Option<f64>,
    #[serde(default)]
    pub medium: Option<String>,
}

/// Builds a surface from validated input, registering its media.
pub type Builder = fn(&GeometryInput, &mut MediaTable) -> Result<Box<dyn Surface>>;

/// Type-tag to builder lookup used by the scene builder.
///
/// **Context**: Scene files choose a primitive by name. New primitives are
/// added by registering a builder, without touching query code.
///
/// **How it Works**: Holds a map from tag to [`Builder`]. [`Registry::default`]
/// knows the ellipsoid and the sphere.
#[derive(Clone)]
pub struct Registry {
    builders: HashMap<&'static str, Builder>,
}

impl Default for Registry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(Ellipsoid::TYPE_NAME, build_ellipsoid);
        registry.register(Sphere::TYPE_NAME, build_sphere);
        registry
    }
}

impl Registry {
    pub fn empty() -> Self {
        Self {
            builders: HashMap::new(),
        }
    }

    /// Adds or replaces the builder for `tag`.
    pub fn register(&mut self, tag: &'static str, builder: Builder) {
        self.builders.insert(tag, builder);
    }

    /// Registered tags in alphabetical order.
    pub fn types(&self) -> Vec<&'static str> {
        self.builders.keys().copied().sorted().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.builders.is_empty()
    }

    pub fn build(&self, input: &GeometryInput, media: &mut MediaTable) -> Result<Box<dyn Surface>> {
        let builder = self.builders.get(input.kind.as_str()).ok_or_else(|| {
            anyhow!(
                "unknown geometry type '{}', known types: {}",
                input.kind,
                self.types().iter().join(", ")
            )
        })?;

        let surface = builder(input, media)
            .with_context(|| format!("failed to build {} '{}'", input.kind, input.name))?;
        debug!(
            "built {} '{}' with {} region(s)",
            surface.type_name(),
            input.name,
            surface.num_regions()
        );
        Ok(surface)
    }
}

fn midpoint(input: &GeometryInput) -> Point3<f64> {
    match input.midpoint.as_deref() {
        Some([x, y, z]) => Point3::new(*x, *y, *z),
        Some(other) => {
            warn!(
                "ignoring midpoint of '{}' with {} components, using the origin",
                input.name,
                other.len()
            );
            Point3::origin()
        }
        None => Point3::origin(),
    }
}

fn positive(value: Option<f64>, key: &str) -> Result<f64> {
    match value {
        Some(v) if v > 0.0 => Ok(v),
        _ => {
            warn!("wrong/missing '{}' input: {:?}", key, value);
            bail!("wrong/missing '{}' input", key)
        }
    }
}

fn interior_medium(input: &GeometryInput, media: &mut MediaTable) -> Option<usize> {
    input.medium.as_deref().map(|name| media.add(name))
}

fn build_ellipsoid(input: &GeometryInput, media: &mut MediaTable) -> Result<Box<dyn Surface>> {
    let a = positive(input.x_semi_axis, "x semi-axis")?;
    let b = positive(input.y_semi_axis, "y semi-axis")?;
    let c = positive(input.z_semi_axis, "z semi-axis")?;

    let mut ellipsoid = Ellipsoid::new(a, b, c, midpoint(input));
    ellipsoid.set_name(&input.name);
    ellipsoid.set_medium(interior_medium(input, media));
    Ok(Box::new(ellipsoid))
}

fn build_sphere(input: &GeometryInput, media: &mut MediaTable) -> Result<Box<dyn Surface>> {
    let radius = positive(input.radius, "radius")?;

    let mut sphere = Sphere::new(radius, midpoint(input));
    sphere.set_name(&input.name);
    sphere.set_medium(interior_medium(input, media));
    Ok(Box::new(sphere))
}
