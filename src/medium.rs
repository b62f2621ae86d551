//! Media bookkeeping for boundary primitives.
//!
//! Primitives know nothing about materials. A scene owns one [`MediaTable`]
//! listing every medium by name; each primitive carries a [`RegionMedia`]
//! that maps its local region indices onto entries of that table and simply
//! forwards lookups to it.


/// Lookup from a local region index to a medium index.
///
/// `0` is the interior of a single-region primitive and `-1` its exterior.
/// `None` means vacuum.
pub trait MediumLookup {
    fn medium(&self, local: i32) -> Option<usize>;
}

/// Medium assignment for a primitive with one interior region.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RegionMedia {
    pub interior: Option<usize>,
}

impl RegionMedia {
    pub fn new(interior: Option<usize>) -> Self {
        Self { interior }
    }
}

impl MediumLookup for RegionMedia {
    fn medium(&self, local: i32) -> Option<usize> {
        if local < 0 {
            None // the exterior is owned by whatever surrounds the primitive
        } else {
            self.interior
        }
    }
}

/// Scene-wide list of media, indexed in order of first appearance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaTable {
    names: Vec<String>,
}

impl MediaTable {
    pub fn new() -> Self {
        Self { names: Vec::new() }
    }

    /// Returns the index of `name`, appending it if not yet known.
    pub fn add(&mut self, name: &str) -> usize {
        match self.index_of(name) {
            Some(index) => index,
            None => {
                self.names.push(name.to_string());
                self.names.len() - 1
            }
        }
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
