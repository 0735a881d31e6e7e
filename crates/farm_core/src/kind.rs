//! Closed set of crop and livestock kinds.
//!
//! Kinds are plain tagged variants. Every kind-specific number lives in
//! [`GameConfig`](crate::config::GameConfig) and is looked up by key, so a
//! crop and a cow share one entity shape and differ only in the
//! discriminant and the configuration they were built from.
//!
//! # Example
//!
//! ```
//! use farm_core::kind::{AnimalKind, CropKind, ResourceKind};
//!
//! let kind = ResourceKind::Crop(CropKind::Tomato);
//! assert!(kind.is_crop());
//! assert_eq!(ResourceKind::from(AnimalKind::DairyCow).name(), "DairyCow");
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// A plantable crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CropKind {
    /// Cheap, fast crop sold by the seed.
    Tomato,
    /// Slower crop with a better sell price.
    Blueberry,
    /// Sold only in bulk seed bundles.
    Strawberry,
}

impl CropKind {
    /// Every crop kind, in declaration order.
    pub const ALL: [Self; 3] = [Self::Tomato, Self::Blueberry, Self::Strawberry];

    /// Stable name used in logs and configuration keys.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Tomato => "Tomato",
            Self::Blueberry => "Blueberry",
            Self::Strawberry => "Strawberry",
        }
    }
}

/// A placeable animal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AnimalKind {
    /// Produces milk.
    DairyCow,
}

impl AnimalKind {
    /// Every animal kind, in declaration order.
    pub const ALL: [Self; 1] = [Self::DairyCow];

    /// Stable name used in logs and configuration keys.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::DairyCow => "DairyCow",
        }
    }

    /// Name of the goods this animal produces.
    #[must_use]
    pub const fn produce_name(self) -> &'static str {
        match self {
            Self::DairyCow => "milk",
        }
    }
}

/// Discriminant of a resource entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    /// A crop growing on a plot.
    Crop(CropKind),
    /// An animal placed on a plot.
    Animal(AnimalKind),
}

impl ResourceKind {
    /// Whether this is a crop.
    #[must_use]
    pub const fn is_crop(self) -> bool {
        matches!(self, Self::Crop(_))
    }

    /// Whether this is an animal.
    #[must_use]
    pub const fn is_animal(self) -> bool {
        matches!(self, Self::Animal(_))
    }

    /// Stable name of the underlying kind.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Crop(crop) => crop.name(),
            Self::Animal(animal) => animal.name(),
        }
    }
}

impl From<CropKind> for ResourceKind {
    fn from(crop: CropKind) -> Self {
        Self::Crop(crop)
    }
}

impl From<AnimalKind> for ResourceKind {
    fn from(animal: AnimalKind) -> Self {
        Self::Animal(animal)
    }
}

impl fmt::Display for CropKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for AnimalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
