#![deny(bare_trait_objects)]
#![deny(unconditional_recursion)]
#![allow(clippy::match_like_matches_macro)]

//! Reading the paths of a host graphics platform (Skia paths, as embedded in Android's
//! `android.graphics.Path`) without depending on how the platform version at hand
//! lays them out in memory.
//!
//! This crate is reexported in [pathway](../pathway/index.html).
//!
//! # Overview
//!
//! - The [layout](layout/index.html) module selects, once per process, the description
//!   of the host's `SkPathRef` structure for the running platform version.
//! - The [extract](extract/index.html) module reads the points, verbs and conic weights
//!   of a path object through that description.
//! - The [iterator](iterator/index.html) module walks these arrays in path order and
//!   optionally approximates conics with quadratic bézier curves.
//! - The [registry](registry/index.html) module exposes iterators through integer
//!   handles, for binding layers.
//!
//! All accesses to the host's memory go through the [`HostMemory`](memory/trait.HostMemory.html)
//! trait and are bounds-checked.
//!
//! # Examples
//!
//! ```
//! use pathway_path::extract::write_path;
//! use pathway_path::layout::{FixedVersion, LayoutResolver};
//! use pathway_path::math::point;
//! use pathway_path::memory::{MemoryImage, PointerWidth};
//! use pathway_path::{IteratorOptions, PathIterator, Verb};
//!
//! let resolver =
//!     LayoutResolver::with_pointer_width(FixedVersion::release(28), PointerWidth::Bits32);
//! let layout = resolver.resolve().unwrap();
//!
//! // A memory image standing in for the host process.
//! let mut memory = MemoryImage::new(0x8000);
//! let path = write_path(
//!     &mut memory,
//!     layout,
//!     &[Verb::Move, Verb::Conic],
//!     &[point(0.0, 0.0), point(10.0, 0.0), point(10.0, 10.0)],
//!     &[std::f32::consts::FRAC_1_SQRT_2],
//! );
//!
//! let iter = PathIterator::from_handle(&memory, path, layout, IteratorOptions::DEFAULT).unwrap();
//! for segment in iter {
//!     assert!(segment.verb == Verb::Move || segment.verb == Verb::Quadratic);
//! }
//! ```

pub use pathway_geom as geom;

#[cfg(feature = "serialization")]
#[macro_use]
pub extern crate serde;

pub mod contours;
mod error;
pub mod extract;
pub mod iterator;
pub mod layout;
pub mod memory;
pub mod registry;
mod segment;
pub mod svg;
mod verb;

#[doc(inline)]
pub use crate::error::{Error, Result};
#[doc(inline)]
pub use crate::extract::{PathHandle, RawPath};
#[doc(inline)]
pub use crate::iterator::{ConicEvaluation, IteratorOptions, PathIterator};
#[doc(inline)]
pub use crate::layout::{LayoutDescriptor, LayoutResolver, VerbDirection, VersionSource};
#[doc(inline)]
pub use crate::memory::HostMemory;
#[doc(inline)]
pub use crate::registry::{IteratorHandle, IteratorRegistry};
pub use crate::segment::PathSegment;
pub use crate::verb::Verb;

pub mod math {
    //! f32 version of the pathway_geom types used everywhere.

    use crate::geom::euclid;

    /// Alias for ```euclid::default::Point2D<f32>```.
    pub type Point = euclid::default::Point2D<f32>;

    /// Alias for ```euclid::default::Vector2D<f32>```.
    pub type Vector = euclid::default::Vector2D<f32>;

    /// Alias for ```euclid::default::Box2D<f32>```.
    pub type Box2D = euclid::default::Box2D<f32>;

    /// Shorthand for `Vector::new(x, y)`.
    #[inline]
    pub fn vector(x: f32, y: f32) -> Vector {
        Vector::new(x, y)
    }

    /// Shorthand for `Point::new(x, y)`.
    #[inline]
    pub fn point(x: f32, y: f32) -> Point {
        Point::new(x, y)
    }
}

/// The fill rule defines how to determine what is inside and what is outside of the shape.
///
/// Mirrors the `fill-rule` property of SVG.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum FillRule {
    EvenOdd,
    NonZero,
}

impl Default for FillRule {
    fn default() -> Self {
        FillRule::NonZero
    }
}
