#![deny(bare_trait_objects)]

//! Iterate over the verbs and points of paths owned by a host graphics platform,
//! whatever the platform version and the way it lays paths out in memory.
//!
//! # Crates
//!
//! This meta-crate (`pathway`) reexports the following sub-crates for convenience:
//!
//! * [![crate](https://img.shields.io/crates/v/pathway_path.svg)](https://crates.io/crates/pathway_path)
//!   [![doc](https://docs.rs/pathway_path/badge.svg)](https://docs.rs/pathway_path) -
//!   **pathway_path** - Host layouts, path extraction, the path iterator and the
//!   handle registry used by binding layers.
//! * [![crate](https://img.shields.io/crates/v/pathway_geom.svg)](https://crates.io/crates/pathway_geom)
//!   [![doc](https://docs.rs/pathway_geom/badge.svg)](https://docs.rs/pathway_geom) -
//!   **pathway_geom** - Quadratic bézier curves and conics, and the approximation of
//!   the latter with the former.
//!
//! # Feature flags
//!
//! serde serialization is disabled by default and can be enabled with the
//! `serialization` feature flag.
//!
//! # Overview
//!
//! A host path is an opaque object whose first machine word points to a structure
//! holding three arrays: points, verbs and conic weights. Where these arrays are, and
//! whether the verbs are stored front to back or back to front, depends on the
//! platform version. The layout is resolved once per process from the version
//! reported by a [`VersionSource`](path/layout/trait.VersionSource.html):
//!
//! ```
//! use pathway::path::layout::{FixedVersion, LayoutKind, LayoutResolver};
//! use pathway::path::VerbDirection;
//!
//! let resolver = LayoutResolver::new(FixedVersion::preview(33, "UpsideDownCake"));
//! let layout = resolver.resolve().unwrap();
//!
//! assert_eq!(layout.kind, LayoutKind::PathRef34);
//! assert_eq!(layout.direction, VerbDirection::Forward);
//! ```
//!
//! A [`PathIterator`](path/iterator/struct.PathIterator.html) then produces the
//! commands of a path in order, each with its points:
//!
//! ```
//! use pathway::path::extract::write_path;
//! use pathway::path::layout::LayoutDescriptor;
//! use pathway::path::memory::{MemoryImage, PointerWidth};
//! use pathway::path::svg::to_svg_path_data;
//! use pathway::math::point;
//! use pathway::{IteratorOptions, PathIterator, Verb};
//!
//! let layout = LayoutDescriptor::for_version(24, PointerWidth::Bits64).unwrap();
//! let mut memory = MemoryImage::new(0x1000);
//! let path = write_path(
//!     &mut memory,
//!     layout,
//!     &[Verb::Move, Verb::Quadratic, Verb::Close],
//!     &[point(0.0, 0.0), point(5.0, 10.0), point(10.0, 0.0)],
//!     &[],
//! );
//!
//! let iter = PathIterator::from_handle(&memory, path, layout, IteratorOptions::DEFAULT).unwrap();
//! assert_eq!(iter.count(), 3);
//! assert_eq!(to_svg_path_data(iter), "M0 0Q5 10 10 0Z");
//! ```
//!
//! Conics, which most consumers of paths can't handle, are approximated with
//! quadratic bézier curves unless `ConicEvaluation::AsConic` is requested.

pub extern crate pathway_path;

pub use pathway_path as path;
pub use path::geom;

pub use path::math;

#[doc(inline)]
pub use path::{
    ConicEvaluation, Error, IteratorOptions, PathIterator, PathSegment, Result, Verb,
};
