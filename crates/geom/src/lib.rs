#![deny(bare_trait_objects)]
#![deny(unconditional_recursion)]
#![allow(clippy::excessive_precision)]
#![allow(clippy::many_single_char_names)]
#![no_std]

//! Simple 2D geometric primitives on top of euclid.
//!
//! This crate is reexported in [pathway](../pathway/index.html).
//!
//! # Overview.
//!
//! This crate implements the maths needed to work with the curves found in
//! Skia paths:
//!
//! - quadratic bézier curves,
//! - conics (rational quadratic bézier curves).
//!
//! # Conics
//!
//! A conic is a quadratic bézier curve with a weight attached to its control point.
//! A weight of one is an ordinary quadratic curve, a weight below one describes an
//! elliptical arc and a weight above one a hyperbolic one.
//!
//! Most consumers of paths do not know what to do with conics, so the
//! [`ConicConverter`](conic/struct.ConicConverter.html) approximates them with a
//! chain of quadratic curves.
//!
//! The tolerance threshold taken as input by the conversion corresponds
//! to the maximum distance between the conic and its approximation.
//! The smaller the tolerance is, the more precise the approximation and the more segments
//! are generated.
//!
//! ```
//! use pathway_geom::{point, ConicConverter, ConicSegment};
//!
//! let quarter_circle = ConicSegment {
//!     from: point(100.0f32, 0.0),
//!     ctrl: point(100.0, 100.0),
//!     to: point(0.0, 100.0),
//!     weight: core::f32::consts::FRAC_1_SQRT_2,
//! };
//!
//! let mut converter = ConicConverter::new();
//! let count = converter.convert(&quarter_circle, 0.25);
//!
//! assert_eq!(count, converter.quadratic_count());
//! assert_eq!(converter.quadratics().len(), 2 * count + 1);
//! ```

#[cfg(any(test, feature = "std"))]
extern crate std;

// Reexport dependencies.
pub use arrayvec;
pub use euclid;

#[cfg(feature = "serialization")]
#[macro_use]
pub extern crate serde;

pub mod conic;
pub mod quadratic_bezier;

#[doc(inline)]
pub use crate::conic::{ConicConverter, ConicSegment};
#[doc(inline)]
pub use crate::quadratic_bezier::QuadraticBezierSegment;

pub use crate::scalar::Scalar;

mod scalar {
    pub(crate) use num_traits::{Float, NumCast};

    use core::fmt::{Debug, Display};
    use core::ops::{AddAssign, DivAssign, MulAssign, SubAssign};

    pub trait Scalar:
        Float + NumCast + Sized + Display + Debug + AddAssign + SubAssign + MulAssign + DivAssign
    {
        const HALF: Self;
        const ZERO: Self;
        const ONE: Self;
        const TWO: Self;
        const FOUR: Self;

        /// Below this distance two points are considered equal when collapsing
        /// degenerate subdivisions.
        const NEARLY_ZERO: Self;

        fn value(v: f32) -> Self;
    }

    impl Scalar for f32 {
        const HALF: Self = 0.5;
        const ZERO: Self = 0.0;
        const ONE: Self = 1.0;
        const TWO: Self = 2.0;
        const FOUR: Self = 4.0;

        // 1 / 4096
        const NEARLY_ZERO: Self = 1.0 / 4096.0;

        #[inline]
        fn value(v: f32) -> Self {
            v
        }
    }

    impl Scalar for f64 {
        const HALF: Self = 0.5;
        const ZERO: Self = 0.0;
        const ONE: Self = 1.0;
        const TWO: Self = 2.0;
        const FOUR: Self = 4.0;

        const NEARLY_ZERO: Self = 1.0 / 4096.0;

        #[inline]
        fn value(v: f32) -> Self {
            v as f64
        }
    }
}

/// Alias for `euclid::default::Point2D`.
pub use euclid::default::Point2D as Point;

/// Alias for `euclid::default::Vector2D`.
pub use euclid::default::Vector2D as Vector;

/// Alias for `euclid::default::Box2D`
pub use euclid::default::Box2D;

/// Shorthand for `Vector::new(x, y)`.
#[inline]
pub fn vector<S>(x: S, y: S) -> Vector<S> {
    Vector::new(x, y)
}

/// Shorthand for `Point::new(x, y)`.
#[inline]
pub fn point<S>(x: S, y: S) -> Point<S> {
    Point::new(x, y)
}
