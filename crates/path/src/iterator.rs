//! Iteration over the commands of a host path.
//!
//! # Overview
//!
//! A [`PathIterator`](struct.PathIterator.html) walks the raw arrays of a host path in
//! path order, whatever the physical order of the verbs, and produces one verb per
//! call to `next` along with the points of the corresponding segment. Curves carry
//! their start point, which in the host's arrays is implicitly the last point of
//! the previous verb.
//!
//! Conics are either reported as they are or approximated with quadratic bézier
//! curves, see [`ConicEvaluation`](enum.ConicEvaluation.html).
//!
//! # Examples
//!
//! ```
//! use pathway_path::extract::write_path;
//! use pathway_path::iterator::{IteratorOptions, PathIterator};
//! use pathway_path::layout::LayoutDescriptor;
//! use pathway_path::math::{point, Point};
//! use pathway_path::memory::{MemoryImage, PointerWidth};
//! use pathway_path::Verb;
//!
//! // Build the host objects of a small path in a memory image.
//! let layout = LayoutDescriptor::for_version(30, PointerWidth::Bits64).unwrap();
//! let mut image = MemoryImage::new(0x1000);
//! let path = write_path(
//!     &mut image,
//!     layout,
//!     &[Verb::Move, Verb::Line, Verb::Close],
//!     &[point(1.0, 1.0), point(2.0, 2.0)],
//!     &[],
//! );
//!
//! let mut iter =
//!     PathIterator::from_handle(&image, path, layout, IteratorOptions::DEFAULT).unwrap();
//! let mut points = [Point::zero(); 4];
//!
//! assert_eq!(iter.next(&mut points), Verb::Move);
//! assert_eq!(points[0], point(1.0, 1.0));
//! assert_eq!(iter.next(&mut points), Verb::Line);
//! assert_eq!(&points[..2], &[point(1.0, 1.0), point(2.0, 2.0)]);
//! assert_eq!(iter.next(&mut points), Verb::Close);
//! assert!(!iter.has_next());
//! assert_eq!(iter.next(&mut points), Verb::Done);
//! ```

use crate::extract::{extract, PathHandle, RawPath};
use crate::geom::{ConicConverter, ConicSegment};
use crate::layout::{LayoutDescriptor, VerbDirection};
use crate::math::{point, Point};
use crate::memory::HostMemory;
use crate::segment::PathSegment;
use crate::verb::Verb;
use crate::{Error, Result};

use arrayvec::ArrayVec;

/// How conics are reported.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum ConicEvaluation {
    /// Conics are reported as `Verb::Conic`, with their weight.
    AsConic = 0,
    /// Each conic is replaced by one or more `Verb::Quadratic`.
    AsQuadratics = 1,
}

impl ConicEvaluation {
    /// The numeric codes used by the binding layer.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(ConicEvaluation::AsConic),
            1 => Some(ConicEvaluation::AsQuadratics),
            _ => None,
        }
    }
}

impl Default for ConicEvaluation {
    fn default() -> Self {
        ConicEvaluation::AsQuadratics
    }
}

/// Parameters of a [`PathIterator`](struct.PathIterator.html).
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct IteratorOptions {
    /// See [`ConicEvaluation`](enum.ConicEvaluation.html).
    ///
    /// Default value: `ConicEvaluation::AsQuadratics`.
    pub conic_evaluation: ConicEvaluation,

    /// Maximum distance between a conic and the quadratic curves approximating it.
    ///
    /// Default value: `IteratorOptions::DEFAULT_TOLERANCE`.
    pub tolerance: f32,
}

impl IteratorOptions {
    /// Default conic approximation tolerance.
    pub const DEFAULT_TOLERANCE: f32 = 0.25;

    pub const DEFAULT: Self = IteratorOptions {
        conic_evaluation: ConicEvaluation::AsQuadratics,
        tolerance: Self::DEFAULT_TOLERANCE,
    };

    #[inline]
    pub fn tolerance(tolerance: f32) -> Self {
        Self::DEFAULT.with_tolerance(tolerance)
    }

    /// Options reporting conics as they are.
    #[inline]
    pub fn as_conics() -> Self {
        Self::DEFAULT.with_conic_evaluation(ConicEvaluation::AsConic)
    }

    #[inline]
    pub const fn with_tolerance(mut self, tolerance: f32) -> Self {
        self.tolerance = tolerance;
        self
    }

    #[inline]
    pub const fn with_conic_evaluation(mut self, conic_evaluation: ConicEvaluation) -> Self {
        self.conic_evaluation = conic_evaluation;
        self
    }
}

impl Default for IteratorOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Position in the raw arrays, in path order.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
struct Cursor {
    verb: usize,
    point: usize,
    weight: usize,
}

impl Cursor {
    fn advance(&mut self, verb: Verb) {
        self.verb += 1;
        self.point += verb.consumed_points();
        if verb.consumes_weight() {
            self.weight += 1;
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum State {
    /// Reading verbs from the raw arrays.
    Outer,
    /// Returning the quadratic curves approximating a conic, starting with `next`.
    Draining { next: usize },
    Done,
}

/// A segment read from the raw arrays.
struct RawSegment {
    verb: Verb,
    points: ArrayVec<Point, 4>,
    weight: f32,
}

/// Walks the commands of a host path.
///
/// The iterator borrows the host's memory: the host path must not be modified or
/// released while the iterator is alive.
///
/// Malformed data (a verb referencing points or weights past the end of their
/// arrays, a curve without a start point, an unknown verb code) ends the iteration
/// as if `Verb::Done` had been read, and is reported as a warning through `log`.
pub struct PathIterator<'l> {
    raw: RawPath<'l>,
    cursor: Cursor,
    state: State,
    options: IteratorOptions,
    converter: ConicConverter<f32>,
}

impl<'l> PathIterator<'l> {
    pub fn new(raw: RawPath<'l>, options: IteratorOptions) -> Self {
        PathIterator {
            raw,
            cursor: Cursor::default(),
            state: State::Outer,
            options,
            converter: ConicConverter::new(),
        }
    }

    /// Extracts the path at `handle` and iterates over it.
    pub fn from_handle<M: HostMemory + ?Sized>(
        memory: &'l M,
        handle: PathHandle,
        layout: &LayoutDescriptor,
        options: IteratorOptions,
    ) -> Result<Self> {
        Ok(PathIterator::new(extract(memory, handle, layout)?, options))
    }

    /// Returns true while unread verbs remain.
    ///
    /// Becomes false for good once `next` has produced `Verb::Done`.
    pub fn has_next(&self) -> bool {
        match self.state {
            State::Outer => self.cursor.verb < self.raw.count,
            State::Draining { .. } => true,
            State::Done => false,
        }
    }

    /// Returns the verb the next call to `next` will produce, without advancing.
    ///
    /// Conics are reported as `Verb::Quadratic` when they are approximated.
    pub fn peek(&self) -> Verb {
        match self.state {
            State::Draining { .. } => Verb::Quadratic,
            State::Done => Verb::Done,
            State::Outer => {
                // Malformed segments are read as the end of the path, as `next` does.
                let verb = match self.read(&self.cursor) {
                    Ok(Some(segment)) => segment.verb,
                    Ok(None) | Err(_) => Verb::Done,
                };

                if verb == Verb::Conic
                    && self.options.conic_evaluation == ConicEvaluation::AsQuadratics
                {
                    Verb::Quadratic
                } else {
                    verb
                }
            }
        }
    }

    /// Produces the next verb and writes its points into `points`.
    ///
    /// The points are written in order: the start point (for curves and lines), the
    /// control points, and the end point. Conics store their weight in both
    /// coordinates of `points[3]`. Close and Done write nothing.
    pub fn next(&mut self, points: &mut [Point; 4]) -> Verb {
        match self.state {
            State::Done => return Verb::Done,
            State::Draining { next } => return self.drain(next, points),
            State::Outer => {}
        }

        let segment = match self.read(&self.cursor) {
            Ok(Some(segment)) => segment,
            Ok(None) => {
                self.state = State::Done;
                return Verb::Done;
            }
            Err(reason) => {
                log::warn!(
                    "Malformed path data at verb {} of {}: {}.",
                    self.cursor.verb,
                    self.raw.count,
                    reason
                );
                self.state = State::Done;
                return Verb::Done;
            }
        };

        self.cursor.advance(segment.verb);

        if segment.verb == Verb::Conic
            && self.options.conic_evaluation == ConicEvaluation::AsQuadratics
        {
            let conic = [segment.points[0], segment.points[1], segment.points[2]];
            self.converter
                .to_quadratics(&conic, segment.weight, self.options.tolerance);

            return self.drain(0, points);
        }

        for (i, p) in segment.points.iter().enumerate() {
            points[i] = *p;
        }
        if segment.verb == Verb::Conic {
            points[3] = point(segment.weight, segment.weight);
        }

        segment.verb
    }

    /// Same as `next`, writing the coordinates of the points into `buffer`, starting
    /// at `offset`.
    ///
    /// Writes 2 floats for `Move`, 4 for `Line`, 6 for `Quadratic`, 8 for `Cubic` and 8
    /// for `Conic` (the last two being the weight). The buffer must have room for 8
    /// floats past `offset`, otherwise the iterator doesn't advance and an error is
    /// returned.
    pub fn next_into(&mut self, buffer: &mut [f32], offset: usize) -> Result<Verb> {
        let required = offset.saturating_add(8);
        if buffer.len() < required {
            return Err(Error::BufferTooSmall {
                required,
                actual: buffer.len(),
            });
        }

        let mut points = [Point::zero(); 4];
        let verb = self.next(&mut points);
        let written = match verb {
            Verb::Move => 1,
            Verb::Line => 2,
            Verb::Quadratic => 3,
            Verb::Conic | Verb::Cubic => 4,
            Verb::Close | Verb::Done => 0,
        };

        for (i, p) in points[..written].iter().enumerate() {
            buffer[offset + i * 2] = p.x;
            buffer[offset + i * 2 + 1] = p.y;
        }

        Ok(verb)
    }

    /// Produces the next segment.
    pub fn next_segment(&mut self) -> PathSegment {
        let mut points = [Point::zero(); 4];
        let verb = self.next(&mut points);
        let weight = if verb == Verb::Conic {
            Some(points[3].x)
        } else {
            None
        };

        PathSegment::new(verb, &points, weight)
    }

    /// Number of verbs stored in the host path.
    #[inline]
    pub fn raw_count(&self) -> usize {
        self.raw.count
    }

    /// Number of verbs produced by a complete iteration, `Verb::Done` excluded.
    ///
    /// This differs from `raw_count` when conics are approximated, or when the
    /// path stops early because of a `Done` verb or malformed data. It does not
    /// depend on the progress of the iteration.
    pub fn count(&self) -> usize {
        let mut cursor = Cursor::default();
        let mut count = 0;

        while let Ok(Some(segment)) = self.read(&cursor) {
            count += if segment.verb == Verb::Conic
                && self.options.conic_evaluation == ConicEvaluation::AsQuadratics
            {
                ConicSegment {
                    from: segment.points[0],
                    ctrl: segment.points[1],
                    to: segment.points[2],
                    weight: segment.weight,
                }
                .quadratic_count(self.options.tolerance)
            } else {
                1
            };

            cursor.advance(segment.verb);
        }

        count
    }

    #[inline]
    pub fn conic_evaluation(&self) -> ConicEvaluation {
        self.options.conic_evaluation
    }

    #[inline]
    pub fn tolerance(&self) -> f32 {
        self.options.tolerance
    }

    #[inline]
    pub fn direction(&self) -> VerbDirection {
        self.raw.direction
    }

    #[inline]
    pub fn raw_path(&self) -> &RawPath<'l> {
        &self.raw
    }

    /// Iterates over the remaining segments.
    pub fn into_segments(self) -> Segments<'l> {
        Segments { iter: self }
    }

    fn drain(&mut self, index: usize, points: &mut [Point; 4]) -> Verb {
        let quadratic = match self.converter.quadratic(index) {
            Some(quadratic) => quadratic,
            None => {
                self.state = State::Outer;
                return self.next(points);
            }
        };

        points[0] = quadratic.from;
        points[1] = quadratic.ctrl;
        points[2] = quadratic.to;

        let next = index + 1;
        self.state = if next < self.converter.quadratic_count() {
            State::Draining { next }
        } else {
            State::Outer
        };

        Verb::Quadratic
    }

    /// Reads the segment at `cursor`.
    ///
    /// Returns `None` at the end of the path, including when a `Done` verb is read.
    fn read(&self, cursor: &Cursor) -> core::result::Result<Option<RawSegment>, &'static str> {
        let code = match self.raw.verb_code(cursor.verb) {
            Some(code) => code,
            None => return Ok(None),
        };
        let verb = Verb::from_code(code).ok_or("unknown verb code")?;
        if verb == Verb::Done {
            return Ok(None);
        }

        let mut points = ArrayVec::new();
        if verb.has_implicit_start() {
            let start = cursor.point.checked_sub(1).ok_or("curve without a start point")?;
            points.push(self.raw.points.get(start).ok_or("missing start point")?);
        }
        for i in 0..verb.consumed_points() {
            points.push(self.raw.points.get(cursor.point + i).ok_or("missing points")?);
        }

        let weight = if verb.consumes_weight() {
            self.raw
                .conic_weights
                .get(cursor.weight)
                .ok_or("missing conic weight")?
        } else {
            0.0
        };

        Ok(Some(RawSegment {
            verb,
            points,
            weight,
        }))
    }
}

impl<'l> core::fmt::Debug for PathIterator<'l> {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.debug_struct("PathIterator")
            .field("cursor", &self.cursor)
            .field("state", &self.state)
            .field("options", &self.options)
            .field("raw_count", &self.raw.count)
            .finish()
    }
}

/// An `Iterator` over the segments of a path.
///
/// Stops before `Verb::Done`.
pub struct Segments<'l> {
    iter: PathIterator<'l>,
}

impl<'l> Segments<'l> {
    pub fn path_iterator(&self) -> &PathIterator<'l> {
        &self.iter
    }
}

impl<'l> Iterator for Segments<'l> {
    type Item = PathSegment;

    fn next(&mut self) -> Option<PathSegment> {
        if !self.iter.has_next() {
            return None;
        }

        let segment = self.iter.next_segment();
        if segment.verb == Verb::Done {
            return None;
        }

        Some(segment)
    }
}

impl<'l> IntoIterator for PathIterator<'l> {
    type Item = PathSegment;
    type IntoIter = Segments<'l>;

    fn into_iter(self) -> Segments<'l> {
        self.into_segments()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{write_path, write_raw_path};
    use crate::layout::{LAYOUTS_32, LAYOUTS_64};
    use crate::memory::MemoryImage;
    use core::f32::consts::FRAC_1_SQRT_2;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn forward() -> &'static LayoutDescriptor {
        &LAYOUTS_64[3]
    }

    fn backward() -> &'static LayoutDescriptor {
        &LAYOUTS_64[2]
    }

    struct TestPath {
        image: MemoryImage,
        handle: PathHandle,
        layout: &'static LayoutDescriptor,
    }

    impl TestPath {
        fn new(
            layout: &'static LayoutDescriptor,
            verbs: &[Verb],
            points: &[Point],
            weights: &[f32],
        ) -> Self {
            let mut image = MemoryImage::new(0x10_0000);
            let handle = write_path(&mut image, layout, verbs, points, weights);

            TestPath {
                image,
                handle,
                layout,
            }
        }

        fn raw(
            layout: &'static LayoutDescriptor,
            codes: &[u8],
            points: &[Point],
            weights: &[f32],
        ) -> Self {
            let mut image = MemoryImage::new(0x10_0000);
            let handle = write_raw_path(&mut image, layout, codes, points, weights);

            TestPath {
                image,
                handle,
                layout,
            }
        }

        fn iter(&self, options: IteratorOptions) -> PathIterator {
            PathIterator::from_handle(&self.image, self.handle, self.layout, options).unwrap()
        }

        fn segments(&self, options: IteratorOptions) -> Vec<PathSegment> {
            self.iter(options).into_segments().collect()
        }
    }

    // A 52x52 rounded rectangle with corners of radius 8, made of lines and conics.
    fn round_rect(layout: &'static LayoutDescriptor) -> TestPath {
        use Verb::*;

        let w = FRAC_1_SQRT_2;
        TestPath::new(
            layout,
            &[Move, Line, Conic, Line, Conic, Line, Conic, Line, Conic, Close],
            &[
                point(20.0, 12.0),
                point(56.0, 12.0),
                point(64.0, 12.0),
                point(64.0, 20.0),
                point(64.0, 56.0),
                point(64.0, 64.0),
                point(56.0, 64.0),
                point(20.0, 64.0),
                point(12.0, 64.0),
                point(12.0, 56.0),
                point(12.0, 20.0),
                point(12.0, 12.0),
                point(20.0, 12.0),
            ],
            &[w, w, w, w],
        )
    }

    #[test]
    fn empty_path() {
        let path = TestPath::new(forward(), &[], &[], &[]);
        let mut iter = path.iter(IteratorOptions::DEFAULT);

        assert!(!iter.has_next());
        assert_eq!(iter.peek(), Verb::Done);
        assert_eq!(iter.raw_count(), 0);
        assert_eq!(iter.count(), 0);
        assert_eq!(iter.next(&mut [Point::zero(); 4]), Verb::Done);
        assert!(path.segments(IteratorOptions::DEFAULT).is_empty());
    }

    #[test]
    fn round_trip() {
        use Verb::*;

        let points = [
            point(0.0, 0.0),
            point(1.0, 0.0),
            point(2.0, 1.0),
            point(2.0, 2.0),
            point(3.0, 3.0),
            point(4.0, 3.0),
            point(5.0, 5.0),
        ];
        let path = TestPath::new(
            forward(),
            &[Move, Line, Quadratic, Cubic, Close, Done],
            &points,
            &[],
        );

        let mut iter = path.iter(IteratorOptions::DEFAULT);
        let mut out = [Point::zero(); 4];

        assert_eq!(iter.raw_count(), 6);
        assert_eq!(iter.count(), 5);

        assert_eq!(iter.next(&mut out), Move);
        assert_eq!(out[0], points[0]);

        assert_eq!(iter.next(&mut out), Line);
        assert_eq!(&out[..2], &points[0..2]);

        assert_eq!(iter.next(&mut out), Quadratic);
        assert_eq!(&out[..3], &points[1..4]);

        assert_eq!(iter.next(&mut out), Cubic);
        assert_eq!(&out[..4], &points[3..7]);

        assert_eq!(iter.next(&mut out), Close);
        assert!(iter.has_next());
        assert_eq!(iter.next(&mut out), Done);
        assert!(!iter.has_next());
    }

    #[test]
    fn peek_is_idempotent() {
        let path = round_rect(forward());
        let mut iter = path.iter(IteratorOptions::as_conics());
        let mut out = [Point::zero(); 4];

        for _ in 0..3 {
            assert_eq!(iter.peek(), Verb::Move);
        }
        iter.next(&mut out);
        assert_eq!(iter.peek(), Verb::Line);
        assert_eq!(iter.peek(), Verb::Line);
        iter.next(&mut out);
        assert_eq!(iter.peek(), Verb::Conic);
        assert_eq!(iter.next(&mut out), Verb::Conic);
    }

    #[test]
    fn peek_while_draining() {
        let path = round_rect(forward());
        let mut iter = path.iter(IteratorOptions::DEFAULT);
        let mut out = [Point::zero(); 4];

        iter.next(&mut out);
        iter.next(&mut out);
        assert_eq!(iter.peek(), Verb::Quadratic);
        assert_eq!(iter.next(&mut out), Verb::Quadratic);
        assert_eq!(iter.peek(), Verb::Quadratic);
        assert_eq!(iter.next(&mut out), Verb::Quadratic);
        assert_eq!(iter.peek(), Verb::Line);
    }

    #[test]
    fn directions_are_equivalent() {
        for options in &[IteratorOptions::DEFAULT, IteratorOptions::as_conics()] {
            let a = round_rect(forward()).segments(*options);
            let b = round_rect(backward()).segments(*options);
            let c = round_rect(&LAYOUTS_32[0]).segments(*options);

            assert!(!a.is_empty());
            assert_eq!(a, b);
            assert_eq!(a, c);
        }

        assert_eq!(
            round_rect(forward()).iter(IteratorOptions::DEFAULT).direction(),
            VerbDirection::Forward
        );
        assert_eq!(
            round_rect(backward()).iter(IteratorOptions::DEFAULT).direction(),
            VerbDirection::Backward
        );
    }

    #[test]
    fn conics_pass_through_unmodified() {
        let path = round_rect(backward());
        let segments = path.segments(IteratorOptions::as_conics());

        assert_eq!(segments.len(), 10);
        let conics: Vec<&PathSegment> =
            segments.iter().filter(|s| s.verb == Verb::Conic).collect();
        assert_eq!(conics.len(), 4);
        for conic in conics {
            assert_eq!(conic.weight, Some(FRAC_1_SQRT_2));
            assert_eq!(conic.points.len(), 3);
        }
        assert_eq!(
            &segments[2].points[..],
            &[point(56.0, 12.0), point(64.0, 12.0), point(64.0, 20.0)]
        );
    }

    #[test]
    fn conic_weight_is_packed_in_the_last_point() {
        let path = round_rect(forward());
        let mut iter = path.iter(IteratorOptions::as_conics());
        let mut buffer = [0.0f32; 8];

        iter.next_into(&mut buffer, 0).unwrap();
        iter.next_into(&mut buffer, 0).unwrap();
        assert_eq!(iter.next_into(&mut buffer, 0), Ok(Verb::Conic));
        assert_eq!(buffer, [56.0, 12.0, 64.0, 12.0, 64.0, 20.0, FRAC_1_SQRT_2, FRAC_1_SQRT_2]);
    }

    #[test]
    fn conics_as_quadratics() {
        let path = round_rect(forward());
        let segments = path.segments(IteratorOptions::DEFAULT);

        assert!(segments.iter().all(|s| s.verb != Verb::Conic));
        assert_eq!(segments.len(), 14);

        // The first corner is approximated with two quadratics joining the
        // conic's endpoints.
        assert_eq!(segments[2].verb, Verb::Quadratic);
        assert_eq!(segments[3].verb, Verb::Quadratic);
        assert_eq!(segments[2].from(), Some(point(56.0, 12.0)));
        assert_eq!(segments[2].to(), segments[3].from());
        assert_eq!(segments[3].to(), Some(point(64.0, 20.0)));
        assert_eq!(segments[4].verb, Verb::Line);
        assert_eq!(segments[4].from(), Some(point(64.0, 20.0)));
    }

    #[test]
    fn counts() {
        let path = round_rect(backward());

        let iter = path.iter(IteratorOptions::as_conics());
        assert_eq!(iter.raw_count(), 10);
        assert_eq!(iter.count(), 10);

        let iter = path.iter(IteratorOptions::DEFAULT);
        assert_eq!(iter.raw_count(), 10);
        assert_eq!(iter.count(), 14);

        let iter = path.iter(IteratorOptions::tolerance(0.01));
        assert!(iter.count() > 14);
        assert_eq!(iter.count(), iter.into_segments().count());

        // The count doesn't depend on the progress of the iteration.
        let mut iter = path.iter(IteratorOptions::DEFAULT);
        let mut out = [Point::zero(); 4];
        iter.next(&mut out);
        iter.next(&mut out);
        iter.next(&mut out);
        assert_eq!(iter.count(), 14);
    }

    #[test]
    fn conic_endpoints_are_preserved() {
        let from = point(3.0, -7.0);
        let to = point(250.0, 90.0);
        for &weight in &[0.05f32, 0.5, FRAC_1_SQRT_2, 1.0, 3.0, 40.0] {
            for &tolerance in &[0.001f32, 0.1, 0.25, 10.0] {
                let path = TestPath::new(
                    forward(),
                    &[Verb::Move, Verb::Conic],
                    &[from, point(40.0, 200.0), to],
                    &[weight],
                );

                let options = IteratorOptions::tolerance(tolerance);
                let quadratics: Vec<PathSegment> =
                    path.segments(options).into_iter().skip(1).collect();

                assert!(!quadratics.is_empty());
                assert!(quadratics.iter().all(|s| s.verb == Verb::Quadratic));
                assert_eq!(quadratics[0].from(), Some(from));
                assert_eq!(quadratics[quadratics.len() - 1].to(), Some(to));
                for pair in quadratics.windows(2) {
                    assert_eq!(pair[0].to(), pair[1].from());
                }

                assert_eq!(path.segments(options), path.segments(options));
                assert_eq!(path.iter(options).count(), quadratics.len() + 1);
            }
        }
    }

    #[test]
    fn done_is_permanent() {
        let path = TestPath::new(
            forward(),
            &[Verb::Move, Verb::Done, Verb::Line],
            &[point(0.0, 0.0), point(1.0, 1.0)],
            &[],
        );
        let mut iter = path.iter(IteratorOptions::DEFAULT);
        let mut out = [point(-1.0, -1.0); 4];

        assert_eq!(iter.next(&mut out), Verb::Move);
        assert_eq!(iter.next(&mut out), Verb::Done);

        out = [point(-1.0, -1.0); 4];
        for _ in 0..3 {
            assert!(!iter.has_next());
            assert_eq!(iter.peek(), Verb::Done);
            assert_eq!(iter.next(&mut out), Verb::Done);
        }
        assert_eq!(out, [point(-1.0, -1.0); 4]);
        assert_eq!(iter.count(), 1);
    }

    #[test]
    fn malformed_paths_end_the_iteration() {
        init_logger();

        let origin = point(0.0, 0.0);
        let cases: &[(&[u8], &[Point], &[f32])] = &[
            // Line without a start point.
            (&[1], &[origin], &[]),
            // Cubic without enough points.
            (&[0, 4], &[origin, origin, origin], &[]),
            (&[0, 4], &[origin, origin], &[]),
            // Conic without weight.
            (&[0, 3], &[origin, origin, origin], &[]),
            // Unknown verb.
            (&[0, 42], &[origin], &[]),
        ];

        for &(codes, points, weights) in cases {
            for &layout in &[forward(), backward()] {
                let path = TestPath::raw(layout, codes, points, weights);
                let mut iter = path.iter(IteratorOptions::DEFAULT);
                let mut out = [Point::zero(); 4];

                let mut verbs = Vec::new();
                loop {
                    let peeked = iter.peek();
                    let verb = iter.next(&mut out);
                    assert_eq!(peeked, verb, "{:?}", codes);
                    verbs.push(verb);
                    if verb == Verb::Done {
                        break;
                    }
                    assert!(verbs.len() <= codes.len());
                }

                assert_eq!(verbs.len(), codes.len(), "{:?}", codes);
                assert!(!iter.has_next());
                assert_eq!(iter.count(), codes.len() - 1);
            }
        }
    }

    #[test]
    fn buffer_offsets() {
        let path = round_rect(forward());
        let mut iter = path.iter(IteratorOptions::DEFAULT);
        let mut buffer = [-1.0f32; 12];

        assert_eq!(
            iter.next_into(&mut buffer, 5),
            Err(Error::BufferTooSmall {
                required: 13,
                actual: 12
            })
        );
        assert_eq!(iter.peek(), Verb::Move);
        assert_eq!(buffer, [-1.0; 12]);

        assert_eq!(iter.next_into(&mut buffer, 4), Ok(Verb::Move));
        assert_eq!(&buffer[..6], &[-1.0, -1.0, -1.0, -1.0, 20.0, 12.0]);
        assert_eq!(buffer[6], -1.0);

        assert_eq!(iter.next_into(&mut buffer, 2), Ok(Verb::Line));
        assert_eq!(&buffer[2..6], &[20.0, 12.0, 56.0, 12.0]);
    }

    #[test]
    fn close_and_done_do_not_write() {
        let path = TestPath::new(forward(), &[Verb::Move, Verb::Close], &[point(1.0, 2.0)], &[]);
        let mut iter = path.iter(IteratorOptions::DEFAULT);
        let mut buffer = [0.0f32; 8];

        assert_eq!(iter.next_into(&mut buffer, 0), Ok(Verb::Move));
        buffer = [7.0; 8];
        assert_eq!(iter.next_into(&mut buffer, 0), Ok(Verb::Close));
        assert_eq!(iter.next_into(&mut buffer, 0), Ok(Verb::Done));
        assert_eq!(buffer, [7.0; 8]);
    }

    #[test]
    fn options() {
        assert_eq!(IteratorOptions::default(), IteratorOptions::DEFAULT);
        assert_eq!(IteratorOptions::DEFAULT.tolerance, 0.25);
        assert_eq!(
            IteratorOptions::DEFAULT.conic_evaluation,
            ConicEvaluation::AsQuadratics
        );
        assert_eq!(ConicEvaluation::from_code(0), Some(ConicEvaluation::AsConic));
        assert_eq!(ConicEvaluation::from_code(1), Some(ConicEvaluation::AsQuadratics));
        assert_eq!(ConicEvaluation::from_code(2), None);

        let path = round_rect(forward());
        let iter = path.iter(IteratorOptions::as_conics().with_tolerance(0.5));
        assert_eq!(iter.conic_evaluation(), ConicEvaluation::AsConic);
        assert_eq!(iter.tolerance(), 0.5);
    }
}
