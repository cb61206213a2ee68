//! Division of a path into its contours.

use crate::math::Point;
use crate::segment::PathSegment;
use crate::verb::Verb;

/// A sequence of segments starting with a `Move`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Contour {
    pub segments: Vec<PathSegment>,
}

impl Contour {
    /// The point the contour starts at.
    pub fn start(&self) -> Option<Point> {
        self.segments.first().and_then(|segment| segment.from())
    }

    pub fn is_closed(&self) -> bool {
        self.segments.iter().any(|segment| segment.verb == Verb::Close)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Splits `segments` into one contour per `Move`.
///
/// Segments appearing before the first `Move` form a contour of their own. The
/// iteration stops at the first `Done`.
pub fn divide<I>(segments: I) -> Vec<Contour>
where
    I: IntoIterator<Item = PathSegment>,
{
    let mut contours = Vec::new();
    let mut contour = Contour::default();

    for segment in segments {
        match segment.verb {
            Verb::Done => break,
            Verb::Move => {
                if !contour.is_empty() {
                    contours.push(contour);
                }
                contour = Contour {
                    segments: vec![segment],
                };
            }
            _ => contour.segments.push(segment),
        }
    }

    if !contour.is_empty() {
        contours.push(contour);
    }

    contours
}

#[test]
fn one_contour_per_move() {
    use crate::math::point;

    let a = point(0.0, 0.0);
    let b = point(1.0, 0.0);
    let c = point(5.0, 5.0);
    let d = point(6.0, 5.0);

    let segments = vec![
        PathSegment::new(Verb::Move, &[a], None),
        PathSegment::new(Verb::Line, &[a, b], None),
        PathSegment::close(),
        PathSegment::new(Verb::Move, &[c], None),
        PathSegment::new(Verb::Conic, &[c, d, c], Some(2.0)),
        PathSegment::done(),
        PathSegment::new(Verb::Move, &[d], None),
    ];

    let contours = divide(segments);

    assert_eq!(contours.len(), 2);
    assert_eq!(contours[0].len(), 3);
    assert_eq!(contours[0].start(), Some(a));
    assert!(contours[0].is_closed());
    assert_eq!(contours[1].len(), 2);
    assert_eq!(contours[1].start(), Some(c));
    assert!(!contours[1].is_closed());
    assert_eq!(contours[1].segments[1].weight, Some(2.0));
}

#[test]
fn leading_segments_and_empty_input() {
    use crate::math::point;

    assert!(divide(Vec::new()).is_empty());

    let contours = divide(vec![
        PathSegment::close(),
        PathSegment::new(Verb::Move, &[point(1.0, 1.0)], None),
    ]);

    assert_eq!(contours.len(), 2);
    assert_eq!(contours[0].start(), None);
    assert_eq!(contours[1].start(), Some(point(1.0, 1.0)));
}
