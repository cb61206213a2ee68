use crate::math::Point;
use crate::verb::Verb;

use arrayvec::ArrayVec;

/// One command of a path together with the points describing it.
///
/// The number of points depends on the verb:
///
/// - `Move`: 1 point.
/// - `Line`: 2 points (start, end).
/// - `Quadratic` and `Conic`: 3 points (start, control point, end).
/// - `Cubic`: 4 points (start, two control points, end).
/// - `Close` and `Done`: no point.
///
/// `weight` is only set for conics.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct PathSegment {
    pub verb: Verb,
    pub points: ArrayVec<Point, 4>,
    pub weight: Option<f32>,
}

impl PathSegment {
    /// Builds a segment from the first `verb.segment_point_count()` points of `points`.
    pub fn new(verb: Verb, points: &[Point], weight: Option<f32>) -> Self {
        let count = verb.segment_point_count().min(points.len());

        PathSegment {
            verb,
            points: points[..count].iter().copied().collect(),
            weight: if verb == Verb::Conic { weight } else { None },
        }
    }

    pub fn done() -> Self {
        PathSegment {
            verb: Verb::Done,
            points: ArrayVec::new(),
            weight: None,
        }
    }

    pub fn close() -> Self {
        PathSegment {
            verb: Verb::Close,
            points: ArrayVec::new(),
            weight: None,
        }
    }

    /// The first point of the segment, if any.
    #[inline]
    pub fn from(&self) -> Option<Point> {
        self.points.first().copied()
    }

    /// The last point of the segment, if any.
    #[inline]
    pub fn to(&self) -> Option<Point> {
        self.points.last().copied()
    }
}

#[test]
fn segments_keep_the_points_of_their_verb() {
    use crate::math::point;

    let points = [point(0.0, 0.0), point(1.0, 0.0), point(1.0, 1.0), point(0.0, 1.0)];

    let line = PathSegment::new(Verb::Line, &points, None);
    assert_eq!(line.points.len(), 2);
    assert_eq!(line.from(), Some(point(0.0, 0.0)));
    assert_eq!(line.to(), Some(point(1.0, 0.0)));

    let conic = PathSegment::new(Verb::Conic, &points, Some(0.5));
    assert_eq!(conic.points.len(), 3);
    assert_eq!(conic.weight, Some(0.5));

    let quadratic = PathSegment::new(Verb::Quadratic, &points, Some(0.5));
    assert_eq!(quadratic.weight, None);

    assert_eq!(PathSegment::new(Verb::Close, &points, None), PathSegment::close());
    assert_eq!(PathSegment::done().to(), None);
}
