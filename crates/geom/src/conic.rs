//! Conics and their approximation with quadratic bézier curves.

use crate::scalar::{NumCast, Scalar};
use crate::{point, Point, QuadraticBezierSegment};
use arrayvec::ArrayVec;

/// The conversion never splits a conic more than this many times, which bounds
/// the output to 32 quadratic curves.
pub const MAX_SUBDIVISION_LEVEL: u32 = 5;

/// Maximum number of quadratic curves produced for a single conic.
pub const MAX_QUADRATIC_COUNT: usize = 1 << MAX_SUBDIVISION_LEVEL;

/// Maximum number of points stored by a [`ConicConverter`](struct.ConicConverter.html).
pub const MAX_POINTS: usize = 2 * MAX_QUADRATIC_COUNT + 1;

/// A rational quadratic bézier curve: a quadratic curve with a weight attached
/// to its control point.
///
/// The curve is defined by equation:
/// ```∀ t ∈ [0..1],  P(t) = ((1 - t)² * from + 2 * w * (1 - t) * t * ctrl + t² * to) / ((1 - t)² + 2 * w * (1 - t) * t + t²)```
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct ConicSegment<S> {
    pub from: Point<S>,
    pub ctrl: Point<S>,
    pub to: Point<S>,
    pub weight: S,
}

impl<S: Scalar> ConicSegment<S> {
    /// Sample the curve at t (expecting t between 0 and 1).
    pub fn sample(&self, t: S) -> Point<S> {
        let one_t = S::ONE - t;
        let a = one_t * one_t;
        let b = S::TWO * self.weight * one_t * t;
        let c = t * t;

        let denominator = a + b + c;
        let x = self.from.x * a + self.ctrl.x * b + self.to.x * c;
        let y = self.from.y * a + self.ctrl.y * b + self.to.y * c;

        point(x / denominator, y / denominator)
    }

    pub fn is_finite(&self) -> bool {
        self.weight.is_finite()
            && self.from.x.is_finite()
            && self.from.y.is_finite()
            && self.ctrl.x.is_finite()
            && self.ctrl.y.is_finite()
            && self.to.x.is_finite()
            && self.to.y.is_finite()
    }

    /// The quadratic curve sharing this conic's points, ignoring the weight.
    pub fn to_quadratic(&self) -> QuadraticBezierSegment<S> {
        QuadraticBezierSegment {
            from: self.from,
            ctrl: self.ctrl,
            to: self.to,
        }
    }

    /// Split the conic in two halves at t = 0.5.
    ///
    /// Both halves are conics with the same weight, `sqrt(0.5 + weight / 2)`, which
    /// is closer to one than the original weight.
    pub fn split(&self) -> (ConicSegment<S>, ConicSegment<S>) {
        let scale = S::ONE / (S::ONE + self.weight);
        let new_weight = (S::HALF + self.weight * S::HALF).sqrt();

        let p0 = self.from.to_vector();
        let wp1 = self.ctrl.to_vector() * self.weight;
        let p2 = self.to.to_vector();

        let mut mid = ((p0 + wp1 * S::TWO + p2) * (scale * S::HALF)).to_point();
        if !(mid.x.is_finite() && mid.y.is_finite()) {
            // The intermediate sums overflowed, retry with more headroom.
            let w = self.weight.to_f64().unwrap_or(f64::NAN);
            let scale_half = 1.0 / (1.0 + w) * 0.5;
            let from = self.from.to_f64();
            let ctrl = self.ctrl.to_f64();
            let to = self.to.to_f64();
            let x = (from.x + 2.0 * w * ctrl.x + to.x) * scale_half;
            let y = (from.y + 2.0 * w * ctrl.y + to.y) * scale_half;
            if let (Some(x), Some(y)) = (<S as NumCast>::from(x), <S as NumCast>::from(y)) {
                mid = point(x, y);
            }
        }

        (
            ConicSegment {
                from: self.from,
                ctrl: ((p0 + wp1) * scale).to_point(),
                to: mid,
                weight: new_weight,
            },
            ConicSegment {
                from: mid,
                ctrl: ((wp1 + p2) * scale).to_point(),
                to: self.to,
                weight: new_weight,
            },
        )
    }

    /// Number of times this conic must be split in half so that quadratic curves
    /// built from the halves deviate from it by less than `tolerance`.
    ///
    /// The deviation between a conic and the quadratic curve with the same points is
    /// estimated as `|w - 1| / (4 * (w + 1)) * |from - 2 * ctrl + to|`, and each split
    /// divides it by four.
    pub fn subdivision_level(&self, tolerance: S) -> u32 {
        if !(tolerance >= S::ZERO) || !tolerance.is_finite() {
            return 0;
        }
        if !self.is_finite() || !(self.weight > S::ZERO) {
            return 0;
        }

        let a = self.weight - S::ONE;
        let k = a / (S::FOUR * (S::TWO + a));
        let x = k * (self.from.x - S::TWO * self.ctrl.x + self.to.x);
        let y = k * (self.from.y - S::TWO * self.ctrl.y + self.to.y);

        let mut error = (x * x + y * y).sqrt();
        let mut level = 0;
        while level < MAX_SUBDIVISION_LEVEL && error > tolerance {
            error *= S::value(0.25);
            level += 1;
        }

        level
    }

    /// Number of quadratic curves needed to approximate this conic within `tolerance`.
    ///
    /// This is always a power of two between 1 and 32, and always what
    /// [`ConicConverter::convert`](struct.ConicConverter.html#method.convert) produces.
    /// The count is smallest at a weight of one and grows as the weight moves away
    /// from one in either direction, never shrinking.
    pub fn quadratic_count(&self, tolerance: S) -> usize {
        let level = self.subdivision_level(tolerance);
        if level == MAX_SUBDIVISION_LEVEL && self.splits_into_lines() {
            return 2;
        }

        1 << level
    }

    // Extreme weights can make the first split produce two lines, in which
    // case there is no point in subdividing further.
    fn splits_into_lines(&self) -> bool {
        let (first, second) = self.split();
        nearly_equal(first.ctrl, first.to) && nearly_equal(second.from, second.ctrl)
    }
}

/// Approximates conics with chains of quadratic bézier curves.
///
/// The converter owns a fixed-size buffer that is overwritten by each call to
/// [`convert`](#method.convert). Consecutive quadratic curves share their endpoints,
/// so `n` curves are stored as `2 * n + 1` points:
///
/// ```ascii
///  from, ctrl0, to0 = from1, ctrl1, to1 = from2, ..., to(n-1)
/// ```
///
/// The first point is always exactly the conic's start point and the last point exactly
/// the conic's end point.
#[derive(Clone, Debug)]
pub struct ConicConverter<S> {
    points: ArrayVec<Point<S>, MAX_POINTS>,
}

impl<S: Scalar> ConicConverter<S> {
    pub fn new() -> Self {
        ConicConverter {
            points: ArrayVec::new(),
        }
    }

    /// Same as [`convert`](#method.convert) with the conic expressed as its three points
    /// and a weight.
    pub fn to_quadratics(&mut self, points: &[Point<S>; 3], weight: S, tolerance: S) -> usize {
        self.convert(
            &ConicSegment {
                from: points[0],
                ctrl: points[1],
                to: points[2],
                weight,
            },
            tolerance,
        )
    }

    /// Approximates `conic` and returns the number of quadratic curves generated.
    pub fn convert(&mut self, conic: &ConicSegment<S>, tolerance: S) -> usize {
        self.points.clear();
        self.points.push(conic.from);

        let mut level = conic.subdivision_level(tolerance);
        if level == MAX_SUBDIVISION_LEVEL && conic.splits_into_lines() {
            let (first, second) = conic.split();
            self.points.push(first.ctrl);
            self.points.push(first.ctrl);
            self.points.push(first.ctrl);
            self.points.push(second.to);
            level = 1;
        } else {
            subdivide(conic, &mut self.points, level);
        }

        let len = self.points.len();
        let all_finite = self
            .points
            .iter()
            .all(|p| p.x.is_finite() && p.y.is_finite());
        if !all_finite {
            // Keep the endpoints and pin everything else to the control point.
            for p in &mut self.points[1..len - 1] {
                *p = conic.ctrl;
            }
        }

        debug_assert_eq!(len, (2 << level) + 1);

        1 << level
    }

    /// Number of quadratic curves produced by the last conversion.
    #[inline]
    pub fn quadratic_count(&self) -> usize {
        self.points.len() / 2
    }

    /// The points of the last conversion, `2 * quadratic_count() + 1` of them.
    #[inline]
    pub fn quadratics(&self) -> &[Point<S>] {
        &self.points
    }

    /// The `index`-th quadratic curve of the last conversion.
    pub fn quadratic(&self, index: usize) -> Option<QuadraticBezierSegment<S>> {
        if index >= self.quadratic_count() {
            return None;
        }

        let i = index * 2;
        Some(QuadraticBezierSegment {
            from: self.points[i],
            ctrl: self.points[i + 1],
            to: self.points[i + 2],
        })
    }

    /// Iterates over the quadratic curves of the last conversion.
    pub fn iter(&self) -> impl Iterator<Item = QuadraticBezierSegment<S>> + '_ {
        (0..self.quadratic_count()).filter_map(move |i| self.quadratic(i))
    }
}

impl<S: Scalar> Default for ConicConverter<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[inline]
fn nearly_equal<S: Scalar>(a: Point<S>, b: Point<S>) -> bool {
    (a - b).square_length() <= S::NEARLY_ZERO * S::NEARLY_ZERO
}

// Whether b is between a and c, inclusive.
#[inline]
fn between<S: Scalar>(a: S, b: S, c: S) -> bool {
    (a - b) * (c - b) <= S::ZERO
}

fn subdivide<S: Scalar>(
    conic: &ConicSegment<S>,
    out: &mut ArrayVec<Point<S>, MAX_POINTS>,
    level: u32,
) {
    if level == 0 {
        out.push(conic.ctrl);
        out.push(conic.to);
        return;
    }

    let (mut first, mut second) = conic.split();

    // A y-monotonic conic must produce y-monotonic halves.
    let start_y = conic.from.y;
    let end_y = conic.to.y;
    if between(start_y, conic.ctrl.y, end_y) {
        let mid_y = first.to.y;
        if !between(start_y, mid_y, end_y) {
            let closer_y = if (mid_y - start_y).abs() < (mid_y - end_y).abs() {
                start_y
            } else {
                end_y
            };
            first.to.y = closer_y;
            second.from.y = closer_y;
        }
        if !between(start_y, first.ctrl.y, first.to.y) {
            first.ctrl.y = start_y;
        }
        if !between(second.from.y, second.ctrl.y, end_y) {
            second.ctrl.y = end_y;
        }
    }

    subdivide(&first, out, level - 1);
    subdivide(&second, out, level - 1);
}

#[cfg(test)]
use std::{vec, vec::Vec};

#[cfg(test)]
fn quarter_circle(radius: f32) -> ConicSegment<f32> {
    ConicSegment {
        from: point(radius, 0.0),
        ctrl: point(radius, radius),
        to: point(0.0, radius),
        weight: core::f32::consts::FRAC_1_SQRT_2,
    }
}

#[test]
fn unit_weight_is_a_single_quadratic() {
    let conic = ConicSegment {
        from: point(0.0f32, 0.0),
        ctrl: point(10.0, 20.0),
        to: point(20.0, 0.0),
        weight: 1.0,
    };

    let mut converter = ConicConverter::new();
    assert_eq!(converter.convert(&conic, 0.25), 1);
    assert_eq!(converter.quadratic_count(), 1);
    assert_eq!(converter.quadratic(0), Some(conic.to_quadratic()));
    assert_eq!(converter.quadratic(1), None);
}

#[test]
fn quarter_circle_stays_within_tolerance() {
    let radius = 100.0;
    let tolerance = 0.25;
    let conic = quarter_circle(radius);

    let mut converter = ConicConverter::new();
    let count = converter.convert(&conic, tolerance);

    assert!(count > 1);
    assert!(count.is_power_of_two());
    assert_eq!(converter.quadratics().len(), 2 * count + 1);
    assert_eq!(converter.quadratics()[0], conic.from);
    assert_eq!(converter.quadratics()[2 * count], conic.to);

    for quadratic in converter.iter() {
        for i in 0..=16 {
            let t = i as f32 / 16.0;
            let distance = quadratic.sample(t).to_vector().length();
            assert!(
                (distance - radius).abs() <= tolerance,
                "{:?} is {} away from the circle",
                quadratic.sample(t),
                (distance - radius).abs()
            );
        }
    }
}

#[test]
fn chain_is_connected() {
    let conic = ConicSegment {
        from: point(-3.0f32, 7.0),
        ctrl: point(40.0, -12.0),
        to: point(80.0, 55.0),
        weight: 3.5,
    };

    let mut converter = ConicConverter::new();
    let count = converter.convert(&conic, 0.1);
    let quadratics: std::vec::Vec<_> = converter.iter().collect();

    assert_eq!(quadratics.len(), count);
    assert_eq!(quadratics[0].from, conic.from);
    assert_eq!(quadratics[count - 1].to, conic.to);
    for pair in quadratics.windows(2) {
        assert_eq!(pair[0].to, pair[1].from);
    }
}

#[test]
fn count_is_monotonic_in_tolerance() {
    let conic = quarter_circle(500.0);
    let mut previous = 0;
    for tolerance in &[100.0f32, 10.0, 1.0, 0.5, 0.25, 0.1, 0.01, 0.001] {
        let count = conic.quadratic_count(*tolerance);
        assert!(count >= previous, "{} < {} at {}", count, previous, tolerance);
        previous = count;
    }
    assert_eq!(previous, MAX_QUADRATIC_COUNT);
}

#[test]
fn count_is_monotonic_in_weight() {
    let mut previous = 0;
    for weight in &[1.0f32, 1.1, 1.5, 2.0, 5.0, 10.0, 100.0] {
        let conic = ConicSegment {
            from: point(0.0f32, 0.0),
            ctrl: point(50.0, 100.0),
            to: point(100.0, 0.0),
            weight: *weight,
        };
        let count = conic.quadratic_count(0.25);
        assert!(count >= previous, "{} < {} at {}", count, previous, weight);
        previous = count;
    }
}

#[test]
fn elliptical_counts_shrink_towards_unit_weight() {
    // Below one the arc flattens towards the parabola as the weight grows.
    let counts: Vec<usize> = [0.01f32, 0.1, 0.3, 0.5, core::f32::consts::FRAC_1_SQRT_2, 0.9, 1.0]
        .iter()
        .map(|&weight| {
            ConicSegment {
                from: point(0.0f32, 0.0),
                ctrl: point(100.0, 100.0),
                to: point(200.0, 0.0),
                weight,
            }
            .quadratic_count(0.25)
        })
        .collect();

    assert_eq!(counts, vec![16, 16, 16, 16, 8, 4, 1]);
    for pair in counts.windows(2) {
        assert!(pair[0] >= pair[1], "{:?}", counts);
    }
}

#[test]
fn conversion_is_deterministic() {
    let conic = quarter_circle(250.0);
    let mut a = ConicConverter::new();
    let mut b = ConicConverter::new();

    assert_eq!(a.convert(&conic, 0.3), b.convert(&conic, 0.3));
    assert_eq!(a.quadratics(), b.quadratics());

    // Converting something else in between does not leak into the next result.
    a.convert(&quarter_circle(3.0), 0.3);
    a.convert(&conic, 0.3);
    assert_eq!(a.quadratics(), b.quadratics());
}

#[test]
fn invalid_inputs_produce_a_single_quadratic() {
    let mut converter = ConicConverter::new();
    let mut conic = quarter_circle(100.0);

    assert_eq!(converter.convert(&conic, f32::NAN), 1);
    assert_eq!(converter.convert(&conic, -1.0), 1);
    assert_eq!(converter.convert(&conic, f32::INFINITY), 1);

    conic.weight = f32::NAN;
    assert_eq!(converter.convert(&conic, 0.25), 1);
    assert_eq!(converter.quadratics()[0], conic.from);
    assert_eq!(converter.quadratics()[2], conic.to);

    conic.weight = 0.0;
    assert_eq!(converter.convert(&conic, 0.25), 1);
}

#[test]
fn zero_tolerance_uses_the_maximum_subdivision() {
    let conic = quarter_circle(100.0);
    assert_eq!(conic.subdivision_level(0.0), MAX_SUBDIVISION_LEVEL);

    let mut converter = ConicConverter::new();
    assert_eq!(converter.convert(&conic, 0.0), MAX_QUADRATIC_COUNT);
    assert_eq!(converter.quadratics().len(), MAX_POINTS);
}

#[test]
fn extreme_weights_collapse_to_two_lines() {
    let conic = ConicSegment {
        from: point(0.0f64, 0.0),
        ctrl: point(1000.0, 1000.0),
        to: point(2000.0, 0.0),
        weight: 1.0e9,
    };

    assert_eq!(conic.subdivision_level(0.25), MAX_SUBDIVISION_LEVEL);
    assert_eq!(conic.quadratic_count(0.25), 2);

    let mut converter = ConicConverter::new();
    assert_eq!(converter.convert(&conic, 0.25), 2);
    assert_eq!(converter.quadratics().len(), 5);
    assert_eq!(converter.quadratics()[0], conic.from);
    assert_eq!(converter.quadratics()[4], conic.to);
}

#[test]
fn split_halves_meet_on_the_curve() {
    let conic = ConicSegment {
        from: point(0.0f64, 0.0),
        ctrl: point(1.0, 2.0),
        to: point(2.0, 0.0),
        weight: 2.0,
    };

    let (first, second) = conic.split();
    let mid = conic.sample(0.5);

    assert_eq!(first.to, second.from);
    assert!((first.to - mid).length() < 1e-9);
    assert_eq!(first.from, conic.from);
    assert_eq!(second.to, conic.to);
    assert!((first.weight - (1.5f64).sqrt()).abs() < 1e-12);

    // Halves describe the same curve as the original.
    assert!((first.sample(0.5) - conic.sample(first_quarter_t(&conic))).length() < 1e-9);
}

// The parameter on the original conic that maps to t = 0.5 on its first half.
#[cfg(test)]
fn first_quarter_t(conic: &ConicSegment<f64>) -> f64 {
    // Normalizing the first half's end weight to one reparameterizes it, its
    // midpoint lands on t = 0.5 / (1 + sqrt((1 + w) / 2)) of the original.
    let w = conic.weight;
    0.5 / (1.0 + ((1.0 + w) / 2.0).sqrt())
}
