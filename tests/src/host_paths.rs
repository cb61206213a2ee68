use crate::{all_layouts, Shape};

use pathway::geom::ConicSegment;
use pathway::math::{point, Box2D, Point};
use pathway::path::contours::divide;
use pathway::path::layout::{FixedVersion, LayoutKind, LayoutResolver};
use pathway::path::memory::PointerWidth;
use pathway::path::svg::{to_svg_document, to_svg_path_data};
use pathway::path::{
    ConicEvaluation, Error, FillRule, IteratorOptions, IteratorRegistry, PathSegment, Verb,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn every_layout_produces_the_same_segments() {
    init_logger();

    for options in &[IteratorOptions::DEFAULT, IteratorOptions::as_conics()] {
        let shape = Shape::kitchen_sink();
        let mut reference: Option<Vec<PathSegment>> = None;

        for layout in all_layouts() {
            let segments: Vec<PathSegment> =
                shape.write(layout).iter(*options).into_iter().collect();
            match &reference {
                Some(expected) => assert_eq!(&segments, expected, "{:?}", layout),
                None => reference = Some(segments),
            }
        }
    }
}

#[test]
fn points_follow_the_consumption_table() {
    let shape = Shape::kitchen_sink();
    let path = shape.write(&pathway::path::layout::LAYOUTS_64[1]);
    let segments: Vec<PathSegment> = path.iter(IteratorOptions::as_conics()).into_iter().collect();

    let verbs: Vec<Verb> = segments.iter().map(|s| s.verb).collect();
    assert_eq!(verbs, shape.verbs);

    // Replaying the segments consumes the points array exactly.
    let mut consumed: Vec<Point> = Vec::new();
    for segment in &segments {
        let skip = segment.verb.has_implicit_start() as usize;
        if skip == 1 {
            assert_eq!(segment.from(), consumed.last().copied());
        }
        consumed.extend(segment.points.iter().skip(skip));
    }
    assert_eq!(consumed, shape.points);

    let weights: Vec<f32> = segments.iter().filter_map(|s| s.weight).collect();
    assert_eq!(weights, shape.weights);
}

#[test]
fn circles_stay_within_tolerance() {
    let radius = 100.0;
    let center = point(150.0, 150.0);
    let shape = Shape::circle(center, radius);

    for &tolerance in &[1.0f32, 0.25, 0.05] {
        let path = shape.write(&pathway::path::layout::LAYOUTS_64[4]);
        let iter = path.iter(IteratorOptions::tolerance(tolerance));
        let count = iter.count();

        let segments: Vec<PathSegment> = iter.into_iter().collect();
        assert_eq!(segments.len(), count);
        assert_eq!(segments.len() % 4, 2);

        for segment in segments.iter().filter(|s| s.verb == Verb::Quadratic) {
            let quadratic = pathway::geom::QuadraticBezierSegment {
                from: segment.points[0],
                ctrl: segment.points[1],
                to: segment.points[2],
            };
            for i in 0..=8 {
                let p = quadratic.sample(i as f32 / 8.0);
                let error = ((p - center).length() - radius).abs();
                assert!(error <= tolerance, "{} > {}", error, tolerance);
            }
        }
    }
}

#[test]
fn quadratic_count_matches_the_iteration() {
    let shape = Shape::kitchen_sink();
    let path = shape.write(&pathway::path::layout::LAYOUTS_32[3]);

    for &tolerance in &[0.001f32, 0.1, 0.25, 4.0] {
        let iter = path.iter(IteratorOptions::tolerance(tolerance));
        let expected_conics: usize = [
            ConicSegment {
                from: point(8.0, 8.0),
                ctrl: point(10.0, 8.0),
                to: point(10.0, 10.0),
                weight: 2.0,
            },
            ConicSegment {
                from: point(30.0, 20.0),
                ctrl: point(30.0, 30.0),
                to: point(20.0, 30.0),
                weight: 0.5,
            },
        ]
        .iter()
        .map(|conic| conic.quadratic_count(tolerance))
        .sum();

        assert_eq!(iter.raw_count(), 9);
        assert_eq!(iter.count(), 9 - 2 + expected_conics);
        assert_eq!(iter.count(), iter.into_iter().count());
    }
}

#[test]
fn registry_session() {
    init_logger();

    let resolver =
        LayoutResolver::with_pointer_width(FixedVersion::release(27), PointerWidth::Bits64);
    let layout = resolver.resolve().unwrap();
    assert_eq!(layout.kind, LayoutKind::PathRef26);

    let path = Shape::round_rect(point(12.0, 12.0), point(64.0, 64.0), 8.0).write(layout);
    let mut registry = IteratorRegistry::with_resolver(&path.memory, &resolver);

    let converted = registry
        .create(path.handle, ConicEvaluation::AsQuadratics, 0.25)
        .unwrap();
    let raw = registry
        .create(path.handle, ConicEvaluation::AsConic, 0.25)
        .unwrap();

    assert_eq!(registry.raw_count(converted), Ok(10));
    assert_eq!(registry.count(converted), Ok(14));
    assert_eq!(registry.count(raw), Ok(10));

    // Drive the iterator the way a binding layer does, reusing one buffer.
    let mut buffer = [0.0f32; 16];
    let mut verbs = Vec::new();
    while registry.has_next(converted).unwrap() {
        let peeked = registry.peek(converted).unwrap();
        let verb = registry.next(converted, &mut buffer, 8).unwrap();
        assert_eq!(peeked, verb);
        verbs.push(verb.code());
    }
    assert_eq!(verbs, vec![0, 1, 2, 2, 1, 2, 2, 1, 2, 2, 1, 2, 2, 5]);
    assert_eq!(registry.next(converted, &mut buffer, 8), Ok(Verb::Done));
    assert_eq!(registry.next(converted, &mut buffer, 9), Err(Error::BufferTooSmall {
        required: 17,
        actual: 16,
    }));

    registry.destroy(converted).unwrap();
    assert_eq!(registry.has_next(converted), Err(Error::UseAfterFree));
    assert_eq!(registry.peek(raw), Ok(Verb::Move));
    assert_eq!(registry.len(), 1);
}

#[test]
fn svg_export() {
    let shape = Shape::round_rect(point(0.0, 0.0), point(20.0, 10.0), 2.0);
    let path = shape.write(&pathway::path::layout::LAYOUTS_64[0]);

    let data = to_svg_path_data(path.iter(IteratorOptions::DEFAULT));
    assert!(data.starts_with("M2 0L18 0Q"));
    assert!(data.ends_with('Z'));
    assert!(!data.contains('C'));

    // Conics are left out when they are not converted.
    let data = to_svg_path_data(path.iter(IteratorOptions::as_conics()));
    assert_eq!(data, "M2 0L18 0 20 8 2 10 0 2Z");

    let document = to_svg_document(
        path.iter(IteratorOptions::DEFAULT),
        &Box2D::new(point(0.0, 0.0), point(20.0, 10.0)),
        FillRule::EvenOdd,
    );
    assert!(document
        .starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 20 10\">\n"));
    assert!(document.contains("fill-rule=\"evenodd\""));
}

#[test]
fn contours_of_a_host_path() {
    let shape = Shape::kitchen_sink();
    let path = shape.write(&pathway::path::layout::LAYOUTS_32[0]);

    let contours = divide(path.iter(IteratorOptions::as_conics()));

    assert_eq!(contours.len(), 2);
    assert_eq!(contours[0].start(), Some(point(1.0, 1.0)));
    assert_eq!(contours[0].len(), 5);
    assert!(!contours[0].is_closed());
    assert_eq!(contours[1].start(), Some(point(20.0, 20.0)));
    assert!(contours[1].is_closed());
}

#[test]
fn unsupported_hosts_are_reported() {
    let resolver = LayoutResolver::new(FixedVersion::preview(36, "Zebra"));
    assert_eq!(
        resolver.resolve(),
        Err(Error::UnsupportedLayout {
            version: "Zebra".to_string()
        })
    );
}
