extern crate pathway;
extern crate pathway_tests;
#[macro_use]
extern crate criterion;

use criterion::Criterion;
use pathway::geom::{ConicConverter, ConicSegment};
use pathway::math::{point, Point};
use pathway::path::layout::LAYOUTS_64;
use pathway::IteratorOptions;
use pathway_tests::Shape;

const N: usize = 100;

static TOLERANCES: [f32; 5] = [0.01, 0.1, 0.25, 0.5, 1.0];

fn conic_conversion(bench: &mut Criterion) {
    let conics: Vec<ConicSegment<f32>> = (1..=N)
        .map(|i| {
            let r = i as f32;
            ConicSegment {
                from: point(r, 0.0),
                ctrl: point(r, r),
                to: point(0.0, r),
                weight: 0.5 + i as f32 / N as f32,
            }
        })
        .collect();

    for &tolerance in &TOLERANCES {
        bench.bench_function(&format!("conic conversion (tolerance {})", tolerance), |b| {
            let mut converter = ConicConverter::new();
            b.iter(|| {
                let mut count = 0;
                for conic in &conics {
                    count += converter.convert(conic, tolerance);
                }
                std::hint::black_box(count);
            })
        });
    }
}

fn path_iteration(bench: &mut Criterion) {
    let mut shape = Shape::new();
    for i in 0..N {
        let offset = i as f32 * 50.0;
        let rect = Shape::round_rect(point(offset, 0.0), point(offset + 40.0, 40.0), 8.0);
        shape.verbs.extend_from_slice(&rect.verbs);
        shape.points.extend_from_slice(&rect.points);
        shape.weights.extend_from_slice(&rect.weights);
    }

    for &layout in &[&LAYOUTS_64[2], &LAYOUTS_64[4]] {
        let path = shape.write(layout);

        bench.bench_function(&format!("iterate as conics ({:?})", layout.kind), |b| {
            b.iter(|| {
                let mut iter = path.iter(IteratorOptions::as_conics());
                let mut points = [Point::zero(); 4];
                while iter.has_next() {
                    std::hint::black_box(iter.next(&mut points));
                }
            })
        });

        bench.bench_function(&format!("iterate as quadratics ({:?})", layout.kind), |b| {
            b.iter(|| {
                let mut iter = path.iter(IteratorOptions::DEFAULT);
                let mut points = [Point::zero(); 4];
                while iter.has_next() {
                    std::hint::black_box(iter.next(&mut points));
                }
            })
        });
    }
}

criterion_group!(conic, conic_conversion);
criterion_group!(iteration, path_iteration);
criterion_main!(conic, iteration);
