use criterion::{black_box, criterion_group, criterion_main, Criterion};
use gridpage::{compile, CompileOptions, LayoutRequest, MergePolicy, Resolution};

// Dense grid with many small elements and a few large spans.
fn wall_request(rows: usize, cols: usize) -> LayoutRequest {
    let layout = (0..rows)
        .map(|r| {
            (0..cols)
                .map(|c| {
                    if r < 2 {
                        Some("header.0".to_string())
                    } else if (r + c) % 7 == 0 {
                        None
                    } else {
                        Some(format!("div.{}-{}", r / 2, c / 2))
                    }
                })
                .collect()
        })
        .collect();
    LayoutRequest {
        layout,
        resolution: Some(Resolution { width: 3840, height: 2160 }),
        ..Default::default()
    }
}

fn bench_compile_hull(c: &mut Criterion) {
    let req = wall_request(48, 64);
    let options = CompileOptions::default();
    c.bench_function("compile_48x64_hull", |b| {
        b.iter(|| {
            let _ = compile(black_box(&req), &options).unwrap();
        })
    });
}

fn bench_compile_contiguous(c: &mut Criterion) {
    let req = wall_request(48, 64);
    let options = CompileOptions { merge_policy: MergePolicy::Contiguous, ..Default::default() };
    c.bench_function("compile_48x64_contiguous", |b| {
        b.iter(|| {
            let _ = compile(black_box(&req), &options).unwrap();
        })
    });
}

fn bench_parse_and_compile(c: &mut Criterion) {
    let payload = r#"{
        "layout": [["header.0","header.0","header.0"],["nav.0","main.0","main.0"],["footer.0","footer.0","footer.0"]],
        "content": {"main.0": "<p>Hello</p>"},
        "resolution": {"width": 1920, "height": 1080}
    }"#;
    c.bench_function("parse_and_compile_small", |b| {
        b.iter(|| {
            let req = LayoutRequest::from_json(black_box(payload)).unwrap();
            let _ = compile(&req, &CompileOptions::default()).unwrap();
        })
    });
}

criterion_group!(benches, bench_compile_hull, bench_compile_contiguous, bench_parse_and_compile);
criterion_main!(benches);
