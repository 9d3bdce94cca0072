use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pivot_engine::{
    calculate_view, AxisCategory, AxisDimension, CubeAxes, CubeLayout, DataCube, LayoutSpec,
};

fn build_cube(sizes: &[usize]) -> (DataCube, CubeAxes) {
    let codes: Vec<String> = (0..sizes.len()).map(|i| format!("D{i}")).collect();
    let total: usize = sizes.iter().product();
    let values = (0..total)
        .map(|v| if v % 17 == 0 { None } else { Some(v as f64) })
        .collect();
    let axes = codes
        .iter()
        .zip(sizes)
        .map(|(code, &n)| AxisDimension {
            code: code.clone(),
            label: code.clone(),
            categories: (0..n)
                .map(|i| AxisCategory {
                    code: format!("{code}_{i}"),
                    label: format!("{code} {i}"),
                })
                .collect(),
        })
        .collect();
    let cube = DataCube::new(codes, sizes.to_vec(), values).unwrap();
    (cube, CubeAxes::new(axes))
}

fn bench_calculate_view(c: &mut Criterion) {
    let mut group = c.benchmark_group("calculate_view");
    // region x sex x age x year
    for sizes in [vec![21, 2, 10, 12], vec![290, 2, 20, 30]] {
        let (cube, axes) = build_cube(&sizes);
        let spec = LayoutSpec::new(["D0", "D2"], ["D1", "D3"]);
        group.bench_with_input(BenchmarkId::from_parameter(cube.len()), &spec, |b, spec| {
            b.iter(|| calculate_view(black_box(&cube), &axes, spec).unwrap())
        });
    }
    group.finish();
}

fn bench_relayout(c: &mut Criterion) {
    let (cube, axes) = build_cube(&[290, 2, 20, 30]);
    let mut layout = CubeLayout::new(&cube, &axes, LayoutSpec::new(["D0", "D2"], ["D1", "D3"])).unwrap();
    c.bench_function("move_dimension", |b| {
        b.iter(|| {
            layout.move_to_columns(black_box("D2"), Some(0)).unwrap();
            layout.move_to_rows(black_box("D2"), None).unwrap();
        })
    });
}

criterion_group!(benches, bench_calculate_view, bench_relayout);
criterion_main!(benches);
