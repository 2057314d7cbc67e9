use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_omsi::formats::model::Model;
use serde_omsi::formats::paths::Paths;
use serde_omsi::{from_str, schema_of, to_string};

fn model_document(meshes: usize) -> String {
    let mut text = String::from("Generated model.\r\n\r\n[LOD]\r\n500\r\n");
    for i in 0..meshes {
        text.push_str(&format!(
            "\r\n[mesh]\r\npart_{i}.o3d\r\n[mesh_ident]\r\npart_{i}\r\n\
             [matl]\r\npart_{i}.dds\r\n0\r\n[matl_alpha]\r\n1\r\n\
             [matl]\r\npart_{i}_glass.dds\r\n1\r\n\
             [newanim]\r\norigin_trans\r\n0\r\n{i}\r\n0\r\nanim_rot\r\ndoor_{i}\r\n90\r\n"
        ));
    }
    text
}

fn paths_document(points: usize) -> String {
    let mut text = String::new();
    for i in 0..points {
        text.push_str(&format!("[pathpnt]\r\n{i}\r\n0\r\n1.5\r\n"));
    }
    for i in 1..points {
        if i % 10 == 0 {
            text.push_str(&format!("[next_stepsound]\r\n{}\r\n", i / 10));
        }
        text.push_str(&format!("[pathlink]\r\n{}\r\n{}\r\n", i - 1, i));
    }
    text
}

fn benchmark_schema(c: &mut Criterion) {
    c.bench_function("schema_of_model_cached", |b| {
        b.iter(|| schema_of::<Model>().unwrap())
    });
}

fn benchmark_decode_model(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_model");

    for size in [10, 100, 500].iter() {
        let text = model_document(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &text, |b, text| {
            b.iter(|| from_str::<Model>(black_box(text)))
        });
    }
    group.finish();
}

fn benchmark_encode_model(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_model");

    for size in [10, 100, 500].iter() {
        let model: Model = from_str(&model_document(*size)).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(size), &model, |b, model| {
            b.iter(|| to_string(black_box(model)))
        });
    }
    group.finish();
}

fn benchmark_paths_roundtrip(c: &mut Criterion) {
    let text = paths_document(200);

    c.bench_function("roundtrip_paths", |b| {
        b.iter(|| {
            let paths: Paths = from_str(black_box(&text)).unwrap();
            let _written = to_string(black_box(&paths)).unwrap();
        })
    });
}

criterion_group!(
    benches,
    benchmark_schema,
    benchmark_decode_model,
    benchmark_encode_model,
    benchmark_paths_roundtrip
);
criterion_main!(benches);
