use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use tristrip_rs::codec::strip::{decode_strip, encode_strip, initial_triangle};
use tristrip_rs::codec::StripEncodingVersion;
use tristrip_rs::stitch::stitch_strips;
use tristrip_rs::stripify::grow_strips;
use tristrip_rs::{adjacency::AdjacencyGraph, stripify, NonManifoldPolicy, StripConfig};

use std::path::Path;

#[derive(Clone, Default)]
struct Mesh {
    vertex_count: usize,
    indices: Vec<u32>,
}

impl Mesh {
    pub fn load<P>(path: P) -> Result<Mesh, tobj::LoadError>
    where
        P: AsRef<Path>,
    {
        let (models, _materials) = tobj::load_obj(
            path.as_ref(),
            &tobj::LoadOptions {
                triangulate: true,
                single_index: true,
                ..Default::default()
            },
        )?;

        let mut result = Mesh::default();

        for model in models.iter() {
            let base = result.vertex_count as u32;

            result.indices.extend(model.mesh.indices.iter().map(|i| base + i));
            result.vertex_count += model.mesh.positions.len() / 3;
        }

        Ok(result)
    }

    /// Regular grid of `width` x `height` quads, two triangles each.
    pub fn grid(width: u32, height: u32) -> Mesh {
        let mut indices = Vec::with_capacity((width * height * 6) as usize);

        for y in 0..height {
            for x in 0..width {
                let a = y * (width + 1) + x;
                let b = a + 1;
                let c = a + width + 1;
                let d = c + 1;

                indices.extend_from_slice(&[a, b, c, c, b, d]);
            }
        }

        Mesh {
            vertex_count: ((width + 1) * (height + 1)) as usize,
            indices,
        }
    }
}

fn with_input(c: &mut Criterion) {
    // TRISTRIP_BENCH_MESH points to an .obj file; a generated grid is used otherwise
    let (input_name, mesh) = match std::env::var("TRISTRIP_BENCH_MESH") {
        Ok(path) => {
            let mesh = Mesh::load(&path).unwrap();
            (path, mesh)
        }
        Err(_) => ("grid256".to_string(), Mesh::grid(256, 256)),
    };

    let input_name = input_name.as_str();

    c.bench_with_input(BenchmarkId::new("adjacency", input_name), &mesh, |b, mesh| {
        b.iter(|| AdjacencyGraph::build(&mesh.indices, NonManifoldPolicy::Proceed).unwrap());
    });

    c.bench_with_input(BenchmarkId::new("grow_strips", input_name), &mesh, |b, mesh| {
        let graph = AdjacencyGraph::build(&mesh.indices, NonManifoldPolicy::Proceed).unwrap();

        b.iter(|| grow_strips(&graph, 16));
    });

    c.bench_with_input(BenchmarkId::new("stripify", input_name), &mesh, |b, mesh| {
        let config = StripConfig::default();

        b.iter(|| stripify(&mesh.indices, mesh.vertex_count, &config).unwrap());
    });

    let graph = AdjacencyGraph::build(&mesh.indices, NonManifoldPolicy::Proceed).unwrap();
    let strips: Vec<Vec<u32>> = grow_strips(&graph, 16).into_iter().map(|s| s.indices).collect();

    c.bench_with_input(BenchmarkId::new("stitch_strips", input_name), &strips, |b, strips| {
        b.iter(|| stitch_strips(strips));
    });

    let strip = stitch_strips(&strips);

    let mut group = c.benchmark_group("strip-encoding");
    {
        group.throughput(Throughput::Bytes((strip.len() * std::mem::size_of::<u32>()) as u64));
        group.bench_with_input(BenchmarkId::new("encode_strip", input_name), &strip, |b, strip| {
            b.iter(|| {
                encode_strip(strip)
                    .unwrap()
                    .to_bytes(StripEncodingVersion::default())
            });
        });

        let encoded = encode_strip(&strip).unwrap();
        let initial = initial_triangle(&strip).unwrap();

        group.throughput(Throughput::Bytes((strip.len() * std::mem::size_of::<u32>()) as u64));
        group.bench_with_input(BenchmarkId::new("decode_strip", input_name), &encoded, |b, encoded| {
            b.iter(|| decode_strip(encoded, initial).unwrap());
        });
    }
    group.finish();
}

criterion_group!(benches, with_input);
criterion_main!(benches);
