use tristrip_rs::cache::analyze_vertex_cache;
use tristrip_rs::codec::strip::{decode_strip, encode_strip, initial_triangle, EncodedStrip};
use tristrip_rs::codec::StripEncodingVersion;
use tristrip_rs::primitive::canonical_triangle;
use tristrip_rs::{stripify, PrimitiveGroup, PrimitiveType, StripConfig, Triangle};

/// Regular grid of `width` x `height` quads, two consistently wound triangles each.
fn grid(width: u32, height: u32) -> Vec<u32> {
    let mut indices = Vec::new();

    for y in 0..height {
        for x in 0..width {
            let a = y * (width + 1) + x;
            let b = a + 1;
            let c = a + width + 1;
            let d = c + 1;

            indices.extend_from_slice(&[a, b, c, c, b, d]);
        }
    }

    indices
}

/// Grid wrapped in both directions, so every edge is shared by two triangles.
fn torus(width: u32, height: u32) -> Vec<u32> {
    let mut indices = Vec::new();

    for y in 0..height {
        for x in 0..width {
            let a = y * width + x;
            let b = y * width + (x + 1) % width;
            let c = ((y + 1) % height) * width + x;
            let d = ((y + 1) % height) * width + (x + 1) % width;

            indices.extend_from_slice(&[a, b, c, c, b, d]);
        }
    }

    indices
}

fn vertex_count(indices: &[u32]) -> usize {
    indices.iter().max().map_or(0, |v| *v as usize + 1)
}

fn sorted_triangles<I>(triangles: I) -> Vec<Triangle>
where
    I: IntoIterator<Item = Triangle>,
{
    let mut triangles: Vec<_> = triangles.into_iter().map(canonical_triangle).collect();
    triangles.sort_unstable();
    triangles
}

fn input_triangles(indices: &[u32]) -> Vec<Triangle> {
    sorted_triangles(indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]]))
}

fn output_triangles(groups: &[PrimitiveGroup]) -> Vec<Triangle> {
    sorted_triangles(groups.iter().flat_map(|g| g.triangles()))
}

/// xorshift32, enough to shuffle test meshes deterministically
struct Random(u32);

impl Random {
    fn next(&mut self) -> u32 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 17;
        self.0 ^= self.0 << 5;
        self.0
    }

    fn below(&mut self, n: u32) -> u32 {
        self.next() % n
    }

    fn chance(&mut self, percent: u32) -> bool {
        self.below(100) < percent
    }
}

/// Grid pieces with dropped, flipped, duplicated and degenerate triangles.
fn scrambled_mesh(random: &mut Random) -> Vec<u32> {
    let indices = grid(1 + random.below(6), 1 + random.below(6));

    let mut triangles: Vec<Triangle> = indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]]).collect();

    for i in (1..triangles.len()).rev() {
        let j = random.below(i as u32 + 1) as usize;
        triangles.swap(i, j);
    }

    triangles.retain(|_| random.chance(80));

    for t in triangles.iter_mut() {
        if random.chance(10) {
            t.reverse();
        }
    }

    if random.chance(30) {
        if let Some(first) = triangles.first().copied() {
            triangles.push(first);
        }
    }

    if random.chance(30) {
        triangles.push([1, 1, 2]);
    }

    triangles.into_iter().flatten().collect()
}

fn assert_roundtrip(strip: &[u32]) {
    let encoded = encode_strip(strip).unwrap();
    let initial = initial_triangle(strip).unwrap();

    let bytes = encoded.to_bytes(StripEncodingVersion::default());
    let parsed = EncodedStrip::from_bytes(&bytes).unwrap();

    assert_eq!(decode_strip(&parsed, initial).unwrap(), strip);
}

#[test]
fn test_triangle_preservation() {
    let meshes = [grid(4, 4), grid(8, 3), torus(8, 8), torus(5, 7)];

    for indices in &meshes {
        for cache_size in [3, 4, 8, 16, 32] {
            for stitch in [false, true] {
                let config = StripConfig::default()
                    .with_cache_size(cache_size)
                    .with_stitch_strips(stitch);

                let result = stripify(indices, vertex_count(indices), &config).unwrap();

                assert_eq!(output_triangles(&result.groups), input_triangles(indices));
                assert!(result.index_count() <= indices.len());
            }
        }
    }
}

#[test]
fn test_triangle_preservation_scrambled() {
    let mut random = Random(0x9e3779b9);

    for _ in 0..200 {
        let indices = scrambled_mesh(&mut random);

        let cache_size = [3, 5, 16][random.below(3) as usize];
        let min_strip_size = [0, 0, 2, 3][random.below(4) as usize];

        for stitch in [false, true] {
            let config = StripConfig::default()
                .with_cache_size(cache_size)
                .with_min_strip_size(min_strip_size)
                .with_stitch_strips(stitch);

            let result = stripify(&indices, vertex_count(&indices), &config).unwrap();

            assert_eq!(output_triangles(&result.groups), input_triangles(&indices));

            for group in result.groups.iter().filter(|g| g.kind == PrimitiveType::Strip) {
                assert_roundtrip(&group.indices);
            }
        }
    }
}

#[test]
fn test_degenerate_invisibility() {
    let indices = grid(8, 8);
    let result = stripify(&indices, vertex_count(&indices), &StripConfig::default()).unwrap();

    assert_eq!(result.groups.len(), 1);

    let strip = &result.groups[0];
    assert_eq!(strip.kind, PrimitiveType::Strip);
    assert_eq!(strip.count(), 158);

    let windows = strip.indices.windows(3);
    let degenerate = windows
        .clone()
        .filter(|w| w[0] == w[1] || w[1] == w[2] || w[0] == w[2])
        .count();

    // every window is either an input triangle or a zero-area join
    assert_eq!(windows.len() - degenerate, indices.len() / 3);
    assert_eq!(strip.triangle_count(), indices.len() / 3);
}

#[test]
fn test_encode_decode_roundtrip() {
    let meshes = [grid(4, 4), grid(8, 3), torus(8, 8), torus(5, 7)];

    for indices in &meshes {
        for stitch in [false, true] {
            let config = StripConfig::default().with_stitch_strips(stitch);
            let result = stripify(indices, vertex_count(indices), &config).unwrap();

            for group in &result.groups {
                assert_roundtrip(&group.indices);
            }
        }
    }
}

#[test]
fn test_cache_size_does_not_add_strips() {
    let meshes = [grid(4, 4), grid(8, 8), grid(16, 9), torus(8, 8), torus(12, 6)];

    for indices in &meshes {
        let mut previous = usize::MAX;

        for cache_size in [3, 4, 8, 16, 32] {
            let config = StripConfig::default()
                .with_cache_size(cache_size)
                .with_stitch_strips(false);

            let strips = stripify(indices, vertex_count(indices), &config).unwrap().strip_count();

            assert!(strips <= previous, "{strips} strips with cache size {cache_size}, {previous} before");
            previous = strips;
        }
    }
}

#[test]
fn test_strips_reduce_index_count() {
    let indices = grid(4, 4);
    let config = StripConfig::default().with_stitch_strips(false);

    let result = stripify(&indices, vertex_count(&indices), &config).unwrap();

    assert_eq!(result.strip_count(), 4);
    assert_eq!(result.index_count(), 4 * 10);

    let stitched = stripify(&indices, vertex_count(&indices), &StripConfig::default()).unwrap();
    assert_eq!(stitched.index_count(), 46);

    let list = analyze_vertex_cache(&[PrimitiveGroup::list(indices.clone())], vertex_count(&indices), 16);
    let strips = analyze_vertex_cache(&stitched.groups, vertex_count(&indices), 16);

    assert!(strips.acmr <= 3.0);
    assert!(list.acmr <= 3.0);
    assert!(strips.atvr >= 1.0);
}

#[test]
fn test_lists_only_idempotence() {
    let meshes = [grid(3, 3), torus(4, 4), vec![0, 1, 2, 1, 2, 3, 2, 3, 4]];

    for indices in &meshes {
        for cache_size in [3, 16] {
            for stitch in [false, true] {
                let config = StripConfig::default()
                    .with_lists_only(true)
                    .with_cache_size(cache_size)
                    .with_stitch_strips(stitch);

                let result = stripify(indices, vertex_count(indices), &config).unwrap();

                assert_eq!(result.groups, vec![PrimitiveGroup::list(indices.clone())]);
            }
        }
    }
}

#[test]
fn test_scenario_three_triangles() {
    let indices = [0, 1, 2, 2, 1, 3, 2, 3, 4];

    let config = StripConfig::default()
        .with_cache_size(16)
        .with_stitch_strips(false)
        .with_min_strip_size(0);

    let result = stripify(&indices, 5, &config).unwrap();

    assert_eq!(result.groups, vec![PrimitiveGroup::strip(vec![0, 1, 2, 3, 4])]);
    assert!(result.diagnostics.is_empty());

    let lists = stripify(&indices, 5, &config.with_lists_only(true)).unwrap();
    assert_eq!(lists.groups, vec![PrimitiveGroup::list(indices.to_vec())]);
}

#[test]
fn test_scenario_disjoint_triangles() {
    let indices = [0, 1, 2, 5, 6, 7];

    let result = stripify(&indices, 8, &StripConfig::default()).unwrap();

    assert_eq!(result.groups.len(), 1);

    let stitched = &result.groups[0].indices;
    assert_eq!(stitched.len(), 3 + 2 + 3);
    assert_eq!(stitched, &vec![0, 1, 2, 2, 5, 5, 7, 6]);

    // the join triples (1 2 2), (2 2 5), (2 5 5), (5 5 7) all repeat a vertex
    for w in stitched.windows(3).skip(1).take(4) {
        assert!(w[0] == w[1] || w[1] == w[2]);
    }

    assert_eq!(output_triangles(&result.groups), input_triangles(&indices));
}
