//! Joining independent triangle strips into a single strip

use crate::config::StripConfig;
use crate::primitive::{PrimitiveGroup, PrimitiveType};

use tracing::debug;

/// Appends `strip` to `destination`, connecting the two with degenerate triangles.
///
/// For a destination ending in `.. B C` and a strip starting with `D E F ..`, `C D` is inserted. That keeps the
/// winding of the appended triangles when the destination length is even; for an odd length a single-triangle strip
/// is emitted as `D F E` instead, and longer strips get one more copy of `D`.
fn append_strip(destination: &mut Vec<u32>, strip: &[u32]) {
    assert!(strip.len() >= 3);

    let last = match destination.last() {
        Some(last) => *last,
        None => {
            destination.extend_from_slice(strip);
            return;
        }
    };

    let first = strip[0];

    destination.push(last);
    destination.push(first);

    if destination.len() % 2 == 0 {
        destination.extend_from_slice(strip);
    } else if strip.len() == 3 {
        // D E F read at an odd position is E D F, so swap the last two to keep the winding
        destination.extend_from_slice(&[strip[0], strip[2], strip[1]]);
    } else {
        destination.push(first);
        destination.extend_from_slice(strip);
    }
}

/// Joins strips into one sequence using degenerate triangles.
///
/// All non-degenerate triangles keep their winding. The result has `sum(len) + 2 * joins` indices plus one extra
/// index for every multi-triangle strip that lands on an odd offset.
pub fn stitch_strips<S>(strips: &[S]) -> Vec<u32>
where
    S: AsRef<[u32]>,
{
    let mut result = Vec::with_capacity(stitch_strips_bound(strips));

    for strip in strips {
        append_strip(&mut result, strip.as_ref());
    }

    result
}

/// Joins strips into one sequence separated by `restart_index`, which must not be used as a vertex index.
pub fn stitch_strips_with_restart<S>(strips: &[S], restart_index: u32) -> Vec<u32>
where
    S: AsRef<[u32]>,
{
    let mut result = Vec::with_capacity(stitch_strips_bound(strips));

    for strip in strips {
        if !result.is_empty() {
            result.push(restart_index);
        }

        result.extend_from_slice(strip.as_ref());
    }

    result
}

/// Returns worst case size requirement for [stitch_strips].
pub fn stitch_strips_bound<S>(strips: &[S]) -> usize
where
    S: AsRef<[u32]>,
{
    let total: usize = strips.iter().map(|s| s.as_ref().len()).sum();

    // worst case is 3 extra indices per join
    total + strips.len().saturating_sub(1) * 3
}

/// Merges every strip group into a single strip group when `config.stitch_strips` is set.
///
/// List and fan groups are never joined; they keep their relative order after the stitched strip. With stitching
/// disabled the groups are returned untouched and the caller issues one draw per group.
pub fn stitch(groups: Vec<PrimitiveGroup>, config: &StripConfig) -> Vec<PrimitiveGroup> {
    if !config.stitch_strips {
        return groups;
    }

    let (strips, others): (Vec<_>, Vec<_>) = groups
        .into_iter()
        .partition(|g| g.kind == PrimitiveType::Strip && g.indices.len() >= 3);

    if strips.is_empty() {
        return others;
    }

    let joins = strips.len() - 1;
    let original: usize = strips.iter().map(|s| s.count()).sum();

    let mut stitched = match config.restart_index {
        Some(restart_index) => {
            let indices: Vec<&[u32]> = strips.iter().map(|s| s.indices.as_slice()).collect();
            let mut group = PrimitiveGroup::strip(stitch_strips_with_restart(&indices, restart_index));
            group.restart_index = Some(restart_index);
            group
        }
        None => {
            let indices: Vec<&[u32]> = strips.iter().map(|s| s.indices.as_slice()).collect();
            PrimitiveGroup::strip(stitch_strips(&indices))
        }
    };

    // strips that already carry restart indices keep them
    if stitched.restart_index.is_none() {
        stitched.restart_index = strips.iter().find_map(|s| s.restart_index);
    }

    debug!(
        strips = strips.len(),
        joins,
        indices = stitched.count(),
        overhead = stitched.count() - original,
        "stitched strips"
    );

    let mut result = Vec::with_capacity(others.len() + 1);
    result.push(stitched);
    result.extend(others);
    result
}
