//! Control-code encoding and decoding of (stitched) triangle strips

use super::{
    decode_index, decode_v_byte, encode_index, encode_v_byte, pack_codes, unpack_codes, ControlCode, DecodeError,
    StripEncodingVersion,
};
use crate::error::{Result, StripError};
use crate::hash::checksum;
use crate::primitive::{PrimitiveGroup, PrimitiveType};
use crate::stitch::stitch_strips;
use crate::util::{read_byte, read_exact};
use crate::{Triangle, INVALID_INDEX};

use std::io::Cursor;

const STRIP_HEADER: u8 = 0xd0;

/// A strip stored as one [ControlCode] per triangle plus the vertices those codes introduce.
///
/// The first triangle is not part of the vertex pool; it has to be supplied again to [decode_strip].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedStrip {
    pub triangle_count: u32,
    /// 2-bit control codes, 4 per byte
    pub codes: Vec<u8>,
    pub vertices: Vec<u32>,
    /// Checksum of the initial triangle followed by `vertices`
    pub checksum: u32,
}

#[inline]
fn is_triangle(a: u32, b: u32, c: u32) -> bool {
    a != b && b != c && c != a
}

fn has_directed_edge(t: &Triangle, x: u32, y: u32) -> bool {
    (0..3).any(|j| t[j] == x && t[(j + 1) % 3] == y)
}

fn same_edge(e: (u32, u32), x: u32, y: u32) -> bool {
    (e.0 == x && e.1 == y) || (e.0 == y && e.1 == x)
}

fn third_vertex(t: &Triangle, x: u32, y: u32) -> Option<u32> {
    t.iter().copied().find(|v| *v != x && *v != y)
}

/// Returns the edge reused by `code` for triangle `i`, given the triangles and codes before it.
fn reused_edge(records: &[Triangle], codes: &[ControlCode], i: usize, code: ControlCode) -> Option<(u32, u32)> {
    match code {
        ControlCode::Restart => None,
        ControlCode::ReuseEdgePrev1 => records.get(i.checked_sub(1)?).map(|r| (r[1], r[2])),
        ControlCode::ReuseEdgePrev2 => records.get(i.checked_sub(1)?).map(|r| (r[2], r[0])),
        ControlCode::ReuseEdgePrev1OfPrev2 => {
            let r = records.get(i.checked_sub(2)?)?;

            // take whichever free edge the previous triangle left over
            match codes[i - 1] {
                ControlCode::ReuseEdgePrev1 => Some((r[2], r[0])),
                _ => Some((r[1], r[2])),
            }
        }
    }
}

/// Returns `true` if `edge` is the outgoing edge of `strip`, i.e. a triangle on it continues the strip directly.
fn continues(strip: &[u32], edge: (u32, u32)) -> bool {
    match strip {
        [.., x, y] => same_edge(edge, *x, *y),
        _ => false,
    }
}

/// Returns the first non-degenerate triangle of a strip in the orientation expected by [decode_strip].
pub fn initial_triangle(strip: &[u32]) -> Option<Triangle> {
    (0..strip.len().saturating_sub(2)).find_map(|k| {
        let (a, b, c) = (strip[k], strip[k + 1], strip[k + 2]);

        if !is_triangle(a, b, c) {
            None
        } else if k % 2 == 1 {
            Some([a, c, b])
        } else {
            Some([a, b, c])
        }
    })
}

/// Encodes a triangle strip as control codes.
///
/// Triangles that continue the strip reuse an edge of their predecessor. A triangle that starts a new sub-strip after
/// stitching reuses a free edge of triangle i-1 or i-2 when its orientation allows it, and restarts otherwise.
///
/// The strip has to be in the form produced by [crate::stitch::stitch_strips] (any strip grown by
/// [crate::stripify::stripify] qualifies), otherwise [StripError::InvalidInput] is returned: decoding always reproduces
/// that form. Strips joined with a primitive restart index are not supported; [INVALID_INDEX] is rejected, and
/// [encode_group] also rejects the group's own restart index.
///
/// # Example
///
/// ```
/// use tristrip_rs::codec::strip::{decode_strip, encode_strip, initial_triangle};
///
/// let strip = [0, 1, 2, 3, 4, 5];
/// let encoded = encode_strip(&strip).unwrap();
///
/// assert_eq!(encoded.vertices, vec![3, 4, 5]);
///
/// let initial = initial_triangle(&strip).unwrap();
/// assert_eq!(decode_strip(&encoded, initial).unwrap(), strip);
/// ```
pub fn encode_strip(strip: &[u32]) -> Result<EncodedStrip> {
    if let Some(k) = strip.iter().position(|v| *v == INVALID_INDEX) {
        return Err(StripError::InvalidInput(format!(
            "restart index at strip position {k}; only strips stitched with degenerate triangles can be encoded"
        )));
    }

    let mut records: Vec<Triangle> = Vec::new();
    let mut codes: Vec<ControlCode> = Vec::new();
    let mut vertices = Vec::new();
    let mut substrips: Vec<Vec<u32>> = Vec::new();

    for k in 0..strip.len().saturating_sub(2) {
        let (a, b, c) = (strip[k], strip[k + 1], strip[k + 2]);

        if !is_triangle(a, b, c) {
            continue;
        }

        let i = records.len();

        // t is the triangle as drawn, w the same triangle rotated the way a sub-strip starting here writes it
        let (t, w) = if k % 2 == 1 { ([b, a, c], [a, c, b]) } else { ([a, b, c], [a, b, c]) };

        let continuation = i > 0 && k > 0 && is_triangle(strip[k - 1], a, b);

        let (code, record) = if continuation {
            let code = [ControlCode::ReuseEdgePrev1, ControlCode::ReuseEdgePrev2]
                .into_iter()
                .find(|code| reused_edge(&records, &codes, i, *code).is_some_and(|e| same_edge(e, a, b)))
                .ok_or_else(|| {
                    StripError::InvalidInput(format!("triangle at strip position {k} does not continue the strip"))
                })?;

            let (x, y) = reused_edge(&records, &codes, i, code)
                .ok_or_else(|| StripError::InvalidInput(format!("no edge to reuse at strip position {k}")))?;
            let v = third_vertex(&t, x, y)
                .ok_or_else(|| StripError::InvalidInput(format!("degenerate triangle at strip position {k}")))?;

            vertices.push(v);
            if let Some(last) = substrips.last_mut() {
                last.push(v);
            }

            (code, [y, x, v])
        } else {
            let last = substrips.last().map(|s| s.as_slice()).unwrap_or(&[]);

            let code = [
                ControlCode::ReuseEdgePrev1,
                ControlCode::ReuseEdgePrev2,
                ControlCode::ReuseEdgePrev1OfPrev2,
            ]
            .into_iter()
            .find(|code| match reused_edge(&records, &codes, i, *code) {
                Some((x, y)) => {
                    has_directed_edge(&t, y, x)
                        && !continues(last, (x, y))
                        && third_vertex(&t, x, y).is_some_and(|v| [y, x, v] == w)
                }
                None => false,
            })
            .unwrap_or(ControlCode::Restart);

            if i > 0 {
                match code {
                    ControlCode::Restart => vertices.extend_from_slice(&w),
                    _ => vertices.push(w[2]),
                }
            }

            substrips.push(w.to_vec());

            (code, w)
        };

        records.push(record);
        codes.push(code);
    }

    let Some(initial) = records.first().copied() else {
        return Err(StripError::InvalidInput("strip has no non-degenerate triangles".into()));
    };

    if stitch_strips(&substrips) != strip {
        return Err(StripError::InvalidInput(
            "strip is not in stitched form and cannot be reproduced exactly".into(),
        ));
    }

    Ok(EncodedStrip {
        triangle_count: codes.len() as u32,
        codes: pack_codes(&codes),
        checksum: checksum(initial.iter().copied().chain(vertices.iter().copied())),
        vertices,
    })
}

/// Encodes the indices of a strip group with [encode_strip].
///
/// Fails with [StripError::InvalidInput] for list and fan groups, and for strips that contain their restart index.
pub fn encode_group(group: &PrimitiveGroup) -> Result<EncodedStrip> {
    if group.kind != PrimitiveType::Strip {
        return Err(StripError::InvalidInput(format!("cannot encode a {:?} group as a strip", group.kind)));
    }

    if let Some(r) = group.restart_index {
        if group.indices.contains(&r) {
            return Err(StripError::InvalidInput(format!(
                "strip is joined with restart index {r}; stitch with degenerate triangles to encode it"
            )));
        }
    }

    encode_strip(&group.indices)
}

/// Decodes a strip encoded by [encode_strip].
///
/// `initial` must be the triangle returned by [initial_triangle] for the encoded strip. Fails with
/// [StripError::EncodingMismatch] if it, or the vertex pool, differs from what was encoded.
pub fn decode_strip(encoded: &EncodedStrip, initial: Triangle) -> Result<Vec<u32>> {
    let count = encoded.triangle_count as usize;

    if count == 0 || encoded.codes.len() * 4 < count {
        return Err(StripError::EncodingMismatch(format!(
            "{} code bytes cannot hold {count} triangles",
            encoded.codes.len()
        )));
    }

    let codes = unpack_codes(&encoded.codes, count);

    if codes[0] != ControlCode::Restart {
        return Err(StripError::EncodingMismatch("first triangle is not a restart".into()));
    }

    let expected: usize = codes[1..].iter().map(|c| c.new_vertices()).sum();

    if expected != encoded.vertices.len() {
        return Err(StripError::EncodingMismatch(format!(
            "codes consume {expected} vertices, pool has {}",
            encoded.vertices.len()
        )));
    }

    if checksum(initial.iter().copied().chain(encoded.vertices.iter().copied())) != encoded.checksum {
        return Err(StripError::EncodingMismatch(
            "checksum does not match initial triangle and vertex pool".into(),
        ));
    }

    let mut records: Vec<Triangle> = Vec::with_capacity(count);
    let mut substrips: Vec<Vec<u32>> = vec![initial.to_vec()];
    let mut pool = encoded.vertices.iter().copied();

    records.push(initial);

    for (i, code) in codes.iter().copied().enumerate().skip(1) {
        let record = match reused_edge(&records, &codes, i, code) {
            None if code == ControlCode::Restart => {
                let (Some(a), Some(b), Some(c)) = (pool.next(), pool.next(), pool.next()) else {
                    return Err(StripError::EncodingMismatch("vertex pool exhausted".into()));
                };

                substrips.push(vec![a, b, c]);
                [a, b, c]
            }
            None => {
                return Err(StripError::EncodingMismatch(format!(
                    "triangle {i} reuses an edge of a missing triangle"
                )));
            }
            Some((x, y)) => {
                let Some(v) = pool.next() else {
                    return Err(StripError::EncodingMismatch("vertex pool exhausted".into()));
                };

                let direct = code != ControlCode::ReuseEdgePrev1OfPrev2
                    && substrips.last().is_some_and(|s| continues(s, (x, y)));

                match substrips.last_mut() {
                    Some(last) if direct => last.push(v),
                    _ => substrips.push(vec![y, x, v]),
                }

                [y, x, v]
            }
        };

        records.push(record);
    }

    Ok(stitch_strips(&substrips))
}

impl EncodedStrip {
    /// Returns the unpacked control codes.
    pub fn control_codes(&self) -> Vec<ControlCode> {
        let count = (self.triangle_count as usize).min(self.codes.len() * 4);
        unpack_codes(&self.codes, count)
    }

    /// Serializes the encoded strip.
    ///
    /// Layout: header byte, varint triangle count, packed codes, zig-zag delta varint vertex pool, little-endian
    /// checksum. The pool length is implied by the codes.
    pub fn to_bytes(&self, version: StripEncodingVersion) -> Vec<u8> {
        let version: u8 = version.into();

        let mut data = Vec::with_capacity(1 + 5 + self.codes.len() + self.vertices.len() * 2 + 4);

        data.push(STRIP_HEADER | version);
        encode_v_byte(&mut data, self.triangle_count);
        data.extend_from_slice(&self.codes);

        let mut last = 0;

        for v in &self.vertices {
            encode_index(&mut data, *v, last);
            last = *v;
        }

        data.extend_from_slice(&self.checksum.to_le_bytes());

        data
    }

    /// Parses data written by [EncodedStrip::to_bytes].
    ///
    /// The parser is safe to use for untrusted input; consistency with the initial triangle is only checked by
    /// [decode_strip].
    pub fn from_bytes(buffer: &[u8]) -> std::result::Result<Self, DecodeError> {
        let mut data = Cursor::new(buffer);

        let header = read_byte(&mut data)?;

        if (header & 0xf0) != STRIP_HEADER {
            return Err(DecodeError::InvalidHeader);
        }

        if (header & 0x0f) > u8::from(StripEncodingVersion::default()) {
            return Err(DecodeError::UnsupportedVersion);
        }

        let triangle_count = decode_v_byte(&mut data)?;

        // each triangle takes at least 2 bits, so a count the buffer cannot hold is malformed
        let code_bytes = (triangle_count as usize).div_ceil(4);

        if code_bytes > buffer.len() {
            return Err(DecodeError::UnexpectedEof);
        }

        let mut codes = vec![0; code_bytes];
        read_exact(&mut data, &mut codes)?;

        let vertex_count: usize = unpack_codes(&codes, triangle_count as usize)
            .iter()
            .skip(1)
            .map(|c| c.new_vertices())
            .sum();

        let mut vertices = Vec::with_capacity(vertex_count.min(buffer.len()));
        let mut last = 0;

        for _ in 0..vertex_count {
            last = decode_index(&mut data, last)?;
            vertices.push(last);
        }

        let mut checksum = [0; 4];
        read_exact(&mut data, &mut checksum)?;

        if data.position() != buffer.len() as u64 {
            return Err(DecodeError::ExtraBytes);
        }

        Ok(Self {
            triangle_count,
            codes,
            vertices,
            checksum: u32::from_le_bytes(checksum),
        })
    }
}
