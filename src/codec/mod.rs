//! Compact triangle strip encoding

pub mod strip;

use crate::util::read_byte;

use std::io::Read;

#[derive(thiserror::Error, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecodeError {
    #[error("invalid header")]
    InvalidHeader,
    #[error("unsupported encoding version")]
    UnsupportedVersion,
    #[error("extra bytes after encoded data")]
    ExtraBytes,
    #[error("unexpected end of data")]
    UnexpectedEof,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StripEncodingVersion {
    /// Decodable by all versions
    #[default]
    V0,
}

impl From<StripEncodingVersion> for u8 {
    fn from(value: StripEncodingVersion) -> u8 {
        match value {
            StripEncodingVersion::V0 => 0,
        }
    }
}

/// Per-triangle tag describing where a triangle's vertices come from.
///
/// Every triangle is kept as `(a, b, c)` where `(a, b)` is the edge it was entered through and `c` the vertex it
/// introduced; its free edges are `(b, c)` and `(c, a)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ControlCode {
    /// Three new vertices; starts an unconnected sub-strip
    Restart = 0,
    /// Reuses the `(b, c)` edge of the previous triangle
    ReuseEdgePrev1 = 1,
    /// Reuses the `(c, a)` edge of the previous triangle
    ReuseEdgePrev2 = 2,
    /// Reuses the free edge of the triangle before the previous one that the previous one did not take
    ReuseEdgePrev1OfPrev2 = 3,
}

impl ControlCode {
    pub fn from_bits(bits: u8) -> Self {
        match bits & 3 {
            0 => ControlCode::Restart,
            1 => ControlCode::ReuseEdgePrev1,
            2 => ControlCode::ReuseEdgePrev2,
            _ => ControlCode::ReuseEdgePrev1OfPrev2,
        }
    }

    pub fn bits(self) -> u8 {
        self as u8
    }

    /// Returns how many vertices the code takes from the vertex pool.
    pub fn new_vertices(self) -> usize {
        match self {
            ControlCode::Restart => 3,
            _ => 1,
        }
    }
}

/// Packs codes 4 per byte, first code in the lowest bits.
pub fn pack_codes(codes: &[ControlCode]) -> Vec<u8> {
    codes
        .chunks(4)
        .map(|chunk| {
            chunk
                .iter()
                .enumerate()
                .fold(0u8, |byte, (i, code)| byte | (code.bits() << (i * 2)))
        })
        .collect()
}

/// Unpacks `count` codes written by [pack_codes].
pub fn unpack_codes(data: &[u8], count: usize) -> Vec<ControlCode> {
    assert!(data.len() * 4 >= count);

    (0..count)
        .map(|i| ControlCode::from_bits(data[i / 4] >> ((i % 4) * 2)))
        .collect()
}

fn encode_v_byte(data: &mut Vec<u8>, mut v: u32) {
    // encode 32-bit value in up to 5 7-bit groups
    loop {
        data.push(((v & 127) | (if v > 127 { 128 } else { 0 })) as u8);
        v >>= 7;

        if v == 0 {
            break;
        }
    }
}

fn decode_v_byte<R: Read>(data: &mut R) -> Result<u32, DecodeError> {
    let lead = read_byte(data)? as u32;

    // fast path: single byte
    if lead < 128 {
        return Ok(lead);
    }

    // slow path: up to 4 extra bytes
    // note that this loop always terminates, which is important for malformed data
    let mut result = lead & 127;
    let mut shift: u32 = 7;

    for _ in 0..4 {
        let group = read_byte(data)? as u32;
        result |= (group & 127) << shift;
        shift += 7;

        if group < 128 {
            break;
        }
    }

    Ok(result)
}

fn encode_index(data: &mut Vec<u8>, index: u32, last: u32) {
    let d = index.wrapping_sub(last);
    let v = (d << 1) ^ (((d as i32) >> 31) as u32);

    encode_v_byte(data, v);
}

fn decode_index<R: Read>(data: &mut R, last: u32) -> Result<u32, DecodeError> {
    let v = decode_v_byte(data)?;
    let d = (v >> 1) ^ (-((v & 1) as i32) as u32);

    Ok(last.wrapping_add(d))
}
