#![doc(hidden)]

use crate::codec::DecodeError;

use std::io::Read;

pub(crate) fn read_byte<R: Read>(data: &mut R) -> Result<u8, DecodeError> {
    let mut byte = [0];
    data.read_exact(&mut byte).map_err(|_| DecodeError::UnexpectedEof)?;
    Ok(byte[0])
}

pub(crate) fn read_exact<R: Read>(data: &mut R, bytes: &mut [u8]) -> Result<(), DecodeError> {
    data.read_exact(bytes).map_err(|_| DecodeError::UnexpectedEof)
}
