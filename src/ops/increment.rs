//! Buffer-increment operation.
//!
//! The 8-byte request frame is a little-endian u64 counter; the response is
//! the same counter plus one, re-encoded little-endian. Addition wraps, so
//! the all-ones frame maps back to zero.

use bytes::Bytes;

use crate::ops::OperationError;

/// Request frame size in bytes.
pub const INPUT_LEN: usize = 8;

/// Increment the counter held in `input`.
pub fn transform(input: &[u8]) -> Result<Bytes, OperationError> {
    let frame: [u8; INPUT_LEN] =
        input
            .try_into()
            .map_err(|_| OperationError::InputLength {
                expected: INPUT_LEN,
                got: input.len(),
            })?;

    let counter = u64::from_le_bytes(frame);
    let next = counter.wrapping_add(1);

    Ok(Bytes::copy_from_slice(&next.to_le_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increment_zero() {
        let response = transform(&[0u8; 8]).unwrap();
        assert_eq!(&response[..], &[1, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_increment_little_endian() {
        let response = transform(&1234u64.to_le_bytes()).unwrap();
        assert_eq!(u64::from_le_bytes(response[..].try_into().unwrap()), 1235);
    }

    #[test]
    fn test_increment_wraps() {
        let response = transform(&[0xff; 8]).unwrap();
        assert_eq!(&response[..], &[0u8; 8]);
    }

    #[test]
    fn test_rejects_short_frame() {
        match transform(&[0u8; 7]) {
            Err(OperationError::InputLength { expected: 8, got: 7 }) => {}
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_rejects_long_frame() {
        match transform(&[0u8; 9]) {
            Err(OperationError::InputLength { expected: 8, got: 9 }) => {}
            other => panic!("unexpected: {:?}", other),
        }
    }
}
