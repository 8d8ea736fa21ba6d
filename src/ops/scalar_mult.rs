//! Scalar-multiplication operation.
//!
//! The 32-byte request frame is a little-endian 256-bit scalar; the response
//! is the scalar multiplied by the generator constant 9 in the prime field
//! modulo 2^255 - 19, re-encoded as 32 little-endian bytes. Any 32-byte
//! frame is a valid input; values at or above the modulus are reduced by the
//! multiplication itself.
//!
//! Field elements are four 64-bit limbs, least significant first. The
//! multiply is a carry-propagating schoolbook product; reduction folds the
//! high limbs back in via 2^256 = 38 (mod p) and the top bit via
//! 2^255 = 19 (mod p).

use bytes::Bytes;

use crate::ops::OperationError;

/// Request frame size in bytes.
pub const INPUT_LEN: usize = 32;

/// p = 2^255 - 19, as little-endian limbs.
const MODULUS: [u64; 4] = [
    0xffff_ffff_ffff_ffed,
    0xffff_ffff_ffff_ffff,
    0xffff_ffff_ffff_ffff,
    0x7fff_ffff_ffff_ffff,
];

/// Fixed multiplier applied to every request scalar.
const MULTIPLIER: [u64; 4] = [9, 0, 0, 0];

const LOW_63_BITS: u64 = 0x7fff_ffff_ffff_ffff;

/// Multiply the scalar held in `input` by the fixed generator constant.
pub fn transform(input: &[u8]) -> Result<Bytes, OperationError> {
    if input.len() != INPUT_LEN {
        return Err(OperationError::InputLength {
            expected: INPUT_LEN,
            got: input.len(),
        });
    }

    let scalar = decode(input);
    let product = mul_mod(&scalar, &MULTIPLIER);

    Ok(Bytes::copy_from_slice(&encode(&product)))
}

/// Read 32 little-endian bytes into limbs. Caller guarantees the length.
fn decode(input: &[u8]) -> [u64; 4] {
    let mut limbs = [0u64; 4];
    for (i, limb) in limbs.iter_mut().enumerate() {
        let mut chunk = [0u8; 8];
        chunk.copy_from_slice(&input[i * 8..(i + 1) * 8]);
        *limb = u64::from_le_bytes(chunk);
    }
    limbs
}

/// Write limbs back out as 32 little-endian bytes.
fn encode(limbs: &[u64; 4]) -> [u8; 32] {
    let mut out = [0u8; 32];
    for (i, limb) in limbs.iter().enumerate() {
        out[i * 8..(i + 1) * 8].copy_from_slice(&limb.to_le_bytes());
    }
    out
}

/// Compute `a * b mod p`. Operands need not be reduced.
fn mul_mod(a: &[u64; 4], b: &[u64; 4]) -> [u64; 4] {
    // Schoolbook 4x4 product into 8 limbs, carries propagated per row.
    let mut wide = [0u64; 8];
    for i in 0..4 {
        let mut carry: u128 = 0;
        for j in 0..4 {
            let uv = wide[i + j] as u128 + (a[i] as u128) * (b[j] as u128) + carry;
            wide[i + j] = uv as u64;
            carry = uv >> 64;
        }
        wide[i + 4] = carry as u64;
    }

    // Fold the high half: 2^256 = 38 (mod p). Result fits five limbs.
    let mut folded = [0u64; 5];
    let mut carry: u128 = 0;
    for i in 0..4 {
        let uv = wide[i] as u128 + (wide[i + 4] as u128) * 38 + carry;
        folded[i] = uv as u64;
        carry = uv >> 64;
    }
    folded[4] = carry as u64;

    // Fold everything above bit 254: 2^255 = 19 (mod p).
    let mut acc = [folded[0], folded[1], folded[2], folded[3] & LOW_63_BITS];
    let high = (folded[4] << 1) | (folded[3] >> 63);
    add_small(&mut acc, high as u128 * 19);

    // The addition may have set bit 255 again; fold it once more.
    let high = acc[3] >> 63;
    acc[3] &= LOW_63_BITS;
    add_small(&mut acc, high as u128 * 19);

    // Now acc < 2^255, so at most one subtraction of p remains.
    if geq(&acc, &MODULUS) {
        sub(&mut acc, &MODULUS);
    }
    acc
}

/// Add a small value into the limbs, propagating carries.
fn add_small(limbs: &mut [u64; 4], value: u128) {
    let mut carry = value;
    for limb in limbs.iter_mut() {
        let uv = *limb as u128 + carry;
        *limb = uv as u64;
        carry = uv >> 64;
    }
}

/// Lexicographic `a >= b` over little-endian limbs.
fn geq(a: &[u64; 4], b: &[u64; 4]) -> bool {
    for i in (0..4).rev() {
        if a[i] != b[i] {
            return a[i] > b[i];
        }
    }
    true
}

/// In-place `a -= b`, assuming `a >= b`.
fn sub(a: &mut [u64; 4], b: &[u64; 4]) {
    let mut borrow = 0u64;
    for i in 0..4 {
        let (diff, under1) = a[i].overflowing_sub(b[i]);
        let (diff, under2) = diff.overflowing_sub(borrow);
        a[i] = diff;
        borrow = (under1 | under2) as u64;
    }
}
