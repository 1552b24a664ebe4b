use bytes::BufMut;

use crate::error::{Result, StoreError};

/// Largest number of bytes a varint can occupy.
pub const MAX_VARINT_LEN: usize = 9;

/// Read a variable-length integer from the given data at the specified offset
/// Returns (value, bytes_read)
pub fn read_varint(data: &[u8], offset: usize) -> Result<(u64, usize)> {
    let mut value: u64 = 0;
    let mut bytes_read = 0;

    for i in 0..MAX_VARINT_LEN {
        let byte = *data.get(offset + bytes_read).ok_or_else(|| {
            StoreError::corrupt(format!("truncated varint at offset {}", offset))
        })?;
        bytes_read += 1;

        if i == MAX_VARINT_LEN - 1 {
            // 9th byte: take all 8 bits
            value = (value << 8) | byte as u64;
            break;
        }
        // High-order group comes first
        value = (value << 7) | (byte & 0x7F) as u64;
        if byte & 0x80 == 0 {
            break;
        }
    }

    Ok((value, bytes_read))
}

/// Append `value` in the same big-endian 7-bit group format `read_varint`
/// understands. Values that need more than 56 bits use the 9-byte form.
pub fn write_varint<B: BufMut>(buf: &mut B, value: u64) {
    if value >> 56 != 0 {
        let mut out = [0u8; MAX_VARINT_LEN];
        out[8] = value as u8;
        let mut rest = value >> 8;
        for slot in out[..8].iter_mut().rev() {
            *slot = (rest & 0x7F) as u8 | 0x80;
            rest >>= 7;
        }
        buf.put_slice(&out);
        return;
    }

    let mut groups = [0u8; 8];
    let mut n = 0;
    let mut rest = value;
    loop {
        groups[n] = (rest & 0x7F) as u8 | 0x80;
        n += 1;
        rest >>= 7;
        if rest == 0 {
            break;
        }
    }
    // lowest group goes last and terminates the varint
    groups[0] &= 0x7F;
    groups[..n].reverse();
    buf.put_slice(&groups[..n]);
}

pub fn varint_len(value: u64) -> usize {
    if value >> 56 != 0 {
        return MAX_VARINT_LEN;
    }
    let bits = 64 - value.leading_zeros() as usize;
    bits.max(1).div_ceil(7)
}
