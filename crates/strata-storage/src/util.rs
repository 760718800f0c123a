use crate::{Result, StorageError};

/// Check that `[offset, offset + len)` lies within `[0, capacity)`.
///
/// All arithmetic is widened to `u64`, so the check itself cannot wrap.
pub(crate) fn checked_span(offset: u32, len: usize, capacity: u32) -> Result<()> {
    let end = u64::from(offset)
        .checked_add(len as u64)
        .ok_or(StorageError::AddressOverflow)?;
    if end > u64::from(capacity) {
        return Err(StorageError::OutOfBounds {
            offset,
            len,
            capacity,
        });
    }
    Ok(())
}
