use thiserror::Error;

pub type Result<T> = std::result::Result<T, StorageError>;

/// Unified error type for strata storage operations.
///
/// Note: [`StorageError::Io`] intentionally stores a human-readable `String`
/// rather than `std::io::Error` so device implementations without an OS file
/// layer (MMIO-backed chips, bus drivers) can surface failures without a
/// platform-specific error type.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("out of bounds: offset={offset} len={len} capacity={capacity}")]
    OutOfBounds {
        offset: u32,
        len: usize,
        capacity: u32,
    },

    #[error("integer overflow while computing device addresses")]
    AddressOverflow,

    #[error("storage exhausted: requested {requested} bytes, {available} free")]
    OutOfSpace { requested: u32, available: u32 },

    /// Reclamation is stack-ordered: only the most recently allocated
    /// range(s) may be freed, in reverse order of allocation.
    #[error("free of {addr} is not below the watermark {watermark}")]
    NotLastAllocation { addr: u32, watermark: u32 },

    #[error("record index {index} out of range ({records} records)")]
    BadRecordIndex { index: u32, records: u32 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),

    /// Device I/O failure, propagated unchanged from the device.
    #[error("io error: {0}")]
    Io(String),
}
