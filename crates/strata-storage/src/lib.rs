//! Byte-addressed external storage abstractions.
//!
//! Application code wants to park data on external memory (on-chip
//! persistent memory, serial memory chips) without hard-coding device
//! addresses. This crate provides:
//!
//! - [`StorageDevice`]: the minimal read/write capability a driver exposes
//! - [`Storage`]: owns a device and allocates its address space
//!   (bump pointer, stack-ordered reclamation)
//! - [`Block`]: bounds-checked accessor over one allocated range
//! - [`RecordCache`]: indexed fixed-size records staged through one buffer
//! - [`Stream`]: circular FIFO byte queue with wraparound cursors
//! - [`MemDevice`] / [`FileDevice`]: heap- and file-backed devices for
//!   tests and host tooling
//!
//! Everything is single-threaded and synchronous: each operation is a
//! direct, blocking call into the device. Chip drivers live elsewhere and
//! only need to satisfy [`StorageDevice`].

mod block;
mod cache;
mod device;
mod error;
#[cfg(not(target_arch = "wasm32"))]
mod file;
mod storage;
mod stream;
mod util;

pub use block::Block;
pub use cache::RecordCache;
pub use device::{MemDevice, StorageDevice};
pub use error::{Result, StorageError};
#[cfg(not(target_arch = "wasm32"))]
pub use file::FileDevice;
pub use storage::Storage;
pub use stream::Stream;

#[cfg(all(test, not(target_arch = "wasm32")))]
mod proptests;
