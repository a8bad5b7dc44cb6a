use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::error::Error;

/// Allocates a fixed array of `capacity` slots, each produced by `init`.
///
/// The allocation is attempted up front with `try_reserve_exact` so that an
/// oversized table is reported to the caller instead of aborting.
pub(crate) fn allocate_slots<T>(
    capacity: usize,
    init: impl FnMut() -> T,
) -> Result<Box<[T]>, Error> {
    if capacity == 0 {
        return Err(Error::ZeroCapacity);
    }

    let mut slots = Vec::new();
    slots
        .try_reserve_exact(capacity)
        .map_err(|source| Error::Allocation { capacity, source })?;
    slots.resize_with(capacity, init);

    Ok(slots.into_boxed_slice())
}
