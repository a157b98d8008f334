//! Allocation strategies for the bucket table and the index chain.
//!
//! A [`HashIndex`](crate::HashIndex) owns two flat arrays of positions. Both
//! are obtained from, and returned to, a [`SlotAllocator`] chosen by the
//! caller. [`Global`] forwards to the global allocator and is the default.

use alloc::alloc::handle_alloc_error;
use core::alloc::Layout;
use core::ptr::NonNull;

use crate::position::Position;

/// A strategy for allocating arrays of `P`.
///
/// # Safety
///
/// Implementations must uphold the following:
/// - `allocate(len)` returns a pointer that is non-null, aligned for `P` and
///   valid for reads and writes of `len` consecutive `P`s until it is passed
///   back to `deallocate`. The memory may be uninitialized.
/// - Allocation failure must not return. Call
///   [`handle_alloc_error`](alloc::alloc::handle_alloc_error) or panic.
/// - Cloning the strategy yields one that can release memory allocated by
///   the original.
pub unsafe trait SlotAllocator<P> {
    /// Allocates room for `len` slots.
    fn allocate(&self, len: usize) -> NonNull<P>;

    /// Releases memory obtained from [`allocate`](SlotAllocator::allocate).
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by `allocate(len)` on this strategy (or
    /// a clone of it) with the same `len`, and must not be used afterwards.
    unsafe fn deallocate(&self, ptr: NonNull<P>, len: usize);
}

/// The global allocator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Global;

// SAFETY: Memory comes from the global allocator with `Layout::array::<P>`,
// which guarantees size and alignment for `len` slots. Null results are
// routed to `handle_alloc_error`, which never returns.
unsafe impl<P> SlotAllocator<P> for Global {
    fn allocate(&self, len: usize) -> NonNull<P> {
        let layout = Layout::array::<P>(len).expect("allocation size overflow");
        if layout.size() == 0 {
            return NonNull::dangling();
        }

        // SAFETY: We have validated that the layout size is non-zero. Null is
        // handled before constructing the `NonNull`.
        unsafe {
            let raw = alloc::alloc::alloc(layout);
            if raw.is_null() {
                handle_alloc_error(layout);
            }
            NonNull::new_unchecked(raw.cast())
        }
    }

    unsafe fn deallocate(&self, ptr: NonNull<P>, len: usize) {
        let layout = Layout::array::<P>(len).expect("allocation size overflow");
        if layout.size() != 0 {
            // SAFETY: The caller guarantees `ptr` came from `allocate(len)`,
            // which used this exact layout.
            unsafe {
                alloc::alloc::dealloc(ptr.as_ptr().cast(), layout);
            }
        }
    }
}

/// A flat array of positions.
///
/// A buffer either points at [`Position::null_slot`] (length one, never
/// written) or owns memory from a [`SlotAllocator`]. Owned buffers are not
/// freed on drop; the owner hands them back through [`SlotBuffer::release`]
/// with the strategy that produced them.
pub(crate) struct SlotBuffer<P: Position> {
    ptr: NonNull<P>,
    len: usize,
}

impl<P: Position> SlotBuffer<P> {
    /// A read-only one-slot buffer holding [`Position::NULL`].
    pub(crate) fn sentinel() -> Self {
        Self {
            ptr: NonNull::from(P::null_slot()).cast(),
            len: 1,
        }
    }

    /// Allocates `len` slots, all set to `fill`.
    pub(crate) fn filled<A: SlotAllocator<P>>(alloc: &A, len: usize, fill: P) -> Self {
        let ptr = alloc.allocate(len);
        // SAFETY: `allocate` returns memory valid for writes of `len` slots.
        unsafe {
            for i in 0..len {
                ptr.add(i).write(fill);
            }
        }
        Self { ptr, len }
    }

    pub(crate) fn is_sentinel(&self) -> bool {
        core::ptr::eq(self.ptr.as_ptr(), P::null_slot().as_ptr())
    }

    #[inline(always)]
    pub(crate) fn as_slice(&self) -> &[P] {
        // SAFETY: `ptr` is valid for `len` initialized slots, either the
        // static sentinel or memory filled in `filled`/`grow`.
        unsafe { core::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    #[inline(always)]
    pub(crate) fn as_mut_slice(&mut self) -> &mut [P] {
        debug_assert!(!self.is_sentinel(), "write to the shared null slot");
        // SAFETY: Owned buffers are valid for `len` initialized slots and are
        // uniquely referenced through `&mut self`.
        unsafe { core::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    /// Copies the contents into a fresh allocation from `alloc`.
    pub(crate) fn duplicate<A: SlotAllocator<P>>(&self, alloc: &A) -> Self {
        if self.is_sentinel() {
            return Self::sentinel();
        }

        let ptr = alloc.allocate(self.len);
        // SAFETY: The source holds `len` initialized slots and the new
        // allocation is valid for `len` writes. They cannot overlap.
        unsafe {
            core::ptr::copy_nonoverlapping(self.ptr.as_ptr(), ptr.as_ptr(), self.len);
        }
        Self { ptr, len: self.len }
    }

    /// Reallocates to `new_len` slots, keeping the prefix and filling the new
    /// tail with `fill`.
    ///
    /// Any slice previously obtained from this buffer is invalidated.
    pub(crate) fn grow<A: SlotAllocator<P>>(&mut self, alloc: &A, new_len: usize, fill: P) {
        debug_assert!(!self.is_sentinel());
        debug_assert!(new_len >= self.len);

        let ptr = alloc.allocate(new_len);
        // SAFETY: The old buffer holds `len` initialized slots and the new one
        // is valid for `new_len >= len` writes. They cannot overlap. The old
        // buffer came from `alloc` with `self.len` slots.
        unsafe {
            core::ptr::copy_nonoverlapping(self.ptr.as_ptr(), ptr.as_ptr(), self.len);
            for i in self.len..new_len {
                ptr.add(i).write(fill);
            }
            alloc.deallocate(self.ptr, self.len);
        }

        self.ptr = ptr;
        self.len = new_len;
    }

    /// Returns owned memory to `alloc` and turns this into a sentinel.
    pub(crate) fn release<A: SlotAllocator<P>>(&mut self, alloc: &A) {
        if self.is_sentinel() {
            return;
        }

        // SAFETY: Non-sentinel buffers always come from `alloc` with
        // `self.len` slots, and we drop our pointer right after.
        unsafe {
            alloc.deallocate(self.ptr, self.len);
        }
        *self = Self::sentinel();
    }
}
