//! Pin tracking - scoped residency guarantees for payload memory
//!
//! A pin keeps a payload region at a stable address until it is released.
//! The builder that creates a pin owns its release: every pin is released
//! exactly once, after the native call returns, on every exit path. `Drop`
//! is the backstop for early error returns.

use core::ffi::c_void;

use smallvec::SmallVec;

/// Inline pin-table capacity; typical calls pin far fewer payloads
const INLINE_PINS: usize = 8;

/// Compact token locating one pin inside its `PinSet`
///
/// Tokens are 32-bit, nonzero, and dense in acquisition order, so the V2
/// layout can embed them in a record word with zero padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinHandle(u32);

impl PinHandle {
    /// Wire token for this handle
    #[inline]
    pub const fn token(self) -> u32 {
        self.0
    }

    /// Recover a handle from an embedded token; zero means "no pin"
    #[inline]
    pub const fn from_token(token: u32) -> Option<Self> {
        if token == 0 {
            None
        } else {
            Some(Self(token))
        }
    }

    #[inline]
    fn index(self) -> usize {
        (self.0 - 1) as usize
    }
}

/// One pinned region
enum Pinned<'a> {
    /// Owned NUL-terminated UTF-16 conversion of caller text
    Text(Box<[u16]>),
    /// Caller byte payload, held for the call's scope
    Bytes(&'a [u8]),
    /// The record buffer itself (heap path only); accounting entry
    Buffer(*const c_void),
}

impl Pinned<'_> {
    #[inline]
    fn addr(&self) -> *const c_void {
        match self {
            Self::Text(units) => units.as_ptr() as *const c_void,
            Self::Bytes(bytes) => bytes.as_ptr() as *const c_void,
            Self::Buffer(addr) => *addr,
        }
    }
}

/// Pins taken for one native call, released exhaustively afterward
pub struct PinSet<'a> {
    entries: SmallVec<[Option<Pinned<'a>>; INLINE_PINS]>,
    acquired: usize,
    released: usize,
}

impl<'a> PinSet<'a> {
    #[inline]
    pub fn new() -> Self {
        Self {
            entries: SmallVec::new(),
            acquired: 0,
            released: 0,
        }
    }

    /// Pin caller text as a NUL-terminated UTF-16 payload
    pub fn pin_text(&mut self, text: &str) -> (PinHandle, *const c_void) {
        self.push(Pinned::Text(to_wide(text)))
    }

    /// Pin a caller byte payload for the call's scope
    pub fn pin_bytes(&mut self, bytes: &'a [u8]) -> (PinHandle, *const c_void) {
        self.push(Pinned::Bytes(bytes))
    }

    /// Register the whole-buffer pin the heap path takes on its record array
    pub(crate) fn pin_buffer(&mut self, addr: *const c_void) -> PinHandle {
        self.push(Pinned::Buffer(addr)).0
    }

    fn push(&mut self, pinned: Pinned<'a>) -> (PinHandle, *const c_void) {
        let addr = pinned.addr();
        self.entries.push(Some(pinned));
        self.acquired += 1;
        super::note_pin_acquired();
        (PinHandle(self.entries.len() as u32), addr)
    }

    /// Release one pin by handle; true only on the first release
    pub fn release(&mut self, handle: PinHandle) -> bool {
        match self.entries.get_mut(handle.index()) {
            Some(slot) if slot.is_some() => {
                *slot = None;
                self.released += 1;
                super::note_pin_released(1);
                true
            }
            _ => false,
        }
    }

    /// Release every pin still held, in acquisition order
    pub fn release_all(&mut self) {
        let mut dropped = 0usize;
        for slot in self.entries.iter_mut() {
            if slot.take().is_some() {
                dropped += 1;
            }
        }
        self.released += dropped;
        super::note_pin_released(dropped);
    }

    /// Pins taken since construction
    #[inline]
    pub fn acquired(&self) -> usize {
        self.acquired
    }

    /// Pins released so far
    #[inline]
    pub fn released(&self) -> usize {
        self.released
    }

    /// Pins still holding memory resident
    #[inline]
    pub fn outstanding(&self) -> usize {
        self.acquired - self.released
    }
}

impl Default for PinSet<'_> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for PinSet<'_> {
    /// Backstop: a set abandoned on an error path still releases everything
    fn drop(&mut self) {
        if self.outstanding() > 0 {
            tracing::trace!(outstanding = self.outstanding(), "releasing pins on drop");
            self.release_all();
        }
    }
}

/// Convert text to the NUL-terminated UTF-16 form the native reader expects
pub fn to_wide(text: &str) -> Box<[u16]> {
    text.encode_utf16().chain(core::iter::once(0)).collect()
}
