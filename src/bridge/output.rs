//! UTF-16 output buffer for formatted text

/// Default output capacity used by the correctness harness
pub const DEFAULT_CAPACITY: usize = 512;

/// Capacity-bounded, zero-initialized UTF-16 buffer
///
/// The native side fills it up to capacity and NUL-bounds the text;
/// reading back stops at the first NUL.
pub struct WideBuffer {
    units: Vec<u16>,
}

impl WideBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            units: vec![0; capacity],
        }
    }

    /// Capacity in UTF-16 units
    #[inline]
    pub fn capacity(&self) -> usize {
        self.units.len()
    }

    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut u16 {
        self.units.as_mut_ptr()
    }

    #[inline]
    pub fn units(&self) -> &[u16] {
        &self.units
    }

    #[inline]
    pub(crate) fn units_mut(&mut self) -> &mut [u16] {
        &mut self.units
    }

    /// Re-zero the buffer
    pub fn clear(&mut self) {
        self.units.fill(0);
    }

    /// Read the text back, up to the first NUL
    pub fn text(&self) -> String {
        let end = self
            .units
            .iter()
            .position(|&u| u == 0)
            .unwrap_or(self.units.len());
        String::from_utf16_lossy(&self.units[..end])
    }
}

impl Default for WideBuffer {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}
