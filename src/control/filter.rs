//! Median filter for ultrasonic distance readings
//!
//! Fixed five-slot ring buffer. Every new sample overwrites the oldest
//! slot and the median of the whole window is returned, which rejects
//! single-sample echoes and dropouts.
//!
//! The window starts zero-filled, so the first four outputs lean toward
//! 0.0 until real readings displace the defaults. The error supervisor
//! sees those as out-of-range and simply starts its debounce timer; the
//! window is full long before the debounce expires.

/// Number of samples in the window. Odd, so the median is a real sample.
pub const WINDOW_SIZE: usize = 5;

/// Ring-buffer median filter. Stack-allocated, no heap.
#[derive(Debug, Clone)]
pub struct DistanceFilter {
    window: [f32; WINDOW_SIZE],
    next: usize,
}

impl Default for DistanceFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl DistanceFilter {
    pub fn new() -> Self {
        Self {
            window: [0.0; WINDOW_SIZE],
            next: 0,
        }
    }

    /// Push a raw reading and return the median of the updated window.
    pub fn sample(&mut self, raw: f32) -> f32 {
        self.window[self.next] = raw;
        self.next = (self.next + 1) % WINDOW_SIZE;
        self.median()
    }

    /// Median of the current window without pushing a new sample.
    pub fn median(&self) -> f32 {
        let mut sorted = self.window;
        sorted.sort_unstable_by(f32::total_cmp);
        sorted[WINDOW_SIZE / 2]
    }

    /// Live window contents in slot order (not chronological).
    pub fn window(&self) -> &[f32; WINDOW_SIZE] {
        &self.window
    }
}
