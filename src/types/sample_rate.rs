//! Sampling rate control for recording.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Rate at which the recorder samples the raster surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SampleRate {
    /// Once per display refresh. A headless library has no vsync signal,
    /// so this maps to a fixed 30 Hz target.
    Display,

    /// Fixed target rate in Hz. Values of zero are clamped to 1 Hz.
    Fixed(u32),
}

impl SampleRate {
    const DISPLAY_HZ: u32 = 30;

    /// Effective rate in Hz.
    pub fn hz(self) -> u32 {
        match self {
            SampleRate::Display => Self::DISPLAY_HZ,
            SampleRate::Fixed(hz) => hz.max(1),
        }
    }

    /// Interval between samples.
    pub fn interval(self) -> Duration {
        Duration::from_secs_f64(1.0 / self.hz() as f64)
    }
}

impl Default for SampleRate {
    fn default() -> Self {
        SampleRate::Display
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_rate_is_thirty_hz() {
        assert_eq!(SampleRate::Display.hz(), 30);
    }

    #[test]
    fn zero_fixed_rate_is_clamped() {
        assert_eq!(SampleRate::Fixed(0).hz(), 1);
        assert_eq!(SampleRate::Fixed(0).interval(), Duration::from_secs(1));
    }

    #[test]
    fn interval_matches_rate() {
        let interval = SampleRate::Fixed(10).interval();
        assert_eq!(interval, Duration::from_millis(100));
    }
}
