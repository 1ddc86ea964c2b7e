//! Zoom state shared by keyboard shortcuts and ctrl+wheel.

/// Current zoom factor with clamped relative and absolute adjustment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomLevel {
    factor: f32,
}

impl Default for ZoomLevel {
    fn default() -> Self {
        Self { factor: 1.0 }
    }
}

impl ZoomLevel {
    pub const ZOOM_IN_RATE: f32 = 1.1;
    pub const ZOOM_OUT_RATE: f32 = 0.9;
    pub const MIN_FACTOR: f32 = 0.5;
    pub const MAX_FACTOR: f32 = 2.0;

    pub fn new(factor: f32) -> Self {
        Self {
            factor: Self::clamp_factor(factor),
        }
    }

    pub fn factor(&self) -> f32 {
        self.factor
    }

    /// Rounded percentage for status display.
    pub fn percent(&self) -> u16 {
        (self.factor * 100.0).round() as u16
    }

    /// Sets an absolute factor, returning the clamped result.
    pub fn set(&mut self, requested: f32) -> f32 {
        self.factor = Self::clamp_factor(requested);
        self.factor
    }

    pub fn step_in(&mut self) -> f32 {
        self.set(self.factor * Self::ZOOM_IN_RATE)
    }

    pub fn step_out(&mut self) -> f32 {
        self.set(self.factor * Self::ZOOM_OUT_RATE)
    }

    pub fn reset(&mut self) -> f32 {
        self.set(1.0)
    }

    /// Clamps to the supported range; NaN and infinities become 1.0.
    pub fn clamp_factor(factor: f32) -> f32 {
        if !factor.is_finite() {
            return 1.0;
        }
        factor.clamp(Self::MIN_FACTOR, Self::MAX_FACTOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_to_supported_range() {
        assert_eq!(ZoomLevel::clamp_factor(0.1), 0.5);
        assert_eq!(ZoomLevel::clamp_factor(5.0), 2.0);
        assert_eq!(ZoomLevel::clamp_factor(1.3), 1.3);
        assert_eq!(ZoomLevel::clamp_factor(0.5), 0.5);
        assert_eq!(ZoomLevel::clamp_factor(2.0), 2.0);
    }

    #[test]
    fn non_finite_factors_become_identity() {
        assert_eq!(ZoomLevel::clamp_factor(f32::NAN), 1.0);
        assert_eq!(ZoomLevel::clamp_factor(f32::INFINITY), 1.0);
        assert_eq!(ZoomLevel::clamp_factor(f32::NEG_INFINITY), 1.0);
    }

    #[test]
    fn steps_are_multiplicative() {
        let mut zoom = ZoomLevel::default();
        assert!((zoom.step_in() - 1.1).abs() < 1e-6);
        assert!((zoom.step_in() - 1.21).abs() < 1e-6);
        // Stepping back out does not retrace exactly: 1.21 * 0.9 = 1.089.
        assert!((zoom.step_out() - 1.089).abs() < 1e-6);
    }

    #[test]
    fn repeated_zoom_in_saturates_at_max() {
        let mut zoom = ZoomLevel::default();
        for _ in 0..20 {
            zoom.step_in();
        }
        assert_eq!(zoom.factor(), ZoomLevel::MAX_FACTOR);
        // Further steps stay pinned.
        assert_eq!(zoom.step_in(), ZoomLevel::MAX_FACTOR);
    }

    #[test]
    fn repeated_zoom_out_saturates_at_min() {
        let mut zoom = ZoomLevel::default();
        for _ in 0..20 {
            zoom.step_out();
        }
        assert_eq!(zoom.factor(), ZoomLevel::MIN_FACTOR);
        assert_eq!(zoom.step_out(), ZoomLevel::MIN_FACTOR);
    }

    #[test]
    fn reset_returns_to_identity() {
        let mut zoom = ZoomLevel::new(1.7);
        assert_eq!(zoom.reset(), 1.0);
        assert_eq!(zoom.percent(), 100);
    }

    #[test]
    fn percent_rounds_to_nearest() {
        assert_eq!(ZoomLevel::new(1.1).percent(), 110);
        assert_eq!(ZoomLevel::new(0.5).percent(), 50);
        let mut zoom = ZoomLevel::default();
        zoom.step_in();
        zoom.step_in();
        assert_eq!(zoom.percent(), 121);
    }
}
