use super::PositionFilter;

/// Exponential smoothing filter
///
/// Each output is `previous * alpha + observed * (1 - alpha)`, so a larger
/// alpha means heavier smoothing and `alpha == 0` disables it.
#[derive(Debug, Clone)]
pub struct ExponentialFilter {
    alpha: f64,
    last: Option<(f64, f64)>,
}

impl ExponentialFilter {
    /// Create a filter with the weight given to the previous position
    ///
    /// # Panics
    ///
    /// Panics if `alpha` is outside [0, 1)
    #[must_use]
    pub fn new(alpha: f64) -> Self {
        assert!((0.0..1.0).contains(&alpha), "Alpha must be in [0, 1)");
        Self { alpha, last: None }
    }

    /// Weight of the previous position
    #[must_use]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Change the smoothing weight, keeping the current state
    ///
    /// # Panics
    ///
    /// Panics if `alpha` is outside [0, 1)
    pub fn set_alpha(&mut self, alpha: f64) {
        assert!((0.0..1.0).contains(&alpha), "Alpha must be in [0, 1)");
        self.alpha = alpha;
    }
}

impl PositionFilter for ExponentialFilter {
    fn apply(&mut self, x: f64, y: f64) -> (f64, f64) {
        let filtered = match self.last {
            Some((last_x, last_y)) => (
                last_x * self.alpha + x * (1.0 - self.alpha),
                last_y * self.alpha + y * (1.0 - self.alpha),
            ),
            None => (x, y),
        };
        self.last = Some(filtered);
        filtered
    }

    fn reset(&mut self) {
        self.last = None;
    }

    fn name(&self) -> &str {
        "ExponentialFilter"
    }
}
