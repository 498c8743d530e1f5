use serde::{Deserialize, Serialize};
/// Lower bound used when a log axis would otherwise start at or below zero.
pub const LOG_FLOOR: f64 = 1.0e-10;
/// Vertical axis settings shared by every channel.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RangeState {
    pub auto_min: bool,
    pub manual_min: f64,
    pub auto_max: bool,
    pub manual_max: f64,
    pub log_scale: bool,
    pub normalize: bool,
}
impl Default for RangeState {
    fn default() -> Self {
        Self {
            auto_min: true,
            manual_min: 0.0,
            auto_max: true,
            manual_max: 0.0,
            log_scale: false,
            normalize: false,
        }
    }
}
impl RangeState {
    /// Pin the lower bound to `value`.
    pub fn set_min(&mut self, value: f64) {
        self.auto_min = false;
        self.manual_min = value;
    }
    /// Pin the upper bound to `value`.
    pub fn set_max(&mut self, value: f64) {
        self.auto_max = false;
        self.manual_max = value;
    }
    pub fn set_auto_min(&mut self, auto: bool) {
        self.auto_min = auto;
    }
    pub fn set_auto_max(&mut self, auto: bool) {
        self.auto_max = auto;
    }
    /// Axis bounds for the given data extrema (`None` when no channel has data).
    ///
    /// Pure: the same inputs always give the same `(lower, upper)`.
    pub fn compute(&self, data_min: Option<f64>, data_max: Option<f64>) -> (f64, f64) {
        let mut lower = data_min.unwrap_or(f64::NAN);
        let mut upper = data_max.unwrap_or(f64::NAN);
        if self.log_scale {
            if upper <= 0.0 || self.normalize {
                lower = if lower <= 0.0 || upper <= 0.0 {
                    LOG_FLOOR
                } else {
                    lower / upper
                };
                upper = 1.0;
            }
        } else if self.normalize {
            lower = 0.0;
            upper = 1.0;
        }
        if lower == upper {
            lower = if lower == 0.0 { -0.1 } else { lower * 0.9 };
            upper = if upper == 0.0 { 0.1 } else { upper * 1.1 };
        }
        if !self.auto_min {
            lower = self.manual_min;
        }
        if !self.auto_max {
            upper = self.manual_max;
        }
        (lower, upper)
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    fn log_state(normalize: bool) -> RangeState {
        RangeState {
            log_scale: true,
            normalize,
            ..RangeState::default()
        }
    }
    #[test]
    fn auto_linear_range_follows_data() {
        let state = RangeState::default();
        assert_eq!(state.compute(Some(-3.0), Some(7.5)), (-3.0, 7.5));
    }
    #[test]
    fn compute_is_idempotent() {
        let state = RangeState {
            normalize: true,
            log_scale: true,
            ..RangeState::default()
        };
        let first = state.compute(Some(2.0), Some(8.0));
        let second = state.compute(Some(2.0), Some(8.0));
        assert_eq!(first, second);
        assert_eq!(first, (0.25, 1.0));
    }
    #[test]
    fn manual_bounds_override_everything() {
        let mut state = RangeState::default();
        state.set_min(5.0);
        for data_min in [Some(-100.0), Some(0.0), Some(42.0), None] {
            assert_eq!(state.compute(data_min, Some(50.0)).0, 5.0);
        }
        state.set_max(9.0);
        assert_eq!(state.compute(Some(1.0), Some(1.0)), (5.0, 9.0));
        state.set_auto_min(true);
        assert_eq!(state.compute(Some(1.0), Some(3.0)), (1.0, 9.0));
    }
    #[test]
    fn normalized_linear_range_is_unit() {
        let state = RangeState {
            normalize: true,
            ..RangeState::default()
        };
        assert_eq!(state.compute(Some(-50.0), Some(900.0)), (0.0, 1.0));
        assert_eq!(state.compute(None, None), (0.0, 1.0));
    }
    #[test]
    fn flat_range_is_inflated() {
        let state = RangeState::default();
        assert_eq!(state.compute(Some(0.0), Some(0.0)), (-0.1, 0.1));
        let (lower, upper) = state.compute(Some(10.0), Some(10.0));
        assert!((lower - 9.0).abs() < 1e-12);
        assert!((upper - 11.0).abs() < 1e-12);
    }
    #[test]
    fn log_range_with_non_positive_max_is_clamped() {
        assert_eq!(log_state(false).compute(Some(-5.0), Some(-1.0)), (LOG_FLOOR, 1.0));
        assert_eq!(log_state(false).compute(Some(-5.0), Some(0.0)), (LOG_FLOOR, 1.0));
    }
    #[test]
    fn log_range_with_positive_data_is_left_alone() {
        assert_eq!(log_state(false).compute(Some(0.5), Some(200.0)), (0.5, 200.0));
    }
    #[test]
    fn normalized_log_range_is_relative_to_max() {
        assert_eq!(log_state(true).compute(Some(1.0), Some(4.0)), (0.25, 1.0));
        assert_eq!(log_state(true).compute(Some(-1.0), Some(4.0)), (LOG_FLOOR, 1.0));
    }
    #[test]
    fn no_data_yields_nan_bounds() {
        let (lower, upper) = RangeState::default().compute(None, None);
        assert!(lower.is_nan());
        assert!(upper.is_nan());
    }
}
