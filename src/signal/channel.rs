use ndarray::{Array1, ArrayView1};
/// Maps a raw sample onto the relative scale used for overlay display.
///
/// Linear mode rescales the channel's running range onto `0..=1`. Log mode
/// divides by the larger absolute bound instead, which keeps the sign and is
/// therefore not confined to `0..=1`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Normalizer {
    pub min: f64,
    pub max: f64,
    pub logarithmic: bool,
}
impl Normalizer {
    pub fn apply(&self, value: f64) -> f64 {
        if value.is_nan() {
            return f64::NAN;
        }
        if self.logarithmic {
            let scale = self.min.abs().max(self.max.abs());
            if scale == 0.0 {
                value
            } else {
                value / scale
            }
        } else if self.max == self.min {
            // Flat series: park it at a fixed height.
            if self.max == 0.0 {
                0.0
            } else {
                1.0
            }
        } else {
            (value - self.min) / (self.max - self.min)
        }
    }
}
/// Rolling history of one monitored value, newest sample first.
///
/// `NaN` marks "no value" (not yet filled, or the source was disconnected on
/// that tick) and is ignored by the running extrema.
#[derive(Clone, Debug)]
pub struct Channel {
    name: String,
    raw: Array1<f64>,
    normalized: Array1<f64>,
    min: f64,
    max: f64,
    normalize: bool,
    logarithmic: bool,
}
impl Channel {
    pub fn new(name: impl Into<String>, len: usize) -> Self {
        Self {
            name: name.into(),
            raw: Array1::from_elem(len, f64::NAN),
            normalized: Array1::from_elem(len, f64::NAN),
            min: f64::NAN,
            max: f64::NAN,
            normalize: false,
            logarithmic: false,
        }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn len(&self) -> usize {
        self.raw.len()
    }
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }
    pub fn raw(&self) -> ArrayView1<'_, f64> {
        self.raw.view()
    }
    pub fn normalized(&self) -> ArrayView1<'_, f64> {
        self.normalized.view()
    }
    /// Buffer the renderer should draw: normalized when enabled, raw otherwise.
    pub fn display(&self) -> ArrayView1<'_, f64> {
        if self.normalize {
            self.normalized.view()
        } else {
            self.raw.view()
        }
    }
    pub fn min(&self) -> Option<f64> {
        defined(self.min)
    }
    pub fn max(&self) -> Option<f64> {
        defined(self.max)
    }
    pub fn is_normalized(&self) -> bool {
        self.normalize
    }
    pub fn is_logarithmic(&self) -> bool {
        self.logarithmic
    }
    /// Number of leading samples that hold a value.
    pub fn defined_len(&self) -> usize {
        self.raw
            .iter()
            .position(|v| v.is_nan())
            .unwrap_or(self.raw.len())
    }
    pub fn normalizer(&self) -> Normalizer {
        Normalizer {
            min: self.min,
            max: self.max,
            logarithmic: self.logarithmic,
        }
    }
    /// Push one sample (or `NaN` for "no data") and evict the oldest one.
    pub fn push(&mut self, value: f64) -> f64 {
        debug_assert!(!self.raw.is_empty(), "push into a zero-length window");
        let evicted = shift_in(&mut self.raw, value);
        let (old_min, old_max) = (self.min, self.max);
        // A dropped extremum can only be replaced by rescanning the window.
        if !evicted.is_nan() && evicted <= self.min {
            self.min = self.raw.fold(f64::NAN, |acc, &v| acc.min(v));
        }
        if !evicted.is_nan() && evicted >= self.max {
            self.max = self.raw.fold(f64::NAN, |acc, &v| acc.max(v));
        }
        if !value.is_nan() && (self.min.is_nan() || value < self.min) {
            self.min = value;
        }
        if !value.is_nan() && (self.max.is_nan() || value > self.max) {
            self.max = value;
        }
        if self.normalize {
            if same(old_min, self.min) && same(old_max, self.max) {
                let head = self.normalizer().apply(value);
                shift_in(&mut self.normalized, head);
            } else {
                self.recompute_normalized();
            }
        }
        value
    }
    pub fn reset_data(&mut self, len: usize) {
        self.raw = Array1::from_elem(len, f64::NAN);
        self.normalized = Array1::from_elem(len, f64::NAN);
        self.min = f64::NAN;
        self.max = f64::NAN;
    }
    pub fn set_normalized(&mut self, normalize: bool) {
        self.normalize = normalize;
        self.recompute_normalized();
    }
    pub fn set_logarithmic(&mut self, logarithmic: bool) {
        self.logarithmic = logarithmic;
        self.recompute_normalized();
    }
    fn recompute_normalized(&mut self) {
        let normalizer = self.normalizer();
        self.normalized = self.raw.mapv(|v| normalizer.apply(v));
    }
}
fn shift_in(buffer: &mut Array1<f64>, value: f64) -> f64 {
    let last = buffer.len() - 1;
    let evicted = buffer[last];
    for i in (1..=last).rev() {
        buffer[i] = buffer[i - 1];
    }
    buffer[0] = value;
    evicted
}
fn same(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}
fn defined(value: f64) -> Option<f64> {
    if value.is_nan() {
        None
    } else {
        Some(value)
    }
}
