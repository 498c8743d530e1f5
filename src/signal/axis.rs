use ndarray::{Array1, ArrayView1};
/// Smallest window the scan will ever build.
pub const MIN_WINDOW_LEN: usize = 2;
/// Tick positions shared by every channel of a scan.
///
/// Index 0 is the newest sample. Right after a rebuild the positions read
/// `len-1, len-2, .., 0`; every tick adds one to all of them.
#[derive(Clone, Debug)]
pub struct TimeAxis {
    positions: Array1<i64>,
}
impl TimeAxis {
    pub fn with_len(len: usize) -> Self {
        let len = len.max(MIN_WINDOW_LEN);
        let positions = Array1::from_iter((0..len as i64).rev());
        Self { positions }
    }
    pub fn len(&self) -> usize {
        self.positions.len()
    }
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
    pub fn positions(&self) -> ArrayView1<'_, i64> {
        self.positions.view()
    }
    /// Shift the whole window one tick to the right.
    pub fn advance(&mut self) {
        self.positions += 1;
    }
    /// Horizontal bounds `(oldest, newest)` of the current window.
    pub fn x_bounds(&self) -> (i64, i64) {
        let last = self.positions.len() - 1;
        (self.positions[last], self.positions[0])
    }
}
