use ndarray::ArrayView1;
use crate::signal::axis::TimeAxis;
use crate::signal::channel::Channel;
use crate::signal::error::ScanError;
/// What the renderer draws for one channel.
#[derive(Clone, Debug)]
pub struct Series<'a> {
    pub xs: ArrayView1<'a, i64>,
    pub ys: ArrayView1<'a, f64>,
    /// Leading entries that hold data; the rest is the unfilled tail.
    pub len: usize,
}
impl Series<'_> {
    pub fn points(&self) -> impl Iterator<Item = (i64, f64)> + '_ {
        self.xs.iter().copied().zip(self.ys.iter().copied()).take(self.len)
    }
}
/// Ordered collection of channels sharing one time axis.
///
/// The set is the only owner of the axis, so rebuilding it always resets
/// every channel in the same call.
#[derive(Clone, Debug)]
pub struct ChannelSet {
    axis: TimeAxis,
    channels: Vec<Channel>,
    normalize: bool,
    logarithmic: bool,
}
impl ChannelSet {
    pub fn new(window_len: usize) -> Self {
        Self {
            axis: TimeAxis::with_len(window_len),
            channels: Vec::new(),
            normalize: false,
            logarithmic: false,
        }
    }
    pub fn axis(&self) -> &TimeAxis {
        &self.axis
    }
    pub fn len(&self) -> usize {
        self.channels.len()
    }
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
    pub fn iter(&self) -> impl Iterator<Item = &Channel> {
        self.channels.iter()
    }
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Channel> {
        self.channels.iter_mut()
    }
    pub fn names(&self) -> Vec<String> {
        self.channels.iter().map(|c| c.name().to_owned()).collect()
    }
    pub fn get(&self, name: &str) -> Option<&Channel> {
        self.channels.iter().find(|c| c.name() == name)
    }
    pub fn add(&mut self, name: &str) -> Result<&Channel, ScanError> {
        if name.trim().is_empty() {
            return Err(ScanError::EmptyChannelName);
        }
        if self.get(name).is_some() {
            return Err(ScanError::DuplicateChannel(name.to_owned()));
        }
        let mut channel = Channel::new(name, self.axis.len());
        if self.logarithmic {
            channel.set_logarithmic(true);
        }
        if self.normalize {
            channel.set_normalized(true);
        }
        self.channels.push(channel);
        log::info!("monitoring channel {name:?}");
        Ok(&self.channels[self.channels.len() - 1])
    }
    pub fn remove(&mut self, name: &str) -> Result<Channel, ScanError> {
        let idx = self
            .channels
            .iter()
            .position(|c| c.name() == name)
            .ok_or_else(|| ScanError::UnknownChannel(name.to_owned()))?;
        log::info!("stopped monitoring channel {name:?}");
        Ok(self.channels.remove(idx))
    }
    /// Rebuild the shared axis and clear every channel to the new length.
    pub fn rebuild(&mut self, window_len: usize) {
        self.axis = TimeAxis::with_len(window_len);
        let len = self.axis.len();
        for channel in &mut self.channels {
            channel.reset_data(len);
        }
        log::debug!("time axis rebuilt with {len} points");
    }
    pub fn advance_axis(&mut self) {
        self.axis.advance();
    }
    pub fn set_normalized(&mut self, normalize: bool) {
        self.normalize = normalize;
        for channel in &mut self.channels {
            channel.set_normalized(normalize);
        }
    }
    pub fn set_logarithmic(&mut self, logarithmic: bool) {
        self.logarithmic = logarithmic;
        for channel in &mut self.channels {
            channel.set_logarithmic(logarithmic);
        }
    }
    /// Smallest running minimum over all channels that hold data.
    pub fn aggregate_min(&self) -> Option<f64> {
        self.channels
            .iter()
            .filter_map(Channel::min)
            .reduce(f64::min)
    }
    /// Largest running maximum over all channels that hold data.
    pub fn aggregate_max(&self) -> Option<f64> {
        self.channels
            .iter()
            .filter_map(Channel::max)
            .reduce(f64::max)
    }
    pub fn series(&self, name: &str) -> Option<Series<'_>> {
        let channel = self.get(name)?;
        Some(Series {
            xs: self.axis.positions(),
            ys: channel.display(),
            len: channel.defined_len(),
        })
    }
}
