use chrono::{DateTime, Local};
use crate::config::ScanConfig;
use crate::signal::error::ScanError;
use crate::signal::range::RangeState;
use crate::signal::set::{ChannelSet, Series};
use crate::signal::source::AcquisitionSource;
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    Running,
}
/// Values read on one tick, in channel declaration order.
#[derive(Clone, Debug)]
pub struct TickRecord {
    /// Zero-based point number within the scan.
    pub index: usize,
    pub timestamp: DateTime<Local>,
    pub values: Vec<(String, f64)>,
}
/// Result of one tick as seen by the host.
#[derive(Clone, Debug)]
pub struct TickReport {
    pub record: TickRecord,
    /// Vertical axis bounds after this tick.
    pub range: (f64, f64),
    /// The window filled up and the scan stopped itself.
    pub stopped: bool,
}
/// Scan description handed to sinks when a scan starts.
#[derive(Clone, Debug)]
pub struct ScanHeader {
    pub started_at: DateTime<Local>,
    /// Points per scan, `None` for a continuous scan.
    pub points: Option<usize>,
    pub interval: f64,
    pub channels: Vec<String>,
}
/// Receives every tick of a scan, e.g. to persist it.
pub trait TickSink {
    fn on_start(&mut self, header: &ScanHeader);
    fn on_tick(&mut self, record: &TickRecord);
    fn on_stop(&mut self);
}
/// Steps a scan: one read per channel per tick, then re-ranges the axis.
///
/// Ticking needs `&mut self`, so at most one tick (or reconfiguration) runs
/// at a time; hosts that share a driver between threads wrap it in a single
/// lock or hand it to one owning thread (see [`crate::engine`]).
pub struct ScanDriver<S: AcquisitionSource> {
    source: S,
    config: ScanConfig,
    channels: ChannelSet,
    state: ScanState,
    point: usize,
    range: (f64, f64),
    sinks: Vec<Box<dyn TickSink + Send>>,
}
impl<S: AcquisitionSource> ScanDriver<S> {
    pub fn new(source: S, config: ScanConfig) -> Result<Self, ScanError> {
        let mut channels = ChannelSet::new(config.window_len());
        channels.set_logarithmic(config.range.log_scale);
        channels.set_normalized(config.range.normalize);
        for name in &config.channels {
            channels.add(name)?;
        }
        let mut driver = Self {
            source,
            config,
            channels,
            state: ScanState::Idle,
            point: 0,
            range: (f64::NAN, f64::NAN),
            sinks: Vec::new(),
        };
        driver.refresh_range();
        Ok(driver)
    }
    pub fn add_sink(&mut self, sink: Box<dyn TickSink + Send>) {
        self.sinks.push(sink);
    }
    pub fn state(&self) -> ScanState {
        self.state
    }
    pub fn is_running(&self) -> bool {
        self.state == ScanState::Running
    }
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }
    pub fn channels(&self) -> &ChannelSet {
        &self.channels
    }
    pub fn series(&self, name: &str) -> Option<Series<'_>> {
        self.channels.series(name)
    }
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
    /// Vertical axis bounds as of the last tick or reconfiguration.
    pub fn range(&self) -> (f64, f64) {
        self.range
    }
    /// Index of the next point to be read.
    pub fn point(&self) -> usize {
        self.point
    }
    pub fn start(&mut self) -> Option<TickReport> {
        self.start_at(Local::now())
    }
    /// Reset the window and take the first point right away.
    pub fn start_at(&mut self, now: DateTime<Local>) -> Option<TickReport> {
        if self.is_running() {
            return None;
        }
        self.channels.rebuild(self.config.window_len());
        self.point = 0;
        self.state = ScanState::Running;
        let header = self.header(now);
        for sink in &mut self.sinks {
            sink.on_start(&header);
        }
        log::info!(
            "scan started: {} channels, {} points every {}s{}",
            header.channels.len(),
            self.channels.axis().len(),
            header.interval,
            if self.config.continuous { ", continuous" } else { "" }
        );
        self.tick_at(now)
    }
    pub fn tick(&mut self) -> Option<TickReport> {
        self.tick_at(Local::now())
    }
    /// One acquisition step. Returns `None` when the scan is idle.
    pub fn tick_at(&mut self, now: DateTime<Local>) -> Option<TickReport> {
        if !self.is_running() {
            return None;
        }
        let points = self.channels.axis().len();
        let mut values = Vec::with_capacity(self.channels.len());
        for channel in self.channels.iter_mut() {
            let reading = self.source.read(channel.name());
            let value = channel.push(reading.sample());
            values.push((channel.name().to_owned(), value));
        }
        self.channels.advance_axis();
        self.refresh_range();
        let record = TickRecord {
            index: self.point,
            timestamp: now,
            values,
        };
        for sink in &mut self.sinks {
            sink.on_tick(&record);
        }
        let stopped = !self.config.continuous && self.point + 1 >= points;
        if stopped {
            log::info!("window filled after {} points", self.point + 1);
            self.stop();
        }
        self.point += 1;
        Some(TickReport {
            record,
            range: self.range,
            stopped,
        })
    }
    pub fn stop(&mut self) {
        if !self.is_running() {
            return;
        }
        self.state = ScanState::Idle;
        for sink in &mut self.sinks {
            sink.on_stop();
        }
        log::info!("scan stopped at point {}", self.point);
    }
    pub fn set_interval(&mut self, interval: f64) -> Result<(), ScanError> {
        self.config.set_interval(interval)?;
        self.relayout();
        Ok(())
    }
    pub fn set_period(&mut self, period: f64) -> Result<(), ScanError> {
        self.config.set_period(period)?;
        self.relayout();
        Ok(())
    }
    pub fn set_continuous(&mut self, continuous: bool) {
        self.config.continuous = continuous;
    }
    pub fn add_channel(&mut self, name: &str) -> Result<(), ScanError> {
        self.channels.add(name)?;
        self.config.channels.push(name.to_owned());
        self.refresh_range();
        Ok(())
    }
    pub fn remove_channel(&mut self, name: &str) -> Result<(), ScanError> {
        self.channels.remove(name)?;
        self.config.channels.retain(|c| c != name);
        self.refresh_range();
        Ok(())
    }
    pub fn set_normalized(&mut self, normalize: bool) {
        self.config.range.normalize = normalize;
        self.channels.set_normalized(normalize);
        self.refresh_range();
    }
    pub fn set_logarithmic(&mut self, logarithmic: bool) {
        self.config.range.log_scale = logarithmic;
        self.channels.set_logarithmic(logarithmic);
        self.refresh_range();
    }
    pub fn set_range(&mut self, range: RangeState) {
        if range.log_scale != self.config.range.log_scale {
            self.channels.set_logarithmic(range.log_scale);
        }
        if range.normalize != self.config.range.normalize {
            self.channels.set_normalized(range.normalize);
        }
        self.config.range = range;
        self.refresh_range();
    }
    // Timing changed: the old window no longer lines up with the new axis.
    fn relayout(&mut self) {
        self.channels.rebuild(self.config.window_len());
        if self.is_running() {
            log::warn!("timing changed mid-scan; window restarted");
            self.point = 0;
            // Sinks start over too, so a scan log never mixes two timings.
            let header = self.header(Local::now());
            for sink in &mut self.sinks {
                sink.on_stop();
                sink.on_start(&header);
            }
        }
        self.refresh_range();
    }

    fn header(&self, started_at: DateTime<Local>) -> ScanHeader {
        ScanHeader {
            started_at,
            points: (!self.config.continuous).then(|| self.channels.axis().len()),
            interval: self.config.interval,
            channels: self.channels.names(),
        }
    }
    fn refresh_range(&mut self) {
        self.range = self
            .config
            .range
            .compute(self.channels.aggregate_min(), self.channels.aggregate_max());
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use crate::recorder::DataRecorder;
    use crate::signal::source::{ManualSource, Reading};
    fn config(interval: f64, period: f64, channels: &[&str]) -> ScanConfig {
        let mut config = ScanConfig::default();
        config.set_period(period).unwrap();
        config.set_interval(interval).unwrap();
        config.channels = channels.iter().map(|c| c.to_string()).collect();
        config
    }
    struct EventLog(Arc<Mutex<Vec<String>>>);
    impl TickSink for EventLog {
        fn on_start(&mut self, header: &ScanHeader) {
            self.0
                .lock()
                .unwrap()
                .push(format!("start {:?} {:?}", header.points, header.channels));
        }
        fn on_tick(&mut self, record: &TickRecord) {
            self.0.lock().unwrap().push(format!("tick {}", record.index));
        }
        fn on_stop(&mut self) {
            self.0.lock().unwrap().push("stop".into());
        }
    }
    #[test]
    fn fixed_scan_stops_when_window_fills() {
        let source = ManualSource::new().with_values("A", [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let mut driver = ScanDriver::new(source, config(1.0, 5.0, &["A"])).unwrap();
        assert_eq!(driver.channels().axis().len(), 5);
        let first = driver.start().unwrap();
        assert_eq!(first.record.index, 0);
        assert!(!first.stopped);
        for _ in 0..3 {
            assert!(!driver.tick().unwrap().stopped);
        }
        let last = driver.tick().unwrap();
        assert!(last.stopped);
        assert_eq!(driver.state(), ScanState::Idle);
        assert!(driver.tick().is_none());
        let channel = driver.channels().get("A").unwrap();
        assert_eq!(channel.raw().to_vec(), vec![5.0, 4.0, 3.0, 2.0, 1.0]);
        assert_eq!(channel.min(), Some(1.0));
        assert_eq!(channel.max(), Some(5.0));
        assert_eq!(driver.range(), (1.0, 5.0));
    }
    #[test]
    fn continuous_scan_keeps_evicting() {
        let source = ManualSource::new().with_values("A", (1..=12).map(f64::from));
        let mut cfg = config(1.0, 3.0, &["A"]);
        cfg.continuous = true;
        let mut driver = ScanDriver::new(source, cfg).unwrap();
        driver.start();
        for _ in 0..9 {
            assert!(!driver.tick().unwrap().stopped);
        }
        assert!(driver.is_running());
        let channel = driver.channels().get("A").unwrap();
        assert_eq!(channel.raw().to_vec(), vec![10.0, 9.0, 8.0]);
        assert_eq!(driver.range(), (8.0, 10.0));
        assert_eq!(driver.channels().axis().x_bounds(), (10, 12));
    }
    #[test]
    fn disconnected_channel_records_nan() {
        let mut source = ManualSource::new().with_values("A", [1.0, 2.0]);
        source.queue("B", [Reading::Disconnected, Reading::Value(-4.0)]);
        let mut driver = ScanDriver::new(source, config(1.0, 4.0, &["A", "B"])).unwrap();
        let first = driver.start().unwrap();
        assert_eq!(first.record.values[0], ("A".to_owned(), 1.0));
        assert_eq!(first.record.values[1].0, "B");
        assert!(first.record.values[1].1.is_nan());
        assert_eq!(first.range, (0.9, 1.1));
        let second = driver.tick().unwrap();
        assert_eq!(second.range, (-4.0, 2.0));
        assert_eq!(driver.series("B").unwrap().len, 1);
    }
    #[test]
    fn restart_clears_previous_window() {
        let source = ManualSource::new().with_values("A", [1.0, 2.0, 3.0]);
        let mut driver = ScanDriver::new(source, config(1.0, 2.0, &["A"])).unwrap();
        driver.start();
        assert!(driver.tick().unwrap().stopped);
        let report = driver.start().unwrap();
        assert_eq!(report.record.index, 0);
        let channel = driver.channels().get("A").unwrap();
        assert_eq!(channel.raw()[0], 3.0);
        assert!(channel.raw()[1].is_nan());
        assert!(driver.start().is_none());
    }
    #[test]
    fn sinks_see_the_whole_scan() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let source = ManualSource::new().with_values("A", [1.0, 2.0]);
        let mut driver = ScanDriver::new(source, config(1.0, 2.0, &["A"])).unwrap();
        driver.add_sink(Box::new(EventLog(events.clone())));
        driver.start();
        driver.tick();
        driver.stop();
        assert_eq!(
            *events.lock().unwrap(),
            vec![
                "start Some(2) [\"A\"]".to_owned(),
                "tick 0".to_owned(),
                "tick 1".to_owned(),
                "stop".to_owned(),
            ]
        );
    }
    #[test]
    fn timing_change_rebuilds_window() {
        let source = ManualSource::new().with_values("A", [1.0, 2.0, 3.0]);
        let mut driver = ScanDriver::new(source, config(1.0, 10.0, &["A"])).unwrap();
        driver.start();
        driver.tick();
        assert_eq!(driver.point(), 2);
        driver.set_period(4.0).unwrap();
        assert_eq!(driver.channels().axis().len(), 4);
        assert_eq!(driver.point(), 0);
        assert_eq!(driver.channels().get("A").unwrap().min(), None);
        driver.set_interval(3.0).unwrap();
        assert_eq!(driver.config().period, 6.0);
        assert_eq!(driver.channels().axis().len(), 2);
    }
    #[test]
    fn timing_change_restarts_the_scan_log() {
        let dir = tempfile::tempdir().unwrap();
        let source = ManualSource::new().with_values("A", (1..=12).map(f64::from));
        let mut driver = ScanDriver::new(source, config(1.0, 4.0, &["A"])).unwrap();
        driver.add_sink(Box::new(DataRecorder::new(dir.path(), Some("scan.dat".into()))));
        driver.start();
        driver.tick();
        driver.set_interval(0.5).unwrap();
        assert!(driver.is_running());
        while driver.is_running() {
            driver.tick();
        }
        let text = std::fs::read_to_string(dir.path().join("scan.dat")).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[5], "# Number of scan points: 8");
        assert_eq!(lines[6], "# Interval (sec): 0.5");
        let points: Vec<&str> = lines
            .iter()
            .filter(|l| !l.starts_with('#'))
            .filter_map(|l| l.split(' ').next())
            .collect();
        assert_eq!(points, vec!["1", "2", "3", "4", "5", "6", "7", "8"]);
        let first_row = lines.iter().find(|l| !l.starts_with('#')).unwrap();
        assert!(first_row.ends_with(" 3 "));
    }
    #[test]
    fn display_flags_reshape_range() {
        let source = ManualSource::new().with_values("A", [2.0, 8.0]);
        let mut driver = ScanDriver::new(source, config(1.0, 4.0, &["A"])).unwrap();
        driver.start();
        driver.tick();
        assert_eq!(driver.range(), (2.0, 8.0));
        driver.set_normalized(true);
        assert_eq!(driver.range(), (0.0, 1.0));
        assert_eq!(driver.series("A").unwrap().ys[0], 1.0);
        driver.set_logarithmic(true);
        assert_eq!(driver.range(), (0.25, 1.0));
        let mut manual = driver.config().range;
        manual.set_max(100.0);
        driver.set_range(manual);
        assert_eq!(driver.range(), (0.25, 100.0));
    }
    #[test]
    fn channels_can_change_between_scans() {
        let source = ManualSource::new()
            .with_values("A", [1.0])
            .with_values("B", [7.0]);
        let mut driver = ScanDriver::new(source, config(1.0, 2.0, &["A"])).unwrap();
        driver.add_channel("B").unwrap();
        assert!(matches!(
            driver.add_channel("A"),
            Err(ScanError::DuplicateChannel(_))
        ));
        driver.remove_channel("A").unwrap();
        assert_eq!(driver.config().channels, vec!["B".to_owned()]);
        let report = driver.start().unwrap();
        assert_eq!(report.record.values, vec![("B".to_owned(), 7.0)]);
    }
}
