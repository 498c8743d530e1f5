// src/config.rs
use std::fs;
use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use crate::signal::axis::MIN_WINDOW_LEN;
use crate::signal::{RangeState, ScanError};

/// Everything a scan needs to know before it starts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Seconds between two reads of every channel.
    pub interval: f64,
    /// Seconds of history shown in the window.
    pub period: f64,
    /// Keep scrolling after the window has filled once.
    pub continuous: bool,
    pub range: RangeState,
    pub channels: Vec<String>,
    pub save_dir: Option<PathBuf>,
    pub save_name: Option<String>,
    pub auto_name: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            interval: 0.1,
            period: 1.0,
            continuous: false,
            range: RangeState::default(),
            channels: Vec::new(),
            save_dir: None,
            save_name: None,
            auto_name: false,
        }
    }
}

impl ScanConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScanError> {
        let text = fs::read_to_string(path)?;
        let mut config: ScanConfig = serde_json::from_str(&text)?;
        // Re-apply through the setters so a hand-edited file obeys the same rules.
        let (interval, period) = (config.interval, config.period);
        config.interval = Self::default().interval;
        config.period = Self::default().period;
        config.set_period(period)?;
        config.set_interval(interval)?;
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ScanError> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text)?;
        Ok(())
    }

    /// Set the read interval; the period grows if it no longer fits two reads.
    pub fn set_interval(&mut self, interval: f64) -> Result<(), ScanError> {
        if !interval.is_finite() || interval <= 0.0 {
            return Err(ScanError::InvalidInterval(interval));
        }
        self.interval = interval;
        if interval * 2.0 > self.period {
            self.period = interval * 2.0;
        }
        Ok(())
    }

    /// Set the window period; the interval shrinks if two reads no longer fit.
    pub fn set_period(&mut self, period: f64) -> Result<(), ScanError> {
        if !period.is_finite() || period <= 0.0 {
            return Err(ScanError::InvalidPeriod(period));
        }
        self.period = period;
        if self.interval * 2.0 > period {
            self.interval = period / 2.0;
        }
        Ok(())
    }

    /// Number of samples in the window, `floor(period / interval)`, at least 2.
    pub fn window_len(&self) -> usize {
        let ratio = self.period / self.interval;
        // Absorb division round-off only: 0.3 / 0.1 is three points, 5.9999999999 / 1 is five.
        let points = (ratio + ratio * 4.0 * f64::EPSILON).floor();
        (points as usize).max(MIN_WINDOW_LEN)
    }
}
