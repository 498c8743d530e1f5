// src/recorder.rs
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use chrono::{DateTime, Local};
use crate::config::ScanConfig;
use crate::signal::{ScanError, ScanHeader, TickRecord, TickSink};

/// Writes every tick of a scan into a plain-text data file.
pub struct DataRecorder {
    dir: PathBuf,
    // None: pick a fresh time-stamped name on every start
    name: Option<String>,
    writer: Option<BufWriter<File>>,
    last_path: Option<PathBuf>,
}

impl DataRecorder {
    pub fn new(dir: impl Into<PathBuf>, name: Option<String>) -> Self {
        Self {
            dir: dir.into(),
            name,
            writer: None,
            last_path: None,
        }
    }

    /// Recorder described by the config, or `None` when logging is off.
    pub fn from_config(config: &ScanConfig) -> Option<Self> {
        let dir = config.save_dir.clone().unwrap_or_else(|| PathBuf::from("."));
        if config.auto_name {
            Some(Self::new(dir, None))
        } else {
            config
                .save_name
                .as_ref()
                .map(|name| Self::new(dir, Some(name.clone())))
        }
    }

    /// `time_scan_<date>_<time>.dat`, suffixed `_(n)` until it is unused.
    pub fn auto_name(dir: &Path, at: DateTime<Local>) -> PathBuf {
        let stem = format!("time_scan_{}", at.format("%Y-%m-%d_%H-%M-%S"));
        let mut candidate = dir.join(format!("{stem}.dat"));
        let mut count = 1;
        while candidate.exists() {
            candidate = dir.join(format!("{stem}_({count}).dat"));
            count += 1;
        }
        candidate
    }

    /// File the most recent scan was written to.
    pub fn last_path(&self) -> Option<&Path> {
        self.last_path.as_deref()
    }

    pub fn is_recording(&self) -> bool {
        self.writer.is_some()
    }

    pub fn start(&mut self, header: &ScanHeader) -> Result<(), ScanError> {
        self.writer = None;
        let path = match &self.name {
            Some(name) => self.dir.join(name),
            None => Self::auto_name(&self.dir, header.started_at),
        };
        let mut w = BufWriter::new(File::create(&path)?);
        writeln!(w, "# Time Scan")?;
        writeln!(w, "#")?;
        writeln!(w, "# Date: {}", header.started_at.format("%a %b %-d %Y"))?;
        writeln!(w, "# Time: {}", header.started_at.format("%H:%M:%S"))?;
        writeln!(w, "#")?;
        match header.points {
            Some(points) => writeln!(w, "# Number of scan points: {points}")?,
            None => writeln!(w, "# Number of scan points: continuous scan")?,
        }
        writeln!(w, "# Interval (sec): {}", header.interval)?;
        writeln!(w, "# Signals:")?;
        writeln!(w, "#")?;
        for channel in &header.channels {
            writeln!(w, "# PV: \"{channel}\"")?;
        }
        writeln!(w, "#")?;
        writeln!(w, "# Data columns:")?;
        write!(w, "# %Point %Time ")?;
        for channel in &header.channels {
            write!(w, "%{channel} ")?;
        }
        writeln!(w)?;
        log::info!("recording scan to {}", path.display());
        self.writer = Some(w);
        self.last_path = Some(path);
        Ok(())
    }

    pub fn write_record(&mut self, record: &TickRecord) -> Result<(), ScanError> {
        if let Some(w) = &mut self.writer {
            write!(
                w,
                "{} {} ",
                record.index + 1,
                record.timestamp.format("%H:%M:%S%.3f")
            )?;
            for (_, value) in &record.values {
                write!(w, "{value} ")?;
            }
            writeln!(w)?;
        }
        Ok(())
    }

    pub fn stop(&mut self) -> Result<(), ScanError> {
        if let Some(mut w) = self.writer.take() {
            w.flush()?;
            log::info!("scan data saved");
        }
        Ok(())
    }

    fn give_up(&mut self, err: ScanError) {
        log::error!("scan log disabled: {err}");
        self.writer = None;
    }
}

impl TickSink for DataRecorder {
    fn on_start(&mut self, header: &ScanHeader) {
        if let Err(err) = self.start(header) {
            self.give_up(err);
        }
    }

    fn on_tick(&mut self, record: &TickRecord) {
        if let Err(err) = self.write_record(record) {
            self.give_up(err);
        }
    }

    fn on_stop(&mut self) {
        if let Err(err) = self.stop() {
            self.give_up(err);
        }
    }
}
