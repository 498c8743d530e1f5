// src/engine.rs
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use crate::signal::{AcquisitionSource, RangeState, ScanDriver, ScanError};
use crate::types::{ScanCommand, ScanMessage};

/// Run `driver` on its own thread.
///
/// The thread is the only owner of the driver, so ticks and reconfiguration
/// never overlap. A tick that overruns its interval swallows the timer fires
/// it missed instead of queueing them. The driver is handed back when the
/// thread ends (on `Shutdown` or when the command sender is dropped).
pub fn spawn_scan<S>(
    driver: ScanDriver<S>,
    tx: Sender<ScanMessage>,
    rx_cmd: Receiver<ScanCommand>,
) -> JoinHandle<ScanDriver<S>>
where
    S: AcquisitionSource + Send + 'static,
{
    thread::spawn(move || ScanLoop::new(driver, tx).run(rx_cmd))
}

struct ScanLoop<S: AcquisitionSource> {
    driver: ScanDriver<S>,
    tx: Sender<ScanMessage>,
    next_tick: Option<Instant>,
    dropped: u64,
}

impl<S: AcquisitionSource> ScanLoop<S> {
    fn new(driver: ScanDriver<S>, tx: Sender<ScanMessage>) -> Self {
        Self {
            driver,
            tx,
            next_tick: None,
            dropped: 0,
        }
    }

    fn run(mut self, rx_cmd: Receiver<ScanCommand>) -> ScanDriver<S> {
        loop {
            // 1. 等待命令, 直到下一个采样点到期
            let command = match self.next_tick {
                Some(deadline) => {
                    let now = Instant::now();
                    if deadline <= now {
                        None
                    } else {
                        match rx_cmd.recv_timeout(deadline - now) {
                            Ok(cmd) => Some(cmd),
                            Err(RecvTimeoutError::Timeout) => None,
                            Err(RecvTimeoutError::Disconnected) => break,
                        }
                    }
                }
                None => match rx_cmd.recv() {
                    Ok(cmd) => Some(cmd),
                    Err(_) => break,
                },
            };
            // 2. 处理命令
            if let Some(cmd) = command {
                if matches!(cmd, ScanCommand::Shutdown) {
                    break;
                }
                if let Err(err) = self.apply(cmd) {
                    log::warn!("command rejected: {err}");
                    self.tx.send(ScanMessage::Error(err.to_string())).ok();
                }
                continue;
            }
            // 3. 采样
            if let Some(deadline) = self.next_tick {
                self.tick(deadline);
            }
        }
        self.driver.stop();
        if self.dropped > 0 {
            log::info!("{} timer fires dropped during the session", self.dropped);
        }
        self.driver
    }

    fn apply(&mut self, cmd: ScanCommand) -> Result<(), ScanError> {
        match cmd {
            ScanCommand::Start => {
                if let Some(report) = self.driver.start() {
                    self.tx.send(ScanMessage::Status(true)).ok();
                    let stopped = report.stopped;
                    self.tx.send(ScanMessage::Tick(report)).ok();
                    if stopped {
                        self.finish();
                    } else {
                        self.next_tick = self.deadline_after(Instant::now());
                    }
                }
                return Ok(());
            }
            ScanCommand::Stop => {
                if self.driver.is_running() {
                    self.driver.stop();
                    self.finish();
                }
                return Ok(());
            }
            ScanCommand::SetInterval(v) => {
                self.driver.set_interval(v)?;
                if self.driver.is_running() {
                    self.next_tick = self.deadline_after(Instant::now());
                }
            }
            ScanCommand::SetPeriod(v) => self.driver.set_period(v)?,
            ScanCommand::SetContinuous(v) => self.driver.set_continuous(v),
            ScanCommand::AddChannel(name) => self.driver.add_channel(&name)?,
            ScanCommand::RemoveChannel(name) => self.driver.remove_channel(&name)?,
            ScanCommand::SetNormalized(v) => self.driver.set_normalized(v),
            ScanCommand::SetLogarithmic(v) => self.driver.set_logarithmic(v),
            ScanCommand::SetMin(v) => self.update_range(|r| r.set_min(v)),
            ScanCommand::SetMax(v) => self.update_range(|r| r.set_max(v)),
            ScanCommand::SetAutoMin(v) => self.update_range(|r| r.set_auto_min(v)),
            ScanCommand::SetAutoMax(v) => self.update_range(|r| r.set_auto_max(v)),
            ScanCommand::Shutdown => {}
        }
        let (lower, upper) = self.driver.range();
        self.tx.send(ScanMessage::Range(lower, upper)).ok();
        Ok(())
    }

    fn tick(&mut self, deadline: Instant) {
        let Some(report) = self.driver.tick() else {
            self.next_tick = None;
            return;
        };
        let stopped = report.stopped;
        self.tx.send(ScanMessage::Tick(report)).ok();
        if stopped {
            self.finish();
            return;
        }
        // Stay on the interval grid; fires missed while ticking are dropped.
        let now = Instant::now();
        let mut next = self.deadline_after(deadline);
        let mut missed = 0;
        while let Some(at) = next.filter(|at| *at <= now) {
            next = self.deadline_after(at);
            missed += 1;
        }
        if missed > 0 {
            self.dropped += missed;
            log::debug!("tick overran its interval, dropped {missed} timer fires");
            self.tx.send(ScanMessage::Overrun(missed)).ok();
        }
        self.next_tick = next;
    }

    fn finish(&mut self) {
        self.next_tick = None;
        self.tx.send(ScanMessage::Status(false)).ok();
    }

    fn update_range(&mut self, edit: impl FnOnce(&mut RangeState)) {
        let mut range = self.driver.config().range;
        edit(&mut range);
        self.driver.set_range(range);
    }

    // None: the interval is too long to schedule, the scan waits for commands only.
    fn deadline_after(&self, from: Instant) -> Option<Instant> {
        let next = Duration::try_from_secs_f64(self.driver.config().interval)
            .ok()
            .and_then(|interval| from.checked_add(interval));
        if next.is_none() {
            log::warn!("interval {}s cannot be scheduled", self.driver.config().interval);
        }
        next
    }
}
