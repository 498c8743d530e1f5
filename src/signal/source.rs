use std::collections::{HashMap, VecDeque};
use rand::{rngs::StdRng, Rng, SeedableRng};
/// One read of a live value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Reading {
    Value(f64),
    Disconnected,
}
impl Reading {
    /// Sample to push into the window; a disconnected source becomes `NaN`.
    pub fn sample(self) -> f64 {
        match self {
            Reading::Value(v) => v,
            Reading::Disconnected => f64::NAN,
        }
    }
}
impl From<Option<f64>> for Reading {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Reading::Disconnected, Reading::Value)
    }
}
/// Something that can report the current value of a named channel on demand.
pub trait AcquisitionSource {
    fn read(&mut self, channel: &str) -> Reading;
}
impl<S: AcquisitionSource + ?Sized> AcquisitionSource for Box<S> {
    fn read(&mut self, channel: &str) -> Reading {
        (**self).read(channel)
    }
}
/// In-memory source useful for tests and deterministic playback.
///
/// Each channel replays its queued readings in order and reports
/// `Disconnected` once the queue runs dry.
#[derive(Default)]
pub struct ManualSource {
    queues: HashMap<String, VecDeque<Reading>>,
}
impl ManualSource {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_values(
        mut self,
        channel: &str,
        values: impl IntoIterator<Item = f64>,
    ) -> Self {
        self.queue(channel, values.into_iter().map(Reading::Value));
        self
    }
    pub fn queue(&mut self, channel: &str, readings: impl IntoIterator<Item = Reading>) {
        self.queues
            .entry(channel.to_owned())
            .or_default()
            .extend(readings);
    }
}
impl AcquisitionSource for ManualSource {
    fn read(&mut self, channel: &str) -> Reading {
        self.queues
            .get_mut(channel)
            .and_then(|q| q.pop_front())
            .unwrap_or(Reading::Disconnected)
    }
}
/// Stand-in for live process values: a per-channel sine with noise and the
/// occasional dropped connection.
pub struct SimulatedSource {
    rng: StdRng,
    // channel -> (phase, step per read)
    phase: HashMap<String, (f64, f64)>,
    dropout: f64,
}
impl SimulatedSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            phase: HashMap::new(),
            dropout: 0.02,
        }
    }
    /// Probability that a single read reports `Disconnected`.
    pub fn with_dropout(mut self, probability: f64) -> Self {
        // NaN survives clamp and would make gen_bool panic.
        self.dropout = if probability.is_finite() {
            probability.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self
    }
}
impl AcquisitionSource for SimulatedSource {
    fn read(&mut self, channel: &str) -> Reading {
        let count = self.phase.len();
        let (phase, step) = self
            .phase
            .entry(channel.to_owned())
            .or_insert((0.0, 0.1 * (count as f64 * 0.3 + 1.0)));
        *phase += *step;
        let base = phase.sin() * 10.0 + 20.0;
        if self.rng.gen_bool(self.dropout) {
            return Reading::Disconnected;
        }
        Reading::Value(base + self.rng.gen_range(-0.5..0.5))
    }
}
