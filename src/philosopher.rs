//! 哲学者
//!
//! 同期処理は一切持たず、モニタの 4 つの操作だけを呼び出す。
//! 食事・思索・発言の間はモニタのロックを持たずに眠るだけ。

use std::{sync::Arc, thread, time::Duration};

use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::info;

use crate::config::DinnerConfig;
use crate::error::{MonitorError, Operation};
use crate::events::{EventKind, EventLog};
use crate::monitor::Monitor;

const PHRASES: [&str; 4] = [
    "Eating, thinking, talking: a philosopher's week in three words",
    "A chopstick in the hand is worth two on the table",
    "If the left one is taken, perhaps the right one was never free",
    "The unexamined noodle is not worth eating",
];

/// 1 人の哲学者が食事を終えるまでの記録
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhilosopherReport {
    pub id: usize,
    pub meals: usize,
    pub talks: usize,
}

pub struct Philosopher {
    id: usize,
    monitor: Arc<Monitor>,
    config: Arc<DinnerConfig>,
    log: Option<Arc<EventLog>>,
    rng: StdRng,
}

impl Philosopher {
    pub fn new(id: usize, monitor: Arc<Monitor>, config: Arc<DinnerConfig>) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(id as u64)),
            None => StdRng::from_entropy(),
        };
        Philosopher {
            id,
            monitor,
            config,
            log: None,
            rng,
        }
    }

    pub fn with_event_log(mut self, log: Arc<EventLog>) -> Self {
        self.log = Some(log);
        self
    }

    pub fn run(mut self) -> Result<PhilosopherReport, MonitorError> {
        let mut report = PhilosopherReport {
            id: self.id,
            ..Default::default()
        };

        for _ in 0..self.config.steps {
            self.check_interrupt(Operation::AcquirePair)?;
            self.monitor.acquire_pair(self.id)?;
            self.eat();
            self.monitor.release_pair(self.id)?;
            report.meals += 1;

            self.think();

            if self.rng.gen_bool(self.config.talk_probability) {
                self.check_interrupt(Operation::RequestExclusive)?;
                self.monitor.request_exclusive(self.id)?;
                self.talk();
                self.monitor.release_exclusive()?;
                report.talks += 1;
            }
        }

        Ok(report)
    }

    fn eat(&mut self) {
        self.record(EventKind::StartedEating);
        info!("Philosopher {} has started eating", self.id);
        self.waste_time();
        info!("Philosopher {} is done eating", self.id);
        self.record(EventKind::DoneEating);
    }

    fn think(&mut self) {
        info!("Philosopher {} has started thinking", self.id);
        self.waste_time();
        info!("Philosopher {} is done thinking", self.id);
    }

    fn talk(&mut self) {
        info!("Philosopher {} has started talking", self.id);
        // 最後の 1 枠は自己紹介
        let i = self.rng.gen_range(0..=PHRASES.len());
        let phrase = PHRASES
            .get(i)
            .map(|p| p.to_string())
            .unwrap_or_else(|| format!("My number is {}", self.id));
        info!("Philosopher {} says: {}", self.id, phrase);
        info!("Philosopher {} is done talking", self.id);
    }

    // 0 から max_delay までのランダムな時間眠る
    fn waste_time(&mut self) {
        let max = self.config.max_delay.as_millis() as u64;
        if max == 0 {
            thread::yield_now();
            return;
        }
        let ms = self.rng.gen_range(0..=max);
        thread::sleep(Duration::from_millis(ms));
    }

    // 割り込まれていたら次のモニタ操作に入らずに終わる
    fn check_interrupt(&self, op: Operation) -> Result<(), MonitorError> {
        if self.monitor.is_interrupted() {
            return Err(MonitorError::Interrupted { id: self.id, op });
        }
        Ok(())
    }

    fn record(&self, kind: EventKind) {
        if let Some(log) = &self.log {
            log.record(self.id, kind);
        }
    }
}
