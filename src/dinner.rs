//! 夕食会: 哲学者スレッドの起動と終了待ち
//!
//! 各スレッドは結果をチャネルで送る。最初に届いた障害でモニタに割り込み、
//! 残りの哲学者も止めてから、その障害を呼び出し元に返す。

use std::{sync::Arc, thread};

use crossbeam_channel::{unbounded, Sender};
use tracing::{error, info};

use crate::config::DinnerConfig;
use crate::error::{DinnerError, Result};
use crate::events::EventLog;
use crate::monitor::Monitor;
use crate::philosopher::{Philosopher, PhilosopherReport};

type Outcome = Result<PhilosopherReport>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DinnerReport {
    pub philosophers: Vec<PhilosopherReport>,
}

impl DinnerReport {
    pub fn meals(&self) -> usize {
        self.philosophers.iter().map(|p| p.meals).sum()
    }

    pub fn talks(&self) -> usize {
        self.philosophers.iter().map(|p| p.talks).sum()
    }
}

pub struct Dinner {
    config: Arc<DinnerConfig>,
    monitor: Arc<Monitor>,
    log: Option<Arc<EventLog>>,
}

// 結果を送らずに drop された (= panic した) ら PhilosopherPanicked を送る
struct Courier {
    id: usize,
    tx: Option<Sender<Outcome>>,
}

impl Courier {
    fn deliver(mut self, outcome: Outcome) {
        if let Some(tx) = self.tx.take() {
            // 受信側が先にいなくなるのは run が終わった後だけ
            let _ = tx.send(outcome);
        }
    }
}

impl Drop for Courier {
    fn drop(&mut self) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(Err(DinnerError::PhilosopherPanicked { id: self.id }));
        }
    }
}

impl Dinner {
    pub fn new(config: DinnerConfig) -> Result<Self> {
        let config = config.validate()?;
        let monitor = Arc::new(Monitor::new(config.philosophers));
        Ok(Dinner {
            config: Arc::new(config),
            monitor,
            log: None,
        })
    }

    /// 出来事をすべて `log` に記録する夕食会
    pub fn with_event_log(config: DinnerConfig, log: Arc<EventLog>) -> Result<Self> {
        let config = config.validate()?;
        let monitor = Arc::new(Monitor::with_event_log(config.philosophers, log.clone()));
        Ok(Dinner {
            config: Arc::new(config),
            monitor,
            log: Some(log),
        })
    }

    /// シグナルハンドラなど外部から割り込むためのモニタ
    pub fn monitor(&self) -> Arc<Monitor> {
        Arc::clone(&self.monitor)
    }

    pub fn run(&self) -> Result<DinnerReport> {
        let n = self.config.philosophers;
        info!(philosophers = n, steps = self.config.steps, "dinner is served");

        let (tx, rx) = unbounded();
        let mut handles = Vec::with_capacity(n);
        let mut fault: Option<DinnerError> = None;

        for id in 1..=n {
            let mut philosopher =
                Philosopher::new(id, self.monitor.clone(), self.config.clone());
            if let Some(log) = &self.log {
                philosopher = philosopher.with_event_log(log.clone());
            }
            let courier = Courier {
                id,
                tx: Some(tx.clone()),
            };

            let spawned = thread::Builder::new()
                .name(format!("philosopher-{id}"))
                .spawn(move || {
                    let outcome = philosopher.run().map_err(DinnerError::from);
                    courier.deliver(outcome);
                });
            match spawned {
                Ok(handle) => handles.push(handle),
                Err(source) => {
                    // 既に座っている哲学者を止める
                    self.monitor.interrupt();
                    fault = Some(DinnerError::Spawn { id, source });
                    break;
                }
            }
        }
        drop(tx);

        let mut reports = Vec::with_capacity(n);
        for outcome in rx.iter().take(handles.len()) {
            match outcome {
                Ok(report) => reports.push(report),
                Err(e) => {
                    if fault.is_none() {
                        error!("{e}");
                        self.monitor.interrupt();
                        fault = Some(e);
                    }
                }
            }
        }

        for handle in handles {
            // panic は Courier が報告済み
            let _ = handle.join();
        }

        if let Some(e) = fault {
            return Err(e);
        }

        reports.sort_by_key(|r| r.id);
        info!("all philosophers have left the table");
        Ok(DinnerReport {
            philosophers: reports,
        })
    }
}
