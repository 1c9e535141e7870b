//! モニタと哲学者の出来事を時系列で記録するログ
//!
//! 箸と発言権に関する出来事はモニタのロックを保持したまま記録されるので、
//! seq の順番は実際の状態遷移の順番と一致する。

use std::{
    sync::{Mutex, PoisonError},
    time::Instant,
};

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    ChopstickTaken(usize),
    ChopstickReleased(usize),
    PairAcquired,
    PairReleased,
    TalkGranted,
    TalkReleased,
    StartedEating,
    DoneEating,
}

#[derive(Debug, Clone)]
pub struct Event {
    pub seq: u64,
    pub at: Instant,
    pub actor: usize,
    pub kind: EventKind,
}

#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<Event>>,
}

/// replay で見つかった不整合
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ReplayError {
    #[error("event {seq}: philosopher {actor} took chopstick {unit} held by philosopher {holder}")]
    DoubleHold {
        seq: u64,
        unit: usize,
        actor: usize,
        holder: usize,
    },

    #[error("event {seq}: philosopher {actor} released chopstick {unit} it did not hold")]
    ForeignRelease { seq: u64, unit: usize, actor: usize },

    #[error("event {seq}: philosopher {actor} was granted the talk while philosopher {holder} talks")]
    TalkOverlap {
        seq: u64,
        actor: usize,
        holder: usize,
    },

    #[error("event {seq}: chopstick {unit} is outside a ring of {count}")]
    UnknownChopstick { seq: u64, unit: usize, count: usize },
}

/// replay の集計結果
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Replay {
    pub pairs_acquired: usize,
    pub pairs_released: usize,
    pub talks: usize,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, actor: usize, kind: EventKind) {
        // 記録だけは panic したスレッドがいても続ける
        let mut events = self.events.lock().unwrap_or_else(PoisonError::into_inner);
        let seq = events.len() as u64;
        events.push(Event {
            seq,
            at: Instant::now(),
            actor,
            kind,
        });
    }

    pub fn events(&self) -> Vec<Event> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|e| e.kind == kind)
            .count()
    }

    /// 記録を先頭から再生し、箸と発言権の相互排除が一度も破られていないか確かめる
    pub fn replay(&self, count: usize) -> Result<Replay, ReplayError> {
        let mut holders: Vec<Option<usize>> = vec![None; count];
        let mut talker: Option<usize> = None;
        let mut replay = Replay::default();

        for e in self.events() {
            match e.kind {
                EventKind::ChopstickTaken(unit) => {
                    let slot = holders.get_mut(unit).ok_or(ReplayError::UnknownChopstick {
                        seq: e.seq,
                        unit,
                        count,
                    })?;
                    if let Some(holder) = *slot {
                        return Err(ReplayError::DoubleHold {
                            seq: e.seq,
                            unit,
                            actor: e.actor,
                            holder,
                        });
                    }
                    *slot = Some(e.actor);
                }
                EventKind::ChopstickReleased(unit) => {
                    let slot = holders.get_mut(unit).ok_or(ReplayError::UnknownChopstick {
                        seq: e.seq,
                        unit,
                        count,
                    })?;
                    if *slot != Some(e.actor) {
                        return Err(ReplayError::ForeignRelease {
                            seq: e.seq,
                            unit,
                            actor: e.actor,
                        });
                    }
                    *slot = None;
                }
                EventKind::PairAcquired => replay.pairs_acquired += 1,
                EventKind::PairReleased => replay.pairs_released += 1,
                EventKind::TalkGranted => {
                    if let Some(holder) = talker {
                        return Err(ReplayError::TalkOverlap {
                            seq: e.seq,
                            actor: e.actor,
                            holder,
                        });
                    }
                    talker = Some(e.actor);
                    replay.talks += 1;
                }
                EventKind::TalkReleased => talker = None,
                EventKind::StartedEating | EventKind::DoneEating => {}
            }
        }

        Ok(replay)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_seq_is_ordered() {
        let log = EventLog::new();
        log.record(1, EventKind::StartedEating);
        log.record(2, EventKind::DoneEating);

        let events = log.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].seq, 0);
        assert_eq!(events[1].seq, 1);
        assert!(events[0].at <= events[1].at);
    }

    #[test]
    fn test_replay_ok() {
        let log = EventLog::new();
        log.record(1, EventKind::ChopstickTaken(0));
        log.record(1, EventKind::ChopstickTaken(1));
        log.record(1, EventKind::PairAcquired);
        log.record(1, EventKind::ChopstickReleased(0));
        log.record(1, EventKind::ChopstickReleased(1));
        log.record(1, EventKind::PairReleased);
        log.record(2, EventKind::ChopstickTaken(1));

        let replay = log.replay(3).unwrap();
        assert_eq!(replay.pairs_acquired, 1);
        assert_eq!(replay.pairs_released, 1);
    }

    #[test]
    fn test_replay_double_hold() {
        let log = EventLog::new();
        log.record(1, EventKind::ChopstickTaken(1));
        log.record(2, EventKind::ChopstickTaken(1));

        assert_eq!(
            log.replay(3),
            Err(ReplayError::DoubleHold {
                seq: 1,
                unit: 1,
                actor: 2,
                holder: 1
            })
        );
    }

    #[test]
    fn test_replay_talk_overlap() {
        let log = EventLog::new();
        log.record(1, EventKind::TalkGranted);
        log.record(1, EventKind::TalkReleased);
        log.record(3, EventKind::TalkGranted);
        log.record(2, EventKind::TalkGranted);

        assert!(matches!(
            log.replay(3),
            Err(ReplayError::TalkOverlap { actor: 2, holder: 3, .. })
        ));
    }
}
