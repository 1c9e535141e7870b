//! 食事する哲学者のためのモニタ
//!
//! 箸の環と発言権はそれぞれ独立した Mutex と Condvar で守られている。
//! どの操作も片方のロックを持ったままもう片方に入ることはない。

mod ring;
mod talk;

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Condvar, Mutex, PoisonError,
};

use tracing::{debug, warn};

use crate::error::{MonitorError, Operation};
use crate::events::{EventKind, EventLog};

pub use ring::ChopstickRing;
pub use talk::{TalkQueue, Ticket};

pub struct Monitor {
    count: usize,
    ring: Mutex<ChopstickRing>,
    ring_cond: Condvar,
    talk: Mutex<TalkQueue>,
    talk_cond: Condvar,
    interrupted: AtomicBool,
    log: Option<Arc<EventLog>>,
}

impl Monitor {
    /// `count` 人の哲学者と `count` 本の箸を用意する
    pub fn new(count: usize) -> Self {
        Monitor {
            count,
            ring: Mutex::new(ChopstickRing::new(count)),
            ring_cond: Condvar::new(),
            talk: Mutex::new(TalkQueue::new()),
            talk_cond: Condvar::new(),
            interrupted: AtomicBool::new(false),
            log: None,
        }
    }

    pub fn with_event_log(count: usize, log: Arc<EventLog>) -> Self {
        Monitor {
            log: Some(log),
            ..Monitor::new(count)
        }
    }

    pub fn philosophers(&self) -> usize {
        self.count
    }

    /// 両方の箸を持てるまで待つ
    ///
    /// 割り込まれた場合は何も持っていない状態で `Interrupted` を返す。
    pub fn acquire_pair(&self, id: usize) -> Result<(), MonitorError> {
        let mut ring = self.ring.lock()?;
        let (first, second) = ring.pick_order(id);

        while !ring.is_free(first) {
            if self.is_interrupted() {
                return Err(self.interrupted_at(id, Operation::AcquirePair));
            }
            ring = self.ring_cond.wait(ring)?;
        }
        ring.take(first);
        self.record(id, EventKind::ChopstickTaken(first));

        while !ring.is_free(second) {
            if self.is_interrupted() {
                // 片方だけ持ったまま抜けない
                ring.undo_take(first);
                self.record(id, EventKind::ChopstickReleased(first));
                self.ring_cond.notify_all();
                return Err(self.interrupted_at(id, Operation::AcquirePair));
            }
            ring = self.ring_cond.wait(ring)?;
        }
        ring.take(second);
        self.record(id, EventKind::ChopstickTaken(second));
        self.record(id, EventKind::PairAcquired);

        debug!(philosopher = id, first, second, "picked up chopsticks");
        Ok(())
    }

    /// 箸 (id - 1) と (id mod N) を置き、待っている全員を起こす
    pub fn release_pair(&self, id: usize) -> Result<(), MonitorError> {
        let mut ring = self.ring.lock()?;
        let (left, right) = ring.release_units(id);
        ring.put(left, right);
        self.record(id, EventKind::ChopstickReleased(left));
        self.record(id, EventKind::ChopstickReleased(right));
        self.record(id, EventKind::PairReleased);

        self.ring_cond.notify_all();
        debug!(philosopher = id, left, right, "put down chopsticks");
        Ok(())
    }

    /// 発言権を得るまで待つ。待機者には到着順に発言権が渡される
    pub fn request_exclusive(&self, id: usize) -> Result<(), MonitorError> {
        let mut talk = self.talk.lock()?;
        let ticket = match talk.enter(id) {
            None => {
                self.record(id, EventKind::TalkGranted);
                debug!(philosopher = id, "talking privilege was free");
                return Ok(());
            }
            Some(ticket) => ticket,
        };
        debug!(philosopher = id, waiters = talk.waiters(), "waiting to talk");

        // 渡されたかどうかを先に見るので、渡された後の割り込みは無視される
        while !talk.is_granted(ticket) {
            if self.is_interrupted() {
                talk.leave(ticket);
                return Err(self.interrupted_at(id, Operation::RequestExclusive));
            }
            talk = self.talk_cond.wait(talk)?;
        }
        talk.claim(ticket);
        self.record(id, EventKind::TalkGranted);

        debug!(philosopher = id, "talking privilege handed over");
        Ok(())
    }

    /// 発言権を手放す。待機者がいれば先頭に直接渡す
    pub fn release_exclusive(&self) -> Result<(), MonitorError> {
        let mut talk = self.talk.lock()?;
        let holder = talk.talking();
        let next = talk.release();
        if let Some(holder) = holder {
            self.record(holder, EventKind::TalkReleased);
        }

        match next {
            Some(next) => {
                debug!(from = ?holder, to = next, "passing the talking privilege");
                self.talk_cond.notify_all();
            }
            None => debug!(from = ?holder, "talking privilege is free"),
        }
        Ok(())
    }

    /// 待機中の哲学者をすべて起こし、以降の待機を `Interrupted` で失敗させる
    pub fn interrupt(&self) {
        if self.interrupted.swap(true, Ordering::SeqCst) {
            return;
        }
        warn!("interrupting every waiting philosopher");

        // 待機者が条件を確認してから wait に入るまでの間に notify が消えないよう、
        // 一度ロックを取ってから起こす
        drop(self.ring.lock().unwrap_or_else(PoisonError::into_inner));
        self.ring_cond.notify_all();
        drop(self.talk.lock().unwrap_or_else(PoisonError::into_inner));
        self.talk_cond.notify_all();
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }

    /// 各箸が使用中かどうか
    pub fn chopsticks(&self) -> Vec<bool> {
        self.ring
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .snapshot()
    }

    pub fn is_talking(&self) -> bool {
        self.talk
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .talking()
            .is_some()
    }

    pub fn talk_waiters(&self) -> usize {
        self.talk
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .waiters()
    }

    fn interrupted_at(&self, id: usize, op: Operation) -> MonitorError {
        warn!(philosopher = id, %op, "interrupted while waiting");
        MonitorError::Interrupted { id, op }
    }

    fn record(&self, id: usize, kind: EventKind) {
        if let Some(log) = &self.log {
            log.record(id, kind);
        }
    }
}
