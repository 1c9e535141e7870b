use std::collections::VecDeque;

// 発言待ちの整理券
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    number: u64,
    id: usize,
}

impl Ticket {
    pub fn id(&self) -> usize {
        self.id
    }
}

// 発言権の FIFO キュー
// 解放時に先頭の整理券へ発言権を直接渡すので、キューが空でない間は常に誰かが発言権を持っている
#[derive(Debug, Default)]
pub struct TalkQueue {
    talking: Option<usize>,    // 現在の発言者
    waiting: VecDeque<Ticket>, // 到着順
    granted: Option<Ticket>,   // 渡したがまだ受け取られていない整理券
    next_number: u64,
}

impl TalkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// 空いていれば即座に発言権を得る。空いていなければ整理券を発行して最後尾に並ぶ
    pub fn enter(&mut self, id: usize) -> Option<Ticket> {
        assert!(
            self.talking != Some(id) && self.waiting.iter().all(|t| t.id != id),
            "philosopher {id} already holds or waits for the talking privilege"
        );

        if self.talking.is_none() {
            self.talking = Some(id);
            return None;
        }

        let ticket = Ticket {
            number: self.next_number,
            id,
        };
        self.next_number += 1;
        self.waiting.push_back(ticket);
        Some(ticket)
    }

    pub fn is_granted(&self, ticket: Ticket) -> bool {
        self.granted == Some(ticket)
    }

    // 渡された発言権を受け取る
    pub fn claim(&mut self, ticket: Ticket) {
        assert!(self.is_granted(ticket), "ticket {ticket:?} was not granted");
        self.granted = None;
    }

    /// 待機を諦めてキューから抜ける
    ///
    /// 既に発言権を渡されていた場合は false を返すので、呼び出し元は claim すること
    pub fn leave(&mut self, ticket: Ticket) -> bool {
        if self.is_granted(ticket) {
            return false;
        }
        self.waiting.retain(|t| *t != ticket);
        true
    }

    /// 発言権を手放し、次の発言者がいればその id を返す
    pub fn release(&mut self) -> Option<usize> {
        assert!(
            self.talking.is_some() && self.granted.is_none(),
            "releasing the talking privilege without holding it"
        );

        match self.waiting.pop_front() {
            Some(next) => {
                self.talking = Some(next.id);
                self.granted = Some(next);
                Some(next.id)
            }
            None => {
                self.talking = None;
                None
            }
        }
    }

    pub fn talking(&self) -> Option<usize> {
        self.talking
    }

    pub fn waiters(&self) -> usize {
        self.waiting.len()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_enter_free() {
        let mut q = TalkQueue::new();
        assert!(q.enter(1).is_none());
        assert_eq!(q.talking(), Some(1));
        assert_eq!(q.release(), None);
        assert_eq!(q.talking(), None);

        // 空になったら次は待たずに入れる
        assert!(q.enter(2).is_none());
    }

    #[test]
    fn test_handoff_in_order() {
        let mut q = TalkQueue::new();
        q.enter(1);
        let t2 = q.enter(2).unwrap();
        let t3 = q.enter(3).unwrap();
        assert_eq!(q.waiters(), 2);

        assert_eq!(q.release(), Some(2));
        assert!(q.is_granted(t2));
        assert!(!q.is_granted(t3));
        // 渡した後も空きにはならない
        assert_eq!(q.talking(), Some(2));
        q.claim(t2);

        assert_eq!(q.release(), Some(3));
        q.claim(t3);
        assert_eq!(q.release(), None);
        assert_eq!(q.talking(), None);
    }

    #[test]
    fn test_no_overtaking_after_release() {
        let mut q = TalkQueue::new();
        q.enter(1);
        let t2 = q.enter(2).unwrap();
        q.release();

        // 2 が受け取る前に来た 4 は並ぶしかない
        let t4 = q.enter(4).unwrap();
        q.claim(t2);
        assert_eq!(q.release(), Some(4));
        assert!(q.is_granted(t4));
    }

    #[test]
    fn test_leave() {
        let mut q = TalkQueue::new();
        q.enter(1);
        let t2 = q.enter(2).unwrap();
        let t3 = q.enter(3).unwrap();

        assert!(q.leave(t2));
        assert_eq!(q.waiters(), 1);
        assert_eq!(q.release(), Some(3));

        // 渡された後は抜けられない
        assert!(!q.leave(t3));
        q.claim(t3);
    }

    #[test]
    #[should_panic]
    fn test_enter_twice() {
        let mut q = TalkQueue::new();
        q.enter(1);
        q.enter(2);
        q.enter(2);
    }

    #[test]
    #[should_panic]
    fn test_release_without_hold() {
        let mut q = TalkQueue::new();
        q.release();
    }
}
