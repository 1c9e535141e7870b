// 箸の環
// 箸 i は哲学者 i と哲学者 i+1 (mod N) の間に置かれている
#[derive(Debug)]
pub struct ChopstickRing {
    // true なら使用中
    in_use: Vec<bool>,
}

impl ChopstickRing {
    pub fn new(count: usize) -> Self {
        assert!(count >= 2, "a ring needs at least 2 chopsticks");
        ChopstickRing {
            in_use: vec![false; count],
        }
    }

    pub fn len(&self) -> usize {
        self.in_use.len()
    }

    /// 哲学者 id が箸を取る順番 (first, second)
    ///
    /// 最後の哲学者だけ逆順に取ることで循環待ちを断ち切る
    pub fn pick_order(&self, id: usize) -> (usize, usize) {
        self.check_id(id);
        if id == self.len() {
            (0, id - 1)
        } else {
            (id - 1, id)
        }
    }

    /// 哲学者 id が置く箸
    ///
    /// 取った順番に関係なく (id - 1, id mod N) で固定
    pub fn release_units(&self, id: usize) -> (usize, usize) {
        self.check_id(id);
        (id - 1, id % self.len())
    }

    pub fn is_free(&self, unit: usize) -> bool {
        !self.in_use[unit]
    }

    pub fn take(&mut self, unit: usize) {
        assert!(self.is_free(unit), "chopstick {unit} is already in use");
        self.in_use[unit] = true;
    }

    // 取ったはずの箸を戻す。置く前に両方を検査して、状態を中途半端に壊さない
    pub fn put(&mut self, first: usize, second: usize) {
        assert!(
            self.in_use[first] && self.in_use[second],
            "putting down chopsticks {first} and {second} that are not both held"
        );
        self.in_use[first] = false;
        self.in_use[second] = false;
    }

    // 割り込まれたときに片方だけ取った箸を戻す
    pub fn undo_take(&mut self, unit: usize) {
        assert!(self.in_use[unit], "chopstick {unit} is not held");
        self.in_use[unit] = false;
    }

    pub fn snapshot(&self) -> Vec<bool> {
        self.in_use.clone()
    }

    fn check_id(&self, id: usize) {
        assert!(
            (1..=self.len()).contains(&id),
            "philosopher id {id} is out of range 1..={}",
            self.len()
        );
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_pick_order() {
        let ring = ChopstickRing::new(5);
        for id in 1..5 {
            assert_eq!(ring.pick_order(id), (id - 1, id));
        }
        // 最後の哲学者だけ逆
        assert_eq!(ring.pick_order(5), (0, 4));
    }

    #[test]
    fn test_pick_order_two() {
        let ring = ChopstickRing::new(2);
        assert_eq!(ring.pick_order(1), (0, 1));
        assert_eq!(ring.pick_order(2), (0, 1));
    }

    #[test]
    fn test_release_units() {
        let ring = ChopstickRing::new(5);
        assert_eq!(ring.release_units(1), (0, 1));
        assert_eq!(ring.release_units(4), (3, 4));
        assert_eq!(ring.release_units(5), (4, 0));
    }

    #[test]
    fn test_take_and_put() {
        let mut ring = ChopstickRing::new(3);
        ring.take(0);
        ring.take(1);
        assert_eq!(ring.snapshot(), vec![true, true, false]);

        ring.put(0, 1);
        assert_eq!(ring.snapshot(), vec![false, false, false]);
    }

    #[test]
    #[should_panic]
    fn test_double_take() {
        let mut ring = ChopstickRing::new(3);
        ring.take(2);
        ring.take(2);
    }

    #[test]
    #[should_panic]
    fn test_put_without_hold() {
        let mut ring = ChopstickRing::new(3);
        ring.take(0);
        ring.put(0, 1);
    }

    #[test]
    #[should_panic]
    fn test_id_out_of_range() {
        let ring = ChopstickRing::new(3);
        ring.pick_order(0);
    }
}
