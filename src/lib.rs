//! 食事する哲学者
//!
//! N 人の哲学者が環状に置かれた N 本の箸を共有し、さらに 1 人ずつしか
//! 話せない発言権を到着順に譲り合う。同期はすべて [`Monitor`] が受け持つ。
//!
//! - 箸: 最後の哲学者だけ逆順に取ることでデッドロックを避ける
//! - 発言権: 整理券による FIFO で、解放時に先頭へ直接渡す

pub mod config;
pub mod dinner;
pub mod error;
pub mod events;
pub mod monitor;
pub mod philosopher;
pub mod signal;

pub use config::{DinnerArgs, DinnerConfig};
pub use dinner::{Dinner, DinnerReport};
pub use error::{ConfigError, DinnerError, MonitorError, Operation, Result};
pub use events::{Event, EventKind, EventLog};
pub use monitor::Monitor;
pub use philosopher::{Philosopher, PhilosopherReport};
