//! エラー型
//!
//! - MonitorError: モニタの待機操作が失敗した場合
//! - ConfigError: 設定値が不正な場合
//! - DinnerError: 哲学者スレッドの実行全体で起きた致命的な障害

use std::{fmt, io, sync::PoisonError};

use thiserror::Error;

/// 待機中に割り込まれたモニタ操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    AcquirePair,
    RequestExclusive,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::AcquirePair => write!(f, "acquire_pair"),
            Operation::RequestExclusive => write!(f, "request_exclusive"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MonitorError {
    /// 待機中に interrupt() された。呼び出し元は何も保持していない
    #[error("philosopher {id} was interrupted while waiting in {op}")]
    Interrupted { id: usize, op: Operation },

    /// ロック保持中に他のスレッドが panic した
    #[error("monitor lock poisoned by a panicking philosopher")]
    Poisoned,
}

// Mutex::lock と Condvar::wait の結果を ? で伝播するため
impl<T> From<PoisonError<T>> for MonitorError {
    fn from(_: PoisonError<T>) -> Self {
        MonitorError::Poisoned
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("need at least {min} philosophers, got {count}")]
    TooFewPhilosophers { count: usize, min: usize },

    #[error("talk probability must be within [0, 1], got {value}")]
    InvalidTalkProbability { value: f64 },

    #[error("number of dining steps must be positive")]
    ZeroSteps,
}

/// 夕食会全体を止める障害
#[derive(Error, Debug)]
pub enum DinnerError {
    #[error(transparent)]
    Monitor(#[from] MonitorError),

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("philosopher {id} panicked")]
    PhilosopherPanicked { id: usize },

    #[error("failed to spawn philosopher {id}: {source}")]
    Spawn { id: usize, source: io::Error },

    #[error("failed to install signal handler: {0}")]
    Signal(io::Error),
}

pub type Result<T> = std::result::Result<T, DinnerError>;

#[cfg(test)]
mod test {
    use std::sync::Mutex;

    use super::*;

    #[test]
    fn test_poison_converts() {
        let m = Mutex::new(0);
        let _ = std::panic::catch_unwind(|| {
            let _g = m.lock().unwrap();
            panic!("poison");
        });

        let err: MonitorError = m.lock().unwrap_err().into();
        assert_eq!(err, MonitorError::Poisoned);
    }

    #[test]
    fn test_interrupted_message() {
        let err = DinnerError::from(MonitorError::Interrupted {
            id: 3,
            op: Operation::AcquirePair,
        });
        assert_eq!(
            err.to_string(),
            "philosopher 3 was interrupted while waiting in acquire_pair"
        );
    }
}
