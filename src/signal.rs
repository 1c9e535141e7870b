//! シグナルを受けたら哲学者全員に割り込む

use std::{
    sync::Arc,
    thread::{self, JoinHandle},
};

use libc::{SIGINT, SIGTERM, SIGUSR1};
use signal_hook::iterator::{Handle, Signals};
use tracing::warn;

use crate::error::{DinnerError, Result};
use crate::monitor::Monitor;

pub const WATCHED: [i32; 3] = [SIGINT, SIGTERM, SIGUSR1];

pub struct SignalWatcher {
    handle: Handle,
    thread: JoinHandle<()>,
}

impl SignalWatcher {
    pub fn spawn(monitor: Arc<Monitor>) -> Result<Self> {
        let mut signals = Signals::new(WATCHED).map_err(DinnerError::Signal)?;
        let handle = signals.handle();

        let thread = thread::Builder::new()
            .name("signal-watcher".into())
            .spawn(move || {
                // handle.close() されると forever() が終わる
                for sig in signals.forever() {
                    warn!(signal = sig, "received signal, interrupting the dinner");
                    monitor.interrupt();
                }
            })
            .map_err(DinnerError::Signal)?;

        Ok(SignalWatcher { handle, thread })
    }

    pub fn stop(self) {
        self.handle.close();
        let _ = self.thread.join();
    }
}

#[cfg(test)]
mod test {
    use std::{
        thread,
        time::{Duration, Instant},
    };

    use super::*;

    #[test]
    fn test_sigusr1_interrupts() {
        let monitor = Arc::new(Monitor::new(2));
        let watcher = SignalWatcher::spawn(monitor.clone()).unwrap();

        signal_hook::low_level::raise(SIGUSR1).unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while !monitor.is_interrupted() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        assert!(monitor.is_interrupted());
        watcher.stop();
    }
}
