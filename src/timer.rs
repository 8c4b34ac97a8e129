use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::navigator::AttemptId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    Tick(AttemptId),
}

/// Handle on the 1 Hz tick thread of one attempt. Dropping it stops the
/// thread, so whoever owns the countdown owns the periodic trigger.
#[derive(Debug)]
pub struct Countdown {
    attempt: AttemptId,
    stop: Arc<AtomicBool>,
}

/// Read-only view on whether a countdown has been released.
#[derive(Debug, Clone)]
pub struct CountdownWatch(Arc<AtomicBool>);

impl CountdownWatch {
    pub fn is_released(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

impl Countdown {
    /// Starts ticking for `attempt`. Without a sender no thread is spawned
    /// and ticks are expected to be fed by hand.
    pub fn start(attempt: AttemptId, tx: Option<mpsc::Sender<TimerEvent>>) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        if let Some(tx) = tx {
            let flag = stop.clone();
            thread::spawn(move || loop {
                thread::sleep(Duration::from_secs(1));
                if flag.load(Ordering::SeqCst) {
                    break;
                }
                if tx.send(TimerEvent::Tick(attempt)).is_err() {
                    break;
                }
            });
        }
        tracing::debug!(attempt, "countdown started");
        Self { attempt, stop }
    }

    pub fn attempt(&self) -> AttemptId {
        self.attempt
    }

    pub fn stop(&self) {
        if !self.stop.swap(true, Ordering::SeqCst) {
            tracing::debug!(attempt = self.attempt, "countdown released");
        }
    }

    pub fn is_running(&self) -> bool {
        !self.stop.load(Ordering::SeqCst)
    }

    pub fn watch(&self) -> CountdownWatch {
        CountdownWatch(self.stop.clone())
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.stop();
    }
}

pub fn format_duration(total_secs: u32) -> String {
    let minutes = total_secs / 60;
    let seconds = total_secs % 60;
    format!("{:02}:{:02}", minutes, seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_duration(1800), "30:00");
        assert_eq!(format_duration(61), "01:01");
        assert_eq!(format_duration(0), "00:00");
    }

    #[test]
    fn drop_releases_the_countdown() {
        let countdown = Countdown::start(7, None);
        let watch = countdown.watch();
        assert!(countdown.is_running());
        drop(countdown);
        assert!(watch.is_released());
    }

    #[test]
    fn ticking_thread_stops_after_release() {
        let (tx, rx) = mpsc::channel();
        let countdown = Countdown::start(3, Some(tx));
        assert_eq!(
            rx.recv_timeout(Duration::from_secs(3)),
            Ok(TimerEvent::Tick(3))
        );
        drop(countdown);
        // At most one tick may already be in flight; then the sender is gone.
        let mut after = 0;
        while rx.recv_timeout(Duration::from_secs(3)).is_ok() {
            after += 1;
        }
        assert!(after <= 1);
    }
}
