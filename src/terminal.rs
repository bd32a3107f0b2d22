use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use atty::Stream;
use indicatif::{ProgressBar, ProgressStyle};

const TICK: Duration = Duration::from_millis(50);
const LINEAR_UNTIL: f64 = 90.0;
const DECELERATION: f64 = 1.12;

pub fn stderr_is_tty() -> bool {
    atty::is(Stream::Stderr)
}

/// A 0..=100 bar on stderr, hidden when stderr is not a terminal.
pub fn percent_bar(description: &str) -> ProgressBar {
    if !stderr_is_tty() {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(100);
    let style = ProgressStyle::with_template("{msg:>20} [{bar:15}] {pos:>3}/{len}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");
    bar.set_style(style);
    bar.set_message(description.to_string());
    bar
}

/// Bar for the converter, whose progress is unknown. It advances on its own
/// thread, slowing down past 90%, until [`TimedProgress::finish`] sends the
/// done signal.
pub struct TimedProgress {
    done: Sender<()>,
    handle: JoinHandle<()>,
}

impl TimedProgress {
    pub fn start(description: &str) -> Self {
        let bar = percent_bar(description);
        let (done, signal) = mpsc::channel::<()>();
        let handle = thread::spawn(move || {
            let mut position = 0.0_f64;
            let mut step = 1.0_f64;
            loop {
                match signal.recv_timeout(TICK) {
                    Err(RecvTimeoutError::Timeout) => {}
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
                if position < LINEAR_UNTIL {
                    position += 1.0;
                } else {
                    step /= DECELERATION;
                    position += step;
                }
                bar.set_position(position as u64);
            }
            bar.set_position(100);
            bar.finish();
        });
        Self { done, handle }
    }

    pub fn finish(self) {
        let _ = self.done.send(());
        let _ = self.handle.join();
    }
}
