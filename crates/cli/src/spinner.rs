//! Progress spinner on stderr while a turn runs.
//!
//! The only state shared with the task is a single stop flag. `stop` always
//! joins the task, so the line is cleared before the answer is printed.

use std::io::{IsTerminal, Write};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

const FRAMES: [char; 4] = ['|', '/', '-', '\\'];

pub struct Spinner {
    stop: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl Spinner {
    pub fn start(label: &'static str) -> Self {
        let (stop, mut stopped) = watch::channel(false);
        let enabled = std::io::stderr().is_terminal();

        let handle = tokio::spawn(async move {
            let mut frame = 0usize;
            loop {
                if enabled {
                    eprint!("\r{} {label}", FRAMES[frame % FRAMES.len()]);
                    let _ = std::io::stderr().flush();
                }
                frame += 1;
                tokio::select! {
                    changed = stopped.changed() => {
                        if changed.is_err() || *stopped.borrow() {
                            break;
                        }
                    }
                    _ = tokio::time::sleep(Duration::from_millis(100)) => {}
                }
            }
            if enabled {
                eprint!("\r{}\r", " ".repeat(label.len() + 2));
                let _ = std::io::stderr().flush();
            }
        });

        Self { stop, handle }
    }

    pub async fn stop(self) {
        let _ = self.stop.send(true);
        let _ = self.handle.await;
    }
}
