use std::io::Write;
use std::sync::Mutex;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Spinner currently on screen, if any. Log lines are routed through it.
static ACTIVE: Mutex<Option<ProgressBar>> = Mutex::new(None);

fn active() -> Option<ProgressBar> {
    ACTIVE.lock().ok().and_then(|guard| guard.clone())
}

fn set_active(pb: Option<ProgressBar>) {
    if let Ok(mut guard) = ACTIVE.lock() {
        *guard = pb;
    }
}

/// A spinner shown while captures run. Cleared when dropped.
pub struct CaptureSpinner {
    pb: ProgressBar,
}

impl CaptureSpinner {
    pub fn start(message: String, hidden: bool) -> Self {
        let pb = if hidden {
            ProgressBar::hidden()
        } else {
            ProgressBar::new_spinner()
        };
        let style = ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&[
                "▁▁▁▁▁",
                "▁▂▂▂▁",
                "▁▄▂▄▁",
                "▂▄▆▄▂",
                "▄▆█▆▄",
                "▂▄▆▄▂",
                "▁▄▂▄▁",
                "▁▂▂▂▁",
            ]);
        pb.set_style(style);
        pb.set_message(message);
        pb.enable_steady_tick(Duration::from_millis(100));

        set_active(Some(pb.clone()));
        Self { pb }
    }

    pub fn set_message(&self, message: String) {
        self.pb.set_message(message);
    }
}

impl Drop for CaptureSpinner {
    fn drop(&mut self) {
        set_active(None);
        self.pb.finish_and_clear();
    }
}

/// Log writer printing above the active spinner, or to stdout when there is none.
pub struct SpinnerWriter;

impl Write for SpinnerWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match active() {
            Some(pb) => {
                let msg = String::from_utf8_lossy(buf);
                pb.println(msg.trim_end());
                Ok(buf.len())
            }
            None => std::io::stdout().write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        std::io::stdout().flush()
    }
}
