use std::io::{self, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use organizer_engine::{FetchEvent, ProgressSink};

/// User-facing output for one run.
///
/// Diagnostics go through the logging macros; this is only the narrative
/// the user reads. Doubles as the fetch progress sink in verbose mode.
pub struct Console {
    out: Mutex<Box<dyn Write + Send>>,
    verbose: bool,
    total: AtomicUsize,
    finished: AtomicUsize,
}

impl Console {
    pub fn new(out: Box<dyn Write + Send>, verbose: bool) -> Self {
        Self {
            out: Mutex::new(out),
            verbose,
            total: AtomicUsize::new(0),
            finished: AtomicUsize::new(0),
        }
    }

    pub fn stdout(verbose: bool) -> Self {
        Self::new(Box::new(io::stdout()), verbose)
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub fn line(&self, text: &str) {
        // A closed stdout is not worth aborting the run over.
        if let Ok(mut out) = self.out.lock() {
            let _ = writeln!(out, "{text}");
        }
    }

    pub fn blank(&self) {
        self.line("");
    }

    pub fn step(&self, number: usize, text: &str) {
        self.line(&format!("Step {number}: {text}"));
    }

    pub fn done(&self, text: &str) {
        self.line(&format!("  ✓ {text}"));
    }

    pub fn detail(&self, text: &str) {
        self.line(&format!("  {text}"));
    }

    pub fn warn(&self, text: &str) {
        self.line(&format!("Warning: {text}"));
    }

    pub fn error(&self, text: &str) {
        self.line(&format!("Error: {text}"));
    }
}

impl ProgressSink for Console {
    fn emit(&self, event: FetchEvent) {
        match event {
            FetchEvent::Started { total } => {
                self.total.store(total, Ordering::SeqCst);
                self.finished.store(0, Ordering::SeqCst);
            }
            FetchEvent::Finished { title, ok, .. } => {
                let done = self.finished.fetch_add(1, Ordering::SeqCst) + 1;
                if self.verbose {
                    let mark = if ok { "✓" } else { "✗" };
                    let total = self.total.load(Ordering::SeqCst);
                    self.line(&format!("  [{done}/{total}] {mark} {title}"));
                }
            }
        }
    }
}
