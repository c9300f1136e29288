#![allow(dead_code)]

use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use futures::future::BoxFuture;

use footprint::error::{Result, ScanError};
use footprint::scanner::{ScanExit, ScanRun, Scanner};

/// One scripted thing the fake scanner does when asked for a line.
#[derive(Debug, Clone)]
pub enum Step {
    Line(String),
    Fail(String),
    /// Never produces a line, like a scanner stuck on a slow site.
    Hang,
}

pub fn lines(output: &str) -> Vec<Step> {
    output.lines().map(|l| Step::Line(l.to_string())).collect()
}

/// Counters shared between a fake scanner and the test that owns it.
#[derive(Debug, Clone, Default)]
pub struct Probe {
    spawns: Arc<AtomicUsize>,
    kills: Arc<AtomicUsize>,
    drops: Arc<AtomicUsize>,
    usernames: Arc<Mutex<Vec<String>>>,
}

impl Probe {
    pub fn spawns(&self) -> usize {
        self.spawns.load(Ordering::SeqCst)
    }

    pub fn kills(&self) -> usize {
        self.kills.load(Ordering::SeqCst)
    }

    pub fn drops(&self) -> usize {
        self.drops.load(Ordering::SeqCst)
    }

    pub fn usernames(&self) -> Vec<String> {
        self.usernames.lock().unwrap().clone()
    }
}

pub struct FakeScanner {
    steps: Vec<Step>,
    exit: ScanExit,
    fail_spawn: bool,
    pub probe: Probe,
}

impl FakeScanner {
    pub fn new(steps: Vec<Step>) -> FakeScanner {
        FakeScanner {
            steps,
            exit: ScanExit::Success,
            fail_spawn: false,
            probe: Probe::default(),
        }
    }

    pub fn with_output(output: &str) -> FakeScanner {
        Self::new(lines(output))
    }

    pub fn exiting_with(mut self, exit: ScanExit) -> FakeScanner {
        self.exit = exit;
        self
    }

    pub fn failing_to_spawn() -> FakeScanner {
        FakeScanner {
            fail_spawn: true,
            ..Self::new(Vec::new())
        }
    }
}

impl Scanner for FakeScanner {
    fn spawn(&self, username: &str) -> Result<Box<dyn ScanRun>> {
        self.probe.spawns.fetch_add(1, Ordering::SeqCst);
        self.probe.usernames.lock().unwrap().push(username.to_string());
        if self.fail_spawn {
            return Err(ScanError::Spawn {
                program: "fake-scanner".to_string(),
                source: io::Error::new(io::ErrorKind::NotFound, "No such file or directory"),
            });
        }
        Ok(Box::new(FakeRun {
            steps: self.steps.iter().cloned().collect(),
            exit: self.exit,
            probe: self.probe.clone(),
        }))
    }
}

struct FakeRun {
    steps: VecDeque<Step>,
    exit: ScanExit,
    probe: Probe,
}

impl ScanRun for FakeRun {
    fn next_line(&mut self) -> BoxFuture<'_, Result<Option<String>>> {
        Box::pin(async move {
            match self.steps.pop_front() {
                None => Ok(None),
                Some(Step::Line(line)) => Ok(Some(line)),
                Some(Step::Fail(msg)) => Err(ScanError::Read(io::Error::other(msg))),
                Some(Step::Hang) => futures::future::pending().await,
            }
        })
    }

    fn wait(&mut self) -> BoxFuture<'_, Result<ScanExit>> {
        let exit = self.exit;
        Box::pin(async move { Ok(exit) })
    }

    fn kill(&mut self) -> BoxFuture<'_, Result<()>> {
        self.probe.kills.fetch_add(1, Ordering::SeqCst);
        Box::pin(async { Ok(()) })
    }
}

impl Drop for FakeRun {
    fn drop(&mut self) {
        self.probe.drops.fetch_add(1, Ordering::SeqCst);
    }
}

pub const JOHNSMITH_OUTPUT: &str = "[+] GitHub: https://github.com/johnsmith123\n[-] Reddit\n[+] Twitter: https://twitter.com/johnsmith123\n";
