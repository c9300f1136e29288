//! Turns scanner output into a stream of search events.
//!
//! The stream is lazy: the scanner is started on the first poll and read only
//! as fast as the consumer pulls. Dropping the stream drops the run, which
//! stops the scanner.

use std::sync::Arc;

use futures::Stream;
use futures::stream;

use crate::data_models::{FOUND_MARKER, FoundEvent, StreamEvent};
use crate::error::ScanError;
use crate::scanner::{ScanRun, Scanner};

pub struct StreamBridge {
    scanner: Arc<dyn Scanner>,
    report_exit_status: bool,
}

enum BridgeState {
    Pending {
        scanner: Arc<dyn Scanner>,
        username: String,
    },
    Reading {
        run: Box<dyn ScanRun>,
        username: String,
        found: usize,
    },
    Done,
}

impl StreamBridge {
    pub fn new(scanner: Arc<dyn Scanner>, report_exit_status: bool) -> StreamBridge {
        StreamBridge {
            scanner,
            report_exit_status,
        }
    }

    /// Events for one scan of `username`, in scanner output order. At most
    /// one error event is produced and it is always the last item.
    pub fn search(&self, username: &str) -> impl Stream<Item = StreamEvent> + Send + use<> {
        let state = BridgeState::Pending {
            scanner: self.scanner.clone(),
            username: username.to_string(),
        };
        let report_exit_status = self.report_exit_status;
        stream::unfold(state, move |state| advance(state, report_exit_status))
    }
}

async fn advance(
    state: BridgeState,
    report_exit_status: bool,
) -> Option<(StreamEvent, BridgeState)> {
    let (mut run, username, mut found) = match state {
        BridgeState::Pending { scanner, username } => match scanner.spawn(&username) {
            Ok(run) => {
                log::info!("scan started for {username}");
                (run, username, 0)
            }
            Err(e) => {
                log::error!("scan for {username} could not start: {e}");
                return Some((StreamEvent::error(&e), BridgeState::Done));
            }
        },
        BridgeState::Reading {
            run,
            username,
            found,
        } => (run, username, found),
        BridgeState::Done => return None,
    };

    loop {
        match run.next_line().await {
            Ok(Some(line)) => {
                if let Some(event) = FoundEvent::from_line(&line) {
                    found += 1;
                    let next = BridgeState::Reading {
                        run,
                        username,
                        found,
                    };
                    return Some((StreamEvent::Found(event), next));
                }
                if line.starts_with(FOUND_MARKER) {
                    log::debug!("dropping malformed found line for {username}: {line:?}");
                }
            }
            Ok(None) => {
                return finish(run, &username, found, report_exit_status)
                    .await
                    .map(|e| (StreamEvent::error(&e), BridgeState::Done));
            }
            Err(e) => {
                log::error!("scan for {username} failed after {found} found: {e}");
                if let Err(kill_err) = run.kill().await {
                    log::warn!("{kill_err}");
                }
                return Some((StreamEvent::error(&e), BridgeState::Done));
            }
        }
    }
}

/// Reaps the scanner after end of output. Returns the error to report, if any.
async fn finish(
    mut run: Box<dyn ScanRun>,
    username: &str,
    found: usize,
    report_exit_status: bool,
) -> Option<ScanError> {
    match run.wait().await {
        Ok(exit) => match exit.into_error() {
            None => {
                log::info!("scan finished for {username}: {found} found");
                None
            }
            Some(e) => {
                log::warn!("scan for {username} ended badly after {found} found: {e}");
                report_exit_status.then_some(e)
            }
        },
        Err(e) => {
            log::error!("{e}");
            Some(e)
        }
    }
}
