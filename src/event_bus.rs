//! Event bus carrying listener invocations back to the script runner.
//!
//! Design principles:
//! - Broadcast channel (tokio) - every subscriber sees every call
//! - Listeners only send; the runner drains after each command
//! - Nothing is deduplicated, each invocation is reported

use log::warn;
use sel_panel::EventInfo;
use std::sync::OnceLock;
use tokio::sync::broadcast::{self, Receiver, Sender};

/// Broadcast channel capacity.
/// Lagging receivers skip the oldest calls and log how many were lost.
pub const CHANNEL_CAPACITY: usize = 256;

/// One listener invocation.
#[derive(Clone, Debug)]
pub struct ListenerCall {
    pub listener: String,
    pub info: EventInfo,
}

static SENDER: OnceLock<Sender<ListenerCall>> = OnceLock::new();

fn get_sender() -> &'static Sender<ListenerCall> {
    SENDER.get_or_init(|| {
        let (tx, _rx) = broadcast::channel(CHANNEL_CAPACITY);
        tx
    })
}

/// Publish a call. Dropped when nobody is subscribed.
#[inline]
pub fn send(call: ListenerCall) {
    let _ = get_sender().send(call);
}

pub fn subscribe() -> Receiver<ListenerCall> {
    get_sender().subscribe()
}

/// Drain all pending calls in arrival order.
pub fn drain(rx: &mut Receiver<ListenerCall>) -> Vec<ListenerCall> {
    let mut calls = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(call) => calls.push(call),
            Err(broadcast::error::TryRecvError::Empty) => break,
            Err(broadcast::error::TryRecvError::Lagged(n)) => {
                warn!("Event bus lagged, {} listener call(s) lost", n);
            }
            Err(broadcast::error::TryRecvError::Closed) => break,
        }
    }
    calls
}
