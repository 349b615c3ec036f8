//! Resync gateway
//!
//! The selection core never polls. Whatever notices that another process
//! rewrote the selection keys sends a `ChangeNotice` down a channel, and the
//! owner of the `DriverSelections` runs `pump` to turn notices into resyncs.
//!
//! On unix the watcher process maps signals onto that channel:
//!
//! | Signal          | Notice        |
//! |-----------------|---------------|
//! | SIGHUP          | `KeysChanged` |
//! | SIGINT, SIGTERM | `Shutdown`    |
//!
//! Writers in other processes poke the watcher with `notify_watcher(pid)`.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;

use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGTERM};
use signal_hook::iterator::Signals;
use tracing::{debug, info};

use crate::error::{Result, SelectionError};
use crate::selection::{DriverCatalog, DriverSelections};
use crate::store::{SettingsStore, StoreError};

/// Message delivered to the selection owner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeNotice {
    /// The persisted selection keys were written by someone else
    KeysChanged,
    /// Stop pumping
    Shutdown,
}

/// Resync on every `KeysChanged` until `Shutdown` or the senders hang up.
///
/// Notices already queued behind a `KeysChanged` are folded into a single
/// resync. `on_resync` runs after each successful resync. Returns how many
/// resyncs were performed.
pub fn pump<S, C, F>(
    selections: &mut DriverSelections<S, C>,
    notices: &Receiver<ChangeNotice>,
    mut on_resync: F,
) -> std::result::Result<usize, StoreError>
where
    S: SettingsStore,
    C: DriverCatalog,
    F: FnMut(&DriverSelections<S, C>),
{
    let mut resyncs = 0;
    while let Ok(notice) = notices.recv() {
        if notice == ChangeNotice::Shutdown {
            break;
        }

        let shutdown = drain_pending(notices);
        selections.resync()?;
        resyncs += 1;
        on_resync(selections);

        if shutdown {
            break;
        }
    }
    debug!(resyncs, "Resync pump stopped");
    Ok(resyncs)
}

/// Subscribe, load, then pump until shutdown.
///
/// `subscribe` receives the sending half before `open` runs, so a change
/// announced while the table loads still ends in a resync. Returns the
/// resync count together with whatever `subscribe` produced.
pub fn watch<S, C, T, E, Sub, Open, F>(
    subscribe: Sub,
    open: Open,
    on_resync: F,
) -> std::result::Result<(usize, T), E>
where
    S: SettingsStore,
    C: DriverCatalog,
    E: From<StoreError>,
    Sub: FnOnce(Sender<ChangeNotice>) -> std::result::Result<T, E>,
    Open: FnOnce() -> std::result::Result<DriverSelections<S, C>, E>,
    F: FnMut(&DriverSelections<S, C>),
{
    let (tx, rx) = mpsc::channel();
    let subscription = subscribe(tx)?;
    let mut selections = open()?;
    info!(entries = selections.table().len(), "Watching for selection changes");
    let resyncs = pump(&mut selections, &rx, on_resync)?;
    Ok((resyncs, subscription))
}

/// Swallow queued notices. Returns true if a shutdown was among them or the
/// channel is gone.
fn drain_pending(notices: &Receiver<ChangeNotice>) -> bool {
    loop {
        match notices.try_recv() {
            Ok(ChangeNotice::KeysChanged) => continue,
            Ok(ChangeNotice::Shutdown) => return true,
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Disconnected) => return true,
        }
    }
}

/// Forward SIGHUP/SIGINT/SIGTERM to `sender` from a background thread.
///
/// The thread ends after forwarding a shutdown or once the receiver is gone.
pub fn forward_signals(sender: Sender<ChangeNotice>) -> Result<thread::JoinHandle<()>> {
    let mut signals = Signals::new([SIGHUP, SIGINT, SIGTERM])
        .map_err(|e| SelectionError::signal(format!("failed to register signal handlers: {}", e)))?;

    let handle = thread::spawn(move || {
        for sig in signals.forever() {
            let notice = match sig {
                SIGHUP => ChangeNotice::KeysChanged,
                _ => ChangeNotice::Shutdown,
            };
            debug!(signal = sig, ?notice, "Forwarding signal");
            if sender.send(notice).is_err() || notice == ChangeNotice::Shutdown {
                break;
            }
        }
    });
    Ok(handle)
}

/// Tell the watcher running as `pid` that the selection keys changed.
pub fn notify_watcher(pid: i32) -> Result<()> {
    if pid <= 0 {
        return Err(SelectionError::validation(format!("invalid watcher pid {}", pid)));
    }
    signal::kill(Pid::from_raw(pid), Signal::SIGHUP)
        .map_err(|e| SelectionError::signal(format!("failed to signal pid {}: {}", pid, e)))?;
    info!(pid, "Notified watcher of changed selections");
    Ok(())
}
