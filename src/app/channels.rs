//! Command mailbox between the web task and the control loop.
//!
//! Uses an `embassy-sync` bounded channel so any execution context can
//! post commands without touching the control loop's state. The loop
//! owner drains the mailbox between ticks.
//!
//! ```text
//! ┌──────────────┐  ControlCommand  ┌──────────────┐
//! │   Web task   │─────────────────▶│ Control loop │
//! │  / button    │                  │  (owner)     │
//! └──────────────┘                  └──────────────┘
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::warn;

use super::commands::ControlCommand;

/// Channel depth for inbound commands.
pub const CMD_DEPTH: usize = 8;

/// Inbound command channel: any task → control loop.
pub static CMD_CHANNEL: Channel<CriticalSectionRawMutex, ControlCommand, CMD_DEPTH> =
    Channel::new();

/// Post a command without blocking. Returns `false` if the mailbox is full.
pub fn post_command(cmd: ControlCommand) -> bool {
    match CMD_CHANNEL.try_send(cmd) {
        Ok(()) => true,
        Err(_) => {
            warn!("Command mailbox full, dropping command");
            false
        }
    }
}

/// Hand every queued command to `f`, oldest first. Returns how many ran.
pub fn drain_commands(mut f: impl FnMut(ControlCommand)) -> usize {
    let mut n = 0;
    while let Ok(cmd) = CMD_CHANNEL.try_receive() {
        f(cmd);
        n += 1;
    }
    n
}
