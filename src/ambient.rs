//! Ambient environment isolation
//!
//! Model readers may set process environment variables, for example to pass
//! parameters to an exporter they spawn. A generation run holds an
//! [`AmbientScope`] for its whole duration so the environment after the run
//! matches the environment before it, whether the run succeeded or not.

use std::collections::HashMap;
use std::ffi::OsString;
use tracing::debug;

/// Snapshot of the process environment, restored on drop.
#[derive(Debug)]
pub struct AmbientScope {
    original: HashMap<OsString, OsString>,
}

impl AmbientScope {
    pub fn capture() -> Self {
        Self {
            original: std::env::vars_os().collect(),
        }
    }

    /// Put the environment back to the captured state.
    ///
    /// Variables introduced since the capture are removed, changed ones get
    /// their original value back and removed ones are set again.
    pub fn restore(&self) {
        let current: HashMap<OsString, OsString> = std::env::vars_os().collect();
        let mut removed = 0;
        let mut reset = 0;

        for (key, value) in &current {
            match self.original.get(key) {
                Some(original) if original == value => {}
                Some(original) => {
                    std::env::set_var(key, original);
                    reset += 1;
                }
                None => {
                    std::env::remove_var(key);
                    removed += 1;
                }
            }
        }
        for (key, original) in &self.original {
            if !current.contains_key(key) {
                std::env::set_var(key, original);
                reset += 1;
            }
        }

        if removed + reset > 0 {
            debug!(removed, reset, "Restored ambient environment");
        }
    }
}

impl Drop for AmbientScope {
    fn drop(&mut self) {
        self.restore();
    }
}

/// Serializes tests that read or write the process environment.
#[cfg(test)]
pub(crate) static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
