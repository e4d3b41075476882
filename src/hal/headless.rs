use crate::core::Frame;
use crate::hal::DisplayBackend;
use anyhow::{anyhow, Result};
use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Everything a headless display has been asked to do.
#[derive(Debug, Clone, Default)]
pub struct DisplayLog {
    /// Window name and keep-ratio flag, in creation order
    pub windows: Vec<(String, bool)>,
    pub frames_shown: usize,
    pub last_frame: HashMap<String, Frame>,
    pub waits: Vec<i32>,
}

/// Display backend with no window system.
///
/// Frames are recorded rather than drawn. Key events come from a channel:
/// [`HeadlessDisplay::with_keys`] hands out the sending side. Once every
/// sender is gone a key wait returns "no key" immediately.
#[derive(Clone)]
pub struct HeadlessDisplay {
    log: Arc<Mutex<DisplayLog>>,
    keys: Receiver<i32>,
}

/// Feeds key presses to a [`HeadlessDisplay`].
#[derive(Clone)]
pub struct KeySender(Sender<i32>);

impl KeySender {
    /// Returns false if the display is gone.
    pub fn press(&self, key: i32) -> bool {
        self.0.send(key).is_ok()
    }
}

impl HeadlessDisplay {
    /// A display without a keyboard.
    pub fn new() -> Self {
        let (_, keys) = bounded(0);
        Self {
            log: Arc::default(),
            keys,
        }
    }

    pub fn with_keys() -> (Self, KeySender) {
        let (tx, keys) = unbounded();
        let display = Self {
            log: Arc::default(),
            keys,
        };
        (display, KeySender(tx))
    }

    /// Snapshot of what has been shown so far.
    pub fn log(&self) -> DisplayLog {
        self.log.lock().map(|log| log.clone()).unwrap_or_default()
    }

    fn record<F: FnOnce(&mut DisplayLog)>(&self, f: F) -> Result<()> {
        let mut guard = self
            .log
            .lock()
            .map_err(|_| anyhow!("display log poisoned"))?;
        f(&mut *guard);
        Ok(())
    }
}

impl Default for HeadlessDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayBackend for HeadlessDisplay {
    fn named_window(&mut self, name: &str, keep_ratio: bool) -> Result<()> {
        self.record(|state| {
            if !state.windows.iter().any(|(existing, _)| existing == name) {
                log::debug!("creating window '{}' (keep ratio: {})", name, keep_ratio);
                state.windows.push((name.to_string(), keep_ratio));
            }
        })
    }

    fn show(&mut self, name: &str, frame: &Frame) -> Result<()> {
        log::trace!(
            "window '{}': {}x{}x{}",
            name,
            frame.width,
            frame.height,
            frame.channels
        );
        self.record(|state| {
            state.frames_shown += 1;
            state.last_frame
                .entry(name.to_string())
                .or_default()
                .assign(frame);
        })
    }

    fn wait_key(&mut self, millis: i32) -> Result<Option<i32>> {
        self.record(|state| state.waits.push(millis))?;

        let key = match millis {
            0 => self.keys.recv().ok(),
            ms if ms > 0 => match self.keys.recv_timeout(Duration::from_millis(ms as u64)) {
                Ok(key) => Some(key),
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
            },
            _ => self.keys.try_recv().ok(),
        };
        Ok(key)
    }
}
