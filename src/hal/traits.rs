use crate::core::Frame;
use anyhow::Result;

pub use crate::core::CaptureTarget;

/// Opens frame sources (files, cameras)
pub trait VideoBackend: Send {
    fn open(&mut self, target: &CaptureTarget) -> Result<Box<dyn VideoSource>>;
}

/// An opened frame source. Dropping it releases the underlying handle.
pub trait VideoSource: Send {
    /// Read the next frame into `frame`, reusing its storage.
    ///
    /// Returns `Ok(false)` once the source is exhausted.
    fn read(&mut self, frame: &mut Frame) -> Result<bool>;
}

/// Window system used by display nodes
pub trait DisplayBackend: Send {
    /// Create the window if it does not exist yet.
    fn named_window(&mut self, name: &str, keep_ratio: bool) -> Result<()>;

    fn show(&mut self, name: &str, frame: &Frame) -> Result<()>;

    /// Block up to `millis` for a key press; 0 waits indefinitely.
    /// `None` means no key arrived.
    fn wait_key(&mut self, millis: i32) -> Result<Option<i32>>;
}
