use crate::core::Frame;
use crate::hal::{CaptureTarget, VideoBackend, VideoSource};
use anyhow::{anyhow, Result};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct MockState {
    streams: HashMap<CaptureTarget, Vec<Frame>>,
    open_attempts: Vec<CaptureTarget>,
    fail_opens: bool,
    fail_reads: bool,
}

/// Scripted in-memory video backend.
///
/// Clones share state, so a test can keep one handle and move another into
/// a node, then inspect which targets the node tried to open.
#[derive(Clone, Default)]
pub struct MockVideoBackend {
    state: Arc<Mutex<MockState>>,
}

impl MockVideoBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a finite stream of frames for `target`.
    pub fn with_stream(self, target: CaptureTarget, frames: Vec<Frame>) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.streams.insert(target, frames);
        }
        self
    }

    /// Make every open attempt fail, even for known targets.
    pub fn fail_opens(&self, fail: bool) {
        if let Ok(mut state) = self.state.lock() {
            state.fail_opens = fail;
        }
    }

    /// Make reads on sources opened from now on fail.
    pub fn fail_reads(&self, fail: bool) {
        if let Ok(mut state) = self.state.lock() {
            state.fail_reads = fail;
        }
    }

    pub fn open_attempts(&self) -> Vec<CaptureTarget> {
        self.state
            .lock()
            .map(|state| state.open_attempts.clone())
            .unwrap_or_default()
    }
}

impl VideoBackend for MockVideoBackend {
    fn open(&mut self, target: &CaptureTarget) -> Result<Box<dyn VideoSource>> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| anyhow!("mock backend state poisoned"))?;
        state.open_attempts.push(target.clone());

        if state.fail_opens {
            return Err(anyhow!("open refused"));
        }
        let frames = state
            .streams
            .get(target)
            .ok_or_else(|| anyhow!("no such source"))?;

        Ok(Box::new(MockSource {
            frames: frames.iter().cloned().collect(),
            fail_reads: state.fail_reads,
        }))
    }
}

struct MockSource {
    frames: VecDeque<Frame>,
    fail_reads: bool,
}

impl VideoSource for MockSource {
    fn read(&mut self, frame: &mut Frame) -> Result<bool> {
        if self.fail_reads {
            return Err(anyhow!("read failed"));
        }
        match self.frames.pop_front() {
            Some(next) => {
                frame.assign(&next);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_then_exhausted() {
        let target = CaptureTarget::Device(0);
        let mut backend =
            MockVideoBackend::new().with_stream(target.clone(), vec![Frame::new(2, 2, 1)]);

        let mut source = backend.open(&target).unwrap();
        let mut frame = Frame::default();
        assert!(source.read(&mut frame).unwrap());
        assert_eq!(frame.width, 2);
        assert!(!source.read(&mut frame).unwrap());
    }

    #[test]
    fn test_records_failed_attempts() {
        let mut backend = MockVideoBackend::new();
        let handle = backend.clone();

        assert!(backend.open(&CaptureTarget::Device(3)).is_err());
        assert_eq!(handle.open_attempts(), vec![CaptureTarget::Device(3)]);
    }
}
