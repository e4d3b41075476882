use crate::core::{Frame, NodeError, ProcessingNode, Tendrils};
use crate::hal::{CaptureTarget, NetpbmBackend, VideoBackend, VideoSource};
use anyhow::Result;
use slotflow_macros::RegisterNode;
use std::path::PathBuf;

/// Capture source: reads one frame per process call from a video file or a
/// capture device.
///
/// The source is opened lazily on the first process call. A non-empty
/// `video_file` takes precedence over `video_device`. End of stream and
/// failed reads leave `out` empty; `frame_number` counts process calls
/// either way.
#[derive(RegisterNode)]
#[node_meta(name = "VideoCapture", doc = "Use to capture video from a camera or video file.")]
pub struct VideoCapture {
    backend: Box<dyn VideoBackend>,
    source: Option<Box<dyn VideoSource>>,
    video_device: i32,
    video_file: String,
}

impl Default for VideoCapture {
    fn default() -> Self {
        Self::with_backend(NetpbmBackend::new())
    }
}

impl VideoCapture {
    pub fn with_backend(backend: impl VideoBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
            source: None,
            video_device: 0,
            video_file: String::new(),
        }
    }

    /// The target the next open attempt will use.
    pub fn target(&self) -> CaptureTarget {
        if self.video_file.is_empty() {
            CaptureTarget::Device(self.video_device)
        } else {
            CaptureTarget::File(PathBuf::from(&self.video_file))
        }
    }

    pub fn is_open(&self) -> bool {
        self.source.is_some()
    }

    fn open_source(&mut self) -> Result<()> {
        if self.source.is_some() {
            return Ok(());
        }

        let target = self.target();
        match self.backend.open(&target) {
            Ok(source) => {
                log::info!("opened {}", target);
                self.source = Some(source);
                Ok(())
            }
            Err(e) => Err(NodeError::DeviceOpenFailure {
                target,
                reason: format!("{:#}", e),
            }
            .into()),
        }
    }
}

impl ProcessingNode for VideoCapture {
    fn declare_params(&mut self, params: &mut Tendrils) -> Result<()> {
        params.declare_with_default::<i32>("video_device", "The device ID to open.", 0)?;
        params.declare_with_default::<String>(
            "video_file",
            "A video file to read, leave empty to open a video device.",
            String::new(),
        )?;
        Ok(())
    }

    fn configure(
        &mut self,
        params: &Tendrils,
        _inputs: &mut Tendrils,
        outputs: &mut Tendrils,
    ) -> Result<()> {
        self.video_device = *params.get::<i32>("video_device")?;
        self.video_file = params.get::<String>("video_file")?.clone();
        self.source = None;

        outputs.declare_with_default::<Frame>("out", "A video frame.", Frame::default())?;
        outputs.declare_with_default::<i32>("frame_number", "The number of frames captured.", 0)?;
        Ok(())
    }

    fn process(&mut self, _params: &Tendrils, _inputs: &Tendrils, outputs: &mut Tendrils) -> Result<()> {
        self.open_source()?;

        let frame = outputs.get_mut::<Frame>("out")?;
        let read = match self.source.as_mut() {
            Some(source) => source.read(frame),
            None => Ok(false),
        };
        match read {
            Ok(true) => {}
            Ok(false) => {
                log::debug!("{}: end of stream", self.target());
                frame.clear();
            }
            Err(e) => {
                log::warn!("{}: read failed: {:#}", self.target(), e);
                frame.clear();
            }
        }

        *outputs.get_mut::<i32>("frame_number")? += 1;
        Ok(())
    }
}
