use std::fmt;
use std::path::PathBuf;

/// What a capture node asks its backend to open.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CaptureTarget {
    File(PathBuf),
    Device(i32),
}

impl fmt::Display for CaptureTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "video file {}", path.display()),
            Self::Device(index) => write!(f, "video device {}", index),
        }
    }
}
