pub mod headless;
pub mod mock;
pub mod netpbm;
pub mod traits;

pub use headless::{DisplayLog, HeadlessDisplay, KeySender};
pub use mock::MockVideoBackend;
pub use netpbm::NetpbmBackend;
pub use traits::{CaptureTarget, DisplayBackend, VideoBackend, VideoSource};
