pub mod imshow;
pub mod video_capture;

pub use imshow::ImShow;
pub use video_capture::VideoCapture;
