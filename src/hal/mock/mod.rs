pub mod video;

pub use video::MockVideoBackend;
