pub mod capture;
pub mod controller;
pub mod state;

pub use capture::{ChannelCapture, FileReplayCapture, MediaCapture, MediaChunk};
pub use controller::SessionRecorder;
pub use state::{RecorderState, RecorderStatus};
