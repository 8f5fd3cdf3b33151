//! Record modes and the recorder that drives a cassette

mod mode;
mod recorder;

pub use mode::{Decision, RecordMode};
pub use recorder::{PlaybackStats, Recorder, Transport};
