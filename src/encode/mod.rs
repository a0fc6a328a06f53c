//! Frame sinks.
//!
//! Sinks consume finished loop frames in playback order. The sequencer only sees the
//! [`sink::FrameSink`] trait; which concrete sink backs a group is decided by
//! [`select::EncoderSelector`].

/// `ffmpeg` subprocess sink (H.264 MP4 via the system binary).
pub mod ffmpeg;
/// In-process animated GIF sink used when no external encoder is available.
pub mod gif;
/// Encoder choice per output file.
pub mod select;
/// Sink trait and the in-memory sink.
pub mod sink;
