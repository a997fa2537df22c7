//! Download bookkeeping module.
//!
//! Remembers which videos were offered to whom, runs downloads with a
//! concurrency limit, and owns the staged files until they are uploaded.

mod file;
mod runner;
mod state;

pub use file::MediaFile;
pub use runner::DownloadRunner;
pub use state::{RememberedVideo, VideoMemory};
