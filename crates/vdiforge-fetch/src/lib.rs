//! HTTP streaming downloads with single-pass digest computation.
//!
//! The artifact being fetched is hundreds of megabytes to low gigabytes, so
//! hashing is interleaved with the download: each chunk is written to a
//! staging file, fed to every digest accumulator, and reported to the
//! progress callback before the next chunk is read. Memory stays bounded by
//! the chunk size and the bytes are never read twice.
//!
//! The staging file is renamed into place only after the stream ends cleanly;
//! a short or failed stream leaves nothing at the destination path.

pub use self::error::{FetchError, Result};
pub use self::fetcher::{DownloadReport, Fetcher};
pub use self::http::{BoxStream, HttpClient, ReqwestClient};
pub use self::progress::{FetchPhase, Progress, ProgressFn};

mod error;
mod fetcher;
mod http;
mod progress;
