/// Phase of a streaming download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPhase {
    Connecting,
    Downloading,
    Committing,
    Completed,
}

/// Snapshot passed to progress callbacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    pub phase: FetchPhase,

    /// Bytes written to the staging file so far.
    pub bytes_downloaded: u64,

    /// Total expected bytes, if the server sent Content-Length.
    pub total_bytes: Option<u64>,
}

/// Progress callback; invoked once per phase change and once per chunk while
/// downloading.
pub type ProgressFn<'a> = &'a (dyn Fn(&Progress) + Send + Sync);
