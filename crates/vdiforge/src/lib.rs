//! Create a VirtualBox VDI image from a signed CoreOS release.
//!
//! The security-relevant work lives in [`pipeline`]: fetching the release's
//! clearsigned DIGESTS manifest, verifying its signature against a pinned
//! key, and confirming the streamed image download matches the manifest's
//! digests before anything downstream touches it. The remaining modules are
//! thin collaborators: URL layout, bzip2 decompression, `VBoxManage`
//! invocation, and terminal output.

pub mod cli;
pub mod convert;
pub mod pipeline;
pub mod release;
pub mod ui;
pub mod unpack;
