//! Clearsigned digest-manifest verification and parsing.
//!
//! A release publishes a `DIGESTS.asc` document: free-form text listing the
//! expected digest of each release file, wrapped in an OpenPGP clearsign
//! container. Trusting a download means answering two independent questions
//! about that document before looking at a single hex digest:
//!
//! 1. **Authenticity**: does the detached signature verify against a key in
//!    the operator-supplied keyring?
//! 2. **Authorization**: is the signer the one pinned key we trust, compared
//!    by full 64-bit key id, never by substring?
//!
//! Only after both pass is the plaintext handed to the parser, which extracts
//! the expected digests for one target filename.

pub use self::error::{ManifestError, Result};
pub use self::parse::{DigestSet, parse_digests};
pub use self::trust::{Keyring, VerifiedManifest, decode_key_id};

mod error;
mod parse;
mod trust;
