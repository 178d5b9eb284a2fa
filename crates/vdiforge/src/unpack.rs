//! bzip2 decompression of the verified download.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use bzip2::read::BzDecoder;

/// Decompress `src` into `dest`, returning the decompressed size.
///
/// Runs only after the pipeline reached `Trusted`; the input file is the
/// artifact whose digests were just verified.
pub async fn decompress_bz2(src: &Path, dest: &Path) -> io::Result<u64> {
    let src = PathBuf::from(src);
    let dest = PathBuf::from(dest);
    tokio::task::spawn_blocking(move || {
        let input = File::open(&src)?;
        let mut reader = BzDecoder::new(BufReader::new(input));
        let mut output = File::create(&dest)?;
        io::copy(&mut reader, &mut output)
    })
    .await
    .map_err(|err| io::Error::other(err))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn round_trips_bzip2_data() {
        let dir = tempfile::tempdir().unwrap();
        let compressed = dir.path().join("image.bin.bz2");
        let raw = dir.path().join("image.bin");

        let payload = b"raw disk image bytes".repeat(64);
        let mut encoder =
            bzip2::write::BzEncoder::new(File::create(&compressed).unwrap(), bzip2::Compression::fast());
        encoder.write_all(&payload).unwrap();
        encoder.finish().unwrap();

        let written = decompress_bz2(&compressed, &raw).await.unwrap();
        assert_eq!(written, payload.len() as u64);
        assert_eq!(std::fs::read(&raw).unwrap(), payload);
    }

    #[tokio::test]
    async fn garbage_input_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let compressed = dir.path().join("image.bin.bz2");
        std::fs::write(&compressed, b"not bzip2").unwrap();

        let result = decompress_bz2(&compressed, &dir.path().join("image.bin")).await;
        assert!(result.is_err());
    }
}
