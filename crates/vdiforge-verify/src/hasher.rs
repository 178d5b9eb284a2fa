use digest::Digest;

/// Incremental digest accumulator.
///
/// Object-safe so a set of heterogeneous accumulators can sit behind one
/// fan-out; `finalize` consumes the box because RustCrypto digests are
/// finalized by value.
pub trait Hasher: Send {
    fn update(&mut self, data: &[u8]);
    fn finalize(self: Box<Self>) -> Vec<u8>;
}

/// Adapter from any RustCrypto [`Digest`] to [`Hasher`].
pub struct DigestHasher<D: Digest + Send>(D);

impl<D: Digest + Send> DigestHasher<D> {
    pub fn new() -> Self {
        Self(D::new())
    }

    /// One-shot digest of a full buffer.
    pub fn digest(data: &[u8]) -> Vec<u8> {
        D::digest(data).to_vec()
    }
}

impl<D: Digest + Send> Default for DigestHasher<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Digest + Send> Hasher for DigestHasher<D> {
    fn update(&mut self, data: &[u8]) {
        self.0.update(data);
    }

    fn finalize(self: Box<Self>) -> Vec<u8> {
        self.0.finalize().to_vec()
    }
}

pub type Sha1Hasher = DigestHasher<sha1::Sha1>;
pub type Sha512Hasher = DigestHasher<sha2::Sha512>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha1_known_vector() {
        let mut hasher = Box::new(Sha1Hasher::new());
        hasher.update(b"hello world");
        assert_eq!(
            hex::encode(hasher.finalize()),
            "2aae6c35c94fcfb415dbe95f408b9ce91ee846ed"
        );
    }

    #[test]
    fn sha512_known_vector() {
        assert_eq!(
            hex::encode(Sha512Hasher::digest(b"hello world")),
            "309ecc489c12d6eb4cc40f50c902f2b4d0ed77ee511a7c7a9bcd3ca86d4cd86f\
             989dd35bc5ff499670da34255b45b0cfd830e81f605dcf7dc5542e93ae9cd76f"
        );
    }

    #[test]
    fn incremental_matches_one_shot() {
        let data = b"incremental hashing must not depend on chunking";
        let mut hasher = Box::new(Sha512Hasher::new());
        hasher.update(&data[..7]);
        hasher.update(&data[7..]);
        assert_eq!(hasher.finalize(), Sha512Hasher::digest(data));
    }
}
