use std::io::Cursor;

use pgp::cleartext::CleartextSignedMessage;
use pgp::composed::{Deserializable, SignedPublicKey};
use pgp::types::{KeyId, PublicKeyTrait};

use crate::error::{ManifestError, Result};

/// Operator-supplied public keys a manifest signature may verify against.
///
/// The keyring answers authenticity only. A keyring can legitimately hold
/// several keys, so a valid signature still has to pass the pinned key-id
/// check before the manifest is trusted.
pub struct Keyring {
    keys: Vec<SignedPublicKey>,
}

/// Outcome of a successful clearsign verification: the signature-stripped
/// manifest body plus the id of the key that actually signed it.
#[derive(Debug, Clone)]
pub struct VerifiedManifest {
    pub body: String,
    pub signer_key_id: u64,
}

impl Keyring {
    /// Load one or more armored public keys.
    pub fn from_armored(armored: &[u8]) -> Result<Self> {
        let (keys, _headers) = SignedPublicKey::from_armor_many(Cursor::new(armored))
            .map_err(ManifestError::InvalidKey)?;
        let keys = keys
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(ManifestError::InvalidKey)?;
        if keys.is_empty() {
            return Err(ManifestError::EmptyKeyring);
        }
        Ok(Self { keys })
    }

    /// Decode a clearsigned document, check its detached signature, and
    /// authorize the signer against `trusted_key_id`.
    ///
    /// Any failure means no digest in the document may be believed:
    /// a malformed container, a signature no keyring key verifies, or a
    /// cryptographically valid signature from the wrong key are all fatal.
    pub fn verify_clearsigned(
        &self,
        document: &str,
        trusted_key_id: u64,
    ) -> Result<VerifiedManifest> {
        let (msg, _headers) =
            CleartextSignedMessage::from_string(document).map_err(ManifestError::Malformed)?;

        let mut signer: Option<u64> = None;
        'keys: for key in &self.keys {
            if let Ok(sig) = msg.verify(key) {
                signer = Some(signer_key_id(sig, &key.key_id()));
                break;
            }
            for subkey in &key.public_subkeys {
                if let Ok(sig) = msg.verify(subkey) {
                    signer = Some(signer_key_id(sig, &subkey.key_id()));
                    break 'keys;
                }
            }
        }

        let signer = signer.ok_or(ManifestError::SignatureInvalid)?;
        tracing::debug!(target: "vdiforge_manifest", signer = format_args!("{signer:016X}"), "signature verified");

        // Authorization on top of authenticity: full-width numeric equality,
        // never a substring match.
        if signer != trusted_key_id {
            return Err(ManifestError::UntrustedKey {
                signer,
                trusted: trusted_key_id,
            });
        }

        Ok(VerifiedManifest {
            body: msg.text().to_string(),
            signer_key_id: signer,
        })
    }
}

/// Decode a pinned key id from its 16-hex-character form into the 64-bit
/// value used for comparison.
pub fn decode_key_id(hex_id: &str) -> Result<u64> {
    let bytes = hex::decode(hex_id).map_err(|_| ManifestError::InvalidKeyId(hex_id.to_string()))?;
    let bytes: [u8; 8] = bytes
        .try_into()
        .map_err(|_| ManifestError::InvalidKeyId(hex_id.to_string()))?;
    Ok(u64::from_be_bytes(bytes))
}

/// Id of the key that produced a signature, preferring the signature's own
/// issuer subpacket over the key that happened to verify it.
fn signer_key_id(sig: &pgp::StandaloneSignature, verifying_key: &KeyId) -> u64 {
    sig.signature
        .issuer()
        .first()
        .map(|id| key_id_u64(id))
        .unwrap_or_else(|| key_id_u64(verifying_key))
}

fn key_id_u64(id: &KeyId) -> u64 {
    // Key ids are 8 bytes on the wire.
    u64::from_be_bytes(id.as_ref().try_into().unwrap_or([0; 8]))
}
