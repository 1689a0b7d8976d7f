use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand_core::OsRng;

/// The base's asymmetric signing identity. Generated exactly once per
/// process lifetime; key material never touches disk.
pub struct KeyPair {
    signing: SigningKey,
}

impl KeyPair {
    pub fn generate() -> Self {
        Self {
            signing: SigningKey::generate(&mut OsRng),
        }
    }

    /// Hex-encoded public key, as attached to outbound announcements.
    pub fn public_key(&self) -> String {
        hex::encode(self.signing.verifying_key().to_bytes())
    }

    /// Sign `payload`, returning the hex-encoded signature.
    pub fn sign(&self, payload: &[u8]) -> String {
        hex::encode(self.signing.sign(payload).to_bytes())
    }
}

/// Check a hex-encoded signature over `payload` against a hex-encoded
/// public key. Malformed keys or signatures verify as false rather than
/// erroring; the caller only cares whether the announcement can be trusted.
pub fn verify(signature: &str, payload: &[u8], public_key: &str) -> bool {
    let Ok(key_bytes) = hex::decode(public_key) else {
        return false;
    };
    let Ok(key_bytes) = <[u8; 32]>::try_from(key_bytes) else {
        return false;
    };
    let Ok(key) = VerifyingKey::from_bytes(&key_bytes) else {
        return false;
    };

    let Ok(sig_bytes) = hex::decode(signature) else {
        return false;
    };
    let Ok(sig_bytes) = <[u8; 64]>::try_from(sig_bytes) else {
        return false;
    };
    let signature = Signature::from_bytes(&sig_bytes);

    key.verify(payload, &signature).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_verify_round_trip() {
        let key_pair = KeyPair::generate();
        let payload = b"announcement payload";
        let signature = key_pair.sign(payload);
        assert!(verify(&signature, payload, &key_pair.public_key()));
    }

    #[test]
    fn tampered_payload_fails() {
        let key_pair = KeyPair::generate();
        let signature = key_pair.sign(b"announcement payload");
        assert!(!verify(
            &signature,
            b"announcement payloaD",
            &key_pair.public_key()
        ));
    }

    #[test]
    fn malformed_inputs_verify_as_false() {
        let key_pair = KeyPair::generate();
        let signature = key_pair.sign(b"payload");
        assert!(!verify("not-hex", b"payload", &key_pair.public_key()));
        assert!(!verify(&signature, b"payload", "not-hex"));
        assert!(!verify(&signature, b"payload", "abcd"));
    }
}
