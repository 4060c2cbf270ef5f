//! Time-bound request signature derivation.
//!
//! The payout API authenticates sensitive calls with an asymmetric signature
//! header: the plaintext `client_id + "." + unix_seconds` is RSA-OAEP
//! encrypted and base64 encoded. The embedded timestamp binds each signature
//! to a narrow validity window, so a signature is computed fresh for every
//! authorization attempt and never cached or reused.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
use rsa::{
	Oaep, RsaPrivateKey, RsaPublicKey,
	pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey},
	pkcs8::{DecodePrivateKey, DecodePublicKey},
};
use sha2::Sha256;
// self
use crate::{_prelude::*, error::CryptoError};

/// Derives base64-encoded RSA-OAEP signatures bound to a timestamp.
#[derive(Clone)]
pub struct SignatureGenerator {
	key: RsaPublicKey,
}
impl SignatureGenerator {
	/// Parses PEM key material into a generator.
	///
	/// Accepts an RSA public key (SPKI or PKCS#1) directly, or a private key
	/// (PKCS#8 or PKCS#1) whose public half is derived. Any other material
	/// fails with [`CryptoError::InvalidKey`].
	pub fn from_pem(pem: &str) -> Result<Self, CryptoError> {
		if let Ok(key) = RsaPublicKey::from_public_key_pem(pem) {
			return Ok(Self { key });
		}
		if let Ok(key) = RsaPublicKey::from_pkcs1_pem(pem) {
			return Ok(Self { key });
		}
		if let Ok(key) = RsaPrivateKey::from_pkcs8_pem(pem) {
			return Ok(Self { key: key.to_public_key() });
		}

		match RsaPrivateKey::from_pkcs1_pem(pem) {
			Ok(key) => Ok(Self { key: key.to_public_key() }),
			Err(e) => Err(CryptoError::invalid_key(e)),
		}
	}

	/// Encrypts `identifier + "." + unix_seconds` and base64 encodes the
	/// ciphertext.
	///
	/// Pure apart from OAEP randomness; the caller supplies the instant so
	/// freshness stays under the caller's (injectable) clock.
	pub fn sign(&self, identifier: &str, at: OffsetDateTime) -> Result<String, CryptoError> {
		let plaintext = format!("{identifier}.{}", at.unix_timestamp());
		let mut rng = rand::rngs::OsRng;
		let ciphertext = self
			.key
			.encrypt(&mut rng, Oaep::new::<Sha256>(), plaintext.as_bytes())
			.map_err(|source| CryptoError::Encrypt { source })?;

		Ok(STANDARD.encode(ciphertext))
	}
}
impl Debug for SignatureGenerator {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SignatureGenerator").finish_non_exhaustive()
	}
}
