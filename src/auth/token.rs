//! Cached bearer-token record and freshness helpers.

// self
use crate::{_prelude::*, auth::SecretString};

/// Short-lived bearer token together with its local expiry instant.
///
/// Overwritten wholesale on every refresh and never persisted across process
/// restarts. The expiry always carries a safety margin below the token's true
/// server-side lifetime, so `now < expires_at` implies the token is still
/// accepted remotely.
#[derive(Clone)]
pub struct CachedToken {
	token: SecretString,
	expires_at: OffsetDateTime,
}
impl CachedToken {
	/// Wraps a token with its local expiry instant.
	pub fn new(token: impl Into<String>, expires_at: OffsetDateTime) -> Self {
		Self { token: SecretString::new(token), expires_at }
	}

	/// Returns `true` while the token may still be used.
	pub fn is_fresh_at(&self, instant: OffsetDateTime) -> bool {
		instant < self.expires_at
	}

	/// The bearer token value; callers must avoid logging it.
	pub fn token(&self) -> &SecretString {
		&self.token
	}

	/// Local expiry instant including the safety margin.
	pub fn expires_at(&self) -> OffsetDateTime {
		self.expires_at
	}
}
impl Debug for CachedToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CachedToken")
			.field("token", &"<redacted>")
			.field("expires_at", &self.expires_at)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	#[test]
	fn freshness_is_strict_before_expiry() {
		let token = CachedToken::new("T", macros::datetime!(2025-01-01 01:00 UTC));

		assert!(token.is_fresh_at(macros::datetime!(2025-01-01 00:59 UTC)));
		assert!(!token.is_fresh_at(macros::datetime!(2025-01-01 01:00 UTC)));
		assert!(!token.is_fresh_at(macros::datetime!(2025-01-01 01:01 UTC)));
	}

	#[test]
	fn debug_output_redacts_the_token() {
		let token = CachedToken::new("T-secret", macros::datetime!(2025-01-01 01:00 UTC));
		let rendered = format!("{token:?}");

		assert!(!rendered.contains("T-secret"));
		assert!(rendered.contains("<redacted>"));
	}
}
