//! In-memory bearer-token cache with refresh-on-stale semantics.

// self
use crate::{
	_prelude::*,
	auth::{CachedToken, SecretString},
	clock::Clock,
};

/// Owned, injectable holder of the current bearer token and its expiry.
///
/// Shared mutable state across concurrent proof calls: freshness checks go
/// through a `parking_lot` read lock, while refreshes serialize on an async
/// single-flight guard so concurrent callers observing a stale token coalesce
/// into one authorization instead of stampeding the authorize endpoint. A
/// failed refresh commits nothing; the next caller retries cleanly.
pub struct TokenCache {
	current: RwLock<Option<CachedToken>>,
	refresh_guard: AsyncMutex<()>,
	safety_window: Duration,
}
impl TokenCache {
	/// Creates an empty cache whose refreshed tokens live for
	/// `safety_window` locally.
	///
	/// The window must stay strictly below the token's true server-side
	/// lifetime so a racing local clock never presents an expired token.
	pub fn new(safety_window: Duration) -> Self {
		Self { current: RwLock::new(None), refresh_guard: AsyncMutex::new(()), safety_window }
	}

	/// Creates a cache seeded with a pre-obtained token.
	///
	/// The true issuance instant is unknown, so the seed assumes the
	/// conservative `assumed_remaining` lifetime from `now`.
	pub fn seeded(
		token: &SecretString,
		now: OffsetDateTime,
		assumed_remaining: Duration,
		safety_window: Duration,
	) -> Self {
		let cache = Self::new(safety_window);

		*cache.current.write() = Some(CachedToken::new(token.expose(), now + assumed_remaining));

		cache
	}

	/// Returns the cached token if it is still fresh, refreshing otherwise.
	///
	/// `authorize` runs at most once per stale observation; callers that lose
	/// the single-flight race re-check the cache and reuse the winner's
	/// token. No expired token is ever returned regardless of interleaving.
	pub async fn ensure_fresh<F, Fut>(&self, clock: &dyn Clock, authorize: F) -> Result<SecretString>
	where
		F: FnOnce() -> Fut,
		Fut: Future<Output = Result<SecretString>>,
	{
		if let Some(token) = self.fresh_token(clock.now()) {
			return Ok(token);
		}

		let _singleflight = self.refresh_guard.lock().await;

		if let Some(token) = self.fresh_token(clock.now()) {
			return Ok(token);
		}

		let token = authorize().await?;

		*self.current.write() =
			Some(CachedToken::new(token.expose(), clock.now() + self.safety_window));

		Ok(token)
	}

	/// Returns a snapshot of the current record, fresh or not.
	pub fn current(&self) -> Option<CachedToken> {
		self.current.read().clone()
	}

	fn fresh_token(&self, now: OffsetDateTime) -> Option<SecretString> {
		self.current
			.read()
			.as_ref()
			.filter(|record| record.is_fresh_at(now))
			.map(|record| record.token().clone())
	}
}
impl Debug for TokenCache {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenCache")
			.field("current", &self.current.read())
			.field("safety_window", &self.safety_window)
			.finish_non_exhaustive()
	}
}
