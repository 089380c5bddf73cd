//! Immutable credential snapshots rotated by the provider and persisted by stores.

pub mod secret;

pub use secret::TokenSecret;

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use sha2::{Digest, Sha256};
// self
use crate::_prelude::*;

const FINGERPRINT_LEN: usize = 12;

/// Errors produced when a credential snapshot is incomplete.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum CredentialError {
	/// The access token was absent or empty.
	#[error("Access token is required.")]
	MissingAccessToken,
	/// The refresh token was absent or empty.
	#[error("Refresh token is required.")]
	MissingRefreshToken,
	/// The expiry was absent or left at its zero value.
	#[error("Expiry must be set to an instant after the Unix epoch.")]
	MissingExpiry,
}

/// Immutable `{access token, refresh token, expiry}` snapshot.
///
/// A refresh always produces a brand-new value; nothing mutates a credential in place. The
/// serialized form uses the `AccessToken`, `RefreshToken`, and `ExpiresAt` keys with an RFC 3339
/// timestamp, and deserialization rejects snapshots missing any of the three.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", try_from = "RawCredential")]
pub struct Credential {
	access_token: TokenSecret,
	refresh_token: TokenSecret,
	#[serde(with = "time::serde::rfc3339")]
	expires_at: OffsetDateTime,
}
impl Credential {
	/// Validates and builds a credential snapshot.
	pub fn new(
		access_token: impl Into<String>,
		refresh_token: impl Into<String>,
		expires_at: OffsetDateTime,
	) -> Result<Self, CredentialError> {
		let access_token = TokenSecret::new(access_token);
		let refresh_token = TokenSecret::new(refresh_token);

		if access_token.is_empty() {
			return Err(CredentialError::MissingAccessToken);
		}
		if refresh_token.is_empty() {
			return Err(CredentialError::MissingRefreshToken);
		}
		if expires_at <= OffsetDateTime::UNIX_EPOCH {
			return Err(CredentialError::MissingExpiry);
		}

		Ok(Self { access_token, refresh_token, expires_at })
	}

	/// Bearer token handed to callers.
	pub fn access_token(&self) -> &TokenSecret {
		&self.access_token
	}

	/// Refresh token submitted to the identity provider on the next rotation.
	pub fn refresh_token(&self) -> &TokenSecret {
		&self.refresh_token
	}

	/// Instant the access token stops being valid.
	pub fn expires_at(&self) -> OffsetDateTime {
		self.expires_at
	}

	/// Instant at which a proactive refresh becomes due for the given buffer.
	pub fn refresh_at(&self, buffer: Duration) -> OffsetDateTime {
		self.expires_at.checked_sub(buffer).unwrap_or(OffsetDateTime::UNIX_EPOCH)
	}

	/// Returns `true` once `now` reaches `expires_at - buffer`.
	pub fn is_due_at(&self, now: OffsetDateTime, buffer: Duration) -> bool {
		now >= self.refresh_at(buffer)
	}

	/// Remaining lifetime relative to `now`; negative once expired.
	pub fn expires_in_at(&self, now: OffsetDateTime) -> Duration {
		self.expires_at - now
	}

	/// Short digest of the access token that can be logged safely.
	pub fn fingerprint(&self) -> String {
		let digest = Sha256::digest(self.access_token.expose().as_bytes());
		let mut encoded = URL_SAFE_NO_PAD.encode(digest);

		encoded.truncate(FINGERPRINT_LEN);

		encoded
	}
}
impl Debug for Credential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credential")
			.field("access_token", &"<redacted>")
			.field("refresh_token", &"<redacted>")
			.field("expires_at", &self.expires_at)
			.finish()
	}
}

/// Wire shape accepted on deserialization before validation.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct RawCredential {
	#[serde(default)]
	pub(crate) access_token: Option<String>,
	#[serde(default)]
	pub(crate) refresh_token: Option<String>,
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub(crate) expires_at: Option<OffsetDateTime>,
}
impl TryFrom<RawCredential> for Credential {
	type Error = CredentialError;

	fn try_from(raw: RawCredential) -> Result<Self, Self::Error> {
		Credential::new(
			raw.access_token.unwrap_or_default(),
			raw.refresh_token.unwrap_or_default(),
			raw.expires_at.unwrap_or(OffsetDateTime::UNIX_EPOCH),
		)
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	fn fixture() -> Credential {
		Credential::new("access", "refresh", macros::datetime!(2025-01-01 02:00 UTC))
			.expect("Credential fixture should be valid.")
	}

	#[test]
	fn new_rejects_missing_fields() {
		let expiry = macros::datetime!(2025-01-01 00:00 UTC);

		assert_eq!(
			Credential::new("", "refresh", expiry).expect_err("Empty access token must fail."),
			CredentialError::MissingAccessToken,
		);
		assert_eq!(
			Credential::new("access", "", expiry).expect_err("Empty refresh token must fail."),
			CredentialError::MissingRefreshToken,
		);
		assert_eq!(
			Credential::new("access", "refresh", OffsetDateTime::UNIX_EPOCH)
				.expect_err("Zero expiry must fail."),
			CredentialError::MissingExpiry,
		);
		assert_eq!(
			Credential::new("access", "refresh", macros::datetime!(1969-12-31 23:59 UTC))
				.expect_err("Pre-epoch expiry must fail."),
			CredentialError::MissingExpiry,
		);
	}

	#[test]
	fn due_predicate_includes_the_boundary() {
		let credential = fixture();
		let buffer = Duration::hours(1);

		assert!(!credential.is_due_at(macros::datetime!(2025-01-01 00:59:59 UTC), buffer));
		assert!(credential.is_due_at(macros::datetime!(2025-01-01 01:00 UTC), buffer));
		assert!(credential.is_due_at(macros::datetime!(2025-01-01 03:00 UTC), buffer));
		assert_eq!(credential.refresh_at(buffer), macros::datetime!(2025-01-01 01:00 UTC));
	}

	#[test]
	fn remaining_lifetime_turns_negative_after_expiry() {
		let credential = fixture();

		assert_eq!(
			credential.expires_in_at(macros::datetime!(2025-01-01 00:30 UTC)),
			Duration::minutes(90),
		);
		assert_eq!(
			credential.expires_in_at(macros::datetime!(2025-01-01 02:10 UTC)),
			Duration::minutes(-10),
		);
	}

	#[test]
	fn serialized_layout_uses_pascal_case_keys() {
		let value = serde_json::to_value(fixture()).expect("Credential should serialize.");

		assert_eq!(value["AccessToken"], "access");
		assert_eq!(value["RefreshToken"], "refresh");
		assert_eq!(value["ExpiresAt"], "2025-01-01T02:00:00Z");
	}

	#[test]
	fn deserialization_rejects_incomplete_snapshots() {
		let missing_refresh = r#"{"AccessToken":"a","ExpiresAt":"2025-01-01T00:00:00Z"}"#;

		assert!(serde_json::from_str::<Credential>(missing_refresh).is_err());

		let empty_access =
			r#"{"AccessToken":"","RefreshToken":"r","ExpiresAt":"2025-01-01T00:00:00Z"}"#;

		assert!(serde_json::from_str::<Credential>(empty_access).is_err());

		let complete =
			r#"{"AccessToken":"a","RefreshToken":"r","ExpiresAt":"2025-01-01T00:00:00Z"}"#;
		let credential: Credential =
			serde_json::from_str(complete).expect("Complete snapshot should deserialize.");

		assert_eq!(credential.access_token().expose(), "a");
		assert_eq!(credential.expires_at(), macros::datetime!(2025-01-01 00:00 UTC));
	}

	#[test]
	fn debug_and_fingerprint_keep_secrets_out_of_logs() {
		let credential = fixture();
		let rendered = format!("{credential:?}");

		assert!(!rendered.contains("\"access\""));
		assert!(rendered.contains("<redacted>"));

		let fingerprint = credential.fingerprint();

		assert_eq!(fingerprint.len(), FINGERPRINT_LEN);
		assert_eq!(fingerprint, fixture().fingerprint());
	}
}
