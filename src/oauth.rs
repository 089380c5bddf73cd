//! OAuth 2.0 refresh-token grant built on the `oauth2` crate.
//!
//! [`OAuth2Refresher`] implements [`Refresher`] by posting `grant_type=refresh_token` to a token
//! endpoint. The new credential expires `expires_in` seconds after the configured clock's `now`.
//! Providers that do not rotate refresh tokens omit one from the response; the submitted token is
//! kept in that case.

pub use oauth2;

// crates.io
use oauth2::{
	AuthType, ClientId, ClientSecret, EndpointNotSet, EndpointSet, HttpClientError, RefreshToken,
	RequestTokenError, Scope, TokenResponse, TokenUrl,
	basic::{BasicClient, BasicErrorResponse, BasicRequestTokenError, BasicTokenResponse},
};
// self
use crate::{
	_prelude::*,
	clock::{Clock, SystemClock},
	credential::Credential,
	error::{ConfigError, TransientError, TransportError},
	http::{ReqwestHttpClient, ResponseMetadata, ResponseMetadataSlot},
	refresher::{RefreshFuture, Refresher},
};

type ConfiguredBasicClient =
	BasicClient<EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Client authentication modes for token endpoint calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ClientAuthMethod {
	#[default]
	/// HTTP Basic with `client_id`/`client_secret`.
	ClientSecretBasic,
	/// Form POST body parameters for `client_id`/`client_secret`.
	ClientSecretPost,
}

/// Builder for [`OAuth2Refresher`].
#[derive(Clone)]
pub struct OAuth2RefresherBuilder {
	client_id: String,
	token_endpoint: Url,
	client_secret: Option<String>,
	client_auth_method: ClientAuthMethod,
	scopes: Vec<String>,
	http_client: Option<ReqwestHttpClient>,
	clock: Option<Arc<dyn Clock>>,
}
impl OAuth2RefresherBuilder {
	/// Sets the client secret for confidential clients.
	pub fn client_secret(mut self, secret: impl Into<String>) -> Self {
		self.client_secret = Some(secret.into());

		self
	}

	/// Overrides how the client authenticates (defaults to HTTP Basic).
	pub fn client_auth_method(mut self, method: ClientAuthMethod) -> Self {
		self.client_auth_method = method;

		self
	}

	/// Requests the given scopes on every refresh.
	pub fn scopes<I, S>(mut self, scopes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.scopes = scopes.into_iter().map(Into::into).collect();

		self
	}

	/// Reuses a caller-provided HTTP client.
	pub fn http_client(mut self, client: ReqwestHttpClient) -> Self {
		self.http_client = Some(client);

		self
	}

	/// Injects the clock used to turn `expires_in` into an absolute expiry.
	pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = Some(clock);

		self
	}

	/// Consumes the builder and produces an [`OAuth2Refresher`].
	pub fn build(self) -> Result<OAuth2Refresher, ConfigError> {
		let token_url = TokenUrl::new(self.token_endpoint.to_string())
			.map_err(|source| ConfigError::InvalidEndpoint { source })?;
		let mut oauth_client =
			BasicClient::new(ClientId::new(self.client_id)).set_token_uri(token_url);

		if let Some(secret) = self.client_secret {
			oauth_client = oauth_client.set_client_secret(ClientSecret::new(secret));
		}
		if matches!(self.client_auth_method, ClientAuthMethod::ClientSecretPost) {
			oauth_client = oauth_client.set_auth_type(AuthType::RequestBody);
		}

		Ok(OAuth2Refresher {
			oauth_client,
			http_client: self.http_client.unwrap_or_default(),
			clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
			scopes: self.scopes,
		})
	}
}
impl Debug for OAuth2RefresherBuilder {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OAuth2RefresherBuilder")
			.field("client_id", &self.client_id)
			.field("token_endpoint", &self.token_endpoint.as_str())
			.field("client_secret_set", &self.client_secret.is_some())
			.field("client_auth_method", &self.client_auth_method)
			.field("scopes", &self.scopes)
			.finish()
	}
}

/// [`Refresher`] that performs the `refresh_token` grant against an OAuth 2.0 token endpoint.
pub struct OAuth2Refresher {
	oauth_client: ConfiguredBasicClient,
	http_client: ReqwestHttpClient,
	clock: Arc<dyn Clock>,
	scopes: Vec<String>,
}
impl OAuth2Refresher {
	/// Starts a builder for the given client identifier and token endpoint.
	pub fn builder(client_id: impl Into<String>, token_endpoint: Url) -> OAuth2RefresherBuilder {
		OAuth2RefresherBuilder {
			client_id: client_id.into(),
			token_endpoint,
			client_secret: None,
			client_auth_method: ClientAuthMethod::default(),
			scopes: Vec::new(),
			http_client: None,
			clock: None,
		}
	}
}
impl Refresher for OAuth2Refresher {
	fn refresh<'a>(&'a self, refresh_token: &'a str) -> RefreshFuture<'a> {
		let meta = ResponseMetadataSlot::default();

		Box::pin(async move {
			let instrumented = self.http_client.instrumented(meta.clone());
			let refresh_secret = RefreshToken::new(refresh_token.to_owned());
			let mut request = self.oauth_client.exchange_refresh_token(&refresh_secret);

			for scope in &self.scopes {
				request = request.add_scope(Scope::new(scope.to_owned()));
			}

			let response = request
				.request_async(&instrumented)
				.await
				.map_err(|err| map_request_error(meta.take(), err))?;

			map_refresh_token_response(response, refresh_token, self.clock.now())
		})
	}
}
impl Debug for OAuth2Refresher {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OAuth2Refresher")
			.field("token_endpoint", &self.oauth_client.token_uri().as_str())
			.field("scopes", &self.scopes)
			.finish()
	}
}

fn map_refresh_token_response(
	response: BasicTokenResponse,
	submitted_refresh: &str,
	now: OffsetDateTime,
) -> Result<Credential> {
	let expires_in = response.expires_in().ok_or(ConfigError::MissingExpiresIn)?.as_secs();
	let expires_in = i64::try_from(expires_in).map_err(|_| ConfigError::ExpiresInOutOfRange)?;

	if expires_in <= 0 {
		return Err(ConfigError::NonPositiveExpiresIn.into());
	}

	let expires_at = now
		.checked_add(Duration::seconds(expires_in))
		.ok_or(ConfigError::ExpiresInOutOfRange)?;
	let refresh_token = response
		.refresh_token()
		.map(|token| token.secret().to_owned())
		.unwrap_or_else(|| submitted_refresh.to_owned());

	Ok(Credential::new(response.access_token().secret().to_owned(), refresh_token, expires_at)?)
}

fn map_request_error(
	meta: Option<ResponseMetadata>,
	err: BasicRequestTokenError<HttpClientError<ReqwestError>>,
) -> Error {
	let meta_ref = meta.as_ref();

	match err {
		RequestTokenError::ServerResponse(response) =>
			map_server_response_error(response, meta_ref),
		RequestTokenError::Request(error) => map_transport_error(meta_ref, error),
		RequestTokenError::Parse(error, _body) =>
			TransientError::TokenResponseParse { source: error, status: meta_status(meta_ref) }
				.into(),
		RequestTokenError::Other(message) => TransientError::TokenEndpoint {
			message: format!("Token endpoint returned an unexpected response: {message}."),
			status: meta_status(meta_ref),
			retry_after: meta_retry_after(meta_ref),
		}
		.into(),
	}
}

fn map_server_response_error(response: BasicErrorResponse, meta: Option<&ResponseMetadata>) -> Error {
	let code = response.error().as_ref().to_owned();
	let message = match response.error_description() {
		Some(description) => format!("Token endpoint returned an OAuth error: {description}."),
		None => format!("Token endpoint returned an OAuth error: {code}."),
	};

	match classify_oauth_error(&code).or_else(|| {
		response.error_description().and_then(|description| classify_oauth_error(description.as_str()))
	}) {
		Some(OAuthErrorKind::InvalidGrant) => Error::InvalidGrant { reason: message },
		Some(OAuthErrorKind::InvalidClient) => Error::InvalidClient { reason: message },
		None => TransientError::TokenEndpoint {
			message,
			status: meta_status(meta),
			retry_after: meta_retry_after(meta),
		}
		.into(),
	}
}

fn map_transport_error(meta: Option<&ResponseMetadata>, err: HttpClientError<ReqwestError>) -> Error {
	match err {
		HttpClientError::Reqwest(inner) => map_reqwest_error(meta, *inner),
		HttpClientError::Http(inner) => ConfigError::from(inner).into(),
		HttpClientError::Io(inner) => TransportError::Io(inner).into(),
		HttpClientError::Other(message) => TransientError::TokenEndpoint {
			message: format!(
				"HTTP client error occurred while calling the token endpoint: {message}."
			),
			status: meta_status(meta),
			retry_after: meta_retry_after(meta),
		}
		.into(),
		_ => TransientError::TokenEndpoint {
			message: "HTTP client error occurred while calling the token endpoint.".into(),
			status: meta_status(meta),
			retry_after: meta_retry_after(meta),
		}
		.into(),
	}
}

fn map_reqwest_error(meta: Option<&ResponseMetadata>, err: ReqwestError) -> Error {
	if err.is_builder() {
		return ConfigError::from(err).into();
	}
	if err.is_timeout() {
		return TransientError::TokenEndpoint {
			message: "Request timed out while calling the token endpoint.".into(),
			status: meta_status(meta).or_else(|| err.status().map(|code| code.as_u16())),
			retry_after: meta_retry_after(meta),
		}
		.into();
	}

	TransportError::from(err).into()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum OAuthErrorKind {
	InvalidGrant,
	InvalidClient,
}

fn classify_oauth_error(value: &str) -> Option<OAuthErrorKind> {
	let lowered = value.to_ascii_lowercase();

	if lowered.contains("invalid_grant") || lowered.contains("access_denied") {
		Some(OAuthErrorKind::InvalidGrant)
	} else if lowered.contains("invalid_client") || lowered.contains("unauthorized_client") {
		Some(OAuthErrorKind::InvalidClient)
	} else {
		None
	}
}

fn meta_status(meta: Option<&ResponseMetadata>) -> Option<u16> {
	meta.and_then(|value| value.status)
}

fn meta_retry_after(meta: Option<&ResponseMetadata>) -> Option<Duration> {
	meta.and_then(|value| value.retry_after)
}
