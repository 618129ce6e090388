//! Authenticated session against the internship backend
//!
//! A [`Session`] owns the HTTP client, the backend origin and the
//! credential store, and funnels every authenticated call through one
//! send path:
//!
//! 1. Attach the stored access token as a bearer header.
//! 2. Send. Any status except 401 is final.
//! 3. On 401, refresh the pair once and replay the original request with
//!    the new access token. The replayed outcome is final; a second 401
//!    surfaces as-is and is never retried again.
//!
//! Refresh is single-flight: concurrent 401 handlers queue on one gate,
//! and whoever enters after the leader finds the pair already rotated
//! and replays without refreshing again. A failed refresh clears the
//! store so the process is visibly signed out.

use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::credentials::{CredentialStore, TokenPair};
use crate::error::{ApiError, Result};
use crate::types::AdvisorProfile;

const LOGIN_PATH: &str = "advisor/login/";
const REGISTER_PATH: &str = "advisor/register/";
const LOGOUT_PATH: &str = "advisor/logout/";
const REFRESH_PATH: &str = "auth/token/refresh/";

/// An outbound request and whether it has already been replayed.
///
/// Exactly one replay is allowed per original call, tracked here rather
/// than smuggled through request metadata.
struct Attempt {
    request: reqwest::Request,
    already_retried: bool,
}

/// Authenticated handle to the backend.
pub struct Session {
    http: reqwest::Client,
    base_url: String,
    store: Arc<CredentialStore>,
    refresh_gate: tokio::sync::Mutex<()>,
}

impl Session {
    /// Create a session over an injected HTTP client.
    ///
    /// The client carries transport policy (timeouts, TLS); the session
    /// carries authentication state. `base_url` is the backend origin
    /// including any API prefix, with or without a trailing slash.
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        store: Arc<CredentialStore>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http,
            base_url,
            store,
            refresh_gate: tokio::sync::Mutex::new(()),
        }
    }

    /// Whether a credential pair is currently stored.
    pub async fn is_authenticated(&self) -> bool {
        self.store.is_authenticated().await
    }

    /// The credential store backing this session.
    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        self.http.request(method, self.url(path))
    }

    /// Authenticate with username and password.
    ///
    /// On success the returned pair is stored, persisted, and becomes the
    /// session's identity. On any failure the stored state is untouched;
    /// a bad login never signs out a working session.
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenPair> {
        #[derive(Serialize)]
        struct LoginRequest<'a> {
            username: &'a str,
            password: &'a str,
        }

        let response = self
            .http
            .post(self.url(LOGIN_PATH))
            .json(&LoginRequest { username, password })
            .send()
            .await?;
        let pair: TokenPair = decode(response).await?;
        if !pair.is_complete() {
            return Err(ApiError::MalformedResponse(
                "login returned a partial credential pair".into(),
            ));
        }
        if let Err(err) = self.store.set(pair.clone()).await {
            warn!(error = %err, "credential pair not persisted, session is memory-only");
        }
        info!(username, "logged in");
        Ok(pair)
    }

    /// Create a new advisor account.
    ///
    /// No token side effects; the caller signs in separately afterwards.
    pub async fn register(&self, profile: &AdvisorProfile) -> Result<()> {
        let response = self
            .http
            .post(self.url(REGISTER_PATH))
            .json(profile)
            .send()
            .await?;
        expect_success(response).await?;
        info!(username = %profile.username, "advisor account registered");
        Ok(())
    }

    /// End the session.
    ///
    /// Backend invalidation of the refresh token is best-effort; local
    /// credentials are cleared no matter what, so the process can never
    /// keep replaying a dead session. The returned error, if any,
    /// reports the backend call.
    pub async fn logout(&self) -> Result<()> {
        #[derive(Serialize)]
        struct LogoutRequest<'a> {
            refresh: &'a str,
        }

        let backend_result = match self.store.get().await {
            Some(pair) => {
                let builder = self
                    .http
                    .post(self.url(LOGOUT_PATH))
                    .json(&LogoutRequest {
                        refresh: &pair.refresh,
                    });
                match self.execute(builder).await {
                    Ok(response) => expect_success(response).await,
                    Err(err) => Err(err),
                }
            }
            // nothing to invalidate remotely
            None => Ok(()),
        };

        if let Err(err) = self.store.clear().await {
            warn!(error = %err, "credential store not cleared cleanly");
        }
        info!("logged out");
        backend_result
    }

    /// Exchange the stored refresh token for a new access token.
    ///
    /// The stored pair is replaced on success; the refresh token carries
    /// over unless the backend rotates it. Any failure ends the session:
    /// the store is cleared and the error describes the failed exchange.
    pub async fn refresh(&self) -> Result<TokenPair> {
        let _gate = self.refresh_gate.lock().await;
        match self.store.get().await {
            Some(pair) => self.refresh_pair(pair).await,
            None => Err(ApiError::Authorization(
                "no stored credentials to refresh".into(),
            )),
        }
    }

    /// Send an authenticated request, replaying it at most once after a
    /// refresh if the first attempt came back 401.
    pub(crate) async fn execute(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let request_id = Uuid::new_v4();
        let mut attempt = Attempt {
            request: builder.build()?,
            already_retried: false,
        };

        loop {
            let sent_access = match self.store.get().await {
                Some(pair) => {
                    set_bearer(&mut attempt.request, &pair.access)?;
                    Some(pair.access)
                }
                None => None,
            };
            let replay = if attempt.already_retried {
                None
            } else {
                attempt.request.try_clone()
            };

            debug!(
                %request_id,
                method = %attempt.request.method(),
                path = attempt.request.url().path(),
                retry = attempt.already_retried,
                "sending request"
            );
            let response = self.http.execute(attempt.request).await?;

            if response.status() != StatusCode::UNAUTHORIZED || attempt.already_retried {
                return Ok(response);
            }
            let (Some(stale_access), Some(replay)) = (sent_access, replay) else {
                // No token was attached, or the body cannot be replayed;
                // there is nothing to refresh and the 401 stands.
                return Ok(response);
            };

            match self.refresh_after_401(&stale_access, request_id).await {
                Ok(_) => {
                    warn!(%request_id, "access token rejected, replaying request after refresh");
                    attempt = Attempt {
                        request: replay,
                        already_retried: true,
                    };
                }
                Err(err) => {
                    warn!(%request_id, error = %err, "refresh failed, surfacing the original response");
                    return Ok(response);
                }
            }
        }
    }

    /// Refresh on behalf of a 401 handler. Single-flight: the gate
    /// serializes refreshes, and a waiter that entered with a token the
    /// leader already rotated returns the new pair without a second
    /// exchange.
    async fn refresh_after_401(&self, stale_access: &str, request_id: Uuid) -> Result<TokenPair> {
        let _gate = self.refresh_gate.lock().await;
        match self.store.get().await {
            Some(pair) if pair.access != stale_access => {
                debug!(%request_id, "pair already rotated by a concurrent refresh");
                Ok(pair)
            }
            Some(pair) => self.refresh_pair(pair).await,
            None => Err(ApiError::Authorization(
                "no stored credentials to refresh".into(),
            )),
        }
    }

    /// Perform the refresh exchange. Callers hold the refresh gate.
    async fn refresh_pair(&self, current: TokenPair) -> Result<TokenPair> {
        #[derive(Serialize)]
        struct RefreshRequest<'a> {
            refresh: &'a str,
        }

        // the backend always returns a fresh access token and sometimes
        // rotates the refresh token alongside it
        #[derive(Deserialize)]
        struct RefreshResponse {
            access: String,
            #[serde(default)]
            refresh: Option<String>,
        }

        let outcome: Result<RefreshResponse> = async {
            let response = self
                .http
                .post(self.url(REFRESH_PATH))
                .json(&RefreshRequest {
                    refresh: &current.refresh,
                })
                .send()
                .await?;
            let refreshed: RefreshResponse = decode(response).await?;
            if refreshed.access.is_empty() {
                return Err(ApiError::MalformedResponse(
                    "refresh returned an empty access token".into(),
                ));
            }
            Ok(refreshed)
        }
        .await;

        match outcome {
            Ok(refreshed) => {
                let pair = TokenPair {
                    access: refreshed.access,
                    refresh: refreshed
                        .refresh
                        .filter(|r| !r.is_empty())
                        .unwrap_or(current.refresh),
                };
                if let Err(err) = self.store.set(pair.clone()).await {
                    warn!(error = %err, "refreshed pair not persisted, session is memory-only");
                }
                info!("access token refreshed");
                Ok(pair)
            }
            Err(err) => {
                warn!(error = %err, "refresh failed, clearing stored session");
                if let Err(clear_err) = self.store.clear().await {
                    warn!(error = %clear_err, "credential store not cleared cleanly");
                }
                Err(err)
            }
        }
    }
}

fn set_bearer(request: &mut reqwest::Request, access: &str) -> Result<()> {
    let mut value = HeaderValue::from_str(&format!("Bearer {access}")).map_err(|_| {
        ApiError::Authorization("stored access token is not valid in a header".into())
    })?;
    value.set_sensitive(true);
    request.headers_mut().insert(AUTHORIZATION, value);
    Ok(())
}

/// Read the body, classify non-success statuses, decode success bodies.
pub(crate) async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let bytes = response.bytes().await?;
    if !status.is_success() {
        return Err(ApiError::from_response(status, &bytes));
    }
    serde_json::from_slice(&bytes)
        .map_err(|err| ApiError::MalformedResponse(format!("decoding response body: {err}")))
}

/// Like [`decode`] for endpoints whose success body carries nothing the
/// caller needs.
pub(crate) async fn expect_success(response: reqwest::Response) -> Result<()> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let bytes = response.bytes().await.unwrap_or_default();
    Err(ApiError::from_response(status, &bytes))
}
