//! Catalog API access layer.
//! Translates domain operations (register, login, movie listing and detail
//! lookups, favorites, profile edit/delete) into HTTP requests against a
//! fixed base address. Authenticated requests carry a bearer token sourced
//! from the session store; a missing identity fails before anything goes on
//! the wire. Non-2xx responses are classified in exactly one place, with
//! the raw status and body kept on the diagnostic channel.

use reqwest::{RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::{ApiError, ApiResult};
use crate::model::{Director, Genre, LoginRequest, LoginResponse, Movie, NewUser, User, UserUpdate};
use crate::session::{Session, SessionStore};

const LOG_TARGET: &str = "marquee::api";

/// Client for one catalog service. Cloning shares the underlying HTTP
/// connection pool and the session store handle.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    base: Url,
    http: reqwest::Client,
    session: SessionStore,
}

impl CatalogClient {
    /// Build a client against `base`, e.g. `https://catalog.example.com/`.
    /// The session store is shared with the caller: `login` writes into it
    /// and every authenticated operation reads from it.
    pub fn new(base: &str, session: SessionStore) -> ApiResult<Self> {
        let mut base = Url::parse(base)
            .map_err(|e| ApiError::Transport { code: "bad_base_url".into(), message: e.to_string() })?;
        // Joining relative paths below requires the base path to end in '/'
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let http = reqwest::Client::builder().build()?;
        Ok(Self { base, http, session })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    // --- unauthenticated operations ---

    pub async fn register(&self, new_user: &NewUser) -> ApiResult<User> {
        let url = self.endpoint(&["users"])?;
        let resp = self.http.post(url).json(new_user).send().await?;
        self.decode("register", resp).await
    }

    /// Authenticate and install the returned `{token, user}` pair in the
    /// session store before handing it back.
    pub async fn login(&self, username: &str, password: &str) -> ApiResult<Session> {
        let url = self.endpoint(&["login"])?;
        let body = LoginRequest { username: username.to_string(), password: password.to_string() };
        let resp = self.http.post(url).json(&body).send().await?;
        let LoginResponse { token, user } = self.decode("login", resp).await?;
        self.session.set(token.clone(), user.clone());
        Ok(Session { token, user })
    }

    /// Drop the local session. Bearer tokens carry no server-side session
    /// state, so nothing is sent to the service.
    pub fn logout(&self) {
        self.session.clear();
    }

    // --- catalog reads ---

    pub async fn movies(&self) -> ApiResult<Vec<Movie>> {
        self.get_authed("movies", &["movies"]).await
    }

    pub async fn movie(&self, title: &str) -> ApiResult<Movie> {
        self.get_authed("movie", &["movies", title]).await
    }

    pub async fn genre(&self, name: &str) -> ApiResult<Genre> {
        self.get_authed("genre", &["movies", "genre", name]).await
    }

    pub async fn director(&self, name: &str) -> ApiResult<Director> {
        self.get_authed("director", &["movies", "directors", name]).await
    }

    // --- user resources ---

    pub async fn user(&self) -> ApiResult<User> {
        let key = self.user_key()?;
        self.get_authed("get_user", &["users", &key]).await
    }

    /// Favorites are server-sourced truth: fetch the user record and
    /// project its favorites field rather than trusting the cached copy.
    pub async fn favorites(&self) -> ApiResult<Vec<String>> {
        let user = self.user().await?;
        Ok(user.favorite_movies)
    }

    pub async fn add_favorite(&self, movie_id: &str) -> ApiResult<User> {
        let key = self.user_key()?;
        let url = self.endpoint(&["users", &key, "movies", movie_id])?;
        let resp = self.authed(self.http.post(url))?.send().await?;
        let user: User = self.decode("add_favorite", resp).await?;
        self.session.replace_user(user.clone());
        Ok(user)
    }

    pub async fn remove_favorite(&self, movie_id: &str) -> ApiResult<User> {
        let key = self.user_key()?;
        let url = self.endpoint(&["users", &key, "movies", movie_id])?;
        let resp = self.authed(self.http.delete(url))?.send().await?;
        let user: User = self.decode("remove_favorite", resp).await?;
        self.session.replace_user(user.clone());
        Ok(user)
    }

    /// Update the profile. The server's returned record replaces the
    /// cached user, so the session reflects exactly what was stored.
    pub async fn update_user(&self, update: &UserUpdate) -> ApiResult<User> {
        let key = self.user_key()?;
        let url = self.endpoint(&["users", &key])?;
        let resp = self.authed(self.http.put(url))?.json(update).send().await?;
        let user: User = self.decode("update_user", resp).await?;
        self.session.replace_user(user.clone());
        Ok(user)
    }

    /// Delete the account server-side, then drop the local session.
    pub async fn delete_account(&self) -> ApiResult<()> {
        let url = self.endpoint(&["users"])?;
        let resp = self.authed(self.http.delete(url))?.send().await?;
        let status = resp.status();
        if status.is_success() {
            debug!(target: LOG_TARGET, op = "delete_account", status = status.as_u16(), "request ok");
            self.session.clear();
            return Ok(());
        }
        Err(self.classify("delete_account", status, resp).await)
    }

    // --- request plumbing ---

    async fn get_authed<T: DeserializeOwned>(&self, op: &'static str, segments: &[&str]) -> ApiResult<T> {
        let url = self.endpoint(segments)?;
        let resp = self.authed(self.http.get(url))?.send().await?;
        self.decode(op, resp).await
    }

    /// Resolve the bearer token before the request leaves the process; a
    /// missing session fails here, not on the wire.
    fn authed(&self, req: RequestBuilder) -> ApiResult<RequestBuilder> {
        let token = self
            .session
            .token()
            .ok_or_else(|| ApiError::identity("no_session", "no signed-in user; log in first"))?;
        Ok(req.bearer_auth(token))
    }

    fn user_key(&self) -> ApiResult<String> {
        self.session
            .user_key()
            .ok_or_else(|| ApiError::identity("no_session", "no signed-in user; log in first"))
    }

    fn endpoint(&self, segments: &[&str]) -> ApiResult<Url> {
        let path = segments
            .iter()
            .map(|s| urlencoding::encode(s).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        self.base
            .join(&path)
            .map_err(|e| ApiError::Transport { code: "bad_url".into(), message: e.to_string() })
    }

    async fn decode<T: DeserializeOwned>(&self, op: &'static str, resp: Response) -> ApiResult<T> {
        let status = resp.status();
        if status.is_success() {
            debug!(target: LOG_TARGET, op, status = status.as_u16(), "request ok");
            Ok(resp.json::<T>().await?)
        } else {
            Err(self.classify(op, status, resp).await)
        }
    }

    /// Single classification point for non-2xx responses. Raw status and
    /// body go to the diagnostic channel; callers get one tagged error.
    async fn classify(&self, op: &'static str, status: StatusCode, resp: Response) -> ApiError {
        let body = resp.text().await.unwrap_or_default();
        warn!(target: LOG_TARGET, op, status = status.as_u16(), body = %body, "request failed");
        ApiError::from_status(status.as_u16(), &body)
    }
}
