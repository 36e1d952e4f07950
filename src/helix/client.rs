use serde::de::DeserializeOwned;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use super::executor::RequestExecutor;
use super::http::{HttpTransport, ReqwestTransport};
use super::paginator::{Page, Paginator};
use super::request::RequestSpec;
use super::types::{Category, ChannelInfo, Clip, Stream, StreamFilter, User};
use crate::auth::prompt::AuthPrompt;
use crate::auth::provider::TokenProvider;
use crate::auth::store::{FileTokenStore, TokenKind, TokenSet, TokenStore};
use crate::config::{ClientConfig, Credentials};
use crate::error::Error;

/// Client for the Twitch Helix API
///
/// Owns the session lifecycle (login, restore, renewal on rejection, logout)
/// and exposes typed resource operations on top of it. Cheap to clone; every
/// clone shares the same session.
pub struct HelixClient<H: HttpTransport = ReqwestTransport> {
    executor: RequestExecutor<H>,
    provider: TokenProvider<H>,
    store: Arc<dyn TokenStore>,
    config: ClientConfig,
    client_id: String,
}

impl HelixClient<ReqwestTransport> {
    /// Creates a client with the default transport and file token store
    pub fn new(config: ClientConfig, credentials: Credentials) -> Result<Self, Error> {
        let transport = Arc::new(ReqwestTransport::new(Duration::from_secs(
            config.http_timeout_secs,
        )));
        let store: Arc<dyn TokenStore> = Arc::new(FileTokenStore::new()?);
        Ok(Self::with_transport(config, credentials, transport, store))
    }
}

impl<H: HttpTransport> HelixClient<H> {
    /// Creates a client over a custom transport and token store
    pub fn with_transport(
        config: ClientConfig,
        credentials: Credentials,
        transport: Arc<H>,
        store: Arc<dyn TokenStore>,
    ) -> Self {
        let client_id = credentials.client_id.clone();
        let provider = TokenProvider::new(transport.clone(), credentials, &config);
        let executor = RequestExecutor::new(
            transport,
            provider.clone(),
            store.clone(),
            client_id.clone(),
            config.api_base_url.clone(),
        );

        Self {
            executor,
            provider,
            store,
            config,
            client_id,
        }
    }

    // === Session lifecycle ===

    /// Runs the interactive login flow for a user token with the given scopes
    pub async fn login(&self, scopes: &[&str], prompt: &dyn AuthPrompt) -> Result<(), Error> {
        let token = self.provider.authenticate_user(scopes, prompt).await?;
        if let Err(e) = self.store.save(&self.client_id, &token).await {
            tracing::warn!("Failed to persist token after login: {}", e);
        }
        self.executor.set_session(token).await;
        tracing::info!("Logged in with user token");
        Ok(())
    }

    /// Acquires an app token, for server-to-server use without a user
    pub async fn login_app(&self) -> Result<(), Error> {
        let token = self.provider.authenticate_app().await?;
        if let Err(e) = self.store.save(&self.client_id, &token).await {
            tracing::warn!("Failed to persist token after login: {}", e);
        }
        self.executor.set_session(token).await;
        tracing::info!("Logged in with app token");
        Ok(())
    }

    /// Brings a persisted session back to life
    ///
    /// Returns `false` when nothing usable is stored: no token at all, a
    /// token missing some requested scope, or an expired one the server
    /// refuses to renew. Transport failures surface as errors so the caller
    /// can retry instead of forcing a pointless re-login.
    pub async fn restore_session(&self, scopes: &[&str]) -> Result<bool, Error> {
        let stored = match self.store.load(&self.client_id).await {
            Some(token) => token,
            None => return Ok(false),
        };

        if stored.kind == TokenKind::User && !stored.covers_scopes(scopes) {
            tracing::info!("Stored token is missing requested scopes");
            return Ok(false);
        }

        let token = if stored.is_expired() {
            let renewed = match stored.kind {
                TokenKind::User => self.provider.refresh(&stored).await,
                TokenKind::App => self.provider.authenticate_app().await,
            };
            match renewed {
                Ok(token) => {
                    if let Err(e) = self.store.save(&self.client_id, &token).await {
                        tracing::warn!("Failed to persist renewed token: {}", e);
                    }
                    token
                }
                Err(Error::RefreshFailed(reason)) => {
                    tracing::info!("Stored session is no longer renewable: {}", reason);
                    return Ok(false);
                }
                Err(e) => return Err(e),
            }
        } else {
            stored
        };

        self.executor.set_session(token).await;
        tracing::info!("Session restored");
        Ok(true)
    }

    /// Ends the session and deletes the persisted token
    pub async fn logout(&self) -> Result<(), Error> {
        self.executor.clear_session().await;
        self.store.delete(&self.client_id).await?;
        tracing::info!("Logged out");
        Ok(())
    }

    /// Returns a copy of the active session token, if any
    pub async fn session_token(&self) -> Option<TokenSet> {
        self.executor.session().await
    }

    // === Users ===

    /// Looks up a user by id
    pub async fn get_user_by_id(&self, id: &str) -> Result<Option<User>, Error> {
        let request = RequestSpec::get("/users").query("id", id);
        let items = self.fetch_items(&request).await?;
        self.first_item(items)
    }

    /// Looks up a user by login name
    pub async fn get_user_by_login(&self, login: &str) -> Result<Option<User>, Error> {
        let request = RequestSpec::get("/users").query("login", login);
        let items = self.fetch_items(&request).await?;
        self.first_item(items)
    }

    /// Looks up several users by id in one request
    pub async fn get_users(&self, ids: &[&str]) -> Result<Vec<User>, Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut request = RequestSpec::get("/users");
        for id in ids {
            request = request.query("id", *id);
        }
        let items = self.fetch_items(&request).await?;
        self.map_items(items)
    }

    /// Returns the user the session token belongs to
    pub async fn get_current_user(&self) -> Result<User, Error> {
        let request = RequestSpec::get("/users");
        let items = self.fetch_items(&request).await?;
        match self.first_item(items)? {
            Some(user) => Ok(user),
            // App tokens have no user behind them
            None => Err(Error::Authentication(
                "token has no associated user".to_string(),
            )),
        }
    }

    // === Channels and streams ===

    /// Returns a channel's broadcast settings
    pub async fn get_channel(&self, broadcaster_id: &str) -> Result<Option<ChannelInfo>, Error> {
        let request = RequestSpec::get("/channels").query("broadcaster_id", broadcaster_id);
        let items = self.fetch_items(&request).await?;
        self.first_item(items)
    }

    /// Live streams matching a filter, as a lazy paged listing
    ///
    /// Pages are only fetched as items are consumed; stop early and nothing
    /// more is requested.
    pub fn streams(&self, filter: &StreamFilter) -> PagedItems<'_, H, Stream> {
        let request = filter.apply(
            RequestSpec::get("/streams").query("first", self.config.page_size.to_string()),
        );
        self.paged(request)
    }

    /// Collects every live stream matching a filter
    pub async fn get_streams(&self, filter: &StreamFilter) -> Result<Vec<Stream>, Error> {
        self.streams(filter).collect_all().await
    }

    /// Collects the live streams followed by a user
    pub async fn get_followed_streams(&self, user_id: &str) -> Result<Vec<Stream>, Error> {
        let request = RequestSpec::get("/streams/followed")
            .query("user_id", user_id)
            .query("first", self.config.page_size.to_string());
        let items = self.paginate(request).collect_remaining().await?;
        self.map_items(items)
    }

    /// Searches categories/games by name
    pub async fn search_categories(&self, query: &str) -> Result<Vec<Category>, Error> {
        let request = RequestSpec::get("/search/categories")
            .query("query", query)
            .query("first", self.config.page_size.to_string());
        let items = self.paginate(request).collect_remaining().await?;
        self.map_items(items)
    }

    // === Clips ===

    /// Requests a clip of the broadcaster's live stream
    pub async fn create_clip(&self, broadcaster_id: &str) -> Result<Clip, Error> {
        let request = RequestSpec::post("/clips").query("broadcaster_id", broadcaster_id);
        let items = self.fetch_items(&request).await?;
        match self.first_item(items)? {
            Some(clip) => Ok(clip),
            None => Err(Error::Decode {
                message: "clip response contained no items".to_string(),
                body: String::new(),
            }),
        }
    }

    // === Plumbing ===

    /// Starts a raw paged walk over any listing endpoint
    pub fn paginate(&self, request: RequestSpec) -> Paginator<'_, H> {
        Paginator::new(&self.executor, request)
    }

    fn paged<T: DeserializeOwned>(&self, request: RequestSpec) -> PagedItems<'_, H, T> {
        PagedItems {
            client: self,
            paginator: Paginator::new(&self.executor, request),
            _marker: PhantomData,
        }
    }

    async fn fetch_items(&self, request: &RequestSpec) -> Result<Vec<Value>, Error> {
        let response = self.executor.execute(request).await?;
        let page = Page::from_response(&response)?;
        Ok(page.items)
    }

    fn map_item<T: DeserializeOwned>(&self, item: Value) -> Result<Option<T>, Error> {
        match serde_json::from_value(item.clone()) {
            Ok(mapped) => Ok(Some(mapped)),
            Err(e) => {
                if self.config.skip_malformed {
                    tracing::warn!("Skipping malformed item: {}", e);
                    Ok(None)
                } else {
                    Err(Error::Mapping {
                        message: e.to_string(),
                        raw: item,
                    })
                }
            }
        }
    }

    fn map_items<T: DeserializeOwned>(&self, items: Vec<Value>) -> Result<Vec<T>, Error> {
        let mut mapped = Vec::with_capacity(items.len());
        for item in items {
            if let Some(value) = self.map_item(item)? {
                mapped.push(value);
            }
        }
        Ok(mapped)
    }

    fn first_item<T: DeserializeOwned>(&self, items: Vec<Value>) -> Result<Option<T>, Error> {
        match items.into_iter().next() {
            Some(item) => self.map_item(item),
            None => Ok(None),
        }
    }
}

impl<H: HttpTransport> Clone for HelixClient<H> {
    fn clone(&self) -> Self {
        Self {
            executor: self.executor.clone(),
            provider: self.provider.clone(),
            store: self.store.clone(),
            config: self.config.clone(),
            client_id: self.client_id.clone(),
        }
    }
}

/// Lazy paged listing of typed items
///
/// Wraps a [`Paginator`] and maps each raw item to `T` as it is pulled.
pub struct PagedItems<'a, H: HttpTransport, T> {
    client: &'a HelixClient<H>,
    paginator: Paginator<'a, H>,
    _marker: PhantomData<T>,
}

impl<'a, H: HttpTransport, T: DeserializeOwned> PagedItems<'a, H, T> {
    /// Yields the next item, fetching a page when the current one runs out
    pub async fn next(&mut self) -> Result<Option<T>, Error> {
        loop {
            match self.paginator.next_item().await? {
                Some(item) => {
                    if let Some(mapped) = self.client.map_item(item)? {
                        return Ok(Some(mapped));
                    }
                    // Malformed item was skipped, pull the next one
                }
                None => return Ok(None),
            }
        }
    }

    /// Drains the listing into a vector
    pub async fn collect_all(mut self) -> Result<Vec<T>, Error> {
        let mut items = Vec::new();
        while let Some(item) = self.next().await? {
            items.push(item);
        }
        Ok(items)
    }
}
