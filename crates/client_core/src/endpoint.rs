//! Cart endpoint seam and its HTTP implementation.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{
    cookie::{CookieStore, Jar},
    redirect, Client,
};
use shared::{
    domain::CartItemId,
    protocol::{classify_cart_reply, AddToCartRequest, CartReply},
};
use tracing::{debug, warn};
use url::Url;

use crate::{config::WidgetSettings, error::EndpointError};

#[async_trait]
pub trait CartEndpoint: Send + Sync {
    async fn add_item(&self, request: &AddToCartRequest) -> Result<CartReply, EndpointError>;
    async fn remove_item(&self, item_id: CartItemId) -> Result<CartReply, EndpointError>;
    async fn clear(&self) -> Result<CartReply, EndpointError>;
}

/// Talks to the storefront's cart views over HTTP, carrying the session cookies.
///
/// Redirects are not followed: an unauthenticated session shows up as the login redirect itself.
pub struct HttpCartEndpoint {
    http: Client,
    base: Url,
    cookies: Arc<Jar>,
    add_url: Url,
    remove_prefix: String,
    clear_url: Url,
    csrf_cookie: String,
    csrf_header: String,
}

impl HttpCartEndpoint {
    pub fn new(settings: &WidgetSettings) -> Result<Self, EndpointError> {
        let base = Url::parse(&settings.server_url)?;
        let cookies = Arc::new(Jar::default());
        let http = Client::builder()
            .redirect(redirect::Policy::none())
            .cookie_provider(Arc::clone(&cookies))
            .build()
            .map_err(|err| EndpointError::Client(err.to_string()))?;

        Ok(Self {
            http,
            add_url: base.join(&settings.add_path)?,
            remove_prefix: settings.remove_path_prefix.clone(),
            clear_url: base.join(&settings.clear_path)?,
            base,
            cookies,
            csrf_cookie: settings.csrf_cookie.clone(),
            csrf_header: settings.csrf_header.clone(),
        })
    }

    /// Adds a `Set-Cookie` style entry (e.g. `sessionid=...`) scoped to the server.
    pub fn add_cookie(&self, cookie: &str) {
        self.cookies.add_cookie_str(cookie, &self.base);
    }

    /// CSRF credential from the session cookie; empty when the cookie is absent.
    pub fn csrf_token(&self) -> String {
        let Some(header) = self.cookies.cookies(&self.base) else {
            return String::new();
        };
        let Ok(raw) = header.to_str() else {
            return String::new();
        };
        cookie_value(raw, &self.csrf_cookie).unwrap_or_default()
    }

    async fn post(
        &self,
        url: Url,
        body: Option<&AddToCartRequest>,
    ) -> Result<CartReply, EndpointError> {
        let token = self.csrf_token();
        if token.is_empty() {
            warn!(cookie = %self.csrf_cookie, "cart: csrf cookie missing; sending empty token");
        }

        let mut request = self
            .http
            .post(url.clone())
            .header(self.csrf_header.as_str(), token);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;
        debug!(%url, status, body_len = bytes.len(), "cart: endpoint answered");

        Ok(classify_cart_reply(status, &bytes)?)
    }
}

#[async_trait]
impl CartEndpoint for HttpCartEndpoint {
    async fn add_item(&self, request: &AddToCartRequest) -> Result<CartReply, EndpointError> {
        self.post(self.add_url.clone(), Some(request)).await
    }

    async fn remove_item(&self, item_id: CartItemId) -> Result<CartReply, EndpointError> {
        let path = format!("{}/{}/", self.remove_prefix.trim_end_matches('/'), item_id.0);
        let url = self.base.join(&path)?;
        self.post(url, None).await
    }

    async fn clear(&self) -> Result<CartReply, EndpointError> {
        self.post(self.clear_url.clone(), None).await
    }
}

/// Looks up `name` in a `Cookie` header value (`a=1; b=2`).
fn cookie_value(header: &str, name: &str) -> Option<String> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then(|| value.trim().to_string())
    })
}

#[cfg(test)]
#[path = "tests/endpoint_tests.rs"]
mod tests;
