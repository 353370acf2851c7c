//! Catalog gateway client with bearer auth and a global unauthorized hook.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::domain::entities::AuthToken;
use crate::domain::errors::ApiError;
use crate::domain::ports::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, RequestBody};

/// Callback run when the backend rejects the session.
pub type UnauthorizedHandler = Arc<dyn Fn() + Send + Sync>;

/// Query pairs; a key may repeat.
pub type Query = [(String, String)];

/// Thin JSON client over an [`HttpTransport`].
pub struct ApiClient {
    transport: Arc<dyn HttpTransport>,
    token: RwLock<Option<AuthToken>>,
    on_unauthorized: RwLock<Option<UnauthorizedHandler>>,
}

impl ApiClient {
    #[must_use]
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            token: RwLock::new(None),
            on_unauthorized: RwLock::new(None),
        }
    }

    /// Attaches a bearer token to every following request.
    pub fn set_token(&self, token: AuthToken) {
        debug!(token = %token, "API token set");
        *self.token.write() = Some(token);
    }

    pub fn clear_token(&self) {
        *self.token.write() = None;
    }

    #[must_use]
    pub fn token(&self) -> Option<AuthToken> {
        self.token.read().clone()
    }

    #[must_use]
    pub fn has_token(&self) -> bool {
        self.token.read().is_some()
    }

    fn is_current_bearer(&self, bearer: Option<&str>) -> bool {
        self.token.read().as_ref().map(AuthToken::as_str) == bearer
    }

    /// Registers the unauthorized callback, replacing any previous one.
    pub fn set_on_unauthorized(&self, handler: impl Fn() + Send + Sync + 'static) {
        *self.on_unauthorized.write() = Some(Arc::new(handler));
    }

    /// Sends a request and returns the 2xx response as received.
    ///
    /// # Errors
    /// Returns [`ApiError`] for transport failures and non-2xx statuses. A 401 on a request
    /// whose token is still the active one runs the unauthorized callback first.
    pub async fn send(
        &self,
        method: HttpMethod,
        path: &str,
        query: &Query,
        body: RequestBody,
    ) -> Result<HttpResponse, ApiError> {
        let bearer = self.token.read().as_ref().map(|t| t.as_str().to_string());
        let request = HttpRequest::new(method, path)
            .with_query(query.to_vec())
            .with_body(body)
            .with_bearer(bearer.clone());

        let response = self.transport.send(request).await?;
        debug!(%method, path, status = response.status, "API request completed");

        if response.is_success() {
            return Ok(response);
        }

        let error = ApiError::from_response(response.status, response.body.as_ref());
        if error.is_unauthorized() && bearer.is_some() {
            if self.is_current_bearer(bearer.as_deref()) {
                info!(path, "Session rejected by backend");
                let handler = self.on_unauthorized.read().clone();
                if let Some(handler) = handler {
                    handler();
                }
            } else {
                debug!(path, "Ignoring 401 for a token that is no longer active");
            }
        } else {
            warn!(%method, path, status = response.status, error = %error.message, "API request failed");
        }
        Err(error)
    }

    /// # Errors
    /// See [`ApiClient::send`]; also fails when the body does not decode into `T`.
    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &Query) -> Result<T, ApiError> {
        decode(self.send(HttpMethod::Get, path, query, RequestBody::Empty).await?)
    }

    /// # Errors
    /// See [`ApiClient::get`].
    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = RequestBody::Json(encode(body)?);
        decode(self.send(HttpMethod::Post, path, &[], body).await?)
    }

    /// # Errors
    /// See [`ApiClient::get`].
    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = RequestBody::Json(encode(body)?);
        decode(self.send(HttpMethod::Put, path, &[], body).await?)
    }

    /// # Errors
    /// See [`ApiClient::send`].
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send(HttpMethod::Delete, path, &[], RequestBody::Empty)
            .await
            .map(|_| ())
    }

    /// Posts a form-encoded body.
    ///
    /// # Errors
    /// See [`ApiClient::get`].
    pub async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        fields: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let fields = fields
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        decode(
            self.send(HttpMethod::Post, path, &[], RequestBody::Form(fields))
                .await?,
        )
    }
}

fn encode<B: Serialize + ?Sized>(body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body).map_err(ApiError::encode)
}

fn decode<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    let status = response.status;
    serde_json::from_value(response.body.unwrap_or(Value::Null))
        .map_err(|e| ApiError::decode(status, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::mocks::MockTransport;
    use serde::Deserialize;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Named {
        name: String,
    }

    fn client() -> (Arc<MockTransport>, ApiClient) {
        let transport = Arc::new(MockTransport::new());
        let client = ApiClient::new(transport.clone());
        (transport, client)
    }

    #[tokio::test]
    async fn test_bearer_attached_after_set_token() {
        let (transport, client) = client();
        transport.ok(HttpMethod::Get, "/prices", json!([]));

        let _: Vec<Value> = client.get("/prices", &[]).await.unwrap();
        client.set_token(AuthToken::new("abc").unwrap());
        let _: Vec<Value> = client.get("/prices", &[]).await.unwrap();
        client.clear_token();
        let _: Vec<Value> = client.get("/prices", &[]).await.unwrap();

        let bearers: Vec<Option<String>> =
            transport.requests().into_iter().map(|r| r.bearer).collect();
        assert_eq!(bearers, vec![None, Some("abc".to_string()), None]);
    }

    #[tokio::test]
    async fn test_post_sends_json_and_decodes() {
        let (transport, client) = client();
        transport.respond(HttpMethod::Post, "/characteristics", 201, json!({"name": "Speed"}));

        let created: Named = client
            .post("/characteristics", &json!({"name": "Speed"}))
            .await
            .unwrap();

        assert_eq!(created, Named { name: "Speed".to_string() });
        let sent = transport.requests_to(HttpMethod::Post, "/characteristics");
        assert_eq!(sent[0].json(), Some(&json!({"name": "Speed"})));
    }

    #[tokio::test]
    async fn test_error_carries_backend_message_and_status() {
        let (transport, client) = client();
        transport.respond(HttpMethod::Put, "/prices/p1", 409, json!({"detail": "Price is locked"}));

        let err = client
            .put::<_, Value>("/prices/p1", &json!({}))
            .await
            .unwrap_err();

        assert_eq!(err.message, "Price is locked");
        assert_eq!(err.status, Some(409));
    }

    #[tokio::test]
    async fn test_unauthorized_runs_callback() {
        let (transport, client) = client();
        transport.respond(HttpMethod::Get, "/offerings", 401, json!({"detail": "Token expired"}));
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        client.set_on_unauthorized(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        client.set_token(AuthToken::new("stale").unwrap());

        let err = client.get::<Value>("/offerings", &[]).await.unwrap_err();

        assert!(err.is_unauthorized());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unauthorized_callback_may_clear_token() {
        let transport = Arc::new(MockTransport::new());
        transport.respond(HttpMethod::Get, "/prices", 401, json!({"detail": "expired"}));
        let client = Arc::new(ApiClient::new(transport));
        let weak = Arc::downgrade(&client);
        client.set_on_unauthorized(move || {
            if let Some(client) = weak.upgrade() {
                client.clear_token();
            }
        });
        client.set_token(AuthToken::new("stale").unwrap());

        let _ = client.get::<Value>("/prices", &[]).await;

        assert!(!client.has_token());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unauthorized_for_replaced_token_is_ignored() {
        let transport = Arc::new(MockTransport::new().with_delay(Duration::from_millis(100)));
        transport.respond(HttpMethod::Get, "/offerings", 401, json!({"detail": "expired"}));
        let client = Arc::new(ApiClient::new(transport.clone()));
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        client.set_on_unauthorized(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        client.set_token(AuthToken::new("old").unwrap());

        let in_flight = tokio::spawn({
            let client = client.clone();
            async move { client.get::<Value>("/offerings", &[]).await }
        });
        tokio::task::yield_now().await;
        client.set_token(AuthToken::new("new").unwrap());

        let err = in_flight.await.unwrap().unwrap_err();

        assert!(err.is_unauthorized());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(client.token().unwrap().as_str(), "new");
        assert_eq!(transport.requests()[0].bearer.as_deref(), Some("old"));
    }

    #[tokio::test]
    async fn test_empty_success_body_decodes_to_unit() {
        let (transport, client) = client();
        transport.push_empty(HttpMethod::Delete, "/prices/p1", 204);

        client.delete("/prices/p1").await.unwrap();
    }

    #[tokio::test]
    async fn test_post_form_and_repeated_query() {
        let (transport, client) = client();
        transport.ok(HttpMethod::Post, "/auth/login", json!({"access_token": "t", "token_type": "bearer"}));
        transport.ok(HttpMethod::Get, "/store/search", json!({"total": 0, "items": []}));

        let _: Value = client
            .post_form("/auth/login", &[("username", "admin"), ("password", "pw")])
            .await
            .unwrap();
        let query = vec![
            ("characteristic".to_string(), "Speed:500".to_string()),
            ("characteristic".to_string(), "Quota:Unlimited".to_string()),
        ];
        let _: Value = client.get("/store/search", &query).await.unwrap();

        let requests = transport.requests();
        assert_eq!(
            requests[0].body,
            RequestBody::Form(vec![
                ("username".to_string(), "admin".to_string()),
                ("password".to_string(), "pw".to_string()),
            ])
        );
        assert_eq!(requests[1].query, query);
    }

    #[tokio::test]
    async fn test_malformed_success_body_is_decode_error() {
        let (transport, client) = client();
        transport.ok(HttpMethod::Get, "/characteristics/c1", json!({"title": "Speed"}));

        let err = client
            .get::<Named>("/characteristics/c1", &[])
            .await
            .unwrap_err();

        assert!(err.is_decode_error());
        assert!(!err.is_network_error());
        assert_eq!(err.status, Some(200));
        assert!(err.message.starts_with("Unexpected response from server"));
    }

    #[tokio::test]
    async fn test_network_failure_is_not_unauthorized() {
        let (transport, client) = client();
        transport.fail(HttpMethod::Get, "/store/search", "connection refused");

        let err = client.get::<Value>("/store/search", &[]).await.unwrap_err();
        assert!(err.is_network_error());
        assert_eq!(err.message, "connection refused");
    }
}
