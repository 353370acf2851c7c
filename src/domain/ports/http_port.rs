//! HTTP transport port definition.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::errors::ApiError;

/// HTTP verbs used against the catalog gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request body encoding.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    Form(Vec<(String, String)>),
}

/// Outbound request relative to the configured base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    /// Query pairs; a key may repeat.
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
    pub bearer: Option<String>,
}

impl HttpRequest {
    #[must_use]
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
            bearer: None,
        }
    }

    #[must_use]
    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    #[must_use]
    pub fn with_bearer(mut self, token: Option<String>) -> Self {
        self.bearer = token;
        self
    }

    /// Returns the JSON body, if any.
    #[must_use]
    pub fn json(&self) -> Option<&Value> {
        match &self.body {
            RequestBody::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the first value for a query key.
    #[must_use]
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Raw response; `body` is `None` when empty.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Option<Value>,
}

impl HttpResponse {
    #[must_use]
    pub fn new(status: u16, body: Option<Value>) -> Self {
        Self { status, body }
    }

    #[must_use]
    pub fn ok(body: Value) -> Self {
        Self::new(200, Some(body))
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Port for sending requests to the backend.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends a request. Only transport failures are errors; any received status is `Ok`.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::{HashMap, VecDeque};
    use std::time::Duration;

    type Scripted = Result<HttpResponse, ApiError>;

    /// Transport with scripted responses per `(method, path)`. The last scripted response
    /// of a route repeats once earlier ones are consumed.
    #[derive(Default)]
    pub struct MockTransport {
        routes: Mutex<HashMap<(HttpMethod, String), VecDeque<Scripted>>>,
        requests: Mutex<Vec<HttpRequest>>,
        delay: Option<Duration>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self::default()
        }

        /// Holds every reply back for `delay` after the request is recorded.
        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        /// Queues a JSON response with a status.
        pub fn respond(&self, method: HttpMethod, path: &str, status: u16, body: Value) {
            self.push(method, path, Ok(HttpResponse::new(status, Some(body))));
        }

        /// Queues a 200 response.
        pub fn ok(&self, method: HttpMethod, path: &str, body: Value) {
            self.respond(method, path, 200, body);
        }

        /// Queues a response without a body.
        pub fn push_empty(&self, method: HttpMethod, path: &str, status: u16) {
            self.push(method, path, Ok(HttpResponse::new(status, None)));
        }

        /// Queues a transport failure.
        pub fn fail(&self, method: HttpMethod, path: &str, message: &str) {
            self.push(method, path, Err(ApiError::network(message)));
        }

        fn push(&self, method: HttpMethod, path: &str, response: Scripted) {
            self.routes
                .lock()
                .entry((method, path.to_string()))
                .or_default()
                .push_back(response);
        }

        /// All requests sent so far.
        pub fn requests(&self) -> Vec<HttpRequest> {
            self.requests.lock().clone()
        }

        /// Requests sent to one route.
        pub fn requests_to(&self, method: HttpMethod, path: &str) -> Vec<HttpRequest> {
            self.requests
                .lock()
                .iter()
                .filter(|r| r.method == method && r.path == path)
                .cloned()
                .collect()
        }
    }

    #[async_trait]
    impl HttpTransport for MockTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
            let key = (request.method, request.path.clone());
            self.requests.lock().push(request);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }

            let mut routes = self.routes.lock();
            match routes.get_mut(&key) {
                Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or_else(|| {
                    Err(ApiError::network("mock route exhausted"))
                }),
                Some(queue) => queue
                    .front()
                    .cloned()
                    .unwrap_or_else(|| Err(ApiError::network("mock route exhausted"))),
                None => Ok(HttpResponse::new(
                    404,
                    Some(serde_json::json!({"detail": "Not Found"})),
                )),
            }
        }
    }
}
