//! Session state shared by every screen.

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::domain::entities::{AuthToken, User};
use crate::domain::ports::SessionStoragePort;
use crate::infrastructure::http::ApiClient;

/// Storage key holding the bearer token.
pub const TOKEN_KEY: &str = "token";
/// Storage key holding the JSON `{"username": ...}` record.
pub const USER_KEY: &str = "user";

/// Session change delivered to the UI loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    LoggedIn(User),
    /// The session ended; the UI must show the sign-in view.
    LoggedOut,
}

/// Top-level views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Builder,
    Viewer,
    Store,
}

impl Route {
    #[must_use]
    pub const fn requires_session(self) -> bool {
        matches!(self, Self::Builder | Self::Viewer)
    }

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Login => "Sign in",
            Self::Builder => "Builder",
            Self::Viewer => "Viewer",
            Self::Store => "Store",
        }
    }

    /// Name persisted in the state file.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Builder => "builder",
            Self::Viewer => "viewer",
            Self::Store => "store",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        [Self::Login, Self::Builder, Self::Viewer, Self::Store]
            .into_iter()
            .find(|route| route.as_str() == name)
    }
}

#[derive(Debug, Default)]
struct Session {
    token: Option<AuthToken>,
    user: Option<User>,
}

/// Explicit session context; `login` and `logout` are the only mutators.
pub struct AuthContext {
    session: RwLock<Session>,
    storage: Arc<dyn SessionStoragePort>,
    api: Arc<ApiClient>,
    events: mpsc::UnboundedSender<SessionEvent>,
}

impl AuthContext {
    /// Builds the context from persisted state and configures the API token.
    #[must_use]
    pub fn restore(
        storage: Arc<dyn SessionStoragePort>,
        api: Arc<ApiClient>,
        events: mpsc::UnboundedSender<SessionEvent>,
    ) -> Arc<Self> {
        let token = match storage.get_item(TOKEN_KEY) {
            Ok(value) => value.and_then(AuthToken::new),
            Err(e) => {
                warn!(error = %e, "Failed to read stored token");
                None
            }
        };
        let user = match storage.get_item(USER_KEY) {
            Ok(Some(raw)) => serde_json::from_str::<User>(&raw)
                .inspect_err(|e| warn!(error = %e, "Ignoring corrupt stored user"))
                .ok(),
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "Failed to read stored user");
                None
            }
        };

        if let Some(token) = &token {
            api.set_token(token.clone());
        }
        info!(
            authenticated = token.is_some(),
            username = user.as_ref().map_or("", User::username),
            "Session restored"
        );

        Arc::new(Self {
            session: RwLock::new(Session { token, user }),
            storage,
            api,
            events,
        })
    }

    /// Routes backend 401 responses to [`AuthContext::logout`].
    pub fn install_unauthorized_handler(self: &Arc<Self>) {
        let weak = Arc::downgrade(self);
        self.api.set_on_unauthorized(move || {
            if let Some(context) = weak.upgrade() {
                context.logout();
            }
        });
    }

    /// Starts a session. Persistence failures are logged; the in-memory session still holds.
    pub fn login(&self, token: AuthToken, username: &str) -> User {
        let user = User::new(username);
        {
            let mut session = self.session.write();
            session.token = Some(token.clone());
            session.user = Some(user.clone());
        }
        self.api.set_token(token.clone());

        if let Err(e) = self.storage.set_item(TOKEN_KEY, token.as_str()) {
            warn!(error = %e, "Failed to persist token");
        }
        match serde_json::to_string(&user) {
            Ok(record) => {
                if let Err(e) = self.storage.set_item(USER_KEY, &record) {
                    warn!(error = %e, "Failed to persist user");
                }
            }
            Err(e) => warn!(error = %e, "Failed to encode user"),
        }

        info!(username, "Logged in");
        self.emit(SessionEvent::LoggedIn(user.clone()));
        user
    }

    /// Ends the session and sends the UI back to sign-in. Does nothing when signed out.
    pub fn logout(&self) {
        {
            let mut session = self.session.write();
            if session.token.is_none() && session.user.is_none() {
                debug!("Logout ignored, no active session");
                return;
            }
            session.token = None;
            session.user = None;
        }
        self.api.clear_token();

        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.storage.remove_item(key) {
                warn!(error = %e, key, "Failed to clear stored session value");
            }
        }

        info!("Logged out");
        self.emit(SessionEvent::LoggedOut);
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.read().token.is_some()
    }

    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.session.read().user.clone()
    }

    /// Resolves the route to show: protected routes without a session go to sign-in.
    #[must_use]
    pub fn guard(&self, route: Route) -> Route {
        if route.requires_session() && !self.is_authenticated() {
            debug!(?route, "Redirecting to sign-in");
            Route::Login
        } else {
            route
        }
    }

    fn emit(&self, event: SessionEvent) {
        if self.events.send(event).is_err() {
            debug!("Session event dropped, UI loop is gone");
        }
    }
}
