//! Main application orchestrator.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyEvent};
use futures_util::StreamExt;
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Constraint, Layout},
};
use tokio::sync::mpsc;
use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::application::dto::LoginResponse;
use crate::application::forms::{
    OfferingForm, OfferingOptions, PublishFailure, PublishOutcome, SpecificationForm,
};
use crate::application::services::{
    AuthContext, CatalogResource, CatalogService, Debouncer, NotificationManager, PollConfig,
    PollingPublishWatcher, Route, SearchTicket, SessionEvent, StoreSearchService, ToastSender,
};
use crate::application::use_cases::LoginUseCase;
use crate::domain::entities::{
    Characteristic, Offering, Price, SearchPage, Specification, User,
};
use crate::domain::errors::{ApiError, AuthError, CatalogActionError};
use crate::domain::ports::{OnPublished, PublishWatcher, SessionStoragePort, ToastPort, WatchHandle};
use crate::domain::search::FilterState;
use crate::domain::Notification;
use crate::infrastructure::{ApiClient, AppConfig, AppState, StateStore};
use crate::presentation::events::{GlobalKey, global_key, key_press};
use crate::presentation::theme::Theme;
use crate::presentation::ui::builder_screen::{BuilderAction, BuilderScreen};
use crate::presentation::ui::login_screen::{LoginAction, LoginScreen};
use crate::presentation::ui::notification_popup::NotificationPopup;
use crate::presentation::ui::store_screen::{StoreAction, StoreScreen};
use crate::presentation::ui::viewer_screen::{
    CatalogRecord, LoadedRecords, ViewerAction, ViewerScreen,
};
use crate::presentation::widgets::{HeaderBar, HeaderBarStyle, StatusBar};
use crate::{NAME, VERSION};

const TICK_RATE: Duration = Duration::from_millis(250);

const LOGIN_HINTS: &[(&str, &str)] = &[("Enter", "sign in"), ("Tab", "field"), ("Esc", "store")];

/// Results of background work, delivered back to the UI loop.
#[derive(Debug)]
enum Action {
    LoginFinished(Result<LoginResponse, AuthError>),
    CharacteristicSaved(Result<Characteristic, ApiError>),
    SpecificationSaved(Result<Specification, ApiError>),
    PriceSaved(Result<Price, ApiError>),
    OfferingDraftSaved(Result<Offering, ApiError>),
    OfferingSubmitted(Result<Offering, PublishFailure>),
    SpecificationOptions(Result<Vec<Characteristic>, ApiError>),
    OfferingOptions(Result<OfferingOptions, ApiError>),
    RecordsLoaded(LoadedRecords),
    RecordActionFinished {
        resource: CatalogResource,
        result: Result<Option<WatchHandle>, CatalogActionError>,
    },
    OfferingPublished(Offering),
    StoreResults(SearchTicket, Result<SearchPage, ApiError>),
    FiltersSettled(FilterState),
}

pub struct App {
    running: bool,
    route: Route,
    /// Protected route to open after signing in.
    return_to: Option<Route>,
    last_visited: Route,
    theme: Theme,
    login: LoginScreen,
    builder: BuilderScreen,
    viewer: ViewerScreen,
    store: StoreScreen,
    store_started: bool,
    api: Arc<ApiClient>,
    auth: Arc<AuthContext>,
    login_use_case: LoginUseCase,
    catalog: Arc<CatalogService>,
    store_search: StoreSearchService,
    watcher: Arc<dyn PublishWatcher>,
    toasts: Arc<dyn ToastPort>,
    notifications: NotificationManager,
    watches: Vec<WatchHandle>,
    filter_debouncer: Debouncer<Action>,
    state_store: StateStore,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    toast_rx: mpsc::UnboundedReceiver<Notification>,
    session_rx: mpsc::UnboundedReceiver<SessionEvent>,
}

impl App {
    /// Wires the services around `api` and restores the session from `storage`.
    #[must_use]
    pub fn new(
        config: &AppConfig,
        api: Arc<ApiClient>,
        storage: Arc<dyn SessionStoragePort>,
        state_store: StateStore,
        saved: AppState,
    ) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let (session_tx, session_rx) = mpsc::unbounded_channel();
        let (toast_sender, toast_rx) = ToastSender::channel();
        let toasts: Arc<dyn ToastPort> = Arc::new(toast_sender);

        let auth = AuthContext::restore(storage, api.clone(), session_tx);
        auth.install_unauthorized_handler();

        let watcher: Arc<dyn PublishWatcher> = Arc::new(PollingPublishWatcher::new(
            api.clone(),
            toasts.clone(),
            PollConfig {
                interval: config.poll_interval(),
                max_attempts: config.publish.max_attempts,
            },
        ));
        let catalog = Arc::new(CatalogService::new(api.clone(), toasts.clone(), watcher.clone()));
        let store_search = StoreSearchService::new(api.clone(), toasts.clone());
        let login_use_case = LoginUseCase::new(api.clone(), auth.clone());

        let theme = Theme::default();
        let location = config
            .store_query
            .clone()
            .or(saved.store_query)
            .unwrap_or_default();
        let route = saved
            .last_route
            .as_deref()
            .and_then(Route::from_name)
            .filter(|route| *route != Route::Login)
            .unwrap_or(Route::Store);

        Self {
            running: true,
            route,
            return_to: None,
            last_visited: route,
            theme,
            login: LoginScreen::new(theme),
            builder: BuilderScreen::new(theme),
            viewer: ViewerScreen::new(theme, config.ui.page_size, config.ui.viewer_page_size),
            store: StoreScreen::new(theme, &location, config.store.page_size),
            store_started: false,
            api,
            auth,
            login_use_case,
            catalog,
            store_search,
            watcher,
            toasts,
            notifications: NotificationManager::new(config.notification_duration()),
            watches: Vec::new(),
            filter_debouncer: Debouncer::new(config.debounce(), action_tx.clone()),
            state_store,
            action_tx,
            action_rx,
            toast_rx,
            session_rx,
        }
    }

    /// # Errors
    /// Returns error if drawing to the terminal fails.
    pub async fn run(mut self, terminal: &mut DefaultTerminal) -> color_eyre::Result<()> {
        info!(route = ?self.route, authenticated = self.auth.is_authenticated(), "Starting UI");
        self.start();

        let mut terminal_events = EventStream::new();
        let mut tick = interval(TICK_RATE);

        terminal.draw(|frame| self.render(frame))?;

        while self.running {
            tokio::select! {
                biased;

                Some(event) = self.session_rx.recv() => {
                    self.handle_session_event(event);
                }

                Some(notification) = self.toast_rx.recv() => {
                    self.notifications.push(notification);
                }

                Some(action) = self.action_rx.recv() => {
                    self.handle_action(action);
                }

                _ = tick.tick() => {
                    self.tick();
                }

                Some(Ok(event)) = terminal_events.next() => {
                    self.handle_terminal_event(&event);
                }
            }
            terminal.draw(|frame| self.render(frame))?;
        }

        self.filter_debouncer.cancel();
        for watch in &self.watches {
            watch.cancel();
        }
        if let Err(e) = self.state_store.save(&self.app_state()).await {
            warn!(error = %e, "Failed to save state on exit");
        }
        info!("Application exiting normally");
        Ok(())
    }

    fn start(&mut self) {
        let route = self.route;
        self.navigate(route);
    }

    fn spawn<F>(&self, work: F)
    where
        F: Future<Output = Action> + Send + 'static,
    {
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            if tx.send(work.await).is_err() {
                debug!("Action dropped, UI loop is gone");
            }
        });
    }

    fn on_published(&self) -> OnPublished {
        let tx = self.action_tx.clone();
        Box::new(move |offering| {
            if tx.send(Action::OfferingPublished(offering)).is_err() {
                debug!("Publish notice dropped, UI loop is gone");
            }
        })
    }

    fn app_state(&self) -> AppState {
        AppState {
            last_route: Some(self.last_visited.as_str().to_string()),
            store_query: Some(self.store.location().to_string()),
        }
    }

    fn persist_state(&self) {
        let store = self.state_store.clone();
        let state = self.app_state();
        tokio::spawn(async move {
            if let Err(e) = store.save(&state).await {
                warn!(error = %e, "Failed to save state");
            }
        });
    }

    fn navigate(&mut self, requested: Route) {
        let route = self.auth.guard(requested);
        if route == Route::Login && requested != Route::Login {
            self.return_to = Some(requested);
        }
        if route != self.route {
            debug!(from = ?self.route, to = ?route, "Navigating");
        }
        self.route = route;

        match route {
            Route::Login => return,
            Route::Builder => {
                let action = self.builder.switch_tab(self.builder.tab());
                self.dispatch_builder(action);
            }
            Route::Viewer => {
                let action = self.viewer.reload();
                self.dispatch_viewer(action);
            }
            Route::Store => {
                if !self.store_started {
                    self.store_started = true;
                    let ticket = self.store.start();
                    self.search(ticket);
                }
            }
        }
        self.last_visited = route;
        self.persist_state();
    }

    fn tick(&mut self) {
        self.notifications.tick();
        let before = self.watches.len();
        self.watches.retain(|watch| !watch.is_finished());
        if self.watches.len() != before {
            debug!(active = self.watches.len(), "Publish watches finished");
        }
    }

    fn handle_session_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::LoggedIn(user) => debug!(username = user.username(), "Session started"),
            SessionEvent::LoggedOut => {
                if self.route.requires_session() {
                    self.return_to = Some(self.route);
                }
                self.login = LoginScreen::new(self.theme);
                self.route = Route::Login;
                self.toasts.info("Signed out");
            }
        }
    }

    fn handle_terminal_event(&mut self, event: &Event) {
        if let Some(key) = key_press(event) {
            self.handle_key(key);
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if let Some(global) = global_key(&key) {
            match global {
                GlobalKey::Quit => self.running = false,
                GlobalKey::Navigate(route) => self.navigate(route),
                GlobalKey::Logout if self.auth.is_authenticated() => self.auth.logout(),
                GlobalKey::Logout => self.navigate(Route::Login),
                GlobalKey::DismissToast => self.notifications.dismiss(),
            }
            return;
        }

        match self.route {
            Route::Login => match self.login.handle_key(key) {
                LoginAction::Submit => self.submit_login(),
                LoginAction::Cancel => self.navigate(Route::Store),
                LoginAction::None => {}
            },
            Route::Builder => {
                let action = self.builder.handle_key(&key, &*self.toasts);
                self.dispatch_builder(action);
            }
            Route::Viewer => {
                let action = self.viewer.handle_key(&key);
                self.dispatch_viewer(action);
            }
            Route::Store => {
                let action = self.store.handle_key(&key);
                self.dispatch_store(action);
            }
        }
    }

    fn submit_login(&mut self) {
        self.login.set_validating();
        let use_case = self.login_use_case.clone();
        let request = self.login.request();
        self.spawn(async move { Action::LoginFinished(use_case.execute(request).await) });
    }

    fn finish_login(&mut self, result: Result<LoginResponse, AuthError>) {
        match result {
            Ok(response) => {
                info!(username = response.user.username(), "Signed in");
                self.login = LoginScreen::new(self.theme);
                self.toasts
                    .success(&format!("Welcome, {}!", response.user.username()));
                let target = self.return_to.take().unwrap_or(Route::Builder);
                self.navigate(target);
            }
            Err(e) => {
                warn!(error = %e, "Sign-in failed");
                self.login.set_error(e.user_message());
            }
        }
    }

    fn dispatch_builder(&self, action: BuilderAction) {
        let api = self.api.clone();
        match action {
            BuilderAction::None => {}
            BuilderAction::SaveCharacteristic(request) => {
                self.spawn(async move { Action::CharacteristicSaved(request.execute(&api).await) });
            }
            BuilderAction::SaveSpecification(request) => {
                self.spawn(async move { Action::SpecificationSaved(request.execute(&api).await) });
            }
            BuilderAction::SavePricing(request) => {
                self.spawn(async move { Action::PriceSaved(request.execute(&api).await) });
            }
            BuilderAction::SaveOfferingDraft(request) => {
                self.spawn(async move { Action::OfferingDraftSaved(request.execute(&api).await) });
            }
            BuilderAction::PublishOffering(request) => {
                self.spawn(async move { Action::OfferingSubmitted(request.execute(&api).await) });
            }
            BuilderAction::LoadSpecificationOptions => {
                self.spawn(async move {
                    Action::SpecificationOptions(SpecificationForm::fetch_options(&api).await)
                });
            }
            BuilderAction::LoadOfferingOptions => {
                self.spawn(async move {
                    Action::OfferingOptions(OfferingForm::fetch_options(&api).await)
                });
            }
        }
    }

    fn dispatch_viewer(&mut self, action: ViewerAction) {
        let catalog = self.catalog.clone();
        match action {
            ViewerAction::None => {}
            ViewerAction::Reload(resource) => self.load_records(resource),
            ViewerAction::Edit(record) => self.edit_record(&record),
            ViewerAction::Delete(record) => {
                let resource = record.resource();
                self.spawn(async move {
                    let result = match &record {
                        CatalogRecord::Characteristic(c) => catalog.delete_characteristic(c).await,
                        CatalogRecord::Specification(s) => catalog.delete_specification(s).await,
                        CatalogRecord::Price(p) => catalog.delete_price(p).await,
                        CatalogRecord::Offering(o) => catalog.delete_offering(o).await,
                    };
                    Action::RecordActionFinished {
                        resource,
                        result: result.map(|()| None),
                    }
                });
            }
            ViewerAction::Publish(offering) => {
                let on_published = self.on_published();
                self.spawn(async move {
                    Action::RecordActionFinished {
                        resource: CatalogResource::Offerings,
                        result: catalog.publish(&offering, on_published).await,
                    }
                });
            }
            ViewerAction::Retire(offering) => {
                self.spawn(async move {
                    Action::RecordActionFinished {
                        resource: CatalogResource::Offerings,
                        result: catalog.retire(&offering).await.map(|()| None),
                    }
                });
            }
        }
    }

    fn load_records(&mut self, resource: CatalogResource) {
        self.viewer.set_loading(resource);
        let catalog = self.catalog.clone();
        self.spawn(async move { Action::RecordsLoaded(LoadedRecords::fetch(&catalog, resource).await) });
    }

    /// Opens the matching builder form prefilled with `record`.
    fn edit_record(&mut self, record: &CatalogRecord) {
        let opened = match record {
            CatalogRecord::Characteristic(c) => Ok(self.builder.edit_characteristic(c)),
            CatalogRecord::Specification(s) => Ok(self.builder.edit_specification(s)),
            CatalogRecord::Price(p) => self.builder.edit_price(p),
            CatalogRecord::Offering(o) => self.builder.edit_offering(o),
        };
        match opened {
            Ok(action) => {
                debug!(record = record.name(), "Editing record");
                self.route = Route::Builder;
                self.last_visited = Route::Builder;
                self.dispatch_builder(action);
                self.persist_state();
            }
            Err(e) => self.toasts.error(&e.to_string()),
        }
    }

    fn dispatch_store(&mut self, action: StoreAction) {
        match action {
            StoreAction::None => {}
            StoreAction::Search(ticket) => {
                self.search(ticket);
                self.persist_state();
            }
            StoreAction::FiltersChanged(filters) => {
                self.filter_debouncer.call(Action::FiltersSettled(filters));
            }
        }
    }

    fn search(&self, ticket: SearchTicket) {
        let service = self.store_search.clone();
        self.spawn(async move {
            let result = service.search(&ticket).await;
            Action::StoreResults(ticket, result)
        });
    }

    fn handle_action(&mut self, action: Action) {
        match action {
            Action::LoginFinished(result) => self.finish_login(result),
            Action::CharacteristicSaved(result) => {
                self.builder.complete_characteristic(result, &*self.toasts);
            }
            Action::SpecificationSaved(result) => {
                self.builder.complete_specification(result, &*self.toasts);
            }
            Action::PriceSaved(result) => self.builder.complete_pricing(result, &*self.toasts),
            Action::OfferingDraftSaved(result) => {
                self.builder.complete_offering_draft(result, &*self.toasts);
            }
            Action::OfferingSubmitted(result) => {
                let on_published = self.on_published();
                let outcome = self.builder.complete_offering_publish(
                    result,
                    &*self.toasts,
                    &*self.watcher,
                    on_published,
                );
                if let PublishOutcome::Started {
                    watch: Some(watch), ..
                } = outcome
                {
                    self.watches.push(watch);
                }
            }
            Action::SpecificationOptions(result) => {
                self.builder.apply_specification_options(result, &*self.toasts);
            }
            Action::OfferingOptions(result) => {
                self.builder.apply_offering_options(result, &*self.toasts);
            }
            Action::RecordsLoaded(loaded) => self.viewer.apply(loaded),
            Action::RecordActionFinished { resource, result } => match result {
                Ok(watch) => {
                    self.watches.extend(watch);
                    self.load_records(resource);
                }
                Err(e) => debug!(error = %e, ?resource, "Record action did not complete"),
            },
            Action::OfferingPublished(offering) => {
                info!(offering_id = %offering.id, "Offering published");
                if self.route == Route::Viewer && self.viewer.resource() == CatalogResource::Offerings {
                    self.load_records(CatalogResource::Offerings);
                }
            }
            Action::StoreResults(ticket, result) => {
                if !self.store.complete(&ticket, result) {
                    debug!(generation = ticket.generation, "Ignored superseded store results");
                }
            }
            Action::FiltersSettled(filters) => {
                let ticket = self.store.apply_filters(filters);
                self.search(ticket);
                self.persist_state();
            }
        }
    }

    fn hints(&self) -> &'static [(&'static str, &'static str)] {
        match self.route {
            Route::Login => LOGIN_HINTS,
            Route::Builder => self.builder.hints(),
            Route::Viewer => self.viewer.hints(),
            Route::Store => self.store.hints(),
        }
    }

    fn render(&self, frame: &mut Frame) {
        let [header, body, footer] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        let user = self.auth.user();
        frame.render_widget(
            HeaderBar::new(NAME, VERSION)
                .route(self.route)
                .username(user.as_ref().map(User::username))
                .style(HeaderBarStyle::from_theme(&self.theme)),
            header,
        );

        match self.route {
            Route::Login => frame.render_widget(&self.login, body),
            Route::Builder => frame.render_widget(&self.builder, body),
            Route::Viewer => frame.render_widget(&self.viewer, body),
            Route::Store => frame.render_widget(&self.store, body),
        }

        let right = if self.watches.is_empty() {
            "F1-F3 views  ^L sign out  ^Q quit".to_string()
        } else {
            format!("⟳ {} publishing", self.watches.len())
        };
        let status = StatusBar::new()
            .left(self.route.title())
            .hints(self.hints())
            .right(right);
        frame.render_widget(&status, footer);

        if let Some(notification) = self.notifications.current_notification() {
            frame.render_widget(NotificationPopup::new(notification, &self.theme), frame.area());
        }
    }
}
