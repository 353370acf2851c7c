//! Builder screen: create and edit characteristics, specifications, pricing plans
//! and offerings.
//!
//! Submissions leave the screen as [`BuilderAction`]s so the app can run the request
//! on a background task; the results come back through the `complete_*` methods.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs, Widget},
};

use crate::application::forms::{
    CharacteristicForm, FormMode, OfferingForm, OfferingOptions, PricingForm, PublishFailure,
    PublishOutcome, PublishRequest, SaveRequest, SelectOption, SpecificationForm,
};
use crate::domain::entities::{
    Characteristic, CharacteristicPayload, EntityId, Offering, OfferingPayload, Price,
    PricePayload, SalesChannel, Specification, SpecificationPayload,
};
use crate::domain::errors::{ApiError, CatalogError};
use crate::domain::ports::{OnPublished, PublishWatcher, ToastPort};
use crate::presentation::theme::Theme;
use crate::presentation::widgets::{MultiSelect, MultiSelectState, TextInput};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuilderTab {
    #[default]
    Characteristic,
    Specification,
    Pricing,
    Offering,
}

impl BuilderTab {
    pub const ALL: [Self; 4] = [
        Self::Characteristic,
        Self::Specification,
        Self::Pricing,
        Self::Offering,
    ];

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Characteristic => "Characteristic",
            Self::Specification => "Specification",
            Self::Pricing => "Pricing",
            Self::Offering => "Offering",
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::Characteristic => 0,
            Self::Specification => 1,
            Self::Pricing => 2,
            Self::Offering => 3,
        }
    }
}

/// Work the app must run for the builder.
#[derive(Debug)]
pub enum BuilderAction {
    None,
    SaveCharacteristic(SaveRequest<CharacteristicPayload>),
    SaveSpecification(SaveRequest<SpecificationPayload>),
    SavePricing(SaveRequest<PricePayload>),
    SaveOfferingDraft(SaveRequest<OfferingPayload>),
    PublishOffering(PublishRequest),
    LoadSpecificationOptions,
    LoadOfferingOptions,
}

fn step(focus: usize, count: usize, forward: bool) -> usize {
    if forward {
        (focus + 1) % count
    } else {
        (focus + count - 1) % count
    }
}

fn is_ctrl(key: &KeyEvent, c: char) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char(c)
}

fn form_title(entity: &str, mode: &FormMode, busy: Option<&str>) -> String {
    let verb = if mode.is_edit() { "Edit" } else { "New" };
    match busy {
        Some(status) => format!(" {verb} {entity} · {status} "),
        None => format!(" {verb} {entity} "),
    }
}

fn render_choice(label: &str, value: &str, focused: bool, theme: &Theme, area: Rect, buf: &mut Buffer) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_style(focused))
        .title(format!(" {label} "));
    let style = if focused {
        Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.text)
    };
    Paragraph::new(Line::from(vec![
        Span::styled("‹ ", theme.muted_style()),
        Span::styled(value.to_string(), style),
        Span::styled(" ›", theme.muted_style()),
    ]))
    .block(block)
    .render(area, buf);
}

fn cycles_choice(key: &KeyEvent) -> bool {
    matches!(
        key.code,
        KeyCode::Char(' ') | KeyCode::Enter | KeyCode::Left | KeyCode::Right
    )
}

struct CharacteristicPanel {
    form: CharacteristicForm,
    name: TextInput,
    value: TextInput,
    focus: usize,
    busy: bool,
}

impl CharacteristicPanel {
    const FIELDS: usize = 3;

    fn new() -> Self {
        let mut panel = Self {
            form: CharacteristicForm::new(),
            name: TextInput::new(" Name ").placeholder("e.g. Download Speed"),
            value: TextInput::new(" Value ").placeholder("e.g. 500"),
            focus: 0,
            busy: false,
        };
        panel.sync_inputs();
        panel
    }

    fn load(&mut self, form: CharacteristicForm) {
        self.form = form;
        self.focus = 0;
        self.sync_inputs();
    }

    fn sync_inputs(&mut self) {
        self.name.set_value(self.form.name.clone());
        self.value.set_value(self.form.value.clone());
        self.sync_errors();
    }

    fn sync_errors(&mut self) {
        self.name.set_error(self.form.errors().get("name"));
        self.value.set_error(self.form.errors().get("value"));
    }

    fn set_focused(&mut self, focused: bool) {
        self.name.set_focused(focused && self.focus == 0);
        self.value.set_focused(focused && self.focus == 1);
    }

    fn submit(&mut self) -> BuilderAction {
        if self.busy {
            return BuilderAction::None;
        }
        self.form.name = self.name.value().to_string();
        self.form.value = self.value.value().to_string();
        let request = self.form.prepare();
        self.sync_errors();
        match request {
            Some(request) => {
                self.busy = true;
                BuilderAction::SaveCharacteristic(request)
            }
            None => BuilderAction::None,
        }
    }

    fn handle_key(&mut self, key: &KeyEvent) -> BuilderAction {
        if is_ctrl(key, 's') {
            return self.submit();
        }
        if is_ctrl(key, 'n') {
            self.load(CharacteristicForm::new());
            return BuilderAction::None;
        }
        match key.code {
            KeyCode::Tab => self.focus = step(self.focus, Self::FIELDS, true),
            KeyCode::BackTab => self.focus = step(self.focus, Self::FIELDS, false),
            KeyCode::Enter if self.focus < 2 => return self.submit(),
            _ => match self.focus {
                0 => {
                    self.name.handle_key(key);
                }
                1 => {
                    self.value.handle_key(key);
                }
                _ if cycles_choice(key) => {
                    self.form.unit_of_measure = self.form.unit_of_measure.next();
                }
                _ => {}
            },
        }
        self.set_focused(true);
        BuilderAction::None
    }

    fn complete(&mut self, result: Result<Characteristic, ApiError>, toasts: &dyn ToastPort) {
        self.busy = false;
        if self.form.complete(result, toasts).is_saved() {
            self.sync_inputs();
        }
    }

    fn render(&self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        let status = self.busy.then_some("Saving...");
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border_style(true))
            .title(form_title("Characteristic", self.form.mode(), status));
        let inner = block.inner(area);
        block.render(area, buf);

        let [name, value, unit, _] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Fill(1),
        ])
        .areas(inner);
        (&self.name).render(name, buf);
        (&self.value).render(value, buf);
        render_choice(
            "Unit of measure",
            self.form.unit_of_measure.as_str(),
            self.focus == 2,
            theme,
            unit,
            buf,
        );
    }
}

struct SpecificationPanel {
    form: SpecificationForm,
    name: TextInput,
    characteristics: MultiSelectState,
    focus: usize,
    busy: bool,
}

impl SpecificationPanel {
    const FIELDS: usize = 2;

    fn new() -> Self {
        Self {
            form: SpecificationForm::new(),
            name: TextInput::new(" Name ").placeholder("e.g. Fiber Router"),
            characteristics: MultiSelectState::new(),
            focus: 0,
            busy: false,
        }
    }

    /// Replaces the form and reloads its options.
    fn load(&mut self, form: SpecificationForm) -> BuilderAction {
        self.form = form;
        self.focus = 0;
        self.sync_inputs();
        self.refresh_options()
    }

    fn refresh_options(&mut self) -> BuilderAction {
        self.form.begin_options_refresh();
        BuilderAction::LoadSpecificationOptions
    }

    fn sync_inputs(&mut self) {
        self.name.set_value(self.form.name.clone());
        self.name.set_error(self.form.errors().get("name"));
    }

    fn set_focused(&mut self, focused: bool) {
        self.name.set_focused(focused && self.focus == 0);
        self.characteristics.set_focused(focused && self.focus == 1);
    }

    fn submit(&mut self) -> BuilderAction {
        if self.busy {
            return BuilderAction::None;
        }
        self.form.name = self.name.value().to_string();
        let request = self.form.prepare();
        self.sync_inputs();
        match request {
            Some(request) => {
                self.busy = true;
                BuilderAction::SaveSpecification(request)
            }
            None => BuilderAction::None,
        }
    }

    fn handle_key(&mut self, key: &KeyEvent) -> BuilderAction {
        if is_ctrl(key, 's') {
            return self.submit();
        }
        if is_ctrl(key, 'r') {
            return self.refresh_options();
        }
        if is_ctrl(key, 'n') {
            return self.load(SpecificationForm::new());
        }
        match key.code {
            KeyCode::Tab => self.focus = step(self.focus, Self::FIELDS, true),
            KeyCode::BackTab => self.focus = step(self.focus, Self::FIELDS, false),
            KeyCode::Enter if self.focus == 0 => return self.submit(),
            _ if self.focus == 0 => {
                self.name.handle_key(key);
            }
            _ => {
                if let Some(id) = self.characteristics.handle_key(key, self.form.options()) {
                    self.form.toggle_characteristic(&id);
                }
            }
        }
        self.set_focused(true);
        BuilderAction::None
    }

    fn complete(&mut self, result: Result<Specification, ApiError>, toasts: &dyn ToastPort) {
        self.busy = false;
        self.form.complete(result, toasts);
        self.sync_inputs();
    }

    fn render(&self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        let status = self.busy.then_some("Saving...");
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border_style(true))
            .title(form_title("Specification", self.form.mode(), status));
        let inner = block.inner(area);
        block.render(area, buf);

        let [name, characteristics] =
            Layout::vertical([Constraint::Length(3), Constraint::Fill(1)]).areas(inner);
        (&self.name).render(name, buf);
        let mut state = self.characteristics.clone();
        MultiSelect::new(
            "Characteristics",
            self.form.options(),
            &self.form.characteristic_ids,
            theme,
        )
        .loading(self.form.is_loading_options())
        .error(self.form.errors().get("characteristic_ids"))
        .render(characteristics, buf, &mut state);
    }
}

struct PricingPanel {
    form: PricingForm,
    name: TextInput,
    value: TextInput,
    unit: TextInput,
    focus: usize,
    busy: bool,
}

impl PricingPanel {
    const FIELDS: usize = 4;

    fn new() -> Self {
        let mut panel = Self {
            form: PricingForm::new(),
            name: TextInput::new(" Name ").placeholder("e.g. Basic Monthly"),
            value: TextInput::new(" Price ").numeric().placeholder("0.00"),
            unit: TextInput::new(" Unit "),
            focus: 0,
            busy: false,
        };
        panel.sync_inputs();
        panel
    }

    fn load(&mut self, form: PricingForm) {
        self.form = form;
        self.focus = 0;
        self.sync_inputs();
    }

    fn sync_inputs(&mut self) {
        self.name.set_value(self.form.name.clone());
        self.value.set_value(self.form.value.clone());
        self.unit.set_value(self.form.unit.clone());
        self.sync_errors();
    }

    fn sync_errors(&mut self) {
        self.name.set_error(self.form.errors().get("name"));
        self.value.set_error(self.form.errors().get("value"));
        self.unit.set_error(self.form.errors().get("unit"));
    }

    fn set_focused(&mut self, focused: bool) {
        self.name.set_focused(focused && self.focus == 0);
        self.value.set_focused(focused && self.focus == 1);
        self.unit.set_focused(focused && self.focus == 2);
    }

    fn submit(&mut self) -> BuilderAction {
        if self.busy {
            return BuilderAction::None;
        }
        self.form.name = self.name.value().to_string();
        self.form.value = self.value.value().to_string();
        self.form.unit = self.unit.value().to_string();
        let request = self.form.prepare();
        self.sync_errors();
        match request {
            Some(request) => {
                self.busy = true;
                BuilderAction::SavePricing(request)
            }
            None => BuilderAction::None,
        }
    }

    fn handle_key(&mut self, key: &KeyEvent) -> BuilderAction {
        if is_ctrl(key, 's') {
            return self.submit();
        }
        if is_ctrl(key, 'n') {
            self.load(PricingForm::new());
            return BuilderAction::None;
        }
        match key.code {
            KeyCode::Tab => self.focus = step(self.focus, Self::FIELDS, true),
            KeyCode::BackTab => self.focus = step(self.focus, Self::FIELDS, false),
            KeyCode::Enter if self.focus < 3 => return self.submit(),
            _ => match self.focus {
                0 => {
                    self.name.handle_key(key);
                }
                1 => {
                    self.value.handle_key(key);
                }
                2 => {
                    self.unit.handle_key(key);
                }
                _ if cycles_choice(key) => self.form.currency = self.form.currency.next(),
                _ => {}
            },
        }
        self.set_focused(true);
        BuilderAction::None
    }

    fn complete(&mut self, result: Result<Price, ApiError>, toasts: &dyn ToastPort) {
        self.busy = false;
        if self.form.complete(result, toasts).is_saved() {
            self.sync_inputs();
        }
    }

    fn render(&self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        let status = self.busy.then_some("Saving...");
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border_style(true))
            .title(form_title("Pricing Plan", self.form.mode(), status));
        let inner = block.inner(area);
        block.render(area, buf);

        let [name, amount, _] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Fill(1),
        ])
        .areas(inner);
        let [value, unit, currency] = Layout::horizontal([
            Constraint::Fill(2),
            Constraint::Fill(2),
            Constraint::Fill(1),
        ])
        .areas(amount);

        (&self.name).render(name, buf);
        (&self.value).render(value, buf);
        (&self.unit).render(unit, buf);
        render_choice(
            "Currency",
            self.form.currency.as_str(),
            self.focus == 3,
            theme,
            currency,
            buf,
        );
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OfferingBusy {
    Saving,
    Publishing,
}

struct OfferingPanel {
    form: OfferingForm,
    name: TextInput,
    description: TextInput,
    specifications: MultiSelectState,
    prices: MultiSelectState,
    channels: MultiSelectState,
    channel_options: Vec<SelectOption>,
    focus: usize,
    busy: Option<OfferingBusy>,
}

impl OfferingPanel {
    const FIELDS: usize = 5;

    fn new() -> Self {
        let channel_options = SalesChannel::ALL
            .iter()
            .map(|c| SelectOption::new(EntityId::from(c.as_str()), c.as_str()))
            .collect();
        Self {
            form: OfferingForm::new(),
            name: TextInput::new(" Name ").placeholder("e.g. Fiber 500 Bundle"),
            description: TextInput::new(" Description ").placeholder("Optional"),
            specifications: MultiSelectState::new(),
            prices: MultiSelectState::new(),
            channels: MultiSelectState::new(),
            channel_options,
            focus: 0,
            busy: None,
        }
    }

    fn load(&mut self, form: OfferingForm) -> BuilderAction {
        self.form = form;
        self.focus = 0;
        self.sync_inputs();
        self.refresh_options()
    }

    fn refresh_options(&mut self) -> BuilderAction {
        self.form.begin_options_refresh();
        BuilderAction::LoadOfferingOptions
    }

    fn sync_inputs(&mut self) {
        self.name.set_value(self.form.name.clone());
        self.description.set_value(self.form.description.clone());
        self.name.set_error(self.form.errors().get("name"));
    }

    fn set_focused(&mut self, focused: bool) {
        self.name.set_focused(focused && self.focus == 0);
        self.description.set_focused(focused && self.focus == 1);
        self.specifications.set_focused(focused && self.focus == 2);
        self.prices.set_focused(focused && self.focus == 3);
        self.channels.set_focused(focused && self.focus == 4);
    }

    fn selected_channels(&self) -> Vec<EntityId> {
        self.form
            .sales_channels
            .iter()
            .map(|c| EntityId::from(c.as_str()))
            .collect()
    }

    fn collect_inputs(&mut self) {
        self.form.name = self.name.value().to_string();
        self.form.description = self.description.value().to_string();
    }

    fn save_draft(&mut self) -> BuilderAction {
        if self.busy.is_some() {
            return BuilderAction::None;
        }
        self.collect_inputs();
        let request = self.form.prepare_draft();
        self.sync_inputs();
        match request {
            Some(request) => {
                self.busy = Some(OfferingBusy::Saving);
                BuilderAction::SaveOfferingDraft(request)
            }
            None => BuilderAction::None,
        }
    }

    fn publish(&mut self, toasts: &dyn ToastPort) -> BuilderAction {
        if self.busy.is_some() {
            return BuilderAction::None;
        }
        self.collect_inputs();
        let request = self.form.prepare_publish(toasts);
        self.sync_inputs();
        match request {
            Ok(Some(request)) => {
                self.busy = Some(OfferingBusy::Publishing);
                BuilderAction::PublishOffering(request)
            }
            Ok(None) | Err(_) => BuilderAction::None,
        }
    }

    fn handle_key(&mut self, key: &KeyEvent, toasts: &dyn ToastPort) -> BuilderAction {
        if is_ctrl(key, 's') {
            return self.save_draft();
        }
        if is_ctrl(key, 'p') {
            return self.publish(toasts);
        }
        if is_ctrl(key, 'r') {
            return self.refresh_options();
        }
        if is_ctrl(key, 'n') {
            return self.load(OfferingForm::new());
        }
        match key.code {
            KeyCode::Tab => self.focus = step(self.focus, Self::FIELDS, true),
            KeyCode::BackTab => self.focus = step(self.focus, Self::FIELDS, false),
            _ => match self.focus {
                0 => {
                    self.name.handle_key(key);
                }
                1 => {
                    self.description.handle_key(key);
                }
                2 => {
                    if let Some(id) = self
                        .specifications
                        .handle_key(key, self.form.specification_options())
                    {
                        self.form.toggle_specification(&id);
                    }
                }
                3 => {
                    if let Some(id) = self.prices.handle_key(key, self.form.price_options()) {
                        self.form.toggle_price(&id);
                    }
                }
                _ => {
                    if let Some(channel) = self
                        .channels
                        .handle_key(key, &self.channel_options)
                        .and_then(|id| SalesChannel::parse(id.as_str()))
                    {
                        self.form.toggle_channel(channel);
                    }
                }
            },
        }
        self.set_focused(true);
        BuilderAction::None
    }

    fn complete_draft(&mut self, result: Result<Offering, ApiError>, toasts: &dyn ToastPort) {
        self.busy = None;
        self.form.complete_draft(result, toasts);
        self.sync_inputs();
    }

    fn complete_publish(
        &mut self,
        result: Result<Offering, PublishFailure>,
        toasts: &dyn ToastPort,
        watcher: &dyn PublishWatcher,
        on_published: OnPublished,
    ) -> PublishOutcome {
        self.busy = None;
        let outcome = self.form.complete_publish(result, toasts, watcher, on_published);
        self.sync_inputs();
        outcome
    }

    fn render(&self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        let status = self.busy.map(|b| match b {
            OfferingBusy::Saving => "Saving...",
            OfferingBusy::Publishing => "Publishing...",
        });
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border_style(true))
            .title(form_title("Offering", self.form.mode(), status));
        let inner = block.inner(area);
        block.render(area, buf);

        let [name, description, lists, channels] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Fill(1),
            Constraint::Length(5),
        ])
        .areas(inner);
        let [specifications, prices] =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(lists);

        (&self.name).render(name, buf);
        (&self.description).render(description, buf);

        let loading = self.form.is_loading_options();
        let mut state = self.specifications.clone();
        MultiSelect::new(
            "Specifications",
            self.form.specification_options(),
            &self.form.specification_ids,
            theme,
        )
        .loading(loading)
        .render(specifications, buf, &mut state);

        let mut state = self.prices.clone();
        MultiSelect::new("Pricing Plans", self.form.price_options(), &self.form.price_ids, theme)
            .loading(loading)
            .render(prices, buf, &mut state);

        let selected = self.selected_channels();
        let mut state = self.channels.clone();
        MultiSelect::new("Sales Channels", &self.channel_options, &selected, theme)
            .render(channels, buf, &mut state);
    }
}

pub struct BuilderScreen {
    tab: BuilderTab,
    characteristic: CharacteristicPanel,
    specification: SpecificationPanel,
    pricing: PricingPanel,
    offering: OfferingPanel,
    theme: Theme,
}

impl BuilderScreen {
    #[must_use]
    pub fn new(theme: Theme) -> Self {
        let mut screen = Self {
            tab: BuilderTab::Characteristic,
            characteristic: CharacteristicPanel::new(),
            specification: SpecificationPanel::new(),
            pricing: PricingPanel::new(),
            offering: OfferingPanel::new(),
            theme,
        };
        screen.refocus();
        screen
    }

    #[must_use]
    pub const fn tab(&self) -> BuilderTab {
        self.tab
    }

    fn refocus(&mut self) {
        let tab = self.tab;
        self.characteristic.set_focused(tab == BuilderTab::Characteristic);
        self.specification.set_focused(tab == BuilderTab::Specification);
        self.pricing.set_focused(tab == BuilderTab::Pricing);
        self.offering.set_focused(tab == BuilderTab::Offering);
    }

    /// Shows a tab; tabs with related-record pickers reload their options.
    pub fn switch_tab(&mut self, tab: BuilderTab) -> BuilderAction {
        self.tab = tab;
        self.refocus();
        match tab {
            BuilderTab::Specification => self.specification.refresh_options(),
            BuilderTab::Offering => self.offering.refresh_options(),
            BuilderTab::Characteristic | BuilderTab::Pricing => BuilderAction::None,
        }
    }

    pub fn edit_characteristic(&mut self, characteristic: &Characteristic) -> BuilderAction {
        self.characteristic.load(CharacteristicForm::edit(characteristic));
        self.switch_tab(BuilderTab::Characteristic)
    }

    pub fn edit_specification(&mut self, specification: &Specification) -> BuilderAction {
        self.specification.form = SpecificationForm::edit(specification);
        self.specification.focus = 0;
        self.specification.sync_inputs();
        self.switch_tab(BuilderTab::Specification)
    }

    /// # Errors
    /// Returns [`CatalogError::PriceLocked`] for locked plans.
    pub fn edit_price(&mut self, price: &Price) -> Result<BuilderAction, CatalogError> {
        self.pricing.load(PricingForm::edit(price)?);
        Ok(self.switch_tab(BuilderTab::Pricing))
    }

    /// # Errors
    /// Returns [`CatalogError::NotEditable`] unless the offering is a draft.
    pub fn edit_offering(&mut self, offering: &Offering) -> Result<BuilderAction, CatalogError> {
        self.offering.form = OfferingForm::edit(offering)?;
        self.offering.focus = 0;
        self.offering.sync_inputs();
        Ok(self.switch_tab(BuilderTab::Offering))
    }

    pub fn handle_key(&mut self, key: &KeyEvent, toasts: &dyn ToastPort) -> BuilderAction {
        if key.modifiers.contains(KeyModifiers::ALT) {
            if let KeyCode::Char(c @ '1'..='4') = key.code {
                let index = c as usize - '1' as usize;
                return self.switch_tab(BuilderTab::ALL[index]);
            }
        }

        let action = match self.tab {
            BuilderTab::Characteristic => self.characteristic.handle_key(key),
            BuilderTab::Specification => self.specification.handle_key(key),
            BuilderTab::Pricing => self.pricing.handle_key(key),
            BuilderTab::Offering => self.offering.handle_key(key, toasts),
        };
        self.refocus();
        action
    }

    pub fn complete_characteristic(
        &mut self,
        result: Result<Characteristic, ApiError>,
        toasts: &dyn ToastPort,
    ) {
        self.characteristic.complete(result, toasts);
        self.refocus();
    }

    pub fn complete_specification(
        &mut self,
        result: Result<Specification, ApiError>,
        toasts: &dyn ToastPort,
    ) {
        self.specification.complete(result, toasts);
        self.refocus();
    }

    pub fn complete_pricing(&mut self, result: Result<Price, ApiError>, toasts: &dyn ToastPort) {
        self.pricing.complete(result, toasts);
        self.refocus();
    }

    pub fn complete_offering_draft(
        &mut self,
        result: Result<Offering, ApiError>,
        toasts: &dyn ToastPort,
    ) {
        self.offering.complete_draft(result, toasts);
        self.refocus();
    }

    pub fn complete_offering_publish(
        &mut self,
        result: Result<Offering, PublishFailure>,
        toasts: &dyn ToastPort,
        watcher: &dyn PublishWatcher,
        on_published: OnPublished,
    ) -> PublishOutcome {
        let outcome = self
            .offering
            .complete_publish(result, toasts, watcher, on_published);
        self.refocus();
        outcome
    }

    pub fn apply_specification_options(
        &mut self,
        result: Result<Vec<Characteristic>, ApiError>,
        toasts: &dyn ToastPort,
    ) {
        self.specification.form.apply_options(result, toasts);
    }

    pub fn apply_offering_options(
        &mut self,
        result: Result<OfferingOptions, ApiError>,
        toasts: &dyn ToastPort,
    ) {
        self.offering.form.apply_options(result, toasts);
    }

    /// Key hints for the status bar.
    #[must_use]
    pub fn hints(&self) -> &'static [(&'static str, &'static str)] {
        match self.tab {
            BuilderTab::Offering => &[
                ("Alt+1-4", "form"),
                ("Tab", "field"),
                ("Space", "toggle"),
                ("^S", "save draft"),
                ("^P", "publish"),
                ("^R", "reload"),
                ("^N", "new"),
            ],
            BuilderTab::Specification => &[
                ("Alt+1-4", "form"),
                ("Tab", "field"),
                ("Space", "toggle"),
                ("^S", "save"),
                ("^R", "reload"),
                ("^N", "new"),
            ],
            BuilderTab::Characteristic | BuilderTab::Pricing => &[
                ("Alt+1-4", "form"),
                ("Tab", "field"),
                ("←→", "cycle"),
                ("^S", "save"),
                ("^N", "new"),
            ],
        }
    }
}

impl Widget for &BuilderScreen {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let [tabs, body] = Layout::vertical([Constraint::Length(1), Constraint::Fill(1)]).areas(area);

        let titles = BuilderTab::ALL
            .iter()
            .enumerate()
            .map(|(i, tab)| format!(" {} {} ", i + 1, tab.title()));
        Tabs::new(titles)
            .select(self.tab.index())
            .style(self.theme.muted_style())
            .highlight_style(
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD),
            )
            .render(tabs, buf);

        match self.tab {
            BuilderTab::Characteristic => self.characteristic.render(body, buf, &self.theme),
            BuilderTab::Specification => self.specification.render(body, buf, &self.theme),
            BuilderTab::Pricing => self.pricing.render(body, buf, &self.theme),
            BuilderTab::Offering => self.offering.render(body, buf, &self.theme),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Currency, LifecycleStatus, UnitOfMeasure};
    use crate::domain::ports::mocks::{RecordingToasts, RecordingWatcher};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_text(screen: &mut BuilderScreen, toasts: &RecordingToasts, text: &str) {
        for c in text.chars() {
            screen.handle_key(&key(KeyCode::Char(c)), toasts);
        }
    }

    fn draft() -> Offering {
        Offering {
            id: EntityId::from("o1"),
            name: "Fiber 500".to_string(),
            description: Some("Fast".to_string()),
            specification_ids: vec![EntityId::from("s1")],
            price_ids: vec![EntityId::from("p1")],
            sales_channels: vec![SalesChannel::Online],
            lifecycle_status: LifecycleStatus::Draft,
            created_at: None,
            updated_at: None,
            published_at: None,
            retired_at: None,
        }
    }

    #[test]
    fn test_empty_characteristic_is_not_submitted() {
        let toasts = RecordingToasts::new();
        let mut screen = BuilderScreen::new(Theme::default());

        let action = screen.handle_key(&ctrl('s'), &toasts);

        assert!(matches!(action, BuilderAction::None));
        assert_eq!(screen.characteristic.name.error(), Some("Name is required"));
        assert_eq!(screen.characteristic.value.error(), Some("Value is required"));
    }

    #[test]
    fn test_characteristic_submission_carries_inputs() {
        let toasts = RecordingToasts::new();
        let mut screen = BuilderScreen::new(Theme::default());
        type_text(&mut screen, &toasts, "Speed");
        screen.handle_key(&key(KeyCode::Tab), &toasts);
        type_text(&mut screen, &toasts, "500");
        screen.handle_key(&key(KeyCode::Tab), &toasts);
        screen.handle_key(&key(KeyCode::Right), &toasts);

        let action = screen.handle_key(&ctrl('s'), &toasts);

        let BuilderAction::SaveCharacteristic(request) = action else {
            panic!("expected a save request");
        };
        assert_eq!(request.path(), "/characteristics");
        assert_eq!(request.payload.name, "Speed");
        assert_eq!(request.payload.value, "500");
        assert_eq!(request.payload.unit_of_measure, UnitOfMeasure::Mbps);
    }

    #[test]
    fn test_busy_panel_blocks_double_submit() {
        let toasts = RecordingToasts::new();
        let mut screen = BuilderScreen::new(Theme::default());
        type_text(&mut screen, &toasts, "Speed");
        screen.handle_key(&key(KeyCode::Tab), &toasts);
        type_text(&mut screen, &toasts, "1");

        assert!(matches!(
            screen.handle_key(&ctrl('s'), &toasts),
            BuilderAction::SaveCharacteristic(_)
        ));
        assert!(matches!(screen.handle_key(&ctrl('s'), &toasts), BuilderAction::None));
    }

    #[test]
    fn test_saved_characteristic_clears_inputs() {
        let toasts = RecordingToasts::new();
        let mut screen = BuilderScreen::new(Theme::default());
        type_text(&mut screen, &toasts, "Speed");
        screen.handle_key(&key(KeyCode::Tab), &toasts);
        type_text(&mut screen, &toasts, "1");
        screen.handle_key(&ctrl('s'), &toasts);

        let saved = Characteristic {
            id: EntityId::from("c1"),
            name: "Speed".to_string(),
            value: "1".to_string(),
            unit_of_measure: UnitOfMeasure::None,
            created_at: None,
            updated_at: None,
        };
        screen.complete_characteristic(Ok(saved), &toasts);

        assert!(screen.characteristic.name.value().is_empty());
        assert_eq!(toasts.successes(), vec!["Characteristic created successfully!"]);
    }

    #[test]
    fn test_switching_to_offering_requests_options() {
        let mut screen = BuilderScreen::new(Theme::default());
        assert!(matches!(
            screen.switch_tab(BuilderTab::Offering),
            BuilderAction::LoadOfferingOptions
        ));
        assert!(screen.offering.form.is_loading_options());
    }

    #[test]
    fn test_alt_digit_switches_tab() {
        let toasts = RecordingToasts::new();
        let mut screen = BuilderScreen::new(Theme::default());
        let action = screen.handle_key(&KeyEvent::new(KeyCode::Char('3'), KeyModifiers::ALT), &toasts);
        assert!(matches!(action, BuilderAction::None));
        assert_eq!(screen.tab(), BuilderTab::Pricing);
    }

    #[test]
    fn test_pricing_currency_cycles() {
        let toasts = RecordingToasts::new();
        let mut screen = BuilderScreen::new(Theme::default());
        screen.switch_tab(BuilderTab::Pricing);
        for _ in 0..3 {
            screen.handle_key(&key(KeyCode::Tab), &toasts);
        }
        screen.handle_key(&key(KeyCode::Char(' ')), &toasts);
        assert_eq!(screen.pricing.form.currency, Currency::Eur);
    }

    #[test]
    fn test_publish_without_requirements_is_rejected() {
        let toasts = RecordingToasts::new();
        let mut screen = BuilderScreen::new(Theme::default());
        screen.switch_tab(BuilderTab::Offering);
        type_text(&mut screen, &toasts, "Bundle");

        let action = screen.handle_key(&ctrl('p'), &toasts);

        assert!(matches!(action, BuilderAction::None));
        assert!(toasts.errors()[0].starts_with("Cannot publish"));
        assert!(screen.offering.busy.is_none());
    }

    #[test]
    fn test_edit_offering_loads_form_and_options() {
        let mut screen = BuilderScreen::new(Theme::default());

        let action = screen.edit_offering(&draft()).unwrap();

        assert!(matches!(action, BuilderAction::LoadOfferingOptions));
        assert_eq!(screen.tab(), BuilderTab::Offering);
        assert_eq!(screen.offering.name.value(), "Fiber 500");
        assert!(screen.offering.form.mode().is_edit());
    }

    #[test]
    fn test_published_offering_is_not_editable() {
        let mut screen = BuilderScreen::new(Theme::default());
        let mut offering = draft();
        offering.lifecycle_status = LifecycleStatus::Published;

        assert!(screen.edit_offering(&offering).is_err());
        assert_eq!(screen.tab(), BuilderTab::Characteristic);
    }

    #[test]
    fn test_publish_result_hands_off_to_watcher() {
        let toasts = RecordingToasts::new();
        let watcher = RecordingWatcher::new();
        let mut screen = BuilderScreen::new(Theme::default());
        screen.edit_offering(&draft()).unwrap();

        let action = screen.handle_key(&ctrl('p'), &toasts);
        assert!(matches!(action, BuilderAction::PublishOffering(_)));

        let outcome =
            screen.complete_offering_publish(Ok(draft()), &toasts, &watcher, Box::new(|_| {}));

        assert!(outcome.is_started());
        assert_eq!(watcher.watched(), vec![EntityId::from("o1")]);
        assert!(screen.offering.busy.is_none());
    }
}
