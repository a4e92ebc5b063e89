//! Terminal front end for the quote wizard and the contact form.
//!
//! Layout:
//! - Centered window titled with the company name
//! - Left banner with the logo and contact details
//! - Main content panel, one page per wizard step
//! - Bottom button row: [ Back ] [ Next ] [ Cancel ]
//! - Modal confirmations (Cancel, submission outcome)
//!
//! Note: Logging is file-only in TUI mode (stdout logging is disabled) to avoid corrupting the terminal UI.

use crate::api::contact::{ContactForm, SubmitError};
use crate::api::gateway::SubmissionGateway;
use crate::api::quote::{
    cycle_option, option_label, options_for, placeholder, QuoteWizard, SelectOption,
    THANK_YOU_BODY, THANK_YOU_TITLE,
};
use crate::models::fields::{ContactField, FieldKey, QuoteField};
use crate::models::responses::SubmissionResult;
use crate::settings::{CompanySettings, Settings};
use crate::utils::savings::{format_mwk, lifetime_savings, parse_monthly_bill, PROJECTION_YEARS};

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use log::{info, warn};
use ratatui::backend::{CrosstermBackend, TestBackend};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Terminal;
use std::io::{self, Stdout};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

const ASCII_LOGO: &str = r#"███╗   ███╗ ██████╗ ████████╗ ██████╗
████╗ ████║██╔═══██╗╚══██╔══╝██╔═══██╗
██╔████╔██║██║   ██║   ██║   ██║   ██║
██║╚██╔╝██║██║   ██║   ██║   ██║   ██║
██║ ╚═╝ ██║╚██████╔╝   ██║   ╚██████╔╝
╚═╝     ╚═╝ ╚═════╝    ╚═╝    ╚═════╝"#;

/// Which form the terminal session drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Quote,
    Contact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Page {
    BasicInfo,
    PropertyDetails,
    SystemPreferences,
    Review,
    ThankYou,
    Contact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ButtonFocus {
    Back,
    Next,
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Modal {
    ConfirmCancel,
    Message { title: String, body: String },
}

/// Single-line editor. The cursor counts characters, not bytes.
#[derive(Debug, Clone, Default)]
struct TextInput {
    value: String,
    cursor: usize,
}

impl TextInput {
    fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            cursor: value.chars().count(),
            value,
        }
    }

    fn char_len(&self) -> usize {
        self.value.chars().count()
    }

    fn byte_index(&self, char_pos: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_pos)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    /// Returns true when the key was consumed.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char(c) => {
                let at = self.byte_index(self.cursor);
                self.value.insert(at, c);
                self.cursor += 1;
                true
            }
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    let at = self.byte_index(self.cursor - 1);
                    self.value.remove(at);
                    self.cursor -= 1;
                }
                true
            }
            KeyCode::Delete => {
                if self.cursor < self.char_len() {
                    let at = self.byte_index(self.cursor);
                    self.value.remove(at);
                }
                true
            }
            KeyCode::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                true
            }
            KeyCode::Right => {
                self.cursor = (self.cursor + 1).min(self.char_len());
                true
            }
            KeyCode::Home => {
                self.cursor = 0;
                true
            }
            KeyCode::End => {
                self.cursor = self.char_len();
                true
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FocusTarget {
    Field(usize),
    Button(ButtonFocus),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldRef {
    Quote(QuoteField),
    Contact(ContactField),
}

impl FieldRef {
    fn label(self) -> &'static str {
        match self {
            FieldRef::Quote(f) => f.label(),
            FieldRef::Contact(f) => f.label(),
        }
    }

    fn required(self) -> bool {
        match self {
            FieldRef::Quote(f) => f.is_required(),
            FieldRef::Contact(_) => true,
        }
    }

    fn options(self) -> Option<&'static [SelectOption]> {
        match self {
            FieldRef::Quote(f) => options_for(f),
            FieldRef::Contact(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
enum UiMsg {
    SubmissionFinished {
        result: SubmissionResult,
        correlation_id: String,
    },
}

struct TuiState {
    flow: Flow,
    company: CompanySettings,
    gateway: Arc<dyn SubmissionGateway>,
    wizard: QuoteWizard,
    contact: ContactForm,
    editor: TextInput,
    focus: FocusTarget,
    modal: Option<Modal>,
    quit: bool,
}

impl TuiState {
    fn new(flow: Flow, settings: &Settings, gateway: Arc<dyn SubmissionGateway>) -> Self {
        let mut state = Self {
            flow,
            company: settings.company.clone(),
            gateway,
            wizard: QuoteWizard::new(),
            contact: ContactForm::new(),
            editor: TextInput::default(),
            focus: FocusTarget::Field(0),
            modal: None,
            quit: false,
        };
        set_focus(&mut state, FocusTarget::Field(0));
        state
    }
}

fn current_page(state: &TuiState) -> Page {
    match state.flow {
        Flow::Contact => Page::Contact,
        Flow::Quote if state.wizard.is_submitted() => Page::ThankYou,
        Flow::Quote => match state.wizard.step().number() {
            1 => Page::BasicInfo,
            2 => Page::PropertyDetails,
            3 => Page::SystemPreferences,
            _ => Page::Review,
        },
    }
}

fn page_title(state: &TuiState) -> String {
    match current_page(state) {
        Page::ThankYou => "Request Received".to_string(),
        Page::Contact => "Contact Us".to_string(),
        _ => {
            let step = state.wizard.step();
            format!("{} (Step {} of 4)", step.title(), step.number())
        }
    }
}

fn next_label(state: &TuiState) -> &'static str {
    match current_page(state) {
        Page::Review => "Submit Quote",
        Page::ThankYou => "Finish",
        Page::Contact if state.contact.is_submitting() => "Sending...",
        Page::Contact => "Send Message",
        _ => "Next",
    }
}

fn can_go_back(page: Page) -> bool {
    matches!(
        page,
        Page::PropertyDetails | Page::SystemPreferences | Page::Review
    )
}

fn can_go_next(state: &TuiState) -> bool {
    match current_page(state) {
        Page::Contact => !state.contact.is_submitting(),
        _ => true,
    }
}

fn can_cancel(page: Page) -> bool {
    page != Page::ThankYou
}

fn page_fields(state: &TuiState) -> Vec<FieldRef> {
    match current_page(state) {
        Page::Contact => ContactField::ALL
            .iter()
            .copied()
            .map(FieldRef::Contact)
            .collect(),
        Page::ThankYou => Vec::new(),
        _ => QuoteWizard::fields_on_step(state.wizard.step())
            .iter()
            .copied()
            .map(FieldRef::Quote)
            .collect(),
    }
}

fn field_value(state: &TuiState, field: FieldRef) -> &str {
    match field {
        FieldRef::Quote(f) => state.wizard.value(f),
        FieldRef::Contact(f) => state.contact.value(f),
    }
}

fn set_field_value(state: &mut TuiState, field: FieldRef, value: String) {
    match field {
        FieldRef::Quote(f) => state.wizard.set_field(f, value),
        FieldRef::Contact(f) => state.contact.set_field(f, value),
    }
}

fn focused_field(state: &TuiState) -> Option<FieldRef> {
    match state.focus {
        FocusTarget::Field(i) => page_fields(state).get(i).copied(),
        FocusTarget::Button(_) => None,
    }
}

/// Tab order for the current page: fields first, then the enabled buttons.
fn focus_order(state: &TuiState) -> Vec<FocusTarget> {
    let page = current_page(state);
    let mut order: Vec<FocusTarget> = (0..page_fields(state).len())
        .map(FocusTarget::Field)
        .collect();
    if can_go_back(page) {
        order.push(FocusTarget::Button(ButtonFocus::Back));
    }
    if can_go_next(state) {
        order.push(FocusTarget::Button(ButtonFocus::Next));
    }
    if can_cancel(page) {
        order.push(FocusTarget::Button(ButtonFocus::Cancel));
    }
    order
}

fn set_focus(state: &mut TuiState, target: FocusTarget) {
    let target = match target {
        FocusTarget::Field(i) if i >= page_fields(state).len() => {
            FocusTarget::Button(ButtonFocus::Next)
        }
        other => other,
    };
    state.focus = target;
    if let Some(field) = focused_field(state) {
        state.editor = TextInput::new(field_value(state, field));
    }
}

fn move_focus(state: &mut TuiState, forward: bool) {
    let order = focus_order(state);
    if order.is_empty() {
        return;
    }
    let pos = order.iter().position(|t| *t == state.focus);
    let next = match pos {
        None => 0,
        Some(i) if forward => (i + 1) % order.len(),
        Some(0) => order.len() - 1,
        Some(i) => i - 1,
    };
    set_focus(state, order[next]);
}

fn focused_button(state: &TuiState) -> ButtonFocus {
    match state.focus {
        FocusTarget::Button(b) => b,
        _ => ButtonFocus::Next,
    }
}

fn set_focused_button(state: &mut TuiState, b: ButtonFocus) {
    state.focus = FocusTarget::Button(b);
}

pub fn run(flow: Flow, settings: &Settings, gateway: Arc<dyn SubmissionGateway>) -> Result<()> {
    info!(
        "[PHASE: tui] [STEP: start] Starting {:?} flow with {} gateway",
        flow,
        gateway.name()
    );

    let mut terminal = setup_terminal()?;
    let result = run_loop(&mut terminal, TuiState::new(flow, settings, gateway));
    restore_terminal(&mut terminal)?;

    result
}

fn new_smoke_state(target: &str, settings: &Settings) -> Result<TuiState> {
    // Seeded sample values so each page renders something representative.
    let gateway: Arc<dyn SubmissionGateway> = Arc::new(
        crate::api::gateway::MockSubmissionGateway::new(Duration::ZERO, 1.0),
    );

    let flow = if target == "contact" {
        Flow::Contact
    } else {
        Flow::Quote
    };
    let mut state = TuiState::new(flow, settings, gateway);

    if flow == Flow::Contact {
        state.contact.set_field(ContactField::Name, "Chikondi Banda");
        state.contact.set_field(ContactField::Email, "chikondi@example.com");
        state.contact.set_field(ContactField::Phone, "+265 991 234 567");
        state.contact.set_field(ContactField::Message, "Hi there");
        state.contact.validate();
        set_focus(&mut state, FocusTarget::Field(3));
        return Ok(state);
    }

    let sample = [
        (QuoteField::Name, "Chikondi Banda"),
        (QuoteField::Email, "chikondi@example.com"),
        (QuoteField::Phone, "+265 991 234 567"),
        (QuoteField::Address, "Area 47, Lilongwe"),
        (QuoteField::PropertyType, "residential"),
        (QuoteField::RoofType, "tile"),
        (QuoteField::MonthlyBill, "MWK 150,000"),
        (QuoteField::SystemType, "hybrid"),
        (QuoteField::BatteryStorage, "yes"),
        (QuoteField::Budget, "15m-40m"),
    ];
    for (field, value) in sample {
        state.wizard.set_field(field, value);
    }

    let advances = match target {
        "basic" => 0,
        "property" => 1,
        "system" => 2,
        "review" | "thanks" => 3,
        other => anyhow::bail!(
            "Unknown smoke target '{}' (expected basic|property|system|review|thanks|contact)",
            other
        ),
    };
    for _ in 0..advances {
        state.wizard.advance();
    }
    if target == "thanks" {
        state.wizard.submit()?;
    }
    set_focus(&mut state, FocusTarget::Field(0));
    Ok(state)
}

/// Non-interactive smoke mode: render a single frame and return it as text.
/// Targets: basic|property|system|review|thanks|contact
pub fn render_smoke(target: &str, settings: &Settings) -> Result<String> {
    info!(
        "[PHASE: tui] [STEP: smoke] Rendering single-frame TUI smoke target={}",
        target
    );

    let t = target.trim().to_ascii_lowercase();
    let state = new_smoke_state(t.as_str(), settings)?;

    // In-memory backend: no raw mode or alternate screen.
    let backend = TestBackend::new(100, 30);
    let mut terminal = Terminal::new(backend)?;
    terminal.draw(|f| draw(f.size(), f, &state))?;

    Ok(buffer_text(terminal.backend().buffer()))
}

fn buffer_text(buffer: &ratatui::buffer::Buffer) -> String {
    let width = buffer.area.width.max(1) as usize;
    buffer
        .content
        .chunks(width)
        .map(|row| {
            let line: String = row.iter().map(|c| c.symbol()).collect();
            line.trim_end().to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    terminal.backend_mut().execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    mut state: TuiState,
) -> Result<()> {
    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now();
    let (tx, rx) = mpsc::channel::<UiMsg>();

    while !state.quit {
        drain_messages(&mut state, &rx);
        terminal.draw(|f| draw(f.size(), f, &state))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_millis(0));

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                handle_key(&mut state, key.code, &tx);
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }
    }

    info!("[PHASE: tui] [STEP: exit] TUI closed");
    Ok(())
}

fn drain_messages(state: &mut TuiState, rx: &mpsc::Receiver<UiMsg>) {
    while let Ok(msg) = rx.try_recv() {
        match msg {
            UiMsg::SubmissionFinished {
                result,
                correlation_id,
            } => {
                state.contact.finish_submit(&result);
                info!(
                    "[PHASE: tui] [STEP: submit] Contact submission finished success={} (correlation_id={})",
                    result.success, correlation_id
                );
                let title = if result.success {
                    "Message Sent"
                } else {
                    "Submission Failed"
                };
                if result.success {
                    set_focus(state, FocusTarget::Field(0));
                }
                state.modal = Some(Modal::Message {
                    title: title.to_string(),
                    body: result.message,
                });
            }
        }
    }
}

fn start_contact_submission(state: &mut TuiState, tx: &mpsc::Sender<UiMsg>) {
    let payload = match state.contact.begin_submit() {
        Ok(p) => p,
        Err(SubmitError::Invalid(errors)) => {
            // Jump to the first field that needs attention.
            if let Some(first) = errors.iter().next() {
                let idx = ContactField::ALL
                    .iter()
                    .position(|f| *f == first.field)
                    .unwrap_or(0);
                set_focus(state, FocusTarget::Field(idx));
            }
            return;
        }
        Err(SubmitError::AlreadySubmitting) => return,
    };

    let gateway = Arc::clone(&state.gateway);
    let tx = tx.clone();
    thread::spawn(move || {
        let correlation_id = payload.correlation_id.clone();
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build();
        let result = match rt {
            Ok(rt) => SubmissionResult::from(rt.block_on(gateway.submit(&payload))),
            Err(e) => {
                warn!(
                    "[PHASE: tui] [STEP: submit] Internal error starting submission: {}",
                    e
                );
                SubmissionResult::fail(format!("Internal error starting submission: {}", e))
            }
        };
        let _ = tx.send(UiMsg::SubmissionFinished {
            result,
            correlation_id,
        });
    });
}

fn activate_next(state: &mut TuiState, tx: &mpsc::Sender<UiMsg>) {
    match current_page(state) {
        Page::Contact => start_contact_submission(state, tx),
        Page::ThankYou => state.quit = true,
        Page::Review => match state.wizard.submit() {
            Ok(_) => set_focused_button(state, ButtonFocus::Next),
            Err(e) => {
                state.modal = Some(Modal::Message {
                    title: "Unable to submit".to_string(),
                    body: e.to_string(),
                })
            }
        },
        _ => {
            state.wizard.advance();
            set_focus(state, FocusTarget::Field(0));
        }
    }
}

fn activate_back(state: &mut TuiState) {
    if state.wizard.retreat() {
        set_focus(state, FocusTarget::Field(0));
    }
}

fn open_cancel_modal(state: &mut TuiState) {
    if can_cancel(current_page(state)) {
        state.modal = Some(Modal::ConfirmCancel);
        set_focused_button(state, ButtonFocus::Next);
    } else {
        state.quit = true;
    }
}

fn handle_key(state: &mut TuiState, code: KeyCode, tx: &mpsc::Sender<UiMsg>) {
    // Modal handling
    if let Some(modal) = state.modal.clone() {
        match modal {
            Modal::ConfirmCancel => match code {
                KeyCode::Left | KeyCode::Right | KeyCode::Tab => {
                    let next = match focused_button(state) {
                        ButtonFocus::Cancel => ButtonFocus::Next,
                        _ => ButtonFocus::Cancel,
                    };
                    set_focused_button(state, next);
                }
                KeyCode::Enter => {
                    let confirm = focused_button(state) == ButtonFocus::Cancel;
                    state.modal = None;
                    if confirm {
                        info!("[PHASE: tui] [STEP: cancel] User cancelled");
                        state.quit = true;
                    }
                }
                KeyCode::Esc => {
                    state.modal = None;
                }
                _ => {}
            },
            Modal::Message { .. } => {
                if matches!(code, KeyCode::Enter | KeyCode::Esc) {
                    state.modal = None;
                }
            }
        }
        return;
    }

    match code {
        KeyCode::Esc => {
            open_cancel_modal(state);
            return;
        }
        KeyCode::Tab | KeyCode::Down => {
            move_focus(state, true);
            return;
        }
        KeyCode::BackTab | KeyCode::Up => {
            move_focus(state, false);
            return;
        }
        _ => {}
    }

    match state.focus {
        FocusTarget::Button(b) => match code {
            KeyCode::Left | KeyCode::Right => {
                move_focus(state, code == KeyCode::Right);
            }
            KeyCode::Enter => match b {
                ButtonFocus::Back => activate_back(state),
                ButtonFocus::Next => {
                    if can_go_next(state) {
                        activate_next(state, tx);
                    }
                }
                ButtonFocus::Cancel => open_cancel_modal(state),
            },
            _ => {}
        },
        FocusTarget::Field(_) => {
            let Some(field) = focused_field(state) else {
                return;
            };
            if state.flow == Flow::Contact && state.contact.is_submitting() {
                return;
            }
            if code == KeyCode::Enter {
                move_focus(state, true);
                return;
            }

            if let Some(options) = field.options() {
                let forward = match code {
                    KeyCode::Right | KeyCode::Char(' ') => true,
                    KeyCode::Left => false,
                    _ => return,
                };
                let next = cycle_option(options, field_value(state, field), forward);
                set_field_value(state, field, next.to_string());
                return;
            }

            if state.editor.handle_key(code) {
                let value = state.editor.value.clone();
                set_field_value(state, field, value);
            }
        }
    }
}

fn field_lines(state: &TuiState) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let errors = state.contact.errors();

    for (i, field) in page_fields(state).into_iter().enumerate() {
        let focused = state.focus == FocusTarget::Field(i);
        let prefix = if focused { ">" } else { " " };
        let marker = if field.required() { " *" } else { "" };
        lines.push(Line::from(format!("{} {}{}", prefix, field.label(), marker)));

        let raw = field_value(state, field);
        let value_span = if raw.is_empty() {
            let hint = match field {
                FieldRef::Quote(f) => placeholder(f),
                FieldRef::Contact(_) => "",
            };
            Span::styled(hint.to_string(), Style::default().fg(Color::DarkGray))
        } else {
            let shown = match field {
                FieldRef::Quote(f) => option_label(f, raw).unwrap_or(raw).to_string(),
                FieldRef::Contact(_) => raw.to_string(),
            };
            Span::raw(shown)
        };

        let mut value_line = vec![Span::raw("    ")];
        if field.options().is_some() {
            value_line.push(Span::raw("< "));
            value_line.push(value_span);
            value_line.push(Span::raw(" >"));
        } else {
            value_line.push(value_span);
            if focused {
                value_line.push(Span::styled(
                    "_",
                    Style::default().add_modifier(Modifier::SLOW_BLINK),
                ));
            }
        }
        lines.push(Line::from(value_line));

        if let FieldRef::Contact(f) = field {
            if let Some(msg) = errors.message(f) {
                lines.push(Line::from(Span::styled(
                    format!("    {}", msg),
                    Style::default().fg(Color::Red),
                )));
            }
        }

        if field == FieldRef::Quote(QuoteField::MonthlyBill) {
            if let Some(bill) = parse_monthly_bill(raw) {
                lines.push(Line::from(Span::styled(
                    format!(
                        "    Estimated {}-year savings: {}",
                        PROJECTION_YEARS,
                        format_mwk(lifetime_savings(bill))
                    ),
                    Style::default().fg(Color::Green),
                )));
            }
        }
    }
    lines
}

fn content_text(state: &TuiState) -> Text<'static> {
    match current_page(state) {
        Page::BasicInfo | Page::PropertyDetails | Page::SystemPreferences => {
            let mut lines = field_lines(state);
            lines.push(Line::from(""));
            lines.push(Line::from(
                "Tab/Up/Down move between fields. Left/Right change a selection.",
            ));
            Text::from(lines)
        }
        Page::Review => {
            let mut lines = vec![
                Line::from(Span::styled(
                    "Review Your Information",
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
            ];
            for section in state.wizard.review() {
                lines.push(Line::from(Span::styled(
                    section.title,
                    Style::default().add_modifier(Modifier::BOLD),
                )));
                for l in section.lines {
                    lines.push(Line::from(format!("  {}", l)));
                }
                lines.push(Line::from(""));
            }
            let missing = state.wizard.missing_required();
            if !missing.is_empty() {
                let names: Vec<&str> = missing.iter().map(|f| f.label()).collect();
                lines.push(Line::from(Span::styled(
                    format!("Not yet filled in: {}", names.join(", ")),
                    Style::default().fg(Color::Yellow),
                )));
            }
            Text::from(lines)
        }
        Page::ThankYou => Text::from(vec![
            Line::from(Span::styled(
                THANK_YOU_TITLE,
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(THANK_YOU_BODY),
            Line::from(""),
            Line::from("Select Finish to exit."),
        ]),
        Page::Contact => {
            let mut lines = vec![
                Line::from("Send us a message and we'll get back to you soon."),
                Line::from(""),
            ];
            lines.extend(field_lines(state));
            if state.contact.is_submitting() {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    "Sending your message...",
                    Style::default().fg(Color::Yellow),
                )));
            }
            Text::from(lines)
        }
    }
}

fn banner_text(company: &CompanySettings) -> Text<'static> {
    let mut lines: Vec<Line<'static>> = ASCII_LOGO
        .lines()
        .map(|l| Line::from(l.to_string()))
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        company.full_name.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(""));
    lines.push(Line::from(format!("Phone: {}", company.phone)));
    lines.push(Line::from(format!("Email: {}", company.email)));
    lines.push(Line::from(""));
    lines.push(Line::from(company.address.clone()));
    Text::from(lines)
}

fn draw(area: Rect, f: &mut ratatui::Frame<'_>, state: &TuiState) {
    let window_area = centered_window(area, 100, 30);

    // Outer frame
    let window_title = match state.flow {
        Flow::Quote => format!("{} - Get Your Free Quote", state.company.name),
        Flow::Contact => format!("{} - Contact", state.company.name),
    };
    let outer_block = Block::default().borders(Borders::ALL).title(window_title);
    f.render_widget(outer_block, window_area);

    // Inner layout: banner + content + buttons row
    let inner = window_area.inner(&ratatui::layout::Margin {
        vertical: 1,
        horizontal: 1,
    });
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)].as_ref())
        .split(inner);

    let body = rows[0];
    let buttons = rows[1];

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(40), Constraint::Min(0)].as_ref())
        .split(body);

    // Left banner
    let banner = Paragraph::new(banner_text(&state.company))
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: false });
    f.render_widget(banner, cols[0]);

    // Right content
    let content_block = Block::default()
        .borders(Borders::ALL)
        .title(page_title(state));
    f.render_widget(content_block, cols[1]);
    let content_inner = cols[1].inner(&ratatui::layout::Margin {
        vertical: 1,
        horizontal: 1,
    });
    let content = Paragraph::new(content_text(state))
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: false });
    f.render_widget(content, content_inner);

    // Bottom buttons row (right-aligned)
    draw_buttons(f, buttons, state);

    // Modal overlay
    if let Some(modal) = state.modal.as_ref() {
        match modal {
            Modal::ConfirmCancel => draw_cancel_modal(f, window_area, state),
            Modal::Message { title, body } => draw_message_modal(f, window_area, title, body),
        }
    }
}

fn centered_window(area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(area.width.saturating_sub(2)).max(60).min(area.width);
    let h = height.min(area.height.saturating_sub(2)).max(20).min(area.height);
    let x = area.x + (area.width.saturating_sub(w)) / 2;
    let y = area.y + (area.height.saturating_sub(h)) / 2;
    Rect {
        x,
        y,
        width: w,
        height: h,
    }
}

fn draw_buttons(f: &mut ratatui::Frame<'_>, area: Rect, state: &TuiState) {
    let page = current_page(state);

    let back = button_text(
        "Back",
        state.focus == FocusTarget::Button(ButtonFocus::Back),
        can_go_back(page),
    );
    let next = button_text(
        next_label(state),
        state.focus == FocusTarget::Button(ButtonFocus::Next),
        can_go_next(state),
    );
    let cancel = button_text(
        "Cancel",
        state.focus == FocusTarget::Button(ButtonFocus::Cancel),
        can_cancel(page),
    );

    let line = Line::from(vec![back, Span::raw(" "), next, Span::raw(" "), cancel]);
    let p = Paragraph::new(Text::from(line)).alignment(Alignment::Right);
    f.render_widget(p, area);
}

fn button_text(label: &str, focused: bool, enabled: bool) -> Span<'static> {
    let mut style = Style::default();
    if !enabled {
        style = style.fg(Color::DarkGray);
    }
    if focused && enabled {
        style = style.add_modifier(Modifier::REVERSED);
    }
    Span::styled(format!("[ {} ]", label), style)
}

fn modal_area(window_area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(window_area.width.saturating_sub(4)).max(40);
    let h = height.min(window_area.height.saturating_sub(4)).max(7);
    Rect {
        x: window_area.x + (window_area.width.saturating_sub(w)) / 2,
        y: window_area.y + (window_area.height.saturating_sub(h)) / 2,
        width: w,
        height: h,
    }
}

fn modal_button_row(area: Rect) -> Rect {
    Rect {
        x: area.x + 1,
        y: area.y + area.height.saturating_sub(2),
        width: area.width.saturating_sub(2),
        height: 1,
    }
}

fn draw_cancel_modal(f: &mut ratatui::Frame<'_>, window_area: Rect, state: &TuiState) {
    let area = modal_area(window_area, 56, 7);
    f.render_widget(ratatui::widgets::Clear, area);

    let block = Block::default().borders(Borders::ALL).title("Leave?");
    let body = Paragraph::new(Text::from(vec![
        Line::from("Anything you have entered will be discarded."),
        Line::from(""),
        Line::from(""),
    ]))
    .block(block)
    .wrap(Wrap { trim: false });
    f.render_widget(body, area);

    // Buttons: [Yes, leave] [No] (primary on right)
    let yes_focused = focused_button(state) == ButtonFocus::Cancel;
    let no_focused = focused_button(state) == ButtonFocus::Next;
    let yes = Span::styled(
        "[ Yes, leave ]",
        if yes_focused {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        },
    );
    let no = Span::styled(
        "[ No ]",
        if no_focused {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        },
    );

    let line = Line::from(vec![yes, Span::raw(" "), no]);
    let p = Paragraph::new(Text::from(line)).alignment(Alignment::Right);
    f.render_widget(p, modal_button_row(area));
}

fn draw_message_modal(f: &mut ratatui::Frame<'_>, window_area: Rect, title: &str, body: &str) {
    let area = modal_area(window_area, 64, 8);
    f.render_widget(ratatui::widgets::Clear, area);

    let block = Block::default().borders(Borders::ALL).title(title.to_string());
    let p = Paragraph::new(Text::from(body.to_string()))
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(p, area);

    let ok = Span::styled("[ OK ]", Style::default().add_modifier(Modifier::REVERSED));
    let p = Paragraph::new(Text::from(Line::from(vec![ok]))).alignment(Alignment::Right);
    f.render_widget(p, modal_button_row(area));
}
