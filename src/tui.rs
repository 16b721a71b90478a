//! Terminal User Interface for the certforge report wizard.
//!
//! The TUI owns only view state (selection, edit buffers, scroll, zoom);
//! every canonical mutation flows into the [`WizardController`] as a
//! discrete event. Generation runs on the async runtime while the UI keeps
//! ticking; a result that arrives after the user navigated away is still
//! applied to state.

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Paragraph, Wrap},
};
use std::io::{self, Write};
use std::sync::Arc;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use camino::Utf8PathBuf;
use chrono::Utc;

use certforge_config::Config;
use certforge_llm::{GenerationRequest, ReportClient, StubBackend, client_from_config};
use certforge_render::{ZoomLevel, clipboard_sequence, download_file_name, print_html};
use certforge_templates::FieldSpec;
use certforge_utils::atomic_write::write_file_atomic;
use certforge_utils::error::GenerationError;
use certforge_utils::types::{FaultCode, StepId};
use certforge_wizard::{JsonFileStore, SectionUpdate, WizardController};

/// UI tick interval; drives the autosave display stamp and result polling.
const TICK_INTERVAL: Duration = Duration::from_millis(200);

/// How long transient notices stay visible.
const NOTICE_TTL: Duration = Duration::from_secs(5);

/// What the keyboard is currently driving.
#[derive(Default)]
enum Mode {
    /// Navigating steps and rows.
    #[default]
    Browse,
    /// Editing one field's value.
    EditField {
        step: StepId,
        key: String,
        label: String,
        buffer: String,
    },
    /// Editing the additional notes.
    EditNotes { buffer: String },
    /// Filling in a fault entry.
    FaultForm(FaultForm),
    /// Viewing the generated report.
    Report,
    /// Waiting for reset confirmation.
    ConfirmReset,
}

/// Draft state of the fault entry form.
///
/// Cancelling the form discards the draft; nothing reaches the controller
/// until the draft validates.
#[derive(Default)]
struct FaultForm {
    code_idx: Option<usize>,
    description: String,
    location: String,
    recommendation: String,
    /// 0 = code, 1 = description, 2 = location, 3 = recommendation.
    focus: usize,
}

impl FaultForm {
    fn code(&self) -> Option<FaultCode> {
        self.code_idx.map(|i| FaultCode::ALL[i % FaultCode::ALL.len()])
    }

    fn cycle_code(&mut self, forward: bool) {
        let len = FaultCode::ALL.len();
        self.code_idx = Some(match self.code_idx {
            None => {
                if forward {
                    0
                } else {
                    len - 1
                }
            }
            Some(i) if forward => (i + 1) % len,
            Some(i) => (i + len - 1) % len,
        });
    }

    fn focused_buffer(&mut self) -> Option<&mut String> {
        match self.focus {
            1 => Some(&mut self.description),
            2 => Some(&mut self.location),
            3 => Some(&mut self.recommendation),
            _ => None,
        }
    }
}

/// Transient footer notification.
struct Notice {
    text: String,
    error: bool,
    at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GenerationState {
    Idle,
    Pending,
    Done,
    Failed,
}

/// A selectable row in the client/inspection body.
enum BodyRow {
    Field(&'static FieldSpec),
    Fault(u64),
}

/// TUI application state.
struct WizardApp {
    controller: WizardController<JsonFileStore>,
    config: Config,
    /// HTTP client, shared across generate presses so the in-flight guard
    /// spans the whole session. None when the endpoint is unconfigured.
    client: Option<ReportClient>,
    /// Local draft client for 'd' (dry-run) generation.
    stub_client: ReportClient,
    mode: Mode,
    /// Selected row in the current step's body.
    row_index: usize,
    notice: Option<Notice>,
    generation: GenerationState,
    result_rx: Option<mpsc::Receiver<Result<String, GenerationError>>>,
    report: Option<String>,
    report_scroll: u16,
    zoom: ZoomLevel,
    runtime: tokio::runtime::Runtime,
    should_quit: bool,
}

impl WizardApp {
    fn new(config: &Config) -> Result<Self> {
        let store = JsonFileStore::new(config.state_dir.clone());
        let mut controller = WizardController::new(store, config.autosave_debounce);

        let report = std::fs::read_to_string(crate::cli::report_path(config).as_std_path()).ok();
        if report.is_some() {
            controller.mark_generation_started();
        }
        let generation = if report.is_some() {
            GenerationState::Done
        } else {
            GenerationState::Idle
        };

        let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;

        Ok(Self {
            controller,
            config: config.clone(),
            client: client_from_config(config, false).ok(),
            stub_client: ReportClient::new(Arc::new(StubBackend::new())),
            mode: Mode::Browse,
            row_index: 0,
            notice: None,
            generation,
            result_rx: None,
            report,
            report_scroll: 0,
            zoom: ZoomLevel::default(),
            runtime,
            should_quit: false,
        })
    }

    fn notify(&mut self, text: impl Into<String>) {
        self.notice = Some(Notice { text: text.into(), error: false, at: Instant::now() });
    }

    fn notify_error(&mut self, text: impl Into<String>) {
        self.notice = Some(Notice { text: text.into(), error: true, at: Instant::now() });
    }

    /// Rows shown for the current step body.
    fn body_rows(&self) -> Vec<BodyRow> {
        let Some(template) = self.controller.template() else {
            return Vec::new();
        };
        match self.controller.current_step() {
            StepId::Client => template.client_fields.iter().map(BodyRow::Field).collect(),
            StepId::Inspection => {
                let mut rows: Vec<BodyRow> =
                    template.inspection_fields.iter().map(BodyRow::Field).collect();
                for fault in &self.controller.data().inspection_details.faults {
                    rows.push(BodyRow::Fault(fault.id));
                }
                rows
            }
            _ => Vec::new(),
        }
    }

    fn row_count(&self) -> usize {
        match self.controller.current_step() {
            StepId::Template => certforge_templates::catalog().len(),
            _ => self.body_rows().len(),
        }
    }

    fn clamp_row(&mut self) {
        let count = self.row_count();
        if count == 0 {
            self.row_index = 0;
        } else if self.row_index >= count {
            self.row_index = count - 1;
        }
    }

    fn select_previous(&mut self) {
        let count = self.row_count();
        if count == 0 {
            return;
        }
        self.row_index = if self.row_index > 0 { self.row_index - 1 } else { count - 1 };
    }

    fn select_next(&mut self) {
        let count = self.row_count();
        if count == 0 {
            return;
        }
        self.row_index = if self.row_index < count - 1 { self.row_index + 1 } else { 0 };
    }

    /// Periodic work: autosave stamp, notice expiry, generation results.
    fn on_tick(&mut self) {
        self.controller.autosave_tick(Instant::now());

        if self.notice.as_ref().is_some_and(|n| n.at.elapsed() > NOTICE_TTL) {
            self.notice = None;
        }

        let outcome = self.result_rx.as_ref().and_then(|rx| rx.try_recv().ok());
        if let Some(outcome) = outcome {
            self.result_rx = None;
            match outcome {
                Ok(report) => {
                    // Applied to state regardless of where the user is now;
                    // the report view shows it when they return.
                    let template = self
                        .controller
                        .data()
                        .template
                        .clone()
                        .unwrap_or_else(|| "report".to_string());
                    if let Err(e) = crate::cli::save_report(&self.config, &template, &report) {
                        self.notify_error(format!("Report not persisted: {e}"));
                    }
                    self.report = Some(report);
                    self.generation = GenerationState::Done;
                    self.notify("Report generated. Press 'v' on the review step to view it.");
                }
                Err(e) => {
                    self.generation = GenerationState::Failed;
                    self.notify_error(format!("Generation failed: {e}"));
                }
            }
        }
    }

    /// Kick off a generation request on the runtime.
    fn start_generation(&mut self, dry_run: bool) {
        if self.generation == GenerationState::Pending {
            self.notify("Generation already running");
            return;
        }
        if !self.controller.step_accessible(StepId::Review) {
            self.notify_error("Earlier steps are incomplete");
            return;
        }

        let request = match GenerationRequest::from_wizard(self.controller.data()) {
            Ok(request) => request,
            Err(e) => {
                self.notify_error(e.to_string());
                return;
            }
        };

        let client = if dry_run {
            self.stub_client.clone()
        } else {
            match &self.client {
                Some(client) => client.clone(),
                None => {
                    self.notify_error(
                        "Endpoint not configured; press 'd' for a local draft instead",
                    );
                    return;
                }
            }
        };

        self.controller.mark_generation_started();
        self.generation = GenerationState::Pending;
        let (tx, rx) = mpsc::channel();
        self.result_rx = Some(rx);
        self.runtime.spawn(async move {
            let _ = tx.send(client.generate(&request).await);
        });
    }

    fn copy_report(&mut self) {
        let Some(report) = &self.report else {
            self.notify_error("Copy failed: no report");
            return;
        };
        let sequence = clipboard_sequence(report);
        let mut stdout = io::stdout();
        if stdout
            .write_all(sequence.as_bytes())
            .and_then(|()| stdout.flush())
            .is_err()
        {
            self.notify_error("Copy failed");
        } else {
            self.notify("Report copied to clipboard");
        }
    }

    fn export_report(&mut self) {
        let Some(report) = self.report.clone() else {
            self.notify_error("No report to export");
            return;
        };
        let template = self
            .controller
            .data()
            .template
            .clone()
            .unwrap_or_else(|| "report".to_string());
        let path = Utf8PathBuf::from(download_file_name(&template, Utc::now()));
        match write_file_atomic(&path, &report) {
            Ok(()) => self.notify(format!("Exported: {path}")),
            Err(_) => self.notify_error("Export failed"),
        }
    }

    fn print_report(&mut self) {
        let Some(report) = self.report.clone() else {
            self.notify_error("No report to print");
            return;
        };
        let template_id = self
            .controller
            .data()
            .template
            .clone()
            .unwrap_or_else(|| "report".to_string());
        let title = certforge_templates::find(&template_id)
            .map_or_else(|| template_id.clone(), |t| t.name.to_string());
        let now = Utc::now();
        let html = print_html(&report, &title, now);
        let path = Utf8PathBuf::from(format!("{}-report-{}.html", template_id, now.format("%Y-%m-%d")));
        match write_file_atomic(&path, &html) {
            Ok(()) => self.notify(format!("Print document written: {path}")),
            Err(_) => self.notify_error("Print output failed"),
        }
    }

    fn handle_key(&mut self, code: KeyCode) {
        let mode = std::mem::take(&mut self.mode);
        self.mode = match mode {
            Mode::Browse => self.handle_browse_key(code),
            Mode::EditField { step, key, label, buffer } => {
                self.handle_edit_field_key(code, step, key, label, buffer)
            }
            Mode::EditNotes { buffer } => self.handle_edit_notes_key(code, buffer),
            Mode::FaultForm(form) => self.handle_fault_form_key(code, form),
            Mode::Report => self.handle_report_key(code),
            Mode::ConfirmReset => self.handle_confirm_reset_key(code),
        };
    }

    fn handle_browse_key(&mut self, code: KeyCode) -> Mode {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Up | KeyCode::Char('k') => self.select_previous(),
            KeyCode::Down | KeyCode::Char('j') => self.select_next(),
            KeyCode::Tab => {
                if !self.controller.next_step() {
                    let step = self.controller.current_step();
                    let missing = self.controller.missing_fields(step).join(", ");
                    self.notify_error(format!("Complete this step first - missing: {missing}"));
                } else {
                    self.row_index = 0;
                }
            }
            KeyCode::BackTab => {
                if self.controller.previous_step() {
                    self.row_index = 0;
                }
            }
            KeyCode::Enter => return self.activate_row(),
            KeyCode::Char('a') if self.controller.current_step() == StepId::Inspection => {
                return Mode::FaultForm(FaultForm::default());
            }
            KeyCode::Char('d') if self.controller.current_step() == StepId::Inspection => {
                if let Some(BodyRow::Fault(id)) = self.body_rows().get(self.row_index) {
                    let id = *id;
                    self.controller.remove_fault(id);
                    self.clamp_row();
                    self.notify(format!("Fault #{id} removed"));
                }
            }
            KeyCode::Char('n') if self.controller.current_step() == StepId::Review => {
                return Mode::EditNotes {
                    buffer: self.controller.data().additional_notes.clone(),
                };
            }
            KeyCode::Char('g') if self.controller.current_step() == StepId::Review => {
                self.start_generation(false);
            }
            KeyCode::Char('d') if self.controller.current_step() == StepId::Review => {
                self.start_generation(true);
            }
            KeyCode::Char('v')
                if self.controller.current_step() == StepId::Review && self.report.is_some() =>
            {
                self.report_scroll = 0;
                return Mode::Report;
            }
            KeyCode::Char('r') => return Mode::ConfirmReset,
            _ => {}
        }
        Mode::Browse
    }

    /// Enter on the selected row: pick a template or start editing a field.
    fn activate_row(&mut self) -> Mode {
        match self.controller.current_step() {
            StepId::Template => {
                let catalog = certforge_templates::catalog();
                if let Some(template) = catalog.get(self.row_index) {
                    if self.controller.generation_started()
                        && self.controller.data().template.as_deref() != Some(template.id)
                    {
                        self.notify_error("Template is locked after generation has begun");
                    } else {
                        self.controller
                            .update_section(SectionUpdate::Template(Some(template.id.to_string())));
                        self.controller.next_step();
                        self.row_index = 0;
                    }
                }
                Mode::Browse
            }
            step @ (StepId::Client | StepId::Inspection) => {
                match self.body_rows().get(self.row_index) {
                    Some(BodyRow::Field(spec)) => {
                        let current = match step {
                            StepId::Client => self.controller.data().client_details.get(spec.key),
                            _ => self.controller.data().inspection_details.fields.get(spec.key),
                        }
                        .cloned()
                        .unwrap_or_default();
                        Mode::EditField {
                            step,
                            key: spec.key.to_string(),
                            label: spec.label.to_string(),
                            buffer: current,
                        }
                    }
                    _ => Mode::Browse,
                }
            }
            StepId::Review => {
                if self.report.is_some() {
                    self.report_scroll = 0;
                    Mode::Report
                } else {
                    Mode::Browse
                }
            }
        }
    }

    fn handle_edit_field_key(
        &mut self,
        code: KeyCode,
        step: StepId,
        key: String,
        label: String,
        mut buffer: String,
    ) -> Mode {
        match code {
            KeyCode::Enter => {
                match step {
                    StepId::Client => self.controller.set_client_field(&key, &buffer),
                    _ => self.controller.set_inspection_field(&key, &buffer),
                }
                Mode::Browse
            }
            KeyCode::Esc => Mode::Browse,
            KeyCode::Backspace => {
                buffer.pop();
                Mode::EditField { step, key, label, buffer }
            }
            KeyCode::Char(c) => {
                buffer.push(c);
                Mode::EditField { step, key, label, buffer }
            }
            _ => Mode::EditField { step, key, label, buffer },
        }
    }

    fn handle_edit_notes_key(&mut self, code: KeyCode, mut buffer: String) -> Mode {
        match code {
            KeyCode::Enter => {
                self.controller.set_notes(&buffer);
                Mode::Browse
            }
            KeyCode::Esc => Mode::Browse,
            KeyCode::Backspace => {
                buffer.pop();
                Mode::EditNotes { buffer }
            }
            KeyCode::Char(c) => {
                buffer.push(c);
                Mode::EditNotes { buffer }
            }
            _ => Mode::EditNotes { buffer },
        }
    }

    fn handle_fault_form_key(&mut self, code: KeyCode, mut form: FaultForm) -> Mode {
        match code {
            // Cancelled drafts are discarded, never persisted.
            KeyCode::Esc => Mode::Browse,
            KeyCode::Enter => {
                match self.controller.add_fault(
                    form.code(),
                    &form.description,
                    &form.location,
                    &form.recommendation,
                ) {
                    Ok(id) => {
                        self.notify(format!("Fault #{id} recorded"));
                        self.clamp_row();
                        Mode::Browse
                    }
                    Err(missing) => {
                        self.notify_error(format!("Fault needs: {}", missing.join(", ")));
                        Mode::FaultForm(form)
                    }
                }
            }
            KeyCode::Tab | KeyCode::Down => {
                form.focus = (form.focus + 1) % 4;
                Mode::FaultForm(form)
            }
            KeyCode::BackTab | KeyCode::Up => {
                form.focus = (form.focus + 3) % 4;
                Mode::FaultForm(form)
            }
            KeyCode::Left if form.focus == 0 => {
                form.cycle_code(false);
                Mode::FaultForm(form)
            }
            KeyCode::Right if form.focus == 0 => {
                form.cycle_code(true);
                Mode::FaultForm(form)
            }
            KeyCode::Backspace => {
                if let Some(buffer) = form.focused_buffer() {
                    buffer.pop();
                }
                Mode::FaultForm(form)
            }
            KeyCode::Char(c) => {
                if let Some(buffer) = form.focused_buffer() {
                    buffer.push(c);
                }
                Mode::FaultForm(form)
            }
            _ => Mode::FaultForm(form),
        }
    }

    fn handle_report_key(&mut self, code: KeyCode) -> Mode {
        match code {
            KeyCode::Esc | KeyCode::Char('q') => return Mode::Browse,
            KeyCode::Up | KeyCode::Char('k') => {
                self.report_scroll = self.report_scroll.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.report_scroll = self.report_scroll.saturating_add(1);
            }
            KeyCode::PageUp => self.report_scroll = self.report_scroll.saturating_sub(10),
            KeyCode::PageDown => self.report_scroll = self.report_scroll.saturating_add(10),
            KeyCode::Char('+') | KeyCode::Char('=') => self.zoom = self.zoom.zoom_in(),
            KeyCode::Char('-') => self.zoom = self.zoom.zoom_out(),
            KeyCode::Char('c') => self.copy_report(),
            KeyCode::Char('e') => self.export_report(),
            KeyCode::Char('p') => self.print_report(),
            _ => {}
        }
        Mode::Report
    }

    fn handle_confirm_reset_key(&mut self, code: KeyCode) -> Mode {
        if let KeyCode::Char('y') = code {
            self.controller.reset();
            self.report = None;
            self.generation = GenerationState::Idle;
            self.row_index = 0;
            for path in [
                crate::cli::report_path(&self.config),
                crate::cli::sidecar_path(&self.config),
            ] {
                let _ = std::fs::remove_file(path.as_std_path());
            }
            self.notify("Wizard reset");
        }
        Mode::Browse
    }
}

/// Run the wizard TUI against the given configuration.
pub fn run_wizard(config: &Config) -> Result<()> {
    // Setup terminal
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let mut app = WizardApp::new(config)?;

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    result
}

/// Main application loop.
fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut WizardApp,
) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    let mut last_tick = Instant::now();
    loop {
        terminal.draw(|f| ui(f, app))?;

        let timeout = TICK_INTERVAL.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.handle_key(key.code);
        }

        if last_tick.elapsed() >= TICK_INTERVAL {
            app.on_tick();
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

/// Render the UI.
fn ui(f: &mut Frame, app: &WizardApp) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with step tabs
            Constraint::Length(3), // Progress gauge
            Constraint::Min(10),   // Step body
            Constraint::Length(4), // Footer: hints, last saved, notice
        ])
        .split(f.area());

    render_header(f, app, chunks[0]);
    render_progress(f, app, chunks[1]);
    render_body(f, app, chunks[2]);
    render_footer(f, app, chunks[3]);
}

fn render_header(f: &mut Frame, app: &WizardApp, area: Rect) {
    let mut spans = vec![
        Span::styled(
            "certforge ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
    ];

    for step in StepId::ALL {
        let style = if step == app.controller.current_step() {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else if app.controller.is_step_complete(step) {
            Style::default().fg(Color::Green)
        } else if app.controller.step_accessible(step) {
            Style::default().fg(Color::White)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(format!(" {} ", step.label()), style));
        if step.next().is_some() {
            spans.push(Span::raw("→"));
        }
    }

    let header = Paragraph::new(vec![Line::from(spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Report Wizard "),
    );
    f.render_widget(header, area);
}

fn render_progress(f: &mut Frame, app: &WizardApp, area: Rect) {
    let step = app.controller.current_step();
    let label = format!(
        "Step {} of {} - {}",
        step.index() + 1,
        StepId::ALL.len(),
        step.label()
    );

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(" Progress "))
        .gauge_style(Style::default().fg(Color::Cyan))
        .percent(u16::from(app.controller.progress_percent()))
        .label(label);
    f.render_widget(gauge, area);
}

fn render_body(f: &mut Frame, app: &WizardApp, area: Rect) {
    match &app.mode {
        Mode::Report => render_report(f, app, area),
        Mode::FaultForm(form) => render_fault_form(f, form, area),
        Mode::ConfirmReset => render_confirm_reset(f, area),
        _ => match app.controller.current_step() {
            StepId::Template => render_template_step(f, app, area),
            StepId::Client | StepId::Inspection => render_field_step(f, app, area),
            StepId::Review => render_review_step(f, app, area),
        },
    }
}

fn render_template_step(f: &mut Frame, app: &WizardApp, area: Rect) {
    let selected_id = app.controller.data().template.as_deref();

    let items: Vec<ListItem> = certforge_templates::catalog()
        .iter()
        .map(|template| {
            let marker = if Some(template.id) == selected_id { "● " } else { "○ " };
            let line = Line::from(vec![
                Span::styled(marker, Style::default().fg(Color::Green)),
                Span::styled(template.name, Style::default().add_modifier(Modifier::BOLD)),
                Span::styled(
                    format!("  [{} / {}]", template.category.as_str(), template.tier.as_str()),
                    Style::default().fg(Color::Cyan),
                ),
                Span::styled(
                    format!("  {}", template.description),
                    Style::default().fg(Color::DarkGray),
                ),
            ]);
            ListItem::new(line)
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Choose a certificate template "),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("▶ ");

    let mut state = ListState::default();
    state.select(Some(app.row_index));
    f.render_stateful_widget(list, area, &mut state);
}

fn render_field_step(f: &mut Frame, app: &WizardApp, area: Rect) {
    let step = app.controller.current_step();
    let missing = app.controller.missing_fields(step);
    let title = if missing.is_empty() {
        format!(" {} (complete) ", step.label())
    } else {
        format!(" {} - missing: {} ", step.label(), missing.join(", "))
    };

    if app.controller.template().is_none() {
        let paragraph = Paragraph::new("Select a template first (Shift+Tab to go back).")
            .block(Block::default().borders(Borders::ALL).title(title))
            .alignment(Alignment::Center);
        f.render_widget(paragraph, area);
        return;
    }

    let data = app.controller.data();
    let items: Vec<ListItem> = app
        .body_rows()
        .iter()
        .map(|row| match row {
            BodyRow::Field(spec) => {
                let value = match step {
                    StepId::Client => data.client_details.get(spec.key),
                    _ => data.inspection_details.fields.get(spec.key),
                };
                let marker = if spec.required { "*" } else { " " };
                let value_span = match value {
                    Some(v) => Span::raw(v.clone()),
                    None => Span::styled("(empty)", Style::default().fg(Color::DarkGray)),
                };
                ListItem::new(Line::from(vec![
                    Span::styled(
                        format!("{marker}{:<28}", spec.label),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    value_span,
                ]))
            }
            BodyRow::Fault(id) => {
                let fault = data
                    .inspection_details
                    .faults
                    .iter()
                    .find(|fault| fault.id == *id);
                match fault {
                    Some(fault) => ListItem::new(Line::from(vec![
                        Span::styled(
                            format!(" #{} ", fault.id),
                            Style::default().fg(Color::DarkGray),
                        ),
                        Span::styled(
                            format!("[{}] ", fault.code),
                            fault_code_style(fault.code),
                        ),
                        Span::raw(format!("{} @ {}", fault.description, fault.location)),
                    ])),
                    None => ListItem::new(Line::from("")),
                }
            }
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("▶ ");

    let mut state = ListState::default();
    if !app.body_rows().is_empty() {
        state.select(Some(app.row_index));
    }
    f.render_stateful_widget(list, area, &mut state);
}

fn fault_code_style(code: FaultCode) -> Style {
    match code {
        FaultCode::C1 => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        FaultCode::C2 => Style::default().fg(Color::Magenta),
        FaultCode::C3 => Style::default().fg(Color::Yellow),
        FaultCode::FI => Style::default().fg(Color::Cyan),
    }
}

fn render_review_step(f: &mut Frame, app: &WizardApp, area: Rect) {
    let data = app.controller.data();
    let mut lines = Vec::new();

    let template_name = app
        .controller
        .template()
        .map_or("(not selected)", |t| t.name);
    lines.push(Line::from(vec![
        Span::styled("Template: ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(template_name),
    ]));
    lines.push(Line::from(""));

    for (section, fields) in [
        ("Client", &data.client_details),
        ("Inspection", &data.inspection_details.fields),
    ] {
        lines.push(Line::from(Span::styled(
            section,
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )));
        for (key, value) in fields {
            lines.push(Line::from(format!("  {key}: {value}")));
        }
        lines.push(Line::from(""));
    }

    lines.push(Line::from(Span::styled(
        format!("Faults ({})", data.inspection_details.faults.len()),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )));
    for fault in &data.inspection_details.faults {
        lines.push(Line::from(format!(
            "  [{}] {} @ {}",
            fault.code, fault.description, fault.location
        )));
    }
    lines.push(Line::from(""));

    if !data.additional_notes.is_empty() {
        lines.push(Line::from(Span::styled(
            "Notes",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(format!("  {}", data.additional_notes)));
        lines.push(Line::from(""));
    }

    let status_line = match app.generation {
        GenerationState::Idle => Line::from(Span::styled(
            "Press 'g' to generate the report ('d' for a local draft).",
            Style::default().fg(Color::Yellow),
        )),
        GenerationState::Pending => Line::from(Span::styled(
            "Generating report... (generate is disabled until this resolves)",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
        GenerationState::Done => Line::from(Span::styled(
            "Report ready - press 'v' to view, 'r' to start a new report.",
            Style::default().fg(Color::Green),
        )),
        GenerationState::Failed => Line::from(Span::styled(
            "Generation failed. Check the notice below, then press 'g' to retry.",
            Style::default().fg(Color::Red),
        )),
    };
    lines.push(status_line);

    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Review "))
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

fn render_report(f: &mut Frame, app: &WizardApp, area: Rect) {
    let Some(report) = &app.report else {
        let paragraph = Paragraph::new("No report generated yet.")
            .block(Block::default().borders(Borders::ALL).title(" Report "))
            .alignment(Alignment::Center);
        f.render_widget(paragraph, area);
        return;
    };

    let document = certforge_render::render(report);
    let lines = document_lines(&document);

    let title = format!(" Report (zoom {}%) ", app.zoom.percent());
    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: false })
        .scroll((app.report_scroll, 0));
    f.render_widget(paragraph, area);
}

/// Convert rendered display blocks into styled terminal lines.
fn document_lines(document: &certforge_render::DisplayDocument) -> Vec<Line<'static>> {
    use certforge_render::{Block as DocBlock, SpanStyle};

    let styled_spans = |spans: &[certforge_render::TextSpan]| -> Vec<Span<'static>> {
        spans
            .iter()
            .map(|span| match span.style {
                SpanStyle::Plain => Span::raw(span.text.clone()),
                SpanStyle::Bold => {
                    Span::styled(span.text.clone(), Style::default().add_modifier(Modifier::BOLD))
                }
                SpanStyle::Italic => Span::styled(
                    span.text.clone(),
                    Style::default().add_modifier(Modifier::ITALIC),
                ),
            })
            .collect()
    };

    let mut lines = Vec::new();
    for block in &document.blocks {
        match block {
            DocBlock::Heading { level, spans } => {
                let color = if *level <= 1 { Color::Cyan } else { Color::Yellow };
                let text: String = spans.iter().map(|s| s.text.as_str()).collect();
                lines.push(Line::from(Span::styled(
                    text,
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                )));
            }
            DocBlock::Paragraph { spans } => lines.push(Line::from(styled_spans(spans))),
            DocBlock::List { items } => {
                for item in items {
                    let mut spans = vec![Span::raw("  • ")];
                    spans.extend(styled_spans(item));
                    lines.push(Line::from(spans));
                }
            }
            DocBlock::Table { header, rows } => {
                lines.push(Line::from(Span::styled(
                    header.join("  |  "),
                    Style::default().add_modifier(Modifier::BOLD),
                )));
                for row in rows {
                    lines.push(Line::from(row.join("  |  ")));
                }
            }
            DocBlock::Rule => lines.push(Line::from(Span::styled(
                "─".repeat(40),
                Style::default().fg(Color::DarkGray),
            ))),
        }
        lines.push(Line::from(""));
    }
    lines
}

fn render_fault_form(f: &mut Frame, form: &FaultForm, area: Rect) {
    let input_style = |focused: bool| {
        if focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        }
    };

    let code_text = form
        .code()
        .map_or_else(|| "←/→ to choose".to_string(), |c| format!("{} - {}", c, c.label()));

    let lines = vec![
        Line::from("Record a fault (code, description, and location are required)"),
        Line::from(""),
        Line::from(vec![
            Span::styled("Code:           ", input_style(form.focus == 0)),
            Span::raw(code_text),
        ]),
        Line::from(vec![
            Span::styled("Description:    ", input_style(form.focus == 1)),
            Span::raw(form.description.clone()),
        ]),
        Line::from(vec![
            Span::styled("Location:       ", input_style(form.focus == 2)),
            Span::raw(form.location.clone()),
        ]),
        Line::from(vec![
            Span::styled("Recommendation: ", input_style(form.focus == 3)),
            Span::raw(form.recommendation.clone()),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "Enter: add   Esc: discard   Tab: next field",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" New Fault "))
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

fn render_confirm_reset(f: &mut Frame, area: Rect) {
    let paragraph = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            "Discard all entered data and start a new report?",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("Press 'y' to confirm, any other key to cancel."),
    ])
    .block(Block::default().borders(Borders::ALL).title(" Reset "))
    .alignment(Alignment::Center);
    f.render_widget(paragraph, area);
}

fn render_footer(f: &mut Frame, app: &WizardApp, area: Rect) {
    let hints = match &app.mode {
        Mode::Browse => match app.controller.current_step() {
            StepId::Template => "↑/↓ select   Enter choose   Tab next step   r reset   q quit",
            StepId::Client => "↑/↓ select   Enter edit   Tab/Shift+Tab steps   r reset   q quit",
            StepId::Inspection => {
                "↑/↓ select   Enter edit   a add fault   d delete fault   Tab/Shift+Tab steps   q quit"
            }
            StepId::Review => "g generate   d draft   v view report   n notes   Shift+Tab back   q quit",
        },
        Mode::EditField { .. } | Mode::EditNotes { .. } => "Enter save   Esc cancel",
        Mode::FaultForm(_) => "Enter add   Esc discard   Tab next field",
        Mode::Report => "↑/↓ scroll   +/- zoom   c copy   e export   p print   Esc back",
        Mode::ConfirmReset => "y confirm   any other key cancels",
    };

    let mut lines = vec![Line::from(Span::styled(
        hints,
        Style::default().fg(Color::DarkGray),
    ))];

    // Edit buffer overlays the second footer line while editing.
    match &app.mode {
        Mode::EditField { label, buffer, .. } => {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("{label}: "),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(buffer.clone()),
                Span::styled("▌", Style::default().fg(Color::Yellow)),
            ]));
        }
        Mode::EditNotes { buffer } => {
            lines.push(Line::from(vec![
                Span::styled("Notes: ", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(buffer.clone()),
                Span::styled("▌", Style::default().fg(Color::Yellow)),
            ]));
        }
        _ => {
            let saved = match app.controller.last_saved_display() {
                Some(stamp) => format!("Last saved {}", stamp.format("%H:%M:%S UTC")),
                None => "Not saved yet".to_string(),
            };
            match &app.notice {
                Some(notice) => {
                    let style = if notice.error {
                        Style::default().fg(Color::Red)
                    } else {
                        Style::default().fg(Color::Green)
                    };
                    lines.push(Line::from(vec![
                        Span::styled(notice.text.clone(), style),
                        Span::styled(
                            format!("   {saved}"),
                            Style::default().fg(Color::DarkGray),
                        ),
                    ]));
                }
                None => {
                    lines.push(Line::from(Span::styled(
                        saved,
                        Style::default().fg(Color::DarkGray),
                    )));
                }
            }
        }
    }

    let footer = Paragraph::new(lines).block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, area);
}
