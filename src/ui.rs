use std::io;
use std::path::PathBuf;

use anyhow::Result;
use chrono::FixedOffset;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use tracing::{error, info};

use weighing_ledger::format::{format_date, format_date_time, format_delta, format_weight};
use weighing_ledger::{
    AnnotatedRecord, DeltaTrend, ReportFormat, ReportOptions, WeighingLedger, WeighingStore,
};

const PAGE_STEP: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Summary,
    History,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::Summary => Page::History,
            Page::History => Page::Summary,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Summary => "Summary (latest per animal)",
            Page::History => "History",
        }
    }
}

pub struct App<'a, S: WeighingStore> {
    pub ledger: &'a mut WeighingLedger<S>,
    pub current_page: Page,
    pub filter: Option<String>,
    pub history: Vec<AnnotatedRecord>,
    pub summary: Vec<AnnotatedRecord>,
    pub history_state: TableState,
    pub summary_state: TableState,
    pub show_detail: bool,
    /// Record id waiting for y/n
    pub pending_delete: Option<String>,
    pub status: Option<String>,
    pub offset: FixedOffset,
    pub report_options: ReportOptions,
    pub output_dir: PathBuf,
}

impl<'a, S: WeighingStore> App<'a, S> {
    pub fn new(
        ledger: &'a mut WeighingLedger<S>,
        report_options: ReportOptions,
        output_dir: PathBuf,
    ) -> Self {
        let offset = report_options.offset;
        let mut app = Self {
            ledger,
            current_page: Page::Summary,
            filter: None,
            history: Vec::new(),
            summary: Vec::new(),
            history_state: TableState::default(),
            summary_state: TableState::default(),
            show_detail: false,
            pending_delete: None,
            status: None,
            offset,
            report_options,
            output_dir,
        };
        app.refresh();
        app
    }

    /// Recompute both views from the ledger snapshot
    pub fn refresh(&mut self) {
        self.history = self.ledger.history(self.filter.as_deref());
        self.summary = self.ledger.summary();
        clamp_selection(&mut self.history_state, self.history.len());
        clamp_selection(&mut self.summary_state, self.summary.len());
    }

    fn rows(&self) -> &[AnnotatedRecord] {
        match self.current_page {
            Page::Summary => &self.summary,
            Page::History => &self.history,
        }
    }

    fn table_state(&mut self) -> &mut TableState {
        match self.current_page {
            Page::Summary => &mut self.summary_state,
            Page::History => &mut self.history_state,
        }
    }

    pub fn selected_record(&self) -> Option<&AnnotatedRecord> {
        let state = match self.current_page {
            Page::Summary => &self.summary_state,
            Page::History => &self.history_state,
        };
        state.selected().and_then(|i| self.rows().get(i))
    }

    pub fn toggle_detail(&mut self) {
        self.show_detail = !self.show_detail;
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
    }

    // ========================================================================
    // FILTER
    // ========================================================================

    /// Step the animal filter forward (or back) through the known ids.
    /// Past either end the filter is cleared.
    pub fn cycle_filter(&mut self, forward: bool) {
        let ids = self.ledger.animal_ids();
        if ids.is_empty() {
            self.filter = None;
            self.refresh();
            return;
        }

        let position = self
            .filter
            .as_ref()
            .and_then(|f| ids.iter().position(|id| id == f));

        self.filter = match (position, forward) {
            (None, true) => ids.first().cloned(),
            (None, false) => ids.last().cloned(),
            (Some(i), true) => ids.get(i + 1).cloned(),
            (Some(0), false) => None,
            (Some(i), false) => ids.get(i - 1).cloned(),
        };

        self.current_page = Page::History;
        self.history_state.select(None);
        self.refresh();
    }

    pub fn clear_filter(&mut self) {
        self.filter = None;
        self.refresh();
    }

    // ========================================================================
    // DELETE & EXPORT
    // ========================================================================

    pub fn request_delete(&mut self) {
        if let Some(record) = self.selected_record() {
            let id = record.id().to_string();
            self.status = Some(format!(
                "Delete {} weighed {}? (y/n)",
                record.animal_id(),
                format_date(record.date(), self.offset)
            ));
            self.pending_delete = Some(id);
        }
    }

    pub fn confirm_delete(&mut self) {
        let Some(id) = self.pending_delete.take() else {
            return;
        };
        match self.ledger.delete(&id) {
            Ok(true) => self.status = Some("Weighing deleted".to_string()),
            Ok(false) => self.status = Some("Weighing was already gone".to_string()),
            Err(e) => {
                error!(error = %e, "delete failed");
                self.status = Some(format!("Delete failed: {}", e));
            }
        }
        self.refresh();
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
        self.status = None;
    }

    /// Write a CSV report of the current scope into the output dir
    pub fn export(&mut self) {
        let result = self
            .ledger
            .report(self.filter.as_deref(), &self.report_options)
            .and_then(|table| {
                let path = self.output_dir.join(table.file_name(ReportFormat::Csv));
                let file = std::fs::File::create(&path)?;
                table.render(ReportFormat::Csv, file)?;
                Ok(path)
            });

        self.status = Some(match result {
            Ok(path) => {
                info!(path = %path.display(), "report exported");
                format!("Exported {}", path.display())
            }
            Err(e) => format!("Export failed: {}", e),
        });
    }

    // ========================================================================
    // NAVIGATION
    // ========================================================================

    pub fn next(&mut self) {
        let len = self.rows().len();
        move_selection(self.table_state(), len, |i| if i + 1 >= len { 0 } else { i + 1 });
    }

    pub fn previous(&mut self) {
        let len = self.rows().len();
        move_selection(self.table_state(), len, |i| if i == 0 { len - 1 } else { i - 1 });
    }

    pub fn page_down(&mut self) {
        let len = self.rows().len();
        move_selection(self.table_state(), len, |i| (i + PAGE_STEP).min(len - 1));
    }

    pub fn page_up(&mut self) {
        let len = self.rows().len();
        move_selection(self.table_state(), len, |i| i.saturating_sub(PAGE_STEP));
    }

    pub fn first(&mut self) {
        let len = self.rows().len();
        move_selection(self.table_state(), len, |_| 0);
    }

    pub fn last(&mut self) {
        let len = self.rows().len();
        move_selection(self.table_state(), len, |_| len - 1);
    }
}

fn move_selection(state: &mut TableState, len: usize, step: impl Fn(usize) -> usize) {
    if len == 0 {
        state.select(None);
        return;
    }
    let i = match state.selected() {
        Some(i) => step(i.min(len - 1)),
        None => 0,
    };
    state.select(Some(i));
}

fn clamp_selection(state: &mut TableState, len: usize) {
    match (state.selected(), len) {
        (_, 0) => state.select(None),
        (None, _) => state.select(Some(0)),
        (Some(i), _) if i >= len => state.select(Some(len - 1)),
        _ => {}
    }
}

// ============================================================================
// EVENT LOOP
// ============================================================================

pub fn run_ui<S: WeighingStore>(app: &mut App<'_, S>) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!(error = %err, "ui loop failed");
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend, S: WeighingStore>(
    terminal: &mut Terminal<B>,
    app: &mut App<'_, S>,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        if app.pending_delete.is_some() {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => app.confirm_delete(),
                _ => app.cancel_delete(),
            }
            continue;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
            KeyCode::Enter => app.toggle_detail(),
            KeyCode::Tab | KeyCode::BackTab => app.next_page(),
            KeyCode::Char('f') => app.cycle_filter(true),
            KeyCode::Char('F') => app.cycle_filter(false),
            KeyCode::Char('c') => app.clear_filter(),
            KeyCode::Char('d') | KeyCode::Delete => app.request_delete(),
            KeyCode::Char('e') => app.export(),
            KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => app.refresh(),
            KeyCode::Down | KeyCode::Char('j') => app.next(),
            KeyCode::Up | KeyCode::Char('k') => app.previous(),
            KeyCode::PageDown => app.page_down(),
            KeyCode::PageUp => app.page_up(),
            KeyCode::Home => app.first(),
            KeyCode::End => app.last(),
            _ => {}
        }
    }
}

// ============================================================================
// RENDERING
// ============================================================================

fn ui<S: WeighingStore>(f: &mut Frame, app: &mut App<'_, S>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    if app.show_detail {
        let content_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(chunks[1]);

        render_table(f, content_chunks[0], app);
        render_detail_panel(f, content_chunks[1], app);
    } else {
        render_table(f, chunks[1], app);
    }

    render_status_bar(f, chunks[2], app);
}

fn trend_color(delta_kg: Option<f64>) -> Color {
    match DeltaTrend::of(delta_kg) {
        DeltaTrend::NoData => Color::DarkGray,
        DeltaTrend::Gain => Color::Green,
        DeltaTrend::Loss => Color::Red,
        DeltaTrend::Flat => Color::White,
    }
}

fn render_header<S: WeighingStore>(f: &mut Frame, area: Rect, app: &App<'_, S>) {
    let mut tab_spans = vec![];
    for (i, page) in [Page::Summary, Page::History].iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(page.title().to_string(), style));
    }

    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Weighings: {}", app.ledger.len()),
        Style::default().fg(Color::White),
    ));
    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Animals: {}", app.summary.len()),
        Style::default().fg(Color::Cyan),
    ));

    let header = Paragraph::new(vec![Line::from(tab_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(format!(" {} • Weighings ", app.report_options.organization)),
    );

    f.render_widget(header, area);
}

fn render_table<S: WeighingStore>(f: &mut Frame, area: Rect, app: &mut App<'_, S>) {
    let headers: &[&str] = match app.current_page {
        Page::Summary => &["Animal ID", "Date", "Weight (kg)", "Last Δ (kg)"],
        Page::History => &["Date", "Animal ID", "Weight (kg)", "Δ vs. previous (kg)"],
    };

    let header_cells = headers.iter().map(|h| {
        Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    });
    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let offset = app.offset;
    let page = app.current_page;
    let rows: Vec<Row> = app
        .rows()
        .iter()
        .map(|r| {
            let date = Cell::from(format_date(r.date(), offset));
            let animal = Cell::from(truncate(r.animal_id(), 24));
            let weight = Cell::from(format_weight(r.weight_kg()));
            let delta = Cell::from(format_delta(r.delta_kg))
                .style(Style::default().fg(trend_color(r.delta_kg)));

            let cells = match page {
                Page::Summary => vec![animal, date, weight, delta],
                Page::History => vec![date, animal, weight, delta],
            };
            Row::new(cells).height(1)
        })
        .collect();

    let title = match (page, &app.filter) {
        (Page::History, Some(animal)) => format!(" History - {} (by date) ", animal),
        (Page::History, None) => " History (by animal and date) ".to_string(),
        (Page::Summary, _) => " Latest weighing per animal ".to_string(),
    };

    let empty = rows.is_empty();
    let table = Table::new(
        rows,
        [
            Constraint::Length(12),
            Constraint::Length(26),
            Constraint::Length(13),
            Constraint::Length(20),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(title),
    )
    .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol("→ ");

    if empty {
        let message = Paragraph::new("  No weighings to show yet.").block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(page.title().to_string()),
        );
        f.render_widget(message, area);
        return;
    }

    f.render_stateful_widget(table, area, app.table_state());
}

fn render_status_bar<S: WeighingStore>(f: &mut Frame, area: Rect, app: &App<'_, S>) {
    let mut status_spans = vec![];

    if let Some(message) = &app.status {
        status_spans.push(Span::styled(
            format!(" {} ", message),
            Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
        ));
        status_spans.push(Span::raw(" | "));
    }

    if let Some(animal) = &app.filter {
        status_spans.push(Span::styled(
            format!("Filter: {}", animal),
            Style::default().fg(Color::Green),
        ));
        status_spans.push(Span::raw(" ("));
        status_spans.push(Span::styled("c", Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(" clear) | "));
    }

    for (key, label) in [
        ("Tab", " Page | "),
        ("f/F", " Filter | "),
        ("d", " Delete | "),
        ("e", " Export | "),
        ("Enter", " Details | "),
    ] {
        status_spans.push(Span::styled(key, Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(label));
    }
    status_spans.push(Span::styled("q", Style::default().fg(Color::Red)));
    status_spans.push(Span::raw(" Quit"));

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn render_detail_panel<S: WeighingStore>(f: &mut Frame, area: Rect, app: &App<'_, S>) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Weighing Details ");

    let Some(record) = app.selected_record() else {
        f.render_widget(Paragraph::new("No weighing selected").block(block), area);
        return;
    };

    let label = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let content = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  Animal: ", label),
            Span::raw(record.animal_id().to_string()),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Weighed: ", label),
            Span::raw(format_date_time(record.date(), app.offset)),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Weight: ", label),
            Span::raw(format!("{} kg", format_weight(record.weight_kg()))),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Δ vs. previous: ", label),
            Span::styled(
                format_delta(record.delta_kg),
                Style::default().fg(trend_color(record.delta_kg)),
            ),
        ]),
        Line::from(""),
        Line::from("  ─────────────────────────────────────"),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Record ID: ", label),
            Span::styled(record.id().to_string(), Style::default().fg(Color::DarkGray)),
        ]),
        Line::from(""),
        Line::from(vec![Span::styled(
            "  Press Enter to close",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )]),
    ];

    f.render_widget(Paragraph::new(content).block(block), area);
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
