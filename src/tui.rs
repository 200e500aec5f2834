use crate::catalog::{Catalog, Palette};
use crate::client::AnalysisService;
use crate::composer::{Composer, Field, ViewState};
use crate::error::AnalysisError;
use crate::format::{currency_symbol, fixed2, item_valuation};
use crate::model::{AnalysisResult, RiskTag};
use crate::pie;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Points},
        Block, Borders, Cell, List, ListItem, Paragraph, Row, Table, Wrap,
    },
    Frame, Terminal,
};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tui_big_text::{BigText, PixelSize};

const TITLE: &str = "PortPuls";
const SUBTITLE: &str = "Visualize and understand your stock portfolio in real-time";

type Outcome = (u64, Result<AnalysisResult, AnalysisError>);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppMode {
    Normal,
    Edit,
}

pub struct App {
    pub composer: Composer,
    pub catalog: Catalog,
    pub palette: Palette,
    pub selected_row: usize,
    pub selected_field: Field,
    pub mode: AppMode,
    pub edit_input: String,
    pub should_quit: bool,
    pub endpoint: String,
    service: Arc<dyn AnalysisService>,
    outcome_sender: mpsc::UnboundedSender<Outcome>,
    outcome_receiver: mpsc::UnboundedReceiver<Outcome>,
}

impl App {
    pub fn new(
        service: Arc<dyn AnalysisService>,
        catalog: Catalog,
        palette: Palette,
        endpoint: String,
    ) -> App {
        let (outcome_sender, outcome_receiver) = mpsc::unbounded_channel();
        App {
            composer: Composer::new(),
            catalog,
            palette,
            selected_row: 0,
            selected_field: Field::Symbol,
            mode: AppMode::Normal,
            edit_input: String::new(),
            should_quit: false,
            endpoint,
            service,
            outcome_sender,
            outcome_receiver,
        }
    }

    pub fn select_next(&mut self) {
        if self.selected_row < self.composer.entries().len().saturating_sub(1) {
            self.selected_row += 1;
        }
    }

    pub fn select_previous(&mut self) {
        if self.selected_row > 0 {
            self.selected_row -= 1;
        }
    }

    pub fn toggle_field(&mut self) {
        self.selected_field = match self.selected_field {
            Field::Symbol => Field::Quantity,
            Field::Quantity => Field::Symbol,
        };
    }

    pub fn cycle_symbol(&mut self, forward: bool) {
        let current = self.composer.entries()[self.selected_row].symbol.clone();
        let symbol = if forward {
            self.catalog.next_symbol(&current)
        } else {
            self.catalog.previous_symbol(&current)
        };
        self.composer
            .edit_entry(self.selected_row, Field::Symbol, symbol);
    }

    pub fn add_row(&mut self) {
        self.composer.add_row();
        self.selected_row = self.composer.entries().len() - 1;
        self.selected_field = Field::Symbol;
    }

    pub fn enter_edit_mode(&mut self) {
        self.selected_field = Field::Quantity;
        self.mode = AppMode::Edit;
        self.edit_input = self.composer.entries()[self.selected_row].quantity.clone();
    }

    pub fn exit_edit_mode(&mut self) {
        self.mode = AppMode::Normal;
        self.edit_input.clear();
    }

    pub fn save_edit(&mut self) {
        let value = std::mem::take(&mut self.edit_input);
        self.composer
            .edit_entry(self.selected_row, Field::Quantity, value);
        self.exit_edit_mode();
    }

    fn push_input(&mut self, c: char) {
        if c.is_ascii_digit() || (c == '.' && !self.edit_input.contains('.')) {
            self.edit_input.push(c);
        }
    }

    /// Starts an analysis; the request runs on a background task.
    pub fn submit(&mut self) {
        let Ok(submission) = self.composer.begin_analysis() else {
            return;
        };
        let service = self.service.clone();
        let sender = self.outcome_sender.clone();
        tokio::spawn(async move {
            let outcome = service.analyze(&submission.request).await;
            // The receiver is gone once the UI has exited.
            let _ = sender.send((submission.ticket, outcome));
        });
    }

    pub fn try_receive_outcome(&mut self) -> bool {
        let mut applied = false;
        while let Ok((ticket, outcome)) = self.outcome_receiver.try_recv() {
            applied |= self.composer.complete(ticket, outcome);
        }
        applied
    }

    pub fn handle_key(&mut self, code: KeyCode) {
        match self.mode {
            AppMode::Normal => match code {
                KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
                KeyCode::Char('j') | KeyCode::Down => self.select_next(),
                KeyCode::Char('k') | KeyCode::Up => self.select_previous(),
                KeyCode::Tab | KeyCode::BackTab => self.toggle_field(),
                KeyCode::Char('a') => self.add_row(),
                KeyCode::Char('r') => self.submit(),
                KeyCode::Char('e') => self.enter_edit_mode(),
                KeyCode::Right | KeyCode::Char('l') | KeyCode::Char(' ') | KeyCode::Enter
                    if self.selected_field == Field::Symbol =>
                {
                    self.cycle_symbol(true)
                }
                KeyCode::Left | KeyCode::Char('h') if self.selected_field == Field::Symbol => {
                    self.cycle_symbol(false)
                }
                KeyCode::Enter => self.enter_edit_mode(),
                KeyCode::Char(c)
                    if self.selected_field == Field::Quantity
                        && (c.is_ascii_digit() || c == '.') =>
                {
                    self.enter_edit_mode();
                    self.edit_input.clear();
                    self.push_input(c);
                }
                _ => {}
            },
            AppMode::Edit => match code {
                KeyCode::Esc => self.exit_edit_mode(),
                KeyCode::Enter | KeyCode::Tab => self.save_edit(),
                KeyCode::Backspace => {
                    self.edit_input.pop();
                }
                KeyCode::Char(c) => self.push_input(c),
                _ => {}
            },
        }
    }
}

pub async fn run_tui(mut app: App) -> eyre::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    tracing::info!(endpoint = %app.endpoint, "interactive session started");
    let res = run_app(&mut terminal, &mut app).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        tracing::error!(error = %err, "interactive session aborted");
    }
    res.map_err(eyre::Report::from)
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        app.try_receive_outcome();

        if crossterm::event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key.code);
                }
            }
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

fn ui(f: &mut Frame, app: &App) {
    let form_height = app.composer.entries().len() as u16 + 4;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(form_height.min(14)),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(f.area());

    render_header(f, chunks[0]);
    render_form(f, chunks[1], app);
    render_help(f, chunks[2], app);

    match app.composer.view() {
        ViewState::Idle => render_idle(f, chunks[3], app),
        ViewState::Error(message) => render_error(f, chunks[3], message),
        ViewState::Ready(result) => render_result(f, chunks[3], app, result),
    }
}

fn render_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(vec![
        Line::from(Span::styled(
            TITLE,
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(SUBTITLE, Style::default().fg(Color::Gray))),
    ])
    .block(Block::default().borders(Borders::BOTTOM))
    .alignment(Alignment::Center);
    f.render_widget(header, area);
}

fn render_form(f: &mut Frame, area: Rect, app: &App) {
    let header = Row::new(vec![
        Cell::from("#"),
        Cell::from("Symbol"),
        Cell::from("Quantity"),
    ])
    .style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )
    .bottom_margin(1);

    let focused = Style::default().bg(Color::DarkGray).fg(Color::White);

    let rows = app.composer.entries().iter().enumerate().map(|(i, entry)| {
        let is_selected = i == app.selected_row;

        let symbol_text = if entry.symbol.is_empty() {
            "‹ Symbol ›".to_string()
        } else {
            match app.catalog.display_name(&entry.symbol) {
                Some(name) => format!("‹ {} ({name}) ›", entry.symbol),
                None => format!("‹ {} ›", entry.symbol),
            }
        };

        let quantity_text = if is_selected && app.mode == AppMode::Edit {
            format!("{}▌", app.edit_input)
        } else if entry.quantity.is_empty() {
            "Quantity".to_string()
        } else {
            entry.quantity.clone()
        };

        let field_style = |field: Field, empty: bool| {
            if is_selected && app.selected_field == field {
                focused
            } else if empty {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default()
            }
        };

        Row::new(vec![
            Cell::from(format!("{}", i + 1)),
            Cell::from(symbol_text).style(field_style(Field::Symbol, entry.symbol.is_empty())),
            Cell::from(quantity_text)
                .style(field_style(Field::Quantity, entry.quantity.is_empty())),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(4),
            Constraint::Percentage(50),
            Constraint::Percentage(40),
        ],
    )
    .header(header)
    .block(Block::default().borders(Borders::ALL).title("Assets"));

    f.render_widget(table, area);
}

fn render_help(f: &mut Frame, area: Rect, app: &App) {
    let text = match app.mode {
        AppMode::Normal => {
            "j/k (row) | Tab (field) | ←/→ (symbol) | Enter (edit qty) | a (add asset) | r (analyze) | q (quit)"
        }
        AppMode::Edit => "Edit Mode: Enter (save) | Esc (cancel) | digits and decimal point",
    };
    let help = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("Help"))
        .style(Style::default().fg(Color::Gray))
        .alignment(Alignment::Center);
    f.render_widget(help, area);
}

fn render_idle(f: &mut Frame, area: Rect, app: &App) {
    let (text, style) = if app.composer.is_pending() {
        (
            format!("Analyzing… ({})", app.endpoint),
            Style::default().fg(Color::Yellow),
        )
    } else {
        (
            "Add your assets and press r to analyze".to_string(),
            Style::default().fg(Color::Gray),
        )
    };
    let paragraph = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("Analysis"))
        .style(style)
        .alignment(Alignment::Center);
    f.render_widget(paragraph, area);
}

fn render_error(f: &mut Frame, area: Rect, message: &str) {
    let error_paragraph = Paragraph::new(message.to_string())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Error")
                .style(Style::default().fg(Color::Red)),
        )
        .style(Style::default().fg(Color::Red))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(error_paragraph, area);
}

fn risk_style(tag: &RiskTag) -> Style {
    let color = match tag {
        RiskTag::Low => Color::Green,
        RiskTag::Normal | RiskTag::Medium => Color::Yellow,
        RiskTag::High => Color::Red,
        RiskTag::Other(_) => Color::White,
    };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

fn render_result(f: &mut Frame, area: Rect, app: &App, result: &AnalysisResult) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    render_pie(f, columns[0], app, result);

    let mut constraints = vec![Constraint::Length(6), Constraint::Min(3)];
    let insight = result.insight();
    if insight.is_some() {
        constraints.push(Constraint::Length(6));
    }
    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(columns[1]);

    render_total(f, right[0], app, result);
    render_breakdown(f, right[1], result);

    if let Some(insight) = insight {
        let paragraph = Paragraph::new(insight.to_string())
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("AI Insight")
                    .border_style(Style::default().fg(Color::Cyan)),
            )
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, right[2]);
    }
}

fn render_pie(f: &mut Frame, area: Rect, app: &App, result: &AnalysisResult) {
    let block = Block::default().borders(Borders::ALL).title("Allocation");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(inner);

    // Terminal cells are about twice as tall as wide.
    let side = (parts[0].width / 2).min(parts[0].height);
    let chart_area = Rect {
        x: parts[0].x + (parts[0].width - side * 2) / 2,
        y: parts[0].y + (parts[0].height - side) / 2,
        width: side * 2,
        height: side,
    };

    let values: Vec<f64> = result.breakdown.iter().map(|item| item.value).collect();
    let slices = pie::sample_points(&values, 61);
    let colors: Vec<Color> = (0..slices.len()).map(|i| app.palette.color(i)).collect();

    let canvas = Canvas::default()
        .marker(Marker::Braille)
        .x_bounds([-1.0, 1.0])
        .y_bounds([-1.0, 1.0])
        .paint(|ctx| {
            for (points, color) in slices.iter().zip(&colors) {
                ctx.draw(&Points {
                    coords: points,
                    color: *color,
                });
            }
        });
    f.render_widget(canvas, chart_area);

    let legend: Vec<Span> = result
        .breakdown
        .iter()
        .enumerate()
        .flat_map(|(i, item)| {
            [
                Span::styled("■ ", Style::default().fg(app.palette.color(i))),
                Span::raw(format!("{}  ", item.symbol)),
            ]
        })
        .collect();
    f.render_widget(
        Paragraph::new(Line::from(legend)).alignment(Alignment::Center),
        parts[1],
    );
}

fn render_total(f: &mut Frame, area: Rect, app: &App, result: &AnalysisResult) {
    let currency = currency_symbol(result.currency.as_deref());
    let total = fixed2(result.total_value);

    let analyzed_at = app
        .composer
        .analyzed_at()
        .map(|t| format!(" at {}", t.format("%H:%M:%S")))
        .unwrap_or_default();
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Total Value: {currency}{total}{analyzed_at}"))
        .title_alignment(Alignment::Center);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let big_text = BigText::builder()
        .pixel_size(PixelSize::Quadrant)
        .style(
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )
        .lines(vec![total.into()])
        .build();
    f.render_widget(big_text, inner);
}

fn render_breakdown(f: &mut Frame, area: Rect, result: &AnalysisResult) {
    let currency = currency_symbol(result.currency.as_deref());
    let items: Vec<ListItem> = result
        .breakdown
        .iter()
        .map(|item| {
            let tag = item.risk_tag();
            ListItem::new(Line::from(vec![
                Span::raw(format!("{} | Risk: ", item_valuation(item, &currency))),
                Span::styled(item.risk.clone(), risk_style(&tag)),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Breakdown"))
        .style(Style::default().fg(Color::White));
    f.render_widget(list, area);
}
