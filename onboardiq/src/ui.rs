//! UI rendering for the TUI.

use onboardiq_core::format::format_relative_time_opt;
use onboardiq_core::logging::log_file_path;
use onboardiq_core::responder::CELEBRATION_MESSAGE;
use onboardiq_core::{CompletionStore, MessageLog, Role};
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Circle, Points},
        Block, BorderType, Borders, Cell, Paragraph, Row, Table, Wrap,
    },
    Frame,
};

use crate::app::{App, Section};

/// Border color for the chat block
const BORDER_CHAT: Color = Color::Rgb(80, 160, 80);
/// Border color for the pizza block
const BORDER_PIZZA: Color = Color::Rgb(255, 180, 100);
/// Border color for admin blocks
const BORDER_ADMIN: Color = Color::Rgb(0, 150, 150);
/// Unfinished slices
const SLICE_EMPTY: Color = Color::Rgb(60, 60, 60);
/// Crust outline
const CRUST: Color = Color::Rgb(205, 127, 50);
/// Label color for metric names
const LABEL_COLOR: Color = Color::Rgb(100, 180, 180);

/// Render the application UI.
pub fn render<S>(frame: &mut Frame, app: &App<S>)
where
    S: CompletionStore + MessageLog,
{
    let chunks = Layout::vertical([
        Constraint::Length(2), // Tabs
        Constraint::Min(5),    // Body
        Constraint::Length(1), // Footer
    ])
    .split(frame.area());

    render_tab_header(frame, app.section, chunks[0]);
    match app.section {
        Section::User => render_user_view(frame, app, chunks[1]),
        Section::Admin => render_admin_view(frame, app, chunks[1]),
        Section::About => render_about_view(frame, chunks[1]),
    }
    render_footer(frame, app, chunks[2]);

    if app.is_celebrating() {
        render_confetti(frame, app, frame.area());
    }
}

/// Render the tab header with the app name and section tabs.
fn render_tab_header(frame: &mut Frame, active: Section, area: Rect) {
    let chunks = Layout::horizontal([
        Constraint::Length(13), // App name
        Constraint::Min(1),     // Tabs
    ])
    .split(area);

    let app_name = Paragraph::new(" 🍕 OnboardIQ").style(Style::default().fg(Color::Yellow).bold());
    frame.render_widget(app_name, chunks[0]);

    let active_style = Style::default()
        .fg(Color::Yellow)
        .bold()
        .add_modifier(Modifier::UNDERLINED);
    let inactive_style = Style::default().fg(Color::DarkGray);

    let mut spans = Vec::new();
    for (i, section) in Section::ALL.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  "));
        }
        let style = if *section == active {
            active_style
        } else {
            inactive_style
        };
        spans.push(Span::styled(format!(" {} ", section.title()), style));
    }

    let tabs = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(tabs, chunks[1]);
}

// ========== User view ==========

fn render_user_view<S>(frame: &mut Frame, app: &App<S>, area: Rect)
where
    S: CompletionStore + MessageLog,
{
    let columns = Layout::horizontal([Constraint::Percentage(62), Constraint::Percentage(38)])
        .split(area);

    let left = Layout::vertical([
        Constraint::Length(2), // Tagline
        Constraint::Min(3),    // Transcript
        Constraint::Length(3), // Input
    ])
    .split(columns[0]);

    let tagline = Paragraph::new(vec![
        Line::from(Span::styled(
            "AI-Powered Onboarding Intelligence",
            Style::default().fg(Color::White).bold(),
        )),
        Line::from(Span::styled(
            "Guide users to success, slice by slice 👨‍🍳💼",
            Style::default().fg(Color::DarkGray),
        )),
    ]);
    frame.render_widget(tagline, left[0]);

    render_transcript(frame, app, left[1]);
    render_input(frame, app, left[2]);
    render_pizza_panel(frame, app, columns[1]);
}

fn render_transcript<S>(frame: &mut Frame, app: &App<S>, area: Rect)
where
    S: CompletionStore + MessageLog,
{
    let mut lines: Vec<Line> = Vec::new();

    if let Some(session) = app.session() {
        for turn in session.transcript() {
            let (label, color) = match turn.role {
                Role::User => ("You", Color::Cyan),
                Role::Assistant => ("OnboardIQ", Color::Yellow),
            };
            lines.push(Line::from(vec![
                Span::styled(format!("{}: ", label), Style::default().fg(color).bold()),
                Span::raw(turn.content.clone()),
            ]));
        }
    }

    if let Some(pending) = &app.pending {
        lines.push(Line::from(vec![
            Span::styled("You: ", Style::default().fg(Color::Cyan).bold()),
            Span::raw(pending.input.clone()),
        ]));
        let dots = ".".repeat((app.animation_frame / 3 % 4) as usize);
        lines.push(Line::from(Span::styled(
            format!("OnboardIQ is typing{}", dots),
            Style::default().fg(Color::DarkGray).italic(),
        )));
    }

    if lines.is_empty() {
        lines.push(Line::from(Span::styled(
            "Try asking about Dough, Sauce, Cheese, Toppings, Bake, or Serve.",
            Style::default().fg(Color::DarkGray),
        )));
    }

    // Scroll is counted in wrapped rows, so measure after wrapping.
    // Keep the newest turn in view unless the user scrolled up.
    let body = Paragraph::new(lines).wrap(Wrap { trim: false });
    let rows = body.line_count(area.width.saturating_sub(2));
    let top = transcript_top(rows, area.height.saturating_sub(2) as usize, app.scroll_offset);

    let title = format!(" Chat · {} ", app.active_user);
    let paragraph = body
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(BORDER_CHAT))
                .title(title),
        )
        .scroll((top, 0));
    frame.render_widget(paragraph, area);
}

/// First wrapped row to show so the last `visible` rows end the transcript,
/// moved up by `scroll_offset` and clamped at the top.
fn transcript_top(rows: usize, visible: usize, scroll_offset: usize) -> u16 {
    let top = rows.saturating_sub(visible).saturating_sub(scroll_offset);
    top.min(u16::MAX as usize) as u16
}

fn render_input<S>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let (text, style) = if app.input.is_empty() {
        (
            "Ask your onboarding assistant...".to_string(),
            Style::default().fg(Color::DarkGray),
        )
    } else {
        (app.input.clone(), Style::default().fg(Color::White))
    };

    // Blinking cursor
    let cursor = if app.animation_frame % 10 < 5 { "▏" } else { " " };
    let line = Line::from(vec![
        Span::styled("> ", Style::default().fg(Color::Cyan)),
        Span::styled(text, style),
        Span::raw(cursor),
    ]);

    let paragraph = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded),
    );
    frame.render_widget(paragraph, area);
}

/// Render the pizza canvas, the progress label and the celebration banner.
fn render_pizza_panel<S>(frame: &mut Frame, app: &App<S>, area: Rect)
where
    S: CompletionStore + MessageLog,
{
    let progress = app.progress();
    let chunks = Layout::vertical([
        Constraint::Min(6),    // Pizza
        Constraint::Length(1), // Progress label
        Constraint::Length(3), // Banner
    ])
    .split(area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER_PIZZA))
        .title(" Progress ");

    // Braille cells are 2x4 dots and terminal cells are roughly 1:2, so widen
    // the x range to keep the pizza round.
    let inner_w = chunks[0].width.saturating_sub(2).max(1) as f64;
    let inner_h = chunks[0].height.saturating_sub(2).max(1) as f64;
    let aspect = (inner_w / (inner_h * 2.0)).max(1.0);

    let session = app.session();
    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .x_bounds([-1.1 * aspect, 1.1 * aspect])
        .y_bounds([-1.1, 1.1])
        .paint(|ctx| {
            let slices = app.pizza.slice_count();
            for (idx, stage) in app.catalog().iter().enumerate().take(slices) {
                let done = session.is_some_and(|s| s.is_completed(&stage.name));
                let color = if done {
                    let (r, g, b) = stage.color;
                    Color::Rgb(r, g, b)
                } else {
                    SLICE_EMPTY
                };
                ctx.draw(&Points {
                    coords: app.pizza.slice(idx),
                    color,
                });
            }
            ctx.draw(&Circle {
                x: 0.0,
                y: 0.0,
                radius: 1.0,
                color: CRUST,
            });
        });
    frame.render_widget(canvas, chunks[0]);

    let label = Paragraph::new(format!("{}% Progress", progress.percent()))
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::White).bold());
    frame.render_widget(label, chunks[1]);

    if progress.is_complete() {
        let banner = Paragraph::new(CELEBRATION_MESSAGE)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .style(Style::default().fg(Color::Green).bold())
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Green)),
            );
        frame.render_widget(banner, chunks[2]);
    } else if let Some(next) = app
        .catalog()
        .iter()
        .find(|stage| !session.is_some_and(|s| s.is_completed(&stage.name)))
    {
        let hint = Paragraph::new(format!("Next up: {}", next.name))
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(hint, chunks[2]);
    }
}

/// Falling confetti in the stage colors.
fn render_confetti<S>(frame: &mut Frame, app: &App<S>, area: Rect)
where
    S: CompletionStore + MessageLog,
{
    let pieces = ['✦', '•', '*', '▪', '◆', '·'];
    let stages = app.catalog().stages();

    for (i, (x, y, speed, color_idx)) in app.confetti.iter().enumerate() {
        if *x >= area.width || *y >= area.height {
            continue;
        }

        let piece = pieces[(i + *speed as usize) % pieces.len()];
        let color = stages
            .get(*color_idx)
            .map(|s| Color::Rgb(s.color.0, s.color.1, s.color.2))
            .unwrap_or(Color::White);

        let span = Span::styled(piece.to_string(), Style::default().fg(color));
        frame.render_widget(Paragraph::new(span), Rect::new(*x, *y, 1, 1));
    }
}

// ========== Admin view ==========

fn render_admin_view<S>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let chunks = Layout::vertical([
        Constraint::Length(2), // Title
        Constraint::Length(7), // Metrics
        Constraint::Min(4),    // Breakdown
    ])
    .split(area);

    let title = Paragraph::new(vec![
        Line::from(Span::styled(
            "📊 OnboardIQ Admin Dashboard",
            Style::default().fg(Color::White).bold(),
        )),
        Line::from(Span::styled(
            "Track user onboarding progress and milestones",
            Style::default().fg(Color::DarkGray),
        )),
    ]);
    frame.render_widget(title, chunks[0]);

    let Some(report) = &app.admin_report else {
        let message = app
            .admin_error
            .as_deref()
            .map(|e| format!("Could not load stats: {}", e))
            .unwrap_or_else(|| "Loading...".to_string());
        let paragraph = Paragraph::new(message).style(Style::default().fg(Color::Red));
        frame.render_widget(paragraph, chunks[1]);
        return;
    };

    let metric = |label: &str, value: String| {
        Line::from(vec![
            Span::styled(format!("{:<26}", label), Style::default().fg(LABEL_COLOR)),
            Span::styled(value, Style::default().fg(Color::White).bold()),
        ])
    };
    let bottleneck = report
        .bottleneck()
        .map(|row| format!("{} ({})", row.stage, row.completions))
        .unwrap_or_else(|| "-".to_string());

    let metrics = Paragraph::new(vec![
        metric("Total Chat Messages", report.total_messages.to_string()),
        metric("Users Started Onboarding", report.users_started.to_string()),
        metric("Total Completions", report.total_completions().to_string()),
        metric(
            "Last Completion",
            format_relative_time_opt(report.last_completion_at),
        ),
        metric("Bottleneck", bottleneck),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(BORDER_ADMIN))
            .title(" Overview "),
    );
    frame.render_widget(metrics, chunks[1]);

    let max = report
        .stage_breakdown
        .iter()
        .map(|row| row.completions)
        .max()
        .unwrap_or(0)
        .max(1);

    let header = Row::new(
        ["Stage", "Completions", ""]
            .into_iter()
            .map(|h| Cell::from(h).style(Style::default().fg(Color::Yellow).bold())),
    );
    let rows = report.stage_breakdown.iter().map(|row| {
        let bar_len = (row.completions * 20 / max) as usize;
        let stage_style = if row.in_catalog {
            Style::default().fg(Color::White)
        } else {
            Style::default().fg(Color::DarkGray).italic()
        };
        Row::new([
            Cell::from(row.stage.clone()).style(stage_style),
            Cell::from(row.completions.to_string()),
            Cell::from("█".repeat(bar_len)).style(Style::default().fg(Color::Green)),
        ])
    });

    let widths = [
        Constraint::Fill(1),
        Constraint::Length(12),
        Constraint::Length(22),
    ];
    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(BORDER_ADMIN))
            .title(" Slice Completion Stats "),
    );
    frame.render_widget(table, chunks[2]);
}

// ========== About view ==========

fn render_about_view(frame: &mut Frame, area: Rect) {
    let bullet = |text: &'static str| Line::from(vec![Span::raw("  • "), Span::raw(text)]);

    let lines = vec![
        Line::from(Span::styled(
            "🍕 About OnboardIQ",
            Style::default().fg(Color::Yellow).bold(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("OnboardIQ", Style::default().bold()),
            Span::raw(" turns SaaS onboarding into an interactive, gamified journey."),
        ]),
        Line::from(""),
        bullet("Users progress slice by slice through milestones."),
        bullet("The pizza fills in as each milestone is reached."),
        bullet("Cheesy chatbot lines keep users engaged."),
        bullet("The admin dashboard tracks completion counts and bottlenecks."),
        bullet("Everything runs locally; no external APIs."),
        Line::from(""),
        Line::from(Span::styled(
            "Switch sections with Tab / Shift-Tab or F1-F3. Type /login <name> to change user.",
            Style::default().fg(Color::Cyan),
        )),
        Line::from(Span::styled(
            format!("Logs: {}", log_file_path().display()),
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded),
    );
    frame.render_widget(paragraph, area);
}

// ========== Footer ==========

fn render_footer<S>(frame: &mut Frame, app: &App<S>, area: Rect)
where
    S: CompletionStore + MessageLog,
{
    let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Yellow));

    let mut spans = vec![key(" Tab"), Span::raw(" section  ")];
    match app.section {
        Section::User => {
            spans.extend([
                key("Enter"),
                Span::raw(" send  "),
                key("↑/↓"),
                Span::raw(" scroll  "),
                key("/login"),
                Span::raw(" user  "),
            ]);
        }
        Section::Admin => {
            spans.extend([key("r"), Span::raw(" refresh  "), key("q"), Span::raw(" quit  ")]);
        }
        Section::About => {
            spans.extend([key("q"), Span::raw(" quit  ")]);
        }
    }
    spans.extend([key("Esc"), Span::raw(" quit  "), Span::raw("│ ")]);

    match &app.status {
        Some(status) => spans.push(Span::styled(
            status.clone(),
            Style::default().fg(Color::Magenta),
        )),
        None => spans.push(Span::styled(
            format!("{} · {}%", app.active_user, app.progress().percent()),
            Style::default().fg(Color::DarkGray),
        )),
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};
    use onboardiq_core::{Assistant, Catalog, MemoryStore};
    use ratatui::{backend::TestBackend, Terminal};
    use std::time::{Duration, Instant};

    fn app() -> App<MemoryStore> {
        let assistant = Assistant::new(Catalog::pizza(), MemoryStore::new());
        App::new(assistant, "demo_user", Duration::ZERO).unwrap()
    }

    fn send(app: &mut App<MemoryStore>, text: &str) {
        for c in text.chars().chain(std::iter::once('\n')) {
            let code = if c == '\n' {
                KeyCode::Enter
            } else {
                KeyCode::Char(c)
            };
            app.handle_key(KeyEvent {
                code,
                modifiers: KeyModifiers::NONE,
                kind: KeyEventKind::Press,
                state: KeyEventState::NONE,
            });
        }
        app.poll_pending(Instant::now());
    }

    /// Render one frame and return the screen as text, one row per line.
    fn draw(app: &App<MemoryStore>, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();

        let buffer = terminal.backend().buffer();
        (0..buffer.area.height)
            .map(|y| {
                (0..buffer.area.width)
                    .map(|x| buffer[(x, y)].symbol())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_transcript_top_clamps() {
        assert_eq!(transcript_top(5, 10, 0), 0);
        assert_eq!(transcript_top(30, 10, 0), 20);
        assert_eq!(transcript_top(30, 10, 4), 16);
        assert_eq!(transcript_top(30, 10, 100), 0);
    }

    #[test]
    fn test_latest_reply_visible_after_wrapped_turns() {
        let mut app = app();
        for word in ["dough", "sauce", "cheese", "toppings", "bake"] {
            send(&mut app, word);
        }

        let screen = draw(&app, 80, 24);
        assert!(
            screen.contains("Bake - Test"),
            "latest reply not visible:\n{}",
            screen
        );
        assert!(screen.contains("83% Progress"));
    }

    #[test]
    fn test_scrolling_up_reveals_first_turn() {
        let mut app = app();
        for word in ["dough", "sauce", "cheese", "toppings", "bake"] {
            send(&mut app, word);
        }
        app.scroll_offset = 100;
        let screen = draw(&app, 80, 24);
        assert!(screen.contains("You: dough"), "{}", screen);
    }

    #[test]
    fn test_admin_view_renders_counts() {
        let mut app = app();
        send(&mut app, "dough");
        send(&mut app, "hello");
        app.handle_key(KeyEvent {
            code: KeyCode::F(2),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        });

        let screen = draw(&app, 100, 30);
        assert!(screen.contains("Total Chat Messages"));
        assert!(screen.contains("Dough - Create Account"));
    }
}
