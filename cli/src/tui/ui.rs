use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph, Wrap};
use ratatui::Frame;

use quantum_core::api::LifecycleStatus;

use super::app::TuiApp;

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const LOADING_HINTS: [&str; 3] = [
    "Loading weights...",
    "Initializing parameters...",
    "Calibrating neurons...",
];
const PROCESSING_HINTS: [&str; 3] = [
    "Tokenizing input...",
    "Passing through transformer layers...",
    "Generating output...",
];

pub fn draw(f: &mut Frame<'_>, app: &TuiApp) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(2),
        ])
        .split(f.area());

    draw_header(f, chunks[0]);
    let body = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = body.inner(chunks[1]);
    f.render_widget(body, chunks[1]);

    match app.lifecycle.status {
        LifecycleStatus::Unloaded => draw_centered(f, inner, "Initializing system...", Color::Gray),
        LifecycleStatus::Loading => draw_loading(f, inner, app),
        LifecycleStatus::Ready => draw_ready(f, inner, app),
        LifecycleStatus::Error => draw_centered(
            f,
            inner,
            "Failed to load model. Please restart and try again.",
            Color::Red,
        ),
    }
    draw_footer(f, chunks[2], app);
}

fn draw_header(f: &mut Frame<'_>, area: Rect) {
    let lines = vec![
        Line::from(Span::styled(
            "QUANTUM",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Advanced Language Processing Interface",
            Style::default().fg(Color::Gray),
        )),
    ];
    let header = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(header, area);
}

fn draw_footer(f: &mut Frame<'_>, area: Rect, app: &TuiApp) {
    let keys = if app.lifecycle.is_ready() {
        "Enter: submit  Shift+Enter: newline  Ctrl+R: restart  Esc: quit"
    } else {
        "Ctrl+R: restart  Esc: quit"
    };
    let lines = vec![
        Line::from(vec![
            Span::styled("■ ", Style::default().fg(Color::Cyan)),
            Span::styled(
                format!("QUANTUM ENGINE v{}", env!("CARGO_PKG_VERSION")),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(" ■", Style::default().fg(Color::Blue)),
        ]),
        Line::from(Span::styled(keys, Style::default().fg(Color::DarkGray))),
    ];
    f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
}

fn draw_centered(f: &mut Frame<'_>, area: Rect, text: &str, color: Color) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(45),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(area);
    let p = Paragraph::new(Span::styled(text.to_string(), Style::default().fg(color)))
        .alignment(Alignment::Center);
    f.render_widget(p, rows[1]);
}

fn draw_loading(f: &mut Frame<'_>, area: Rect, app: &TuiApp) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(3),
            Constraint::Length(2),
            Constraint::Min(0),
        ])
        .split(area);

    let title = Paragraph::new(vec![
        Line::from(Span::styled(
            "Loading Quantum Model",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Please wait while the AI model is being loaded",
            Style::default().fg(Color::Gray),
        )),
    ])
    .alignment(Alignment::Center);
    f.render_widget(title, rows[0]);

    let ratio = (app.lifecycle.progress / 100.0).clamp(0.0, 1.0);
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL))
        .gauge_style(Style::default().fg(Color::Cyan).bg(Color::Black))
        .ratio(ratio)
        .label(format!("{}%", app.lifecycle.percent()));
    f.render_widget(gauge, rows[1]);

    f.render_widget(hint_line(&LOADING_HINTS), rows[2]);
}

fn draw_ready(f: &mut Frame<'_>, area: Rect, app: &TuiApp) {
    let has_output = !app.request.partial_output.is_empty();
    let processing = app.is_processing();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(6),
            Constraint::Length(1),
            Constraint::Length(if processing { 2 } else { 0 }),
            Constraint::Length(if app.notice.is_some() { 1 } else { 0 }),
            Constraint::Min(0),
        ])
        .split(area);

    let label = Line::from(vec![
        Span::styled("Enter your query:", Style::default().fg(Color::Cyan)),
        Span::raw("  "),
        Span::styled(
            " Model Ready ",
            Style::default().fg(Color::Green).bg(Color::Rgb(20, 60, 20)),
        ),
    ]);
    f.render_widget(Paragraph::new(label), rows[0]);
    draw_input(f, rows[1], app);

    let (button, button_style) = if processing {
        ("[ Processing... ]", Style::default().fg(Color::DarkGray))
    } else {
        (
            "[ Execute Request ]",
            Style::default().fg(Color::Black).bg(Color::Cyan),
        )
    };
    f.render_widget(
        Paragraph::new(Span::styled(button, button_style)).alignment(Alignment::Center),
        rows[2],
    );

    if processing {
        let spinner = SPINNER[app.spinner_frame % SPINNER.len()];
        let lines = vec![
            Line::from(vec![
                Span::styled(format!("{spinner} "), Style::default().fg(Color::Cyan)),
                Span::styled(
                    "Processing your request...",
                    Style::default().fg(Color::Cyan),
                ),
            ]),
            Line::from(Span::styled(
                PROCESSING_HINTS.join("  "),
                Style::default().fg(Color::DarkGray),
            )),
        ];
        f.render_widget(Paragraph::new(lines), rows[3]);
    }

    if let Some(notice) = &app.notice {
        f.render_widget(
            Paragraph::new(Span::styled(notice.clone(), Style::default().fg(Color::Yellow))),
            rows[4],
        );
    }

    if has_output {
        let output = Paragraph::new(app.request.partial_output.clone())
            .style(Style::default().fg(Color::Gray))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(Span::styled("OUTPUT:", Style::default().fg(Color::Cyan))),
            )
            .wrap(Wrap { trim: false });
        f.render_widget(output, rows[5]);
    }
}

fn draw_input(f: &mut Frame<'_>, area: Rect, app: &TuiApp) {
    let enabled = app.input_enabled();
    let border = if enabled { Color::Cyan } else { Color::DarkGray };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));
    let inner = block.inner(area);

    let text = if app.input_buffer.is_empty() {
        Paragraph::new(Span::styled(
            "Type your request here...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let fg = if enabled { Color::White } else { Color::DarkGray };
        Paragraph::new(app.input_buffer.clone()).style(Style::default().fg(fg))
    };
    f.render_widget(text.block(block), area);

    if enabled {
        let (row, col) = cursor_pos(&app.input_buffer, app.input_cursor);
        let x = inner.x.saturating_add(col as u16).min(inner.right().saturating_sub(1));
        let y = inner.y.saturating_add(row as u16).min(inner.bottom().saturating_sub(1));
        f.set_cursor_position((x, y));
    }
}

fn hint_line(hints: &[&str]) -> Paragraph<'static> {
    Paragraph::new(Span::styled(
        hints.join("  "),
        Style::default().fg(Color::DarkGray),
    ))
    .alignment(Alignment::Center)
}

/// Row and column of the byte offset `cursor` within a multi-line buffer.
fn cursor_pos(input: &str, cursor: usize) -> (usize, usize) {
    let before = &input[..cursor.min(input.len())];
    let row = before.matches('\n').count();
    let col = before
        .rsplit('\n')
        .next()
        .map(|line| line.chars().count())
        .unwrap_or(0);
    (row, col)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quantum_core::api::{LifecycleSnapshot, RequestSnapshot, RequestStatus, TuiConfig};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn render(app: &TuiApp) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn ready_app(status: RequestStatus, output: &str) -> TuiApp {
        let mut app = TuiApp::new(TuiConfig::default());
        let (request_id, query) = match status {
            RequestStatus::Idle => (None, None),
            _ => (Some("r-1".to_string()), Some("hello".to_string())),
        };
        app.sync(
            LifecycleSnapshot {
                status: LifecycleStatus::Ready,
                progress: 100.0,
                error: None,
            },
            RequestSnapshot {
                status,
                request_id,
                query,
                partial_output: output.to_string(),
                revealed: output.chars().count(),
                total: 40,
            },
        );
        app
    }

    #[test]
    fn test_cursor_pos_multiline() {
        assert_eq!(cursor_pos("ab\ncé", 6), (1, 2));
        assert_eq!(cursor_pos("ab", 1), (0, 1));
    }

    #[test]
    fn test_loading_screen() {
        let mut app = TuiApp::new(TuiConfig::default());
        let request = app.request.clone();
        app.sync(
            LifecycleSnapshot {
                status: LifecycleStatus::Loading,
                progress: 42.4,
                error: None,
            },
            request,
        );
        let screen = render(&app);
        assert!(screen.contains("Loading Quantum Model"));
        assert!(screen.contains("Please wait while the AI model is being loaded"));
        assert!(screen.contains("42%"));
        assert!(screen.contains("Calibrating neurons..."));
    }

    #[test]
    fn test_error_screen() {
        let mut app = TuiApp::new(TuiConfig::default());
        let request = app.request.clone();
        app.sync(
            LifecycleSnapshot {
                status: LifecycleStatus::Error,
                progress: 0.0,
                error: Some("boom".to_string()),
            },
            request,
        );
        assert!(render(&app).contains("Failed to load model. Please restart and try again."));
    }

    #[test]
    fn test_unloaded_screen() {
        let app = TuiApp::new(TuiConfig::default());
        let screen = render(&app);
        assert!(screen.contains("QUANTUM"));
        assert!(screen.contains("Initializing system..."));
    }

    #[test]
    fn test_ready_idle_screen() {
        let screen = render(&ready_app(RequestStatus::Idle, ""));
        assert!(screen.contains("Enter your query:"));
        assert!(screen.contains("Model Ready"));
        assert!(screen.contains("Type your request here..."));
        assert!(screen.contains("[ Execute Request ]"));
        assert!(!screen.contains("Processing your request..."));
        assert!(!screen.contains("OUTPUT:"));
    }

    #[test]
    fn test_ready_queued_screen_shows_processing_without_output() {
        let screen = render(&ready_app(RequestStatus::Queued, ""));
        assert!(screen.contains("[ Processing... ]"));
        assert!(screen.contains("Processing your request..."));
        assert!(!screen.contains("OUTPUT:"));
    }

    #[test]
    fn test_ready_streaming_screen() {
        let mut app = ready_app(RequestStatus::Streaming, "First line\nSecond");
        app.spinner_frame = 1;
        let screen = render(&app);
        assert!(screen.contains("[ Processing... ]"));
        assert!(!screen.contains("Execute Request"));
        assert!(screen.contains(&format!("{} Processing your request...", SPINNER[1])));
        assert!(screen.contains("Tokenizing input..."));
        assert!(screen.contains("Passing through transformer layers..."));
        assert!(screen.contains("Generating output..."));
        assert!(screen.contains("OUTPUT:"));

        let rows: Vec<&str> = screen.lines().collect();
        let first = rows.iter().position(|r| r.contains("First line"));
        let second = rows.iter().position(|r| r.contains("Second"));
        assert!(first.is_some());
        assert_eq!(second, first.map(|i| i + 1));
    }

    #[test]
    fn test_ready_done_screen() {
        let screen = render(&ready_app(RequestStatus::Done, "All done"));
        assert!(screen.contains("[ Execute Request ]"));
        assert!(!screen.contains("Processing your request..."));
        assert!(screen.contains("OUTPUT:"));
        assert!(screen.contains("All done"));
    }
}
