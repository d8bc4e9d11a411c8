use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::{
    app::App,
    quiz::{Phase, SinkStatus},
};

const HORIZONTAL_MARGIN: u16 = 2;
const SETTINGS_WIDTH: u16 = 30;
const ANSWER_WIDTH: usize = 8;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let session = &self.session;
        let phase = session.phase();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .constraints([
                Constraint::Length(1), // title
                Constraint::Min(3),    // settings + questions
                Constraint::Length(2), // banners
                Constraint::Length(1), // legend
            ])
            .split(area);

        Paragraph::new(Span::styled(
            "Mental Math Trainer",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(SETTINGS_WIDTH), Constraint::Min(10)])
            .split(chunks[1]);

        render_settings(self, phase, body[0], buf);
        render_questions(self, phase, body[1], buf);
        render_banners(self, chunks[2], buf);

        Paragraph::new(Span::styled(
            legend(phase),
            Style::default().add_modifier(Modifier::ITALIC),
        ))
        .render(chunks[3], buf);
    }
}

fn render_settings(app: &App, phase: Phase, area: Rect, buf: &mut Buffer) {
    let config = app.session.config();
    let timer = app.session.timer();
    let locked = phase == Phase::Completed;

    let key_style = Style::default().add_modifier(Modifier::DIM);
    let setting = |label: &str, value: String, key: &str| {
        Line::from(vec![
            Span::raw(format!("{:<11}", label)),
            Span::styled(format!("{:<6}", value), Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(if locked { String::new() } else { format!("({})", key) }, key_style),
        ])
    };

    let button_style = match phase {
        Phase::Running => Style::default().fg(Color::Yellow),
        Phase::Completed => Style::default().add_modifier(Modifier::DIM),
        _ => Style::default().fg(Color::Green),
    }
    .add_modifier(Modifier::BOLD);

    let lines = vec![
        setting("Operation", config.operation.to_string(), "o"),
        setting("Digits A", config.digits_a.get().to_string(), "a"),
        setting("Digits B", config.digits_b.get().to_string(), "b"),
        setting("Questions", config.question_count.get().to_string(), "c"),
        Line::from(""),
        Line::from(format!("Elapsed Time: {:.2} sec", timer.elapsed_secs())),
        Line::from(""),
        Line::from(vec![
            Span::styled(format!("[ {} ]", timer.button_label()), button_style),
            Span::styled(if locked { "" } else { " (space)" }, key_style),
        ]),
    ];

    Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Settings"))
        .render(area, buf);
}

fn render_questions(app: &App, phase: Phase, area: Rect, buf: &mut Buffer) {
    let session = &app.session;
    let questions = session.questions();
    let block = Block::default().borders(Borders::ALL).title("Solve these:");
    let inner = block.inner(area);
    block.render(area, buf);

    let visible = inner.height as usize;
    if visible == 0 || questions.is_empty() {
        return;
    }

    // keep the selected question in view
    let offset = (app.selected() + 1).saturating_sub(visible);
    let prompt_width = questions
        .iter()
        .map(|q| q.prompt().width())
        .max()
        .unwrap_or(0);
    let index_width = questions.len().to_string().len();

    let editable = phase == Phase::Running;
    let completed = phase == Phase::Completed;

    let lines: Vec<Line> = questions
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible)
        .map(|(i, q)| {
            let prompt = q.prompt();
            let pad = " ".repeat(prompt_width - prompt.width());
            let selected = i == app.selected() && !completed;

            let field_style = if completed {
                match session.answers().get(i).copied().flatten() {
                    Some(a) if a == q.answer => Style::default().fg(Color::Green),
                    _ => Style::default().fg(Color::Red),
                }
            } else if !editable {
                Style::default().add_modifier(Modifier::DIM)
            } else if selected {
                Style::default().add_modifier(Modifier::UNDERLINED | Modifier::BOLD)
            } else {
                Style::default()
            };

            let mut spans = vec![
                Span::styled(
                    if selected { "> " } else { "  " },
                    Style::default().fg(Color::Cyan),
                ),
                Span::raw(format!("{:>w$}. ", i + 1, w = index_width)),
                Span::styled(format!("{}{} ", pad, prompt), Style::default().add_modifier(Modifier::BOLD)),
                Span::styled(format!("[{:<w$}]", app.draft(i), w = ANSWER_WIDTH), field_style),
            ];

            if completed && session.answers().get(i).copied().flatten() != Some(q.answer) {
                spans.push(Span::styled(
                    format!("  {}", q.answer),
                    Style::default().add_modifier(Modifier::DIM),
                ));
            }

            Line::from(spans)
        })
        .collect();

    Paragraph::new(lines).render(inner, buf);
}

fn render_banners(app: &App, area: Rect, buf: &mut Buffer) {
    let Some(completion) = app.session.completion() else {
        return;
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(area);

    let grade = &completion.grade;
    Paragraph::new(Span::styled(
        format!(
            "Completed in {:.2} seconds! ✅ {}/{} correct ({:.2}%).",
            completion.elapsed_secs, grade.correct, grade.total, grade.accuracy_percent
        ),
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center)
    .render(rows[0], buf);

    let status = match app.session.sink_status() {
        Some(SinkStatus::Saved) => Span::styled(
            format!("Results saved to {}!", app.sink_name()),
            Style::default().fg(Color::Green),
        ),
        Some(SinkStatus::Failed(message)) => Span::styled(
            format!("Failed to save to {}: {}", app.sink_name(), message),
            Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::BOLD),
        ),
        None if app.has_pending() => Span::styled(
            format!("Saving results to {}...", app.sink_name()),
            Style::default().fg(Color::Yellow),
        ),
        None => return,
    };

    Paragraph::new(status)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(rows[1], buf);
}

fn legend(phase: Phase) -> &'static str {
    match phase {
        Phase::Configuring | Phase::Ready => {
            "(space) start / (o)p (a)/(b) digits (c)ount / (r) try again / (esc)ape"
        }
        Phase::Running => {
            "type answers / ↑↓ select / (enter) submit / (space) pause / (r) try again / (esc)ape"
        }
        Phase::Paused => "(space) resume / (enter) submit / (r) try again / (esc)ape",
        Phase::Completed => "(r) try again / (esc)ape",
    }
}
