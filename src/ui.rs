use itertools::Itertools;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::pacing::{classify, WordMark};
use crate::session::SessionState;
use crate::util::format_mmss;
use crate::{App, AppState};

const HORIZONTAL_MARGIN: u16 = 5;
const METER_WIDTH: usize = 30;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.state {
            AppState::Practice => render_practice(self, area, buf),
            AppState::Results => render_results(self, area, buf),
            AppState::History => render_history(self, area, buf),
        }
    }
}

fn render_practice(app: &App, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let dim_bold_style = Style::default()
        .patch(bold_style)
        .add_modifier(Modifier::DIM);
    let spoken_style = Style::default().patch(bold_style).fg(Color::Green);
    let current_style = Style::default()
        .patch(bold_style)
        .fg(Color::Yellow)
        .add_modifier(Modifier::UNDERLINED);
    let legend_style = Style::default()
        .add_modifier(Modifier::ITALIC)
        .add_modifier(Modifier::DIM);

    let joined = app.script.words().iter().join(" ");
    let max_chars_per_line = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1);
    let prompt_occupied_lines = if joined.width() <= max_chars_per_line as usize {
        1
    } else {
        ((joined.width() as f64 / max_chars_per_line as f64).ceil() + 1.0) as u16
    };

    let top_pad = (area.height.saturating_sub(prompt_occupied_lines) / 2).saturating_sub(3);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints(
            [
                Constraint::Length(top_pad),
                Constraint::Length(1), // status
                Constraint::Length(1),
                Constraint::Length(prompt_occupied_lines),
                Constraint::Length(1),
                Constraint::Length(1), // level meter
                Constraint::Min(1),
                Constraint::Length(1), // legend
            ]
            .as_ref(),
        )
        .split(area);

    let highlight = app.session.highlight();
    let recording = app.session.is_recording();

    let mut spans: Vec<Span> = Vec::with_capacity(app.script.word_count() * 2);
    for (i, word) in app.script.words().iter().enumerate() {
        let style = match classify(i, highlight, recording) {
            WordMark::Spoken => spoken_style,
            WordMark::Current => current_style,
            WordMark::Upcoming => dim_bold_style,
        };
        spans.push(Span::styled(word.clone(), style));
        spans.push(Span::raw(" "));
    }

    let prompt = Paragraph::new(Line::from(spans))
        .alignment(if prompt_occupied_lines == 1 {
            Alignment::Center
        } else {
            Alignment::Left
        })
        .wrap(Wrap { trim: true });
    prompt.render(chunks[3], buf);

    let status = match app.session.state() {
        SessionState::Idle => Span::styled(
            format!(
                "ready: {} ({} words, target {} wpm)",
                app.script.title,
                app.script.word_count(),
                app.session.rate().wpm()
            ),
            dim_bold_style,
        ),
        SessionState::CountingDown => {
            let remaining = app.session.countdown_remaining();
            let text = if remaining > 0 {
                format!("starting in {remaining}")
            } else {
                "go!".to_string()
            };
            Span::styled(
                text,
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD | Modifier::ITALIC),
            )
        }
        SessionState::Recording => Span::styled(
            format!(
                "{} | word {}/{} | {} wpm",
                format_mmss(app.session.elapsed_secs()),
                (highlight + 1).min(app.script.word_count()),
                app.script.word_count(),
                app.session.rate().wpm()
            ),
            bold_style,
        ),
        SessionState::Paused => Span::styled(
            format!("PAUSED at {}", format_mmss(app.session.elapsed_secs())),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::ITALIC),
        ),
        SessionState::Stopped => Span::raw(""),
    };
    Paragraph::new(status)
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    if recording {
        let filled = ((app.level * METER_WIDTH as f64).round() as usize).min(METER_WIDTH);
        let meter = format!(
            "{}{}",
            "█".repeat(filled),
            "░".repeat(METER_WIDTH - filled)
        );
        Paragraph::new(Span::styled(meter, Style::default().fg(Color::Magenta)))
            .alignment(Alignment::Center)
            .render(chunks[5], buf);
    }

    let legend = match app.session.state() {
        SessionState::Idle => "(space) start  (up/down) wpm  (h) history  (esc) quit",
        SessionState::CountingDown => "(r) restart  (esc) quit",
        SessionState::Recording => "(space) pause  (enter) stop  (r) restart  (up/down) wpm",
        SessionState::Paused => "(space) resume  (enter) stop  (r) restart",
        SessionState::Stopped => "",
    };
    Paragraph::new(Span::styled(legend, legend_style))
        .alignment(Alignment::Center)
        .render(chunks[7], buf);
}

fn render_results(app: &App, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let legend_style = Style::default()
        .add_modifier(Modifier::ITALIC)
        .add_modifier(Modifier::DIM);

    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::from(Span::styled(
        format!("session finished: {}", app.script.title),
        bold_style,
    )));
    lines.push(Line::default());

    if let (Some(summary), Some(score)) = (&app.last_summary, app.last_score) {
        lines.push(Line::from(Span::styled(
            format!("confidence {score:.0}/100"),
            Style::default().patch(bold_style).fg(Color::Green),
        )));
        lines.push(Line::default());
        lines.push(Line::from(Span::raw(format!(
            "{} elapsed | {}/{} words | target {} wpm | attained {:.0} wpm",
            format_mmss(summary.elapsed_secs),
            summary.words_covered,
            summary.words_total,
            summary.target_wpm,
            summary.attained_wpm,
        ))));
    }

    if let Some(progress) = &app.progress {
        let spread = app
            .score_spread
            .map(|sd| format!(" | spread {sd:.1}"))
            .unwrap_or_default();
        lines.push(Line::from(Span::styled(
            format!(
                "this script: {} attempts | avg {:.0} | best {:.0} | avg pace {:.0} wpm{}",
                progress.attempts,
                progress.avg_score,
                progress.best_score,
                progress.avg_attained_wpm,
                spread,
            ),
            Style::default().fg(Color::Magenta),
        )));
    }

    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        "(r) practice again  (h) history  (esc) quit",
        legend_style,
    )));

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(centered_block(area), buf);
}

fn render_history(app: &App, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let legend_style = Style::default()
        .add_modifier(Modifier::ITALIC)
        .add_modifier(Modifier::DIM);

    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::from(Span::styled("recent sessions", bold_style)));
    lines.push(Line::default());

    if app.recent.is_empty() {
        lines.push(Line::from(Span::styled(
            "nothing recorded yet",
            Style::default().add_modifier(Modifier::DIM),
        )));
    }
    for rec in &app.recent {
        lines.push(Line::from(Span::raw(format!(
            "{}  {:<12} {:>3.0}/100  {:>3.0} wpm  {}",
            rec.stopped_at.format("%b %d %H:%M"),
            rec.script,
            rec.score,
            rec.attained_wpm,
            format_mmss(rec.elapsed_secs),
        ))));
    }

    lines.push(Line::default());
    lines.push(Line::from(Span::styled("(b) back  (esc) quit", legend_style)));

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(centered_block(area), buf);
}

fn centered_block(area: Rect) -> Rect {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(area.height / 4),
            Constraint::Min(1),
        ])
        .split(area);
    chunks[1]
}
