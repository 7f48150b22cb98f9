pub mod indicators;
pub mod screen;

use itertools::Itertools;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use setpace::{CommitmentLevel, Phase, Set};

use crate::ui::indicators::{
    countdown_seconds, format_time, sequence_dots, set_progress_lines, set_title, set_volume,
    step_indicator, DotState, LineState,
};
use crate::{App, AppState};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

const CONFETTI_COLORS: [Color; 6] = [
    Color::Red,
    Color::Yellow,
    Color::Green,
    Color::Cyan,
    Color::Magenta,
    Color::Blue,
];

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn dim() -> Style {
    Style::default().add_modifier(Modifier::DIM)
}

fn hint() -> Style {
    Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC)
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.state {
            AppState::WorkoutList => render_workout_list(self, area, buf),
            AppState::WorkoutDetail => render_workout_detail(self, area, buf),
            AppState::Timer => render_timer(self, area, buf),
            AppState::Finished => render_finished(self, area, buf),
        }
    }
}

fn render_workout_list(app: &App, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

    Paragraph::new("setpace")
        .block(Block::default().borders(Borders::ALL).title("Workouts"))
        .style(bold().fg(Color::Cyan))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

    let lines: Vec<Line> = app
        .catalog
        .workouts()
        .iter()
        .enumerate()
        .flat_map(|(i, w)| {
            let selected = i == app.list_cursor;
            let marker = if selected { "› " } else { "  " };
            let title_style = if selected {
                bold().fg(Color::Yellow)
            } else {
                bold()
            };
            vec![
                Line::from(vec![
                    Span::styled(marker, title_style),
                    Span::styled(w.name.clone(), title_style),
                    Span::styled(format!("  ({} sets)", w.working_set_count()), dim()),
                ]),
                Line::from(Span::styled(format!("    {}", w.description), dim())),
                Line::from(""),
            ]
        })
        .collect();

    Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .render(chunks[1], buf);

    Paragraph::new("(↑/↓) choose  (enter) open  (esc) quit")
        .style(hint())
        .alignment(Alignment::Center)
        .render(chunks[2], buf);
}

/// Left-align `text` in a column of `width` terminal cells
fn pad_to(text: &str, width: usize) -> String {
    format!("{}{}", text, " ".repeat(width.saturating_sub(text.width()).max(1)))
}

fn ladder_line(selected: CommitmentLevel) -> Line<'static> {
    let spans = CommitmentLevel::ALL
        .iter()
        .map(|level| {
            let style = if *level == selected {
                bold().fg(Color::Black).bg(Color::Yellow)
            } else {
                dim()
            };
            Span::styled(format!(" {} ", level.label()), style)
        })
        .interleave_shortest(std::iter::repeat(Span::raw(" ")).take(CommitmentLevel::ALL.len() - 1))
        .collect::<Vec<_>>();
    Line::from(spans)
}

fn render_workout_detail(app: &App, area: Rect, buf: &mut Buffer) {
    let snapshot = app.machine.snapshot();
    let Some(workout) = app.selected_workout() else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

    Paragraph::new(Span::styled(workout.name.clone(), bold().fg(Color::Cyan)))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);
    Paragraph::new(Span::styled(workout.description.clone(), dim()))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[1], buf);
    Paragraph::new(ladder_line(snapshot.commitment_level))
        .alignment(Alignment::Center)
        .render(chunks[2], buf);

    let lines: Vec<Line> = snapshot
        .sets
        .iter()
        .map(|set| {
            let style = if set.is_rest() { dim() } else { bold() };
            Line::from(vec![
                Span::styled(pad_to(set_title(set), 24), style),
                Span::styled(set_volume(set, snapshot.commitment_level), style),
            ])
        })
        .collect();
    Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Sets"))
        .render(chunks[3], buf);

    Paragraph::new("(←/→) commitment  (enter) start  (esc) back")
        .style(hint())
        .alignment(Alignment::Center)
        .render(chunks[4], buf);
}

fn progress_strip(app: &App) -> Line<'static> {
    let snapshot = app.machine.snapshot();
    let spans = set_progress_lines(
        snapshot.sets.len(),
        snapshot.current_set_index,
        app.machine.is_workout_complete(),
    )
    .into_iter()
    .map(|state| {
        let style = match state {
            LineState::Completed => Style::default().fg(Color::Green),
            LineState::Current => bold().fg(Color::Yellow),
            LineState::Upcoming => dim(),
            LineState::CompletedAll => bold().fg(Color::Green),
        };
        Span::styled("▬ ", style)
    })
    .collect::<Vec<_>>();
    Line::from(spans)
}

fn sequence_line(app: &App) -> Line<'static> {
    let snapshot = app.machine.snapshot();
    match app.machine.current_sequence() {
        Some(seq) => Line::from(
            sequence_dots(&seq.indices, snapshot.current_set_index)
                .into_iter()
                .map(|dot| match dot {
                    DotState::Active => Span::styled("● ", bold().fg(Color::Yellow)),
                    DotState::Completed => Span::styled("● ", Style::default().fg(Color::Green)),
                    DotState::Upcoming => Span::styled("○ ", dim()),
                })
                .collect::<Vec<_>>(),
        ),
        None => Line::from(""),
    }
}

fn render_timer(app: &App, area: Rect, buf: &mut Buffer) {
    let machine = &app.machine;
    let snapshot = machine.snapshot();
    let Some(current) = machine.current_set() else {
        Paragraph::new("No workout selected")
            .alignment(Alignment::Center)
            .render(area, buf);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1), // step indicator
            Constraint::Length(1), // set strip
            Constraint::Length(1), // progress bar
            Constraint::Min(1),    // spacer
            Constraint::Length(1), // superset dots
            Constraint::Length(2), // name
            Constraint::Length(2), // description
            Constraint::Length(3), // clock / status
            Constraint::Min(1),    // spacer
            Constraint::Length(3), // next preview
            Constraint::Length(1), // hints
        ])
        .split(area);

    Paragraph::new(step_indicator(snapshot.current_set_index, snapshot.sets.len()))
        .style(dim())
        .alignment(Alignment::Center)
        .render(chunks[0], buf);
    Paragraph::new(progress_strip(app))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    if snapshot.phase != Phase::Countdown {
        Gauge::default()
            .gauge_style(Style::default().fg(Color::Magenta))
            .ratio((machine.progress_percent() / 100.0).clamp(0.0, 1.0))
            .label("")
            .render(chunks[2], buf);
    }

    Paragraph::new(sequence_line(app))
        .alignment(Alignment::Center)
        .render(chunks[4], buf);

    let title = set_title(current);
    let title_style = if current.is_rest() {
        bold().fg(Color::Blue)
    } else {
        bold().fg(Color::Cyan)
    };
    Paragraph::new(Span::styled(title.to_uppercase(), title_style))
        .alignment(Alignment::Center)
        .render(chunks[5], buf);
    if let Some(description) = current.description() {
        Paragraph::new(Span::styled(description.to_string(), dim()))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(chunks[6], buf);
    }

    let status = status_line(app, current);
    Paragraph::new(status)
        .alignment(Alignment::Center)
        .render(chunks[7], buf);

    if let Some(next) = next_preview(app) {
        Paragraph::new(next)
            .block(Block::default().borders(Borders::TOP))
            .alignment(Alignment::Center)
            .render(chunks[9], buf);
    }

    Paragraph::new(timer_hints(app, current))
        .style(hint())
        .alignment(Alignment::Center)
        .render(chunks[10], buf);
}

fn status_line(app: &App, current: &Set) -> Line<'static> {
    let machine = &app.machine;
    let snapshot = machine.snapshot();
    let clock = bold().fg(Color::White);
    match snapshot.phase {
        Phase::Countdown => Line::from(Span::styled(
            format!("Get Ready {}", countdown_seconds(snapshot.countdown_remaining_ms)),
            bold().fg(Color::Yellow),
        )),
        Phase::Running => Line::from(Span::styled(format_time(snapshot.timer_remaining_ms), clock)),
        Phase::Paused => Line::from(vec![
            Span::styled(format_time(snapshot.timer_remaining_ms), clock),
            Span::styled("  paused", dim()),
        ]),
        Phase::Completed => {
            let text = if machine.is_last_set() {
                "Workout Completed"
            } else {
                "Set Completed"
            };
            Line::from(Span::styled(text, bold().fg(Color::Green)))
        }
        Phase::Idle => Line::from(Span::styled(set_volume(current, snapshot.commitment_level), clock)),
    }
}

/// During a rest, show what comes after it
fn next_preview(app: &App) -> Option<Line<'static>> {
    let machine = &app.machine;
    let current = machine.current_set()?;
    let next = machine.next_set()?;
    if machine.phase() != Phase::Running || !current.is_rest() || next.is_rest() {
        return None;
    }
    Some(Line::from(vec![
        Span::styled("Next: ", dim()),
        Span::styled(set_title(next).to_string(), bold()),
        Span::styled(
            format!("  {}", set_volume(next, machine.snapshot().commitment_level)),
            dim(),
        ),
    ]))
}

fn timer_hints(app: &App, current: &Set) -> String {
    let machine = &app.machine;
    match machine.phase() {
        Phase::Idle if current.is_reps() => {
            if app.done_lock.is_disabled() {
                format!("(enter) done in {:.0}%  (esc) exit", app.done_lock.progress())
            } else if machine.is_last_set() {
                "(enter) finish  (esc) exit".to_string()
            } else {
                "(enter) done  (esc) exit".to_string()
            }
        }
        Phase::Idle => "(enter) start countdown  (r)estart  (esc) exit".to_string(),
        Phase::Countdown => "(enter) skip countdown  (esc) exit".to_string(),
        Phase::Running => "(space) pause  (esc) exit".to_string(),
        Phase::Paused => "(space) continue  (r)estart  (esc) exit".to_string(),
        Phase::Completed if machine.is_last_set() => "(enter) finish  (esc) exit".to_string(),
        Phase::Completed => "(enter) next  (r)estart  (esc) exit".to_string(),
    }
}

fn render_finished(app: &App, area: Rect, buf: &mut Buffer) {
    let name = app
        .selected_workout()
        .map(|w| w.name.clone())
        .unwrap_or_default();
    let level = app.machine.snapshot().commitment_level;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Min(1),
        ])
        .split(area);

    Paragraph::new(Span::styled("WORKOUT COMPLETE", bold().fg(Color::Green)))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);
    Paragraph::new(name)
        .style(bold())
        .alignment(Alignment::Center)
        .render(chunks[2], buf);
    Paragraph::new(format!("at {}  ·  (enter) workouts  (r)estart  (esc) quit", level.label()))
        .style(hint())
        .alignment(Alignment::Center)
        .render(chunks[3], buf);

    if app.celebration.is_active {
        for piece in &app.celebration.pieces {
            if piece.x < 0.0 || piece.y < 0.0 {
                continue;
            }
            let (x, y) = (area.x + piece.x as u16, area.y + piece.y as u16);
            if x >= area.right() || y >= area.bottom() {
                continue;
            }
            if let Some(cell) = buf.cell_mut((x, y)) {
                cell.set_symbol(&piece.symbol.to_string())
                    .set_fg(CONFETTI_COLORS[piece.color_index % CONFETTI_COLORS.len()]);
            }
        }
    }
}
