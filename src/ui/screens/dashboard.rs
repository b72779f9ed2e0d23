use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Tabs, Wrap},
};

use crate::app::{Dashboard, DashboardState, Focus};
use crate::error::Result;
use crate::market::PriceRange;
use crate::ui::components::{
    chart::render_price_card,
    news::render_news_card,
    utils::{split_horizontal, split_vertical},
    TerminalGuard,
};
use crate::ui::styles::{error_line, focused_border, secondary_line, secondary_span, ACCENT};
use crate::utils::{current_human_timestamp, is_ticker_char};

const MAX_TICKER_LEN: usize = 10;
const MAX_QUESTION_LEN: usize = 280;
const FRAME_POLL: Duration = Duration::from_millis(100);

const HEADLINE: &str = "Markets, without the noise.";
const SUBHEAD: &str =
    "A clean, signal-first view of price action and the most relevant coverage for your ticker.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Quit,
}

/// Drive the interactive dashboard until the user quits.
pub async fn run_dashboard(dashboard: &mut Dashboard) -> Result<()> {
    let mut guard = TerminalGuard::new()?;

    loop {
        dashboard.drain();
        guard.draw(|f| draw_dashboard(f, dashboard.state()))?;

        if event::poll(FRAME_POLL)? {
            let control = match event::read()? {
                Event::Key(key) => handle_key(dashboard, key, Instant::now()),
                Event::Paste(text) => {
                    handle_paste(dashboard.state_mut(), &text);
                    LoopControl::Continue
                }
                _ => LoopControl::Continue,
            };
            if control == LoopControl::Quit {
                break;
            }
        } else {
            tokio::task::yield_now().await;
        }
    }

    guard.restore()
}

/// Map one key press onto the dashboard session.
pub fn handle_key(dashboard: &mut Dashboard, key: KeyEvent, now: Instant) -> LoopControl {
    if key.kind != KeyEventKind::Press {
        return LoopControl::Continue;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Esc => return LoopControl::Quit,
        KeyCode::Char('c') if ctrl => return LoopControl::Quit,
        KeyCode::Char('n') if ctrl => {
            dashboard.request_news(now);
        }
        KeyCode::Enter => match dashboard.state().focus {
            Focus::Ticker => {
                dashboard.submit_prices(now);
            }
            Focus::Question => {
                dashboard.submit_question(now);
            }
        },
        KeyCode::Tab | KeyCode::BackTab => {
            let state = dashboard.state_mut();
            state.focus = state.focus.toggle();
        }
        KeyCode::Left => {
            let state = dashboard.state_mut();
            state.range = state.range.prev();
        }
        KeyCode::Right => {
            let state = dashboard.state_mut();
            state.range = state.range.next();
        }
        KeyCode::Up => dashboard.state_mut().scroll_news(-1),
        KeyCode::Down => dashboard.state_mut().scroll_news(1),
        KeyCode::Backspace => {
            let state = dashboard.state_mut();
            match state.focus {
                Focus::Ticker => state.ticker.pop(),
                Focus::Question => state.question.pop(),
            };
        }
        KeyCode::Char(ch) if !ctrl => push_char(dashboard.state_mut(), ch),
        _ => {}
    }

    LoopControl::Continue
}

fn handle_paste(state: &mut DashboardState, text: &str) {
    for ch in text.chars().filter(|ch| !ch.is_control()) {
        push_char(state, ch);
    }
}

fn push_char(state: &mut DashboardState, ch: char) {
    match state.focus {
        Focus::Ticker => {
            if is_ticker_char(ch) && state.ticker.chars().count() < MAX_TICKER_LEN {
                state.ticker.push(ch.to_ascii_uppercase());
            }
        }
        Focus::Question => {
            if state.question.chars().count() < MAX_QUESTION_LEN {
                state.question.push(ch);
            }
        }
    }
}

pub fn draw_dashboard(f: &mut Frame<'_>, state: &DashboardState) {
    let errors = error_lines(state);
    let rows = split_vertical(
        f.size(),
        &[
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(errors.len() as u16),
            Constraint::Min(10),
            Constraint::Length(7),
            Constraint::Length(1),
        ],
    );

    render_header(f, rows[0]);
    render_form(f, rows[1], state);
    if !errors.is_empty() {
        f.render_widget(Paragraph::new(errors), rows[2]);
    }

    let grid = split_horizontal(
        rows[3],
        &[Constraint::Percentage(60), Constraint::Percentage(40)],
    );
    render_price_card(f, grid[0], &state.prices);
    render_news_card(f, grid[1], &state.news, state.news_scroll);

    render_ask_panel(f, rows[4], state);

    f.render_widget(
        Paragraph::new(secondary_line(
            "Enter submit • Ctrl+N news • Tab switch field • ←/→ range • ↑/↓ scroll news • Esc quit",
        )),
        rows[5],
    );
}

fn render_header(f: &mut Frame<'_>, area: Rect) {
    let lines = vec![
        Line::from(vec![
            Span::styled(
                "MarketLens",
                Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            secondary_span(current_human_timestamp()),
        ]),
        Line::from(Span::styled(
            HEADLINE,
            Style::default().add_modifier(Modifier::BOLD),
        )),
        secondary_line(SUBHEAD),
    ];
    f.render_widget(Paragraph::new(lines), area);
}

fn render_form(f: &mut Frame<'_>, area: Rect, state: &DashboardState) {
    let columns = split_horizontal(
        area,
        &[
            Constraint::Length(18),
            Constraint::Length(22),
            Constraint::Min(20),
        ],
    );

    let ticker_line = if state.ticker.is_empty() {
        secondary_line("e.g., AAPL")
    } else {
        Line::from(state.ticker.clone())
    };
    f.render_widget(
        Paragraph::new(ticker_line).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Ticker")
                .border_style(focused_border(state.focus == Focus::Ticker)),
        ),
        columns[0],
    );

    let tabs = Tabs::new(PriceRange::ALL.iter().map(|range| range.as_str()).collect::<Vec<_>>())
        .select(state.range.index())
        .highlight_style(Style::default().fg(ACCENT).add_modifier(Modifier::REVERSED))
        .block(Block::default().borders(Borders::ALL).title("Range ←/→"));
    f.render_widget(tabs, columns[1]);

    let prices_label = if state.prices.loading {
        secondary_span("Loading prices.")
    } else {
        Span::raw("[Enter] Analyze prices")
    };
    let news_label = if state.news.loading {
        secondary_span("Loading news.")
    } else {
        Span::raw("[Ctrl+N] Fetch news")
    };
    f.render_widget(
        Paragraph::new(Line::from(vec![prices_label, Span::raw("   "), news_label]))
            .block(Block::default().borders(Borders::ALL).title("Actions")),
        columns[2],
    );
}

fn render_ask_panel(f: &mut Frame<'_>, area: Rect, state: &DashboardState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Ask")
        .border_style(focused_border(state.focus == Focus::Question));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let prompt = if state.question.is_empty() {
        Line::from(vec![
            Span::raw("> "),
            secondary_span("Tab here, type a question about the ticker, press Enter"),
        ])
    } else {
        Line::from(format!("> {}", state.question))
    };

    let mut lines = vec![prompt];
    if state.answer.loading {
        lines.push(secondary_line("Thinking."));
    } else if let Some(answer) = &state.answer.data {
        lines.push(Line::from(answer.answer.clone()));
        if !answer.sources.is_empty() {
            lines.push(secondary_line(format!(
                "Sources: {}",
                answer.sources.join(", ")
            )));
        }
    }

    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
}

/// Inline errors, one per slice, in prices / news / ask order.
fn error_lines(state: &DashboardState) -> Vec<Line<'static>> {
    [&state.prices.error, &state.news.error, &state.answer.error]
        .into_iter()
        .flatten()
        .map(|message| error_line(message.clone()))
        .collect()
}
