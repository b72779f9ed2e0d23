use ratatui::{
    prelude::*,
    symbols::Marker,
    widgets::{
        block::Title, Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Wrap,
    },
};

use crate::app::{PriceSnapshot, Slice};
use crate::market::{stats, ChartData, PriceStats, MAX_X_TICKS};
use crate::ui::components::utils::{split_horizontal, split_vertical};
use crate::ui::styles::{rgb, secondary_line, tone_style, translucent};

const Y_TICKS: usize = 5;
const STRIP_HEIGHT: u16 = 3;

/// Price trend card: title, line chart (or placeholder) and the stats strip.
pub fn render_price_card(f: &mut Frame<'_>, area: Rect, prices: &Slice<PriceSnapshot>) {
    let heading = match &prices.data {
        Some(snapshot) => format!(
            " Price trend · {} - {} ",
            snapshot.response.ticker, snapshot.response.range
        ),
        None => " Price trend ".to_string(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(heading)
        .title(Title::from(" Daily close ").alignment(Alignment::Right));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let snapshot = match &prices.data {
        Some(snapshot) if !snapshot.chart.is_empty() => snapshot,
        Some(_) => {
            render_placeholder(f, inner, "No price points returned for this range.");
            return;
        }
        None if prices.loading => {
            render_placeholder(f, inner, "Loading prices.");
            return;
        }
        None => {
            render_placeholder(
                f,
                inner,
                "Enter a ticker and press Enter to chart daily closes.",
            );
            return;
        }
    };

    let segments = split_vertical(
        inner,
        &[Constraint::Min(5), Constraint::Length(STRIP_HEIGHT)],
    );
    render_line_chart(f, segments[0], &snapshot.chart);
    if let Some(stats) = &snapshot.stats {
        render_stats_strip(f, segments[1], stats);
    }
}

fn render_placeholder(f: &mut Frame<'_>, area: Rect, message: &str) {
    f.render_widget(
        Paragraph::new(secondary_line(message.to_string()))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        area,
    );
}

fn render_line_chart(f: &mut Frame<'_>, area: Rect, chart: &ChartData) {
    let style = chart.series.style;
    let coordinates = chart.coordinates();
    // One sample per braille dot column and row.
    let fill = if style.fill {
        chart.fill_points(usize::from(area.width) * 2, usize::from(area.height) * 4)
    } else {
        Vec::new()
    };

    let mut datasets = Vec::with_capacity(2);
    if !fill.is_empty() {
        datasets.push(
            Dataset::default()
                .marker(Marker::Braille)
                .graph_type(GraphType::Scatter)
                .style(Style::default().fg(translucent(style.background)))
                .data(&fill),
        );
    }
    datasets.push(
        Dataset::default()
            .name(chart.series.label.clone())
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(rgb(style.border)))
            .data(&coordinates),
    );

    let x_labels: Vec<Span> = chart
        .x_ticks(MAX_X_TICKS.min(usize::from(area.width / 12).max(2)))
        .into_iter()
        .map(Span::raw)
        .collect();
    let y_labels: Vec<Span> = chart.y_ticks(Y_TICKS).into_iter().map(Span::raw).collect();

    let widget = Chart::new(datasets)
        .x_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .bounds(chart.x_bounds())
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .bounds(chart.y_bounds())
                .labels(y_labels),
        )
        .hidden_legend_constraints((Constraint::Ratio(0, 1), Constraint::Ratio(0, 1)));

    f.render_widget(widget, area);
}

pub fn render_stats_strip(f: &mut Frame<'_>, area: Rect, stats: &PriceStats) {
    let columns = split_horizontal(area, &[Constraint::Ratio(1, 4); 4]);
    for (column, cell) in columns.iter().zip(stat_cells(stats)) {
        f.render_widget(Paragraph::new(cell).alignment(Alignment::Center), *column);
    }
}

/// Label and value lines for each stat, in display order.
pub fn stat_cells(stats: &PriceStats) -> Vec<Vec<Line<'static>>> {
    let tone = tone_style(stats.tone());
    let pct_tone = tone_style(stats::tone_of(stats.change_pct));

    vec![
        vec![
            secondary_line("Last close"),
            bold_line(stats::format_price(stats.latest_close)),
        ],
        vec![
            secondary_line("Day change"),
            Line::from(vec![
                Span::styled(
                    stats::format_change(stats.change),
                    tone.add_modifier(Modifier::BOLD),
                ),
                Span::raw(" "),
                Span::styled(stats::format_change_pct(stats.change_pct), pct_tone),
            ]),
        ],
        vec![
            secondary_line("Range high"),
            bold_line(stats::format_price(stats.range_high)),
        ],
        vec![
            secondary_line("Range low"),
            bold_line(stats::format_price(stats.range_low)),
        ],
    ]
}

fn bold_line(text: String) -> Line<'static> {
    Line::from(Span::styled(
        text,
        Style::default().add_modifier(Modifier::BOLD),
    ))
}
