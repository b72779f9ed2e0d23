use ratatui::{
    prelude::*,
    widgets::{block::Title, Block, Borders, Paragraph, Wrap},
};

use crate::app::Slice;
use crate::market::{NewsArticle, NewsResponse};
use crate::ui::styles::{secondary_line, secondary_span, ACCENT};
use crate::utils::{format_published_at, truncate_to_width};

/// Curated news card: digest summary followed by scrollable articles.
pub fn render_news_card(
    f: &mut Frame<'_>,
    area: Rect,
    news: &Slice<NewsResponse>,
    scroll: usize,
) {
    let heading = if news.data.is_some() {
        " Curated news · Top headlines "
    } else {
        " Curated news "
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(heading)
        .title(Title::from(" LLM ranked ").alignment(Alignment::Right));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(data) = &news.data else {
        let message = if news.loading {
            "Loading news."
        } else {
            "Press Ctrl+N to fetch curated headlines for the ticker."
        };
        f.render_widget(
            Paragraph::new(secondary_line(message))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
            inner,
        );
        return;
    };

    let width = usize::from(inner.width);
    let mut lines = vec![Line::from(data.summary.clone()), Line::default()];
    if data.articles.is_empty() {
        lines.push(secondary_line("No articles returned."));
    }
    for article in data.articles.iter().skip(scroll) {
        lines.extend(article_lines(article, width));
        lines.push(Line::default());
    }

    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
}

/// Title, meta line, optional snippet and link for one article, cut to `width`.
pub fn article_lines(article: &NewsArticle, width: usize) -> Vec<Line<'static>> {
    let source = article.source.as_deref().unwrap_or("Source");
    let mut meta = format!("{} - Score {:.2}", source, article.relevance_score);
    if let Some(published) = &article.published_at {
        meta.push_str(" · ");
        meta.push_str(&format_published_at(published));
    }

    let mut lines = vec![
        Line::from(Span::styled(
            truncate_to_width(&article.title, width),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(secondary_span(truncate_to_width(&meta, width))),
    ];
    if let Some(snippet) = article.summary.as_deref().filter(|s| !s.trim().is_empty()) {
        lines.push(Line::from(truncate_to_width(snippet.trim(), width.saturating_mul(2))));
    }
    lines.push(Line::from(Span::styled(
        truncate_to_width(&article.url, width),
        Style::default().fg(ACCENT).add_modifier(Modifier::UNDERLINED),
    )));
    lines
}
