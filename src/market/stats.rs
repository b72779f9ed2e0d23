use super::models::PricePoint;

/// Summary figures shown in the stats strip under the price chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceStats {
    pub latest_close: f64,
    /// Absent when fewer than two points are available.
    pub change: Option<f64>,
    pub change_pct: Option<f64>,
    pub range_high: f64,
    pub range_low: f64,
}

/// Sign of a change value, used to pick the positive or negative tone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Positive,
    Negative,
    Neutral,
}

impl PriceStats {
    /// Derive stats from a chronological series; `None` for an empty series.
    pub fn from_points(points: &[PricePoint]) -> Option<Self> {
        let latest = points.last()?;
        let previous = points.len().checked_sub(2).map(|idx| &points[idx]);

        let change = previous.map(|prev| latest.close - prev.close);
        let change_pct = previous.map(|prev| (latest.close - prev.close) / prev.close * 100.0);

        let (range_high, range_low) = points.iter().fold(
            (points[0].high, points[0].low),
            |(high, low), point| (high.max(point.high), low.min(point.low)),
        );

        Some(Self {
            latest_close: latest.close,
            change,
            change_pct,
            range_high,
            range_low,
        })
    }

    pub fn tone(&self) -> Tone {
        tone_of(self.change)
    }
}

pub fn tone_of(value: Option<f64>) -> Tone {
    match value {
        Some(v) if v >= 0.0 => Tone::Positive,
        Some(_) => Tone::Negative,
        None => Tone::Neutral,
    }
}

pub fn format_price(value: f64) -> String {
    format!("${:.2}", value)
}

pub fn format_change(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{}{:.2}", if v >= 0.0 { "+" } else { "" }, v),
        None => "—".to_string(),
    }
}

pub fn format_change_pct(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{}{:.2}%", if v >= 0.0 { "+" } else { "" }, v),
        None => "—".to_string(),
    }
}
