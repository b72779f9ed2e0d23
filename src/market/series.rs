use super::models::PricesResponse;

const DATE_LABEL_FMT: &str = "%Y-%m-%d";

/// Upper bound on x-axis labels, matching a `maxTicksLimit` of six.
pub const MAX_X_TICKS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Composite onto an opaque base color.
    pub fn blend_over(self, base: (u8, u8, u8)) -> (u8, u8, u8) {
        let alpha = self.a.clamp(0.0, 1.0);
        let mix = |fg: u8, bg: u8| -> u8 {
            (f64::from(fg) * alpha + f64::from(bg) * (1.0 - alpha)).round() as u8
        };
        (mix(self.r, base.0), mix(self.g, base.1), mix(self.b, base.2))
    }
}

/// Fixed visual parameters attached to a line series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesStyle {
    pub fill: bool,
    pub border: Rgba,
    pub background: Rgba,
    pub tension: f64,
    pub point_radius: f64,
}

pub const CLOSE_SERIES_STYLE: SeriesStyle = SeriesStyle {
    fill: true,
    border: Rgba::opaque(0x0d, 0x72, 0x65),
    background: Rgba {
        r: 13,
        g: 114,
        b: 101,
        a: 0.15,
    },
    tension: 0.3,
    point_radius: 0.0,
};

#[derive(Debug, Clone, PartialEq)]
pub struct LineSeries {
    pub label: String,
    pub values: Vec<f64>,
    pub style: SeriesStyle,
}

/// Labeled chart data for a single close-price line.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub series: LineSeries,
}

impl ChartData {
    /// One label and one value per point, in the order received.
    pub fn from_prices(prices: &PricesResponse) -> Self {
        let labels = prices
            .points
            .iter()
            .map(|point| point.date.format(DATE_LABEL_FMT).to_string())
            .collect();
        let values = prices.points.iter().map(|point| point.close).collect();

        Self {
            labels,
            series: LineSeries {
                label: format!("{} Close", prices.ticker),
                values,
                style: CLOSE_SERIES_STYLE,
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.series.values.is_empty()
    }

    /// `(index, close)` pairs for a cartesian renderer.
    pub fn coordinates(&self) -> Vec<(f64, f64)> {
        self.series
            .values
            .iter()
            .enumerate()
            .map(|(idx, value)| (idx as f64, *value))
            .collect()
    }

    /// Close interpolated linearly between neighbouring points at fractional index `x`.
    pub fn close_at(&self, x: f64) -> Option<f64> {
        let values = &self.series.values;
        let last = values.len().checked_sub(1)?;
        let x = x.clamp(0.0, last as f64);
        let lower = x.floor() as usize;
        let upper = (lower + 1).min(last);
        let t = x - lower as f64;
        Some(values[lower] + (values[upper] - values[lower]) * t)
    }

    /// Points sampled on a `columns` x `rows` grid that lie between the y floor and the line.
    pub fn fill_points(&self, columns: usize, rows: usize) -> Vec<(f64, f64)> {
        if self.is_empty() || columns == 0 || rows == 0 {
            return Vec::new();
        }

        let [x_low, x_high] = self.x_bounds();
        let [floor, ceiling] = self.y_bounds();
        let x_step = (x_high - x_low) / columns.max(2).saturating_sub(1) as f64;
        let y_step = (ceiling - floor) / rows as f64;

        let mut points = Vec::new();
        for column in 0..columns.max(2) {
            let x = x_low + x_step * column as f64;
            let Some(close) = self.close_at(x) else {
                continue;
            };
            let mut y = floor;
            while y < close {
                points.push((x, y));
                y += y_step;
            }
        }
        points
    }

    pub fn x_bounds(&self) -> [f64; 2] {
        let last = self.series.values.len().saturating_sub(1).max(1);
        [0.0, last as f64]
    }

    /// Value bounds padded by 5% of the span; a flat series gets a synthetic span.
    pub fn y_bounds(&self) -> [f64; 2] {
        let values = &self.series.values;
        if values.is_empty() {
            return [0.0, 1.0];
        }

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let span = max - min;

        if span.abs() < 1e-6 {
            let pad = if min.abs() < 1.0 { 0.5 } else { min.abs() * 0.025 };
            return [min - pad, max + pad];
        }

        let pad = span * 0.05;
        [min - pad, max + pad]
    }

    /// Evenly spaced date labels, always including the first and last point.
    pub fn x_ticks(&self, max_ticks: usize) -> Vec<String> {
        if self.labels.is_empty() {
            return Vec::new();
        }

        let last_index = self.labels.len() - 1;
        if last_index == 0 {
            return vec![self.labels[0].clone()];
        }

        let desired = max_ticks.max(2).min(self.labels.len());
        let step = last_index as f64 / (desired - 1) as f64;
        let mut indices: Vec<usize> = (0..desired)
            .map(|i| ((i as f64 * step).round() as usize).min(last_index))
            .collect();
        indices.dedup();

        indices
            .into_iter()
            .map(|idx| self.labels[idx].clone())
            .collect()
    }

    /// Dollar-prefixed labels spread across the y bounds.
    pub fn y_ticks(&self, count: usize) -> Vec<String> {
        let [low, high] = self.y_bounds();
        let count = count.max(2);
        let step = (high - low) / (count - 1) as f64;
        (0..count)
            .map(|i| format!("${:.2}", low + step * i as f64))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::models::{PricePoint, PriceRange};
    use chrono::NaiveDate;

    fn prices(closes: &[f64]) -> PricesResponse {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        PricesResponse {
            ticker: "AAPL".to_string(),
            range: PriceRange::OneMonth,
            points: closes
                .iter()
                .enumerate()
                .map(|(idx, close)| PricePoint {
                    date: start + chrono::Duration::days(idx as i64),
                    open: *close,
                    high: close + 1.0,
                    low: close - 1.0,
                    close: *close,
                    volume: 10,
                })
                .collect(),
        }
    }

    #[test]
    fn maps_points_one_to_one() {
        let chart = ChartData::from_prices(&prices(&[100.0, 106.0, 103.5]));

        assert_eq!(chart.labels, vec!["2024-03-01", "2024-03-02", "2024-03-03"]);
        assert_eq!(chart.series.values, vec![100.0, 106.0, 103.5]);
        assert_eq!(chart.series.label, "AAPL Close");
        assert_eq!(chart.series.style, CLOSE_SERIES_STYLE);
        assert!(chart.series.style.fill);
        assert_eq!(chart.series.style.point_radius, 0.0);
        assert_eq!(chart.coordinates()[1], (1.0, 106.0));
    }

    #[test]
    fn x_ticks_respect_limit_and_endpoints() {
        let closes: Vec<f64> = (0..22).map(|i| 100.0 + i as f64).collect();
        let chart = ChartData::from_prices(&prices(&closes));

        let ticks = chart.x_ticks(MAX_X_TICKS);

        assert_eq!(ticks.len(), MAX_X_TICKS);
        assert_eq!(ticks.first().unwrap(), "2024-03-01");
        assert_eq!(ticks.last().unwrap(), "2024-03-22");
    }

    #[test]
    fn flat_series_gets_nonzero_bounds() {
        let chart = ChartData::from_prices(&prices(&[50.0, 50.0]));

        let [low, high] = chart.y_bounds();

        assert!(low < 50.0 && high > 50.0);
        assert_eq!(chart.y_ticks(3).len(), 3);
        assert!(chart.y_ticks(3)[0].starts_with('$'));
    }

    #[test]
    fn background_blends_toward_base() {
        let (r, g, b) = CLOSE_SERIES_STYLE.background.blend_over((255, 255, 255));

        assert_eq!((r, g, b), (219, 234, 232));
    }

    #[test]
    fn fill_stays_between_floor_and_line() {
        let chart = ChartData::from_prices(&prices(&[100.0, 110.0]));
        let [floor, _] = chart.y_bounds();

        let points = chart.fill_points(3, 20);

        assert!(!points.is_empty());
        assert!(points.iter().all(|(x, y)| {
            *y >= floor && *y < chart.close_at(*x).unwrap()
        }));
        assert_eq!(chart.close_at(0.5), Some(105.0));
        let xs: Vec<f64> = points.iter().map(|(x, _)| *x).collect();
        assert!(xs.contains(&0.0) && xs.contains(&0.5) && xs.contains(&1.0));
    }

    #[test]
    fn empty_series_has_no_fill() {
        let chart = ChartData::from_prices(&prices(&[]));

        assert!(chart.fill_points(10, 10).is_empty());
        assert_eq!(chart.close_at(0.0), None);
    }
}
