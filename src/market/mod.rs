pub mod models;
pub mod series;
pub mod stats;

pub use models::{
    AskRequest, AskResponse, HealthResponse, NewsArticle, NewsResponse, PricePoint, PriceRange,
    PricesResponse,
};
pub use series::{ChartData, LineSeries, Rgba, SeriesStyle, CLOSE_SERIES_STYLE, MAX_X_TICKS};
pub use stats::{PriceStats, Tone};
