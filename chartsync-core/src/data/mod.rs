//! Bar ingestion: raw records, normalization, period windows and the
//! upstream indicator summary.

pub mod normalize;
pub mod period;
pub mod raw;
pub mod summary;

pub use normalize::{BarNormalizer, NormalizeOptions, NormalizeReport};
pub use period::{Period, WEEKLY_TRAILING_BARS};
pub use raw::{parse_number, parse_time, RawRecord};
pub use summary::{BollingerSummary, IndicatorSummary, LatestValue, TradingSignal};
