//! Price parsing, statistics, and cross-round match accumulation.

pub mod accumulator;
pub mod parser;
pub mod stats;

pub use accumulator::MatchAccumulator;
pub use parser::parse_price;
pub use stats::PriceStatistics;
