pub mod aggregator;
pub mod book;

pub use aggregator::{sort_views, AccountAggregator, PassOutcome};
pub use book::{AccountBook, PassToken};
