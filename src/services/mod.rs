pub mod aggregator;
pub mod genre_filter;
pub mod providers;
pub mod ratings;
pub mod retry;
pub mod scoring;
