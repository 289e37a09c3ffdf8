pub mod calendar;
pub mod client;
pub mod error;
pub mod markets;
pub mod news;
pub mod polls;
pub mod ratings;
pub mod report;
pub mod snapshot;
pub mod states;
pub mod tracker;
pub mod wikitable;

mod utils;

pub use client::Client;
pub use error::TrackerError;

/// Outcome of a fetch that has a documented default: either live data or
/// the fallback that replaced it. Callers that only need the data unwrap
/// it; tests can tell the two apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetched<T> {
    Live(T),
    Fallback(T),
}

impl<T> Fetched<T> {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Fetched::Fallback(_))
    }

    pub fn get(&self) -> &T {
        match self {
            Fetched::Live(value) | Fetched::Fallback(value) => value,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Fetched::Live(value) | Fetched::Fallback(value) => value,
        }
    }
}
