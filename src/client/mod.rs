//! Outbound data provider

pub mod provider;

pub use provider::{parse_fixture, ProviderClient, FIXTURE_INCLUDES};

use crate::error::Result;
use crate::types::FixtureBundle;
use async_trait::async_trait;

/// Source of fixture data, predictions and odds
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FixtureProvider: Send + Sync {
    /// Fetch one fixture with its predictions and odds embedded
    async fn fetch_fixture(&self, fixture_id: u64) -> Result<FixtureBundle>;
}
