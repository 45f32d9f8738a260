//! Mock provider implementation for testing.

#[cfg(test)]
use std::sync::Arc;
#[cfg(test)]
use std::sync::atomic::{AtomicUsize, Ordering};

#[cfg(test)]
use async_trait::async_trait;
#[cfg(test)]
use cafefinder_core::Coordinates;

#[cfg(test)]
use super::CafeProvider;
#[cfg(test)]
use crate::errors::PlaceSearchError;
#[cfg(test)]
use crate::types::{Cafe, DataSource};

/// Mock provider for testing.
///
/// Returns `count` cafés spaced 100 m apart northwards, or fails when built
/// with [`MockProvider::failing`].
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct MockProvider {
    source: DataSource,
    count: usize,
    fail: bool,
    calls: Arc<AtomicUsize>,
}

#[cfg(test)]
impl MockProvider {
    /// Provider returning `count` cafés labelled `source`.
    pub fn new(source: DataSource, count: usize) -> Self {
        Self {
            source,
            count,
            fail: false,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Provider whose every call fails with a network error.
    pub fn failing(source: DataSource) -> Self {
        Self {
            fail: true,
            ..Self::new(source, 0)
        }
    }

    /// Number of searches issued so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
#[async_trait]
impl CafeProvider for MockProvider {
    fn source(&self) -> DataSource {
        self.source
    }

    async fn nearby_cafes(
        &self,
        centre: Coordinates,
        _radius_m: u32,
    ) -> Result<Vec<Cafe>, PlaceSearchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.fail {
            return Err(PlaceSearchError::NetworkError {
                reason: "mock failure".to_string(),
            });
        }

        // ~100 m of latitude per step, listed farthest first so sorting is observable.
        Ok((0..self.count)
            .rev()
            .map(|i| {
                let position = centre.offset((i as f64 + 1.0) * 0.0009, 0.0);
                let mut cafe = Cafe::new(
                    format!("mock_{i}"),
                    format!("Mock Café {i}"),
                    position,
                    format!("{i} Mock Street"),
                    centre,
                );
                cafe.rating = Some(3.0 + (i % 3) as f32 * 0.5);
                cafe.open_now = Some(i % 2 == 0);
                cafe
            })
            .collect())
    }
}
