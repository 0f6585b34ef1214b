// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Cache-first health statistics.

use crate::db::{RecordStore, StoreError};
use crate::models::{HealthStats, RecordType};

/// Whether a lookup was served from the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
        }
    }
}

#[derive(Debug, Clone)]
pub struct StatsLookup {
    pub stats: HealthStats,
    pub cache: CacheStatus,
}

/// Computes per-type aggregates, consulting the stats cache first.
#[derive(Clone)]
pub struct StatsAggregator {
    store: RecordStore,
}

impl StatsAggregator {
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }

    /// Stats for `(user_id, record_type)`.
    ///
    /// A failed or corrupt cache read is treated as a miss. On a miss every
    /// record in the user's index is read (no page cap). Empty results are not
    /// cached so the first real record shows up on the next read.
    pub async fn get_stats(
        &self,
        user_id: &str,
        record_type: RecordType,
    ) -> Result<StatsLookup, StoreError> {
        match self.store.get_cached_stats(user_id, record_type).await {
            Ok(Some(stats)) => {
                return Ok(StatsLookup {
                    stats,
                    cache: CacheStatus::Hit,
                })
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(
                    user_id = %user_id,
                    record_type = %record_type,
                    error = %e,
                    "Stats cache read failed, recomputing"
                );
            }
        }

        let ids = self.store.full_index(user_id).await?;
        let records = self.store.get_records(user_id, &ids).await?;
        let stats = HealthStats::aggregate(user_id, record_type, &records);

        if !stats.is_empty() {
            if let Err(e) = self.store.put_cached_stats(&stats).await {
                tracing::warn!(
                    user_id = %user_id,
                    record_type = %record_type,
                    error = %e,
                    "Failed to cache stats"
                );
            }
        }

        tracing::debug!(
            user_id = %user_id,
            record_type = %record_type,
            scanned = records.len(),
            count = stats.count,
            "Computed stats"
        );

        Ok(StatsLookup {
            stats,
            cache: CacheStatus::Miss,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::HealthRecord;
    use chrono::Utc;
    use std::sync::Arc;

    fn setup() -> (StatsAggregator, RecordStore) {
        let store = RecordStore::new(Arc::new(MemoryStore::new()));
        (StatsAggregator::new(store.clone()), store)
    }

    async fn add(store: &RecordStore, record_type: RecordType, value: f64) {
        let now = Utc::now();
        let record = HealthRecord {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: "u1".to_string(),
            record_type,
            value,
            unit: "bpm".to_string(),
            notes: None,
            recorded_at: now,
            created_at: now,
        };
        store.insert_record(&record).await.unwrap();
    }

    #[tokio::test]
    async fn test_miss_then_hit() {
        let (stats, store) = setup();
        for v in [60.0, 72.0, 85.5] {
            add(&store, RecordType::HeartRate, v).await;
        }

        let first = stats.get_stats("u1", RecordType::HeartRate).await.unwrap();
        assert_eq!(first.cache, CacheStatus::Miss);
        assert_eq!(first.stats.count, 3);

        let second = stats.get_stats("u1", RecordType::HeartRate).await.unwrap();
        assert_eq!(second.cache, CacheStatus::Hit);
        assert_eq!(second.stats, first.stats);
    }

    #[tokio::test]
    async fn test_empty_result_not_cached() {
        let (stats, store) = setup();

        let empty = stats.get_stats("u1", RecordType::Weight).await.unwrap();
        assert_eq!(empty.cache, CacheStatus::Miss);
        assert!(empty.stats.is_empty());
        assert!(store
            .get_cached_stats("u1", RecordType::Weight)
            .await
            .unwrap()
            .is_none());

        add(&store, RecordType::Weight, 80.0).await;
        let after = stats.get_stats("u1", RecordType::Weight).await.unwrap();
        assert_eq!(after.stats.count, 1);
    }

    #[tokio::test]
    async fn test_write_invalidates_only_that_type() {
        let (stats, store) = setup();
        add(&store, RecordType::HeartRate, 60.0).await;
        add(&store, RecordType::Weight, 80.0).await;
        stats.get_stats("u1", RecordType::HeartRate).await.unwrap();
        stats.get_stats("u1", RecordType::Weight).await.unwrap();

        add(&store, RecordType::HeartRate, 90.0).await;

        let hr = stats.get_stats("u1", RecordType::HeartRate).await.unwrap();
        assert_eq!(hr.cache, CacheStatus::Miss);
        assert_eq!(hr.stats.count, 2);
        assert_eq!(hr.stats.max, 90.0);

        let weight = stats.get_stats("u1", RecordType::Weight).await.unwrap();
        assert_eq!(weight.cache, CacheStatus::Hit);
    }
}
