//! In-memory vector store.
//!
//! The store is filled by one ingestion pass and then shared read-only
//! behind an `Arc`. Every record has the same dimension.

use crate::types::StoreRecord;
use docqa_core::{AppError, AppResult};

/// Ordered collection of `(text, vector)` records of one fixed dimension.
#[derive(Debug, Default, Clone)]
pub struct VectorStore {
    records: Vec<StoreRecord>,
    dimension: Option<usize>,
}

impl VectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a batch of records in order.
    ///
    /// The batch is checked against the established dimension, or against its
    /// own first record when the store is empty. A rejected batch leaves the
    /// store unchanged.
    pub fn append(&mut self, records: Vec<StoreRecord>) -> AppResult<()> {
        let Some(first) = records.first() else {
            return Ok(());
        };

        let expected = self.dimension.unwrap_or(first.dimension());
        if expected == 0 {
            return Err(AppError::dimension_mismatch(
                1,
                0,
                "vector store append (empty vector)",
            ));
        }

        if let Some((index, record)) = records
            .iter()
            .enumerate()
            .find(|(_, record)| record.dimension() != expected)
        {
            return Err(AppError::dimension_mismatch(
                expected,
                record.dimension(),
                format!("vector store append (record {} of batch)", index),
            ));
        }

        self.dimension = Some(expected);
        self.records.extend(records);

        tracing::debug!(
            "Vector store holds {} records of dimension {}",
            self.records.len(),
            expected
        );

        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in insertion order.
    pub fn records(&self) -> &[StoreRecord] {
        &self.records
    }

    /// Dimension shared by all records, `None` while empty.
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }
}
