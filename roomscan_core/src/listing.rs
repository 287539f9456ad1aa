//! Read-only listing of the registry for UI readers.
//!
//! The registry itself is owned by the fusion engine and mutated only on
//! the fusion thread. Readers elsewhere get a `RegistryListing`: a copied
//! summary published through a `ListingHandle` after each completed cycle,
//! so they never observe a half-applied cycle.

use crate::object_record::ObjectRecord;
use crate::object_registry::ObjectRegistry;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use uuid::Uuid;

/// One line of the listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordSummary {
    pub id: Uuid,
    pub label: String,
    pub volume: f64,
    pub times_seen: u32,
    pub confidence: f64,
    pub active: bool,
}

impl From<&ObjectRecord> for RecordSummary {
    fn from(record: &ObjectRecord) -> Self {
        Self {
            id: record.id(),
            label: record.label().to_string(),
            volume: record.volume(),
            times_seen: record.times_seen(),
            confidence: record.confidence(),
            active: record.is_active(),
        }
    }
}

/// Snapshot of every record, in registry order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryListing {
    pub unit_label: String,
    pub entries: Vec<RecordSummary>,
}

impl RegistryListing {
    pub fn from_registry(registry: &ObjectRegistry, unit_label: &str) -> Self {
        Self {
            unit_label: unit_label.to_string(),
            entries: registry.records().map(RecordSummary::from).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for RegistryListing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Master Detected Objects:")?;
        for entry in &self.entries {
            let volume = if entry.volume > 0.0 {
                format!("{:.2} {}", entry.volume, self.unit_label)
            } else {
                "N/A".to_string()
            };
            writeln!(
                f,
                "{} — {} (seen {}, best {:.2})",
                entry.label, volume, entry.times_seen, entry.confidence
            )?;
        }
        Ok(())
    }
}

/// Shared, lock-protected slot holding the latest published listing.
///
/// Cloning the handle shares the slot.
#[derive(Debug, Clone, Default)]
pub struct ListingHandle {
    inner: Arc<RwLock<RegistryListing>>,
}

impl ListingHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the published listing.
    pub fn publish(&self, listing: RegistryListing) {
        let mut slot = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        *slot = listing;
    }

    /// Copy of the most recently published listing.
    pub fn snapshot(&self) -> RegistryListing {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
