//! The reconciled, ordered view of all live records.
//!
//! Order is the order in which this context first observed each record and
//! stays stable while a record remains live. Consumers index into the
//! snapshot positionally, so eviction or insertion may only perturb indices
//! at or after the affected position.

use mosaic_common::WindowRecord;

#[derive(Debug, Default)]
pub struct Snapshot {
    records: Vec<WindowRecord>,
}

impl Snapshot {
    pub fn records(&self) -> &[WindowRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Fold a merged store set into the snapshot: surviving records keep
    /// their positions (with fields updated), newcomers are appended in the
    /// order the merged set presents them. Returns `true` when membership
    /// changed; shape drift alone returns `false`.
    pub fn reconcile(&mut self, merged: &[WindowRecord]) -> bool {
        let mut next: Vec<WindowRecord> = Vec::with_capacity(merged.len());

        for existing in &self.records {
            if let Some(updated) = merged.iter().find(|r| r.id == existing.id) {
                next.push(updated.clone());
            }
        }
        for record in merged {
            if !next.iter().any(|r| r.id == record.id) {
                next.push(record.clone());
            }
        }

        let changed = next.len() != self.records.len()
            || next
                .iter()
                .zip(&self.records)
                .any(|(a, b)| a.id != b.id);
        self.records = next;
        changed
    }
}
