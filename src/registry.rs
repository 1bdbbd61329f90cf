//! Multi-category accumulator registry
//!
//! Samples are indexed by a composite key: a coarse [`Category`] picks one of
//! three independent maps, and an [`OpId`] identifies the operation inside
//! that category. Accumulators are created lazily on first sample and removed
//! in bulk on window reset. Iteration order is key-sorted (`BTreeMap`) so a
//! report is reproducible within a process run.

use std::collections::BTreeMap;

use crate::accumulator::TimingStats;

/// Coarse grouping of instrumented operations.
///
/// Each category owns an independent map of accumulators; all categories
/// share one measurement window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Plugin/device operations
    Plugin,
    /// Controller/protocol operations
    Controller,
    /// Miscellaneous named operations
    Misc,
}

impl Category {
    /// All categories in fixed report order
    pub const ALL: [Category; 3] = [Category::Plugin, Category::Controller, Category::Misc];

    /// Default human-readable label, used when no resolver overrides it
    pub fn label(self) -> &'static str {
        match self {
            Category::Plugin => "Plugin",
            Category::Controller => "Controller",
            Category::Misc => "Misc",
        }
    }

    fn index(self) -> usize {
        match self {
            Category::Plugin => 0,
            Category::Controller => 1,
            Category::Misc => 2,
        }
    }
}

/// Operation identifier within a category.
///
/// Packs a unit/group scope in the high bits and a function scope in the low
/// 8 bits, mirroring the memory-economical composite-key layout. Plain
/// identifiers (no function part) use [`OpId::new`] directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(transparent)]
pub struct OpId(u32);

impl OpId {
    /// Identifier from a raw value
    pub const fn new(raw: u32) -> Self {
        OpId(raw)
    }

    /// Composite identifier: unit/group in the high bits, function in the low 8
    pub const fn composite(unit: u32, func: u8) -> Self {
        OpId((unit << 8) | func as u32)
    }

    /// Unit/group part of a composite identifier
    pub const fn unit(self) -> u32 {
        self.0 >> 8
    }

    /// Function part of a composite identifier
    pub const fn func(self) -> u8 {
        (self.0 & 0xff) as u8
    }

    /// Raw packed value
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// One accumulator map per category
#[derive(Debug, Default)]
pub struct StatsRegistry {
    maps: [BTreeMap<OpId, TimingStats>; 3],
}

impl StatsRegistry {
    /// Create a registry with all categories empty
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one sample for `(category, id)`, creating the accumulator on
    /// first use. Never fails and never touches unrelated entries.
    pub fn record(&mut self, category: Category, id: OpId, duration_us: u64) {
        self.maps[category.index()]
            .entry(id)
            .or_default()
            .record(duration_us);
    }

    /// Look up the accumulator for `(category, id)` if one exists
    pub fn get(&self, category: Category, id: OpId) -> Option<&TimingStats> {
        self.maps[category.index()].get(&id)
    }

    /// Key-sorted iterator over the non-empty accumulators of one category.
    ///
    /// Fresh on every call; never mutates state.
    pub fn non_empty(&self, category: Category) -> impl Iterator<Item = (OpId, &TimingStats)> {
        self.maps[category.index()]
            .iter()
            .filter(|(_, stats)| !stats.is_empty())
            .map(|(id, stats)| (*id, stats))
    }

    /// Number of accumulators held for one category
    pub fn len(&self, category: Category) -> usize {
        self.maps[category.index()].len()
    }

    /// True iff no category holds any accumulator
    pub fn is_empty(&self) -> bool {
        self.maps.iter().all(|m| m.is_empty())
    }

    /// Remove every accumulator of one category
    pub fn clear(&mut self, category: Category) {
        self.maps[category.index()].clear();
    }

    /// Remove every accumulator of every category
    pub fn clear_all(&mut self) {
        for map in &mut self.maps {
            map.clear();
        }
    }
}
