//! Name resolution collaborator
//!
//! Reports decorate each row with human-readable category and operation
//! labels. Resolution lives outside the core: callers that know their plugin
//! or protocol tables implement [`NameResolver`]; everyone else gets numeric
//! fallback labels and the report still builds.

use crate::registry::{Category, OpId};

/// Resolves identifiers to display labels for report rows.
///
/// A `None` from `operation_name` falls back to a numeric identifier string;
/// absence of a resolvable name never prevents report generation.
pub trait NameResolver {
    /// Label for a category
    fn category_label(&self, category: Category) -> String {
        category.label().to_string()
    }

    /// Human-readable name for an operation, or None when unknown
    fn operation_name(&self, category: Category, id: OpId) -> Option<String>;
}

/// Resolver with no name tables; every operation gets the numeric fallback
#[derive(Debug, Default, Clone, Copy)]
pub struct NumericNames;

impl NameResolver for NumericNames {
    fn operation_name(&self, _category: Category, _id: OpId) -> Option<String> {
        None
    }
}

/// Fallback label for an unresolvable operation
pub(crate) fn fallback_label(id: OpId) -> String {
    format!("op 0x{:06x}", id.raw())
}
