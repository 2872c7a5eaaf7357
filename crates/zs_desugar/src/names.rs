//! Collision-free synthetic identifiers and labels.

use rustc_hash::FxHashSet;
use swc_common::DUMMY_SP;
use swc_ecma_ast as ast;

use crate::scope::ScopeTracker;

/// Hands out fresh names for one compilation unit.
///
/// Identifiers and labels share one reserved set: every name that occurs in
/// the input (binding, reference or label) plus everything allocated so far.
/// A hint is used as-is when free, otherwise `hint1`, `hint2`, ... is tried.
#[derive(Debug, Default)]
pub struct NameAllocator {
    taken: FxHashSet<String>,
    synthetic: FxHashSet<String>,
    synthetic_labels: FxHashSet<String>,
}

impl NameAllocator {
    pub fn new(tracker: &ScopeTracker) -> Self {
        Self {
            taken: tracker.taken_names().map(str::to_string).collect(),
            ..Default::default()
        }
    }

    /// Allocate a fresh identifier.
    pub fn fresh_name(&mut self, hint: &str) -> ast::Ident {
        let name = self.allocate(hint);
        ast::Ident::new_no_ctxt(name.into(), DUMMY_SP)
    }

    /// Allocate a fresh statement label. The label is remembered so later
    /// passes can recognise a body wrapper an earlier pass produced.
    pub fn fresh_label(&mut self, hint: &str) -> ast::Ident {
        let name = self.allocate(hint);
        self.synthetic_labels.insert(name.clone());
        ast::Ident::new_no_ctxt(name.into(), DUMMY_SP)
    }

    /// Whether `name` was produced by this allocator (identifier or label).
    pub fn is_synthetic(&self, name: &str) -> bool {
        self.synthetic.contains(name)
    }

    pub fn is_synthetic_label(&self, name: &str) -> bool {
        self.synthetic_labels.contains(name)
    }

    fn allocate(&mut self, hint: &str) -> String {
        let name = if self.taken.contains(hint) {
            (1u32..)
                .map(|n| format!("{hint}{n}"))
                .find(|candidate| !self.taken.contains(candidate))
                .unwrap_or_else(|| hint.to_string())
        } else {
            hint.to_string()
        };
        self.taken.insert(name.clone());
        self.synthetic.insert(name.clone());
        tracing::trace!(%name, hint, "allocated synthetic name");
        name
    }
}
