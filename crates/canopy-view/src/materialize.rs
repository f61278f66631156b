//! Lazy mirroring of syntax elements into the arena.

use canopy_syntax::SyntaxElement;
use tracing::trace;

use crate::adapter::{self, SyntaxCategory, TriviaSide};
use crate::mirror::{ExpansionState, ItemId, MirrorItem, MirrorTree};

impl<'t> MirrorTree<'t> {
    /// Mirrors `root` into a fresh arena. The caller replaces its previous
    /// mirror wholesale, which is what discards the old tree.
    pub(crate) fn build(root: SyntaxElement<'t>, lazy: bool) -> Self {
        let mut tree = Self { items: Vec::new(), root: ItemId::new(0), active: None };
        let root_id = tree.materialize(root, None, None, lazy);
        tree.root = root_id;
        tree
    }

    /// Creates one mirror item reflecting `element`.
    ///
    /// In lazy mode an element with children is tagged `DeferredChildren`
    /// and mirrored no further; otherwise every descendant is materialized
    /// immediately. Eager mode performs unbounded synchronous work on large
    /// trees; that trade-off belongs to the caller.
    fn materialize(
        &mut self,
        element: SyntaxElement<'t>,
        parent: Option<ItemId>,
        trivia_side: Option<TriviaSide>,
        lazy: bool,
    ) -> ItemId {
        let has_children = adapter::has_children(element);
        let state = match (has_children, lazy) {
            (false, _) => ExpansionState::Leaf,
            (true, true) => ExpansionState::DeferredChildren,
            (true, false) => ExpansionState::Materializing,
        };

        let id = ItemId::new(self.items.len());
        self.items.push(MirrorItem {
            element,
            category: adapter::category_of(element),
            kind: adapter::kind_of(element),
            span: adapter::span_of(element),
            full_span: adapter::full_span_of(element),
            parent,
            children: Vec::new(),
            state,
            selected: false,
            highlight: None,
            trivia_side,
        });
        if let Some(parent) = parent {
            self.item_mut(parent).children.push(id);
        }

        if state == ExpansionState::Materializing {
            self.populate(id, false);
            self.item_mut(id).state = ExpansionState::Expanded;
        }
        id
    }

    fn populate(&mut self, id: ItemId, lazy: bool) {
        let element = self.item(id).element;
        for (child, side) in adapter::child_elements(element) {
            self.materialize(child, Some(id), side, lazy);
        }
        if cfg!(debug_assertions) {
            self.assert_child_coverage(id);
        }
    }

    /// Resolves the deferred-children marker for `id`, at most once per
    /// item. Children become available but their visibility is left to the
    /// expansion state set here.
    pub(crate) fn ensure_children(&mut self, id: ItemId) {
        match self.item(id).state {
            ExpansionState::DeferredChildren => {
                trace!(item = id.index(), "materializing deferred children");
                self.item_mut(id).state = ExpansionState::Materializing;
                self.populate(id, true);
                self.item_mut(id).state = ExpansionState::Expanded;
            }
            ExpansionState::Materializing => {
                debug_assert!(false, "re-entrant materialization of a mirror item");
            }
            ExpansionState::Leaf
            | ExpansionState::Expanded
            | ExpansionState::CollapsedMaterialized => {}
        }
    }

    /// Makes `id`'s children visible, materializing them on first expansion.
    pub(crate) fn expand_item(&mut self, id: ItemId) {
        match self.item(id).state {
            ExpansionState::DeferredChildren => self.ensure_children(id),
            ExpansionState::CollapsedMaterialized => {
                self.item_mut(id).state = ExpansionState::Expanded;
            }
            ExpansionState::Leaf | ExpansionState::Expanded | ExpansionState::Materializing => {}
        }
    }

    /// Hides `id`'s children; they stay materialized.
    pub(crate) fn collapse_item(&mut self, id: ItemId) {
        if self.item(id).state == ExpansionState::Expanded {
            self.item_mut(id).state = ExpansionState::CollapsedMaterialized;
        }
    }

    /// Expands every item from the root down to and including `id`.
    pub(crate) fn expand_path_to(&mut self, id: ItemId) {
        let chain: Vec<_> = self.ancestors(id).collect();
        for ancestor in chain.into_iter().rev() {
            self.expand_item(ancestor);
        }
    }

    /// Trusted-input check: a parent's materialized children must tile its
    /// full span. Malformed producer spans are a bug upstream, never
    /// silently repaired here.
    fn assert_child_coverage(&self, id: ItemId) {
        let item = self.item(id);
        match item.category {
            SyntaxCategory::Node => {
                let mut position = item.full_span.start();
                for &child in &item.children {
                    let child_span = self.item(child).full_span;
                    debug_assert_eq!(
                        child_span.start(),
                        position,
                        "child full spans must tile the parent's full span"
                    );
                    position = child_span.end();
                }
                debug_assert_eq!(
                    position,
                    item.full_span.end(),
                    "child full spans must tile the parent's full span"
                );
            }
            SyntaxCategory::Token => {
                let mut position = item.full_span.start();
                for &child in &item.children {
                    let child = self.item(child);
                    if child.trivia_side == Some(TriviaSide::Trailing)
                        && position == item.span.start()
                    {
                        // The token's own text sits between the two runs.
                        position = item.span.end();
                    }
                    debug_assert_eq!(
                        child.full_span.start(),
                        position,
                        "trivia must tile the token's full span around its text"
                    );
                    position = child.full_span.end();
                }
                if position == item.span.start() {
                    position = item.span.end();
                }
                debug_assert_eq!(
                    position,
                    item.full_span.end(),
                    "trivia must tile the token's full span around its text"
                );
            }
            SyntaxCategory::Trivia => {
                for &child in &item.children {
                    debug_assert_eq!(
                        self.item(child).full_span,
                        item.span,
                        "a structured subtree must cover its trivia exactly"
                    );
                }
            }
        }
    }
}
