//! Interactive, lazily materialized mirror of an immutable syntax tree.
//!
//! The view mirrors nodes, tokens, and attached trivia into an arena of
//! display items, expanding subtrees on demand, and keeps its selection in
//! sync with an external source-position view: inbound queries select the
//! best-matching item without echoing a notification back, while direct
//! user selections are reported outward on a channel.

mod adapter;
mod materialize;
mod mirror;
mod navigate;
mod sync;

#[cfg(test)]
mod tests;

use canopy_syntax::{Node, SyntaxElement, SyntaxTree};
use crossbeam_channel::Receiver;
use tracing::debug;

/// Element classes and trivia placement labels.
pub use adapter::{SyntaxCategory, TriviaSide};
/// Mirror item handles and per-item state.
pub use mirror::{ExpansionState, Highlight, ItemId, MirrorItem};
/// Navigation query filters.
pub use navigate::NavigateOptions;
/// Outbound notifications.
pub use sync::Event;

use mirror::MirrorTree;
use sync::Notifier;

/// The engine: owns the single mirror tree and mediates between the
/// displayed tree and the host's source view.
///
/// All operations run synchronously to completion on the calling thread.
pub struct SyntaxTreeView<'t> {
    mirror: Option<MirrorTree<'t>>,
    lazy: bool,
    exports_enabled: bool,
    highlighted: Option<ItemId>,
    notifier: Notifier<'t>,
}

impl<'t> SyntaxTreeView<'t> {
    /// Creates an empty view and the receiver for its outbound events.
    pub fn new() -> (Self, Receiver<Event<'t>>) {
        let (notifier, receiver) = Notifier::new();
        let view = Self {
            mirror: None,
            lazy: true,
            exports_enabled: false,
            highlighted: None,
            notifier,
        };
        (view, receiver)
    }

    /// Displays `tree` from its root, replacing any previous mirror.
    ///
    /// With `lazy` set, children are mirrored on first expansion; otherwise
    /// the entire tree is mirrored at once, which can block for a long time
    /// on large trees.
    pub fn display_tree(&mut self, tree: &'t SyntaxTree, lazy: bool) {
        self.display_root(Some(SyntaxElement::Node(tree.root())), lazy);
    }

    /// Displays the subtree rooted at `node`, replacing any previous mirror.
    pub fn display_node(&mut self, node: &'t Node, lazy: bool) {
        self.display_root(Some(SyntaxElement::Node(node)), lazy);
    }

    /// Displays an arbitrary element as the root. An absent element is a
    /// no-op, not a failure; the previous mirror stays.
    pub fn display_root(&mut self, root: Option<SyntaxElement<'t>>, lazy: bool) {
        let Some(root) = root else { return };
        debug!(kind = root.kind().as_str(), lazy, "display tree");
        self.highlighted = None;
        self.mirror = Some(MirrorTree::build(root, lazy));
        self.lazy = lazy;
    }

    /// Discards the mirror entirely.
    pub fn clear(&mut self) {
        self.mirror = None;
        self.highlighted = None;
    }

    /// Returns `true` while children are materialized on demand.
    pub fn is_lazy(&self) -> bool {
        self.lazy
    }

    /// Returns the root item, if a tree is displayed.
    pub fn root(&self) -> Option<ItemId> {
        self.mirror.as_ref().map(|mirror| mirror.root)
    }

    /// Returns the currently selected item, if any.
    pub fn active_item(&self) -> Option<ItemId> {
        self.mirror.as_ref().and_then(|mirror| mirror.active)
    }

    /// Returns the item for `id`, panicking if no tree is displayed.
    #[track_caller]
    pub fn item(&self, id: ItemId) -> &MirrorItem<'t> {
        match &self.mirror {
            Some(mirror) => mirror.item(id),
            None => panic!("no tree is displayed"),
        }
    }

    /// Expands `id` as a direct user action, materializing children on
    /// first expansion. Expanding an already-expanded item is a no-op.
    pub fn expand(&mut self, id: ItemId) {
        if let Some(mirror) = self.mirror.as_mut() {
            mirror.expand_item(id);
        }
    }

    /// Collapses `id` as a direct user action; children stay materialized.
    pub fn collapse(&mut self, id: ItemId) {
        if let Some(mirror) = self.mirror.as_mut() {
            mirror.collapse_item(id);
        }
    }

    /// Controls whether the export request surface is offered at all.
    pub fn set_exports_enabled(&mut self, enabled: bool) {
        self.exports_enabled = enabled;
    }

    /// Returns `true` if export requests are offered.
    pub fn exports_enabled(&self) -> bool {
        self.exports_enabled
    }

    /// Removes the navigation highlight, if one is set.
    pub fn clear_highlight(&mut self) {
        if let (Some(id), Some(mirror)) = (self.highlighted.take(), self.mirror.as_mut()) {
            mirror.item_mut(id).highlight = None;
        }
    }

    /// Returns the element's diagnostics joined into one annotation,
    /// empty when the element carries none.
    pub fn diagnostic_summary(&self, id: ItemId) -> String {
        adapter::diagnostics_of(self.item(id).element).join("\n")
    }

    /// Renders the mirror as an indented text dump, reflecting expansion,
    /// selection, and highlight state.
    pub fn render(&self) -> String {
        match &self.mirror {
            Some(mirror) => mirror.render(),
            None => String::new(),
        }
    }
}
