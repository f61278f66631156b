//! Arena-backed mirror of the displayed syntax tree.
//!
//! Items are stored in a single flat arena and reference each other by
//! index, so parent links never form an ownership cycle. Ownership flows
//! strictly root to children; the underlying syntax elements are borrowed.

use canopy_syntax::SyntaxElement;
use text_size::TextRange;

use crate::adapter::{self, SyntaxCategory, TriviaSide};

/// Index of a mirror item inside its tree's arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ItemId(u32);

impl ItemId {
    #[inline]
    pub(crate) fn new(index: usize) -> Self {
        Self(index as u32)
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Expansion lifecycle of one mirror item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExpansionState {
    /// Childless element; nothing to expand.
    Leaf,
    /// Children exist in the syntax tree but have not been mirrored yet.
    DeferredChildren,
    /// Children are being mirrored right now.
    Materializing,
    /// Children are mirrored and visible.
    Expanded,
    /// Children are mirrored but hidden; re-expansion does no new work.
    CollapsedMaterialized,
}

/// Visual marker set by a navigation query; persists until replaced or
/// cleared.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Highlight {
    pub caption: Option<String>,
}

/// Display-side counterpart of exactly one syntax element.
pub struct MirrorItem<'t> {
    pub(crate) element: SyntaxElement<'t>,
    pub(crate) category: SyntaxCategory,
    pub(crate) kind: &'t str,
    pub(crate) span: TextRange,
    pub(crate) full_span: TextRange,
    pub(crate) parent: Option<ItemId>,
    pub(crate) children: Vec<ItemId>,
    pub(crate) state: ExpansionState,
    pub(crate) selected: bool,
    pub(crate) highlight: Option<Highlight>,
    pub(crate) trivia_side: Option<TriviaSide>,
}

impl<'t> MirrorItem<'t> {
    /// Returns the mirrored syntax element.
    #[inline]
    pub fn element(&self) -> SyntaxElement<'t> {
        self.element
    }

    /// Returns the element class this item reflects.
    #[inline]
    pub fn category(&self) -> SyntaxCategory {
        self.category
    }

    /// Returns the element's kind tag.
    #[inline]
    pub fn kind(&self) -> &'t str {
        self.kind
    }

    /// Returns the range covering significant content.
    #[inline]
    pub fn span(&self) -> TextRange {
        self.span
    }

    /// Returns the range including attached trivia.
    #[inline]
    pub fn full_span(&self) -> TextRange {
        self.full_span
    }

    /// Returns the parent item, if this is not the root.
    #[inline]
    pub fn parent(&self) -> Option<ItemId> {
        self.parent
    }

    /// Returns the materialized children, empty while deferred.
    #[inline]
    pub fn children(&self) -> &[ItemId] {
        &self.children
    }

    /// Returns the current expansion state.
    #[inline]
    pub fn state(&self) -> ExpansionState {
        self.state
    }

    /// Returns `true` if this item is the current selection.
    #[inline]
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Returns the highlight marker, if one is set.
    #[inline]
    pub fn highlight(&self) -> Option<&Highlight> {
        self.highlight.as_ref()
    }

    /// Returns which side of its token a trivia item sits on.
    #[inline]
    pub fn trivia_side(&self) -> Option<TriviaSide> {
        self.trivia_side
    }
}

/// The single live mirror; replaced wholesale on every display call.
pub(crate) struct MirrorTree<'t> {
    pub(crate) items: Vec<MirrorItem<'t>>,
    pub(crate) root: ItemId,
    pub(crate) active: Option<ItemId>,
}

impl<'t> MirrorTree<'t> {
    #[inline]
    pub(crate) fn item(&self, id: ItemId) -> &MirrorItem<'t> {
        &self.items[id.index()]
    }

    #[inline]
    pub(crate) fn item_mut(&mut self, id: ItemId) -> &mut MirrorItem<'t> {
        &mut self.items[id.index()]
    }

    /// Returns an iterator of items starting from `id` and walking parent
    /// links up to the root.
    pub(crate) fn ancestors(&self, id: ItemId) -> impl Iterator<Item = ItemId> + '_ {
        std::iter::successors(Some(id), |&id| self.item(id).parent)
    }

    /// Collapses `id` and every materialized descendant.
    pub(crate) fn deep_collapse(&mut self, id: ItemId) {
        if self.item(id).state == ExpansionState::Expanded {
            self.item_mut(id).state = ExpansionState::CollapsedMaterialized;
        }
        let children = self.item(id).children.clone();
        for child in children {
            self.deep_collapse(child);
        }
    }

    /// Renders the mirror as an indented dump reflecting the current
    /// expansion and selection state.
    pub(crate) fn render(&self) -> String {
        let mut out = String::new();
        self.render_item(self.root, 0, &mut out);
        out
    }

    fn render_item(&self, id: ItemId, depth: usize, out: &mut String) {
        let item = self.item(id);
        for _ in 0..depth {
            out.push_str("  ");
        }
        match item.trivia_side {
            Some(TriviaSide::Leading) => out.push_str("Lead: "),
            Some(TriviaSide::Trailing) => out.push_str("Trail: "),
            None => {}
        }
        out.push_str(&format!("{}@{:?}", item.kind, item.span));
        if adapter::contains_diagnostics(item.element) {
            out.push_str(" [diagnostics]");
        }
        if item.selected {
            out.push_str(" [selected]");
        }
        match &item.highlight {
            Some(Highlight { caption: Some(caption) }) => {
                out.push_str(&format!(" [highlight: {caption}]"));
            }
            Some(Highlight { caption: None }) => out.push_str(" [highlight]"),
            None => {}
        }
        match item.state {
            ExpansionState::DeferredChildren => out.push_str(" ..."),
            ExpansionState::CollapsedMaterialized => out.push_str(" [collapsed]"),
            _ => {}
        }
        out.push('\n');

        if item.state == ExpansionState::Expanded {
            for &child in &item.children {
                self.render_item(child, depth + 1, out);
            }
        }
    }
}
