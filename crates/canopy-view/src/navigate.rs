//! Position and span best-match search over the mirror.

use text_size::{TextRange, TextSize};
use tracing::debug;

use crate::adapter::SyntaxCategory;
use crate::mirror::{Highlight, ItemId, MirrorTree};
use crate::sync::Origin;
use crate::SyntaxTreeView;

/// Filters and presentation flags for a navigation query.
#[derive(Clone, Copy, Debug, Default)]
pub struct NavigateOptions<'a> {
    /// Exact kind tag the match must carry, if set.
    pub kind: Option<&'a str>,
    /// Element class the match must belong to, if set.
    pub category: Option<SyntaxCategory>,
    /// Mark the match with a highlight that persists until replaced or
    /// cleared.
    pub highlight: bool,
    /// Caption shown alongside the highlight.
    pub caption: Option<&'a str>,
}

impl<'t> SyntaxTreeView<'t> {
    /// Selects the most specific item containing `position` that satisfies
    /// the filters, falling back to the closest satisfying ancestor.
    /// Returns `false` when nothing matches; that is an ordinary outcome,
    /// not an error.
    pub fn navigate_to_position(&mut self, position: TextSize, options: &NavigateOptions<'_>) -> bool {
        let Some(mirror) = self.mirror.as_mut() else { return false };
        debug!(position = u32::from(position), "navigate to position");
        let root = mirror.root;
        let matched = mirror.best_match_position(root, position, options);
        self.finish_navigation(matched, options)
    }

    /// Selects the item whose span or full span best matches `span`, with
    /// the same fallback rule as the position form.
    pub fn navigate_to_span(&mut self, span: TextRange, options: &NavigateOptions<'_>) -> bool {
        let Some(mirror) = self.mirror.as_mut() else { return false };
        debug!(span = ?span, "navigate to span");
        let root = mirror.root;
        let matched = mirror.best_match_span(root, span, options);
        self.finish_navigation(matched, options)
    }

    fn finish_navigation(&mut self, matched: Option<ItemId>, options: &NavigateOptions<'_>) -> bool {
        match matched {
            Some(id) => {
                self.reveal(id, options);
                true
            }
            None => false,
        }
    }

    /// Side effects of a successful match: collapse every sibling along the
    /// ancestor chain, expand the chain itself, select the match, and
    /// optionally highlight it.
    fn reveal(&mut self, id: ItemId, options: &NavigateOptions<'_>) {
        {
            let mirror = self.mirror.as_mut().expect("a match implies a live mirror");
            let root = mirror.root;
            mirror.deep_collapse(root);
            mirror.expand_path_to(id);
        }
        self.select_item(id, Origin::FromExternal);

        if options.highlight {
            let mirror = self.mirror.as_mut().expect("a match implies a live mirror");
            if let Some(previous) = self.highlighted.take() {
                mirror.item_mut(previous).highlight = None;
            }
            mirror.item_mut(id).highlight =
                Some(Highlight { caption: options.caption.map(str::to_owned) });
            self.highlighted = Some(id);
        }
    }
}

impl<'t> MirrorTree<'t> {
    /// Depth-first, left-to-right search; the first descendant match wins,
    /// and an item only matches itself after none of its children did.
    pub(crate) fn best_match_position(
        &mut self,
        id: ItemId,
        position: TextSize,
        options: &NavigateOptions<'_>,
    ) -> Option<ItemId> {
        if !self.item(id).full_span.contains(position) {
            return None;
        }
        // A query is never blocked by lazy loading.
        self.ensure_children(id);

        let children = self.item(id).children.clone();
        for child in children {
            if let Some(matched) = self.best_match_position(child, position, options) {
                return Some(matched);
            }
        }
        self.filters_match(id, options).then_some(id)
    }

    /// Like the position form, except an exact span or full-span equality
    /// short-circuits before any descent. Only the kind filter is consulted
    /// for the short-circuit; point queries deliberately always descend
    /// first instead.
    pub(crate) fn best_match_span(
        &mut self,
        id: ItemId,
        span: TextRange,
        options: &NavigateOptions<'_>,
    ) -> Option<ItemId> {
        let item = self.item(id);
        if !item.full_span.contains_range(span) {
            return None;
        }
        if (item.span == span || item.full_span == span)
            && options.kind.is_none_or(|kind| item.kind == kind)
        {
            return Some(id);
        }
        self.ensure_children(id);

        let children = self.item(id).children.clone();
        for child in children {
            if let Some(matched) = self.best_match_span(child, span, options) {
                return Some(matched);
            }
        }
        self.filters_match(id, options).then_some(id)
    }

    fn filters_match(&self, id: ItemId, options: &NavigateOptions<'_>) -> bool {
        let item = self.item(id);
        options.kind.is_none_or(|kind| item.kind == kind)
            && options.category.is_none_or(|category| item.category == category)
    }
}
