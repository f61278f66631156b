//! Origin-tagged selection reporting.
//!
//! Every selection-causing path carries an explicit origin instead of
//! flipping ambient guard flags; the notifier decides suppression from the
//! tag alone, so nothing needs to be cleared on exit paths.

use canopy_syntax::SyntaxElement;
use crossbeam_channel::{Receiver, Sender, unbounded};
use tracing::debug;

use crate::adapter::SyntaxCategory;
use crate::mirror::ItemId;
use crate::SyntaxTreeView;

/// Who caused a selection: an inbound source-position query, or the user
/// acting directly on the displayed tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Origin {
    FromExternal,
    FromInternal,
}

/// Outbound notification delivered to the host.
#[derive(Clone, Copy, Debug)]
pub enum Event<'t> {
    /// A user-selected element should be revealed in the source view.
    /// Never fired for selections caused by an inbound navigation query.
    SelectedForNavigation { category: SyntaxCategory, element: SyntaxElement<'t> },
    /// The user asked to export the selected element to the graph tool.
    ExportRequested { category: SyntaxCategory, element: SyntaxElement<'t> },
}

pub(crate) struct Notifier<'t> {
    sender: Sender<Event<'t>>,
}

impl<'t> Notifier<'t> {
    pub(crate) fn new() -> (Self, Receiver<Event<'t>>) {
        let (sender, receiver) = unbounded();
        (Self { sender }, receiver)
    }

    /// Reports a selection. An externally-driven selection is suppressed:
    /// reporting it back to the side that asked for it would loop.
    pub(crate) fn selection(&self, origin: Origin, category: SyntaxCategory, element: SyntaxElement<'t>) {
        if origin == Origin::FromExternal {
            return;
        }
        debug!(?category, "selected for source navigation");
        // A host that dropped its receiver opted out of notifications.
        let _ = self.sender.send(Event::SelectedForNavigation { category, element });
    }

    pub(crate) fn export(&self, category: SyntaxCategory, element: SyntaxElement<'t>) {
        debug!(?category, "export requested");
        let _ = self.sender.send(Event::ExportRequested { category, element });
    }
}

impl<'t> SyntaxTreeView<'t> {
    /// Selects `id` as a direct user action on the displayed tree, reporting
    /// the selection outward.
    pub fn select(&mut self, id: ItemId) {
        self.select_item(id, Origin::FromInternal);
    }

    pub(crate) fn select_item(&mut self, id: ItemId, origin: Origin) {
        let Some(mirror) = self.mirror.as_mut() else { return };
        if let Some(previous) = mirror.active {
            mirror.item_mut(previous).selected = false;
        }
        mirror.item_mut(id).selected = true;
        mirror.active = Some(id);
        // Selecting an item also reveals its children.
        mirror.expand_item(id);

        let item = mirror.item(id);
        let (category, element) = (item.category, item.element);
        self.notifier.selection(origin, category, element);
    }

    /// Fires an export request for the currently selected item. Returns
    /// `false` when exports are disabled or nothing is selected.
    pub fn request_export(&mut self) -> bool {
        if !self.exports_enabled {
            return false;
        }
        let Some(mirror) = self.mirror.as_ref() else { return false };
        let Some(active) = mirror.active else { return false };

        let item = mirror.item(active);
        self.notifier.export(item.category, item.element);
        true
    }
}
