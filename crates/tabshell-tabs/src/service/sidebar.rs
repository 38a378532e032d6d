//! Moving Views between the tab strip and the side panel.

use tabshell_common::TabId;
use tracing::{debug, warn};

use super::{TabOptions, TabsService};

impl TabsService {
    /// Move a tab's View into the side panel, keeping its live surface.
    /// The tab itself is removed without going on the closed stack.
    pub async fn move_to_sidebar(&self, id: &TabId) -> bool {
        let Some(removed) = self.take_tab(id) else {
            warn!(tab_id = %id, "move to side panel of unknown tab");
            return false;
        };
        let view = removed.tab.view.clone();
        view.prevent_unmounting_until_next_mount();
        if !self.inner.views.open_sidebar(view.id()) {
            view.finish_relocation();
            warn!(tab_id = %id, view_id = %view.id(), "side panel rejected view");
        }
        debug!(tab_id = %id, view_id = %view.id(), "tab moved to side panel");
        self.finish_removal(removed).await;
        true
    }

    /// Move the side panel's View back into a new tab.
    pub async fn move_sidebar_to_tabs(&self, opts: TabOptions) -> Option<TabId> {
        let Some(view) = self.inner.views.sidebar_view() else {
            debug!("side panel is empty");
            return None;
        };
        view.prevent_unmounting_until_next_mount();
        self.inner.views.close_sidebar(false);
        let id = self.create_with_view(view.clone(), opts).await;
        // A background tab never mounts, so the guard is still set.
        if view.finish_relocation() {
            debug!(view_id = %view.id(), "relocated view kept hidden");
        }
        debug!(tab_id = ?id, "side panel view moved to tabs");
        id
    }
}
