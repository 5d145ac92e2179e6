//! Console display adapter.
//!
//! Implements [`DisplayPort`] by printing each page as one log line.  Used
//! on boards without a panel and on the host.  A panel driver implements
//! the same trait and owns fonts and the wire protocol.

use log::info;

use crate::app::ports::DisplayPort;
use crate::display::{Page, PageView};
use crate::snapshot::Snapshot;

#[derive(Default)]
pub struct LogDisplay {
    renders: u32,
    last_page: Option<Page>,
}

impl LogDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn renders(&self) -> u32 {
        self.renders
    }

    pub fn last_page(&self) -> Option<Page> {
        self.last_page
    }
}

impl DisplayPort for LogDisplay {
    fn render(&mut self, view: &PageView, snapshot: &Snapshot) {
        self.renders = self.renders.wrapping_add(1);
        self.last_page = Some(view.page);
        info!(
            "PANEL{} | {}: {} {} | updated t={}",
            if view.inverted { "*" } else { "" },
            view.title,
            view.value,
            view.unit,
            snapshot.last_update,
        );
    }
}
