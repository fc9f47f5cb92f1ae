use std::sync::Arc;

use crate::application::board::{PostsApi, TokenIssuer};
use crate::application::panel::PanelRegistry;
use crate::application::session::PageSizes;
use crate::config::{PanelSettings, SessionSettings};

#[derive(Clone)]
pub struct AdminState {
    pub posts: Arc<dyn PostsApi>,
    pub issuer: Arc<dyn TokenIssuer>,
    pub panels: PanelRegistry,
    pub session: Arc<SessionSettings>,
    pub panel: PanelSettings,
}

impl AdminState {
    pub fn page_sizes(&self) -> PageSizes {
        PageSizes {
            initial: self.panel.initial_page_size.get(),
            subsequent: self.panel.page_size.get(),
        }
    }
}
