use askama::Template;
use uuid::Uuid;

use crate::application::notice::Notice;

const DEFAULT_TOAST_TTL_MS: u64 = 6000;

#[derive(Clone)]
pub struct AdminToastItem {
    pub id: String,
    pub kind: &'static str,
    pub text: String,
    pub ttl_ms: u64,
}

impl AdminToastItem {
    pub fn from_notice(notice: &Notice) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind: notice.kind.as_str(),
            text: notice.text.clone(),
            ttl_ms: DEFAULT_TOAST_TTL_MS,
        }
    }
}

#[derive(Template)]
#[template(path = "admin/toast_stack.html")]
pub struct AdminToastStackTemplate {
    pub toasts: Vec<AdminToastItem>,
}
