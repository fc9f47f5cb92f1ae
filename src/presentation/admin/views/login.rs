use askama::Template;

use super::AdminLayout;

#[derive(Clone)]
pub struct NoticeView {
    pub kind: &'static str,
    pub text: String,
}

#[derive(Clone)]
pub struct AdminLoginView {
    pub action: &'static str,
    pub notice: Option<NoticeView>,
}

#[derive(Template)]
#[template(path = "admin/login.html")]
pub struct AdminLoginTemplate {
    pub view: AdminLayout<AdminLoginView>,
}
