use askama::Template;
use axum::response::Html;

use crate::{
    error::AppError,
    models::{Article, ArticleForm, ArticleSummary},
};

/// Renders a view into an HTML body.
pub fn render<T: Template>(view: &T) -> Result<Html<String>, AppError> {
    Ok(Html(view.render()?))
}

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeView {
    pub articles: Vec<ArticleSummary>,
}

#[derive(Template)]
#[template(path = "article.html")]
pub struct ArticleView {
    pub article: Article,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginView {
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardView {
    pub articles: Vec<ArticleSummary>,
}

/// The add form. `form` carries back whatever was submitted when validation fails.
#[derive(Template)]
#[template(path = "add.html")]
pub struct AddView {
    pub form: ArticleForm,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "edit.html")]
pub struct EditView {
    pub id: String,
    pub form: ArticleForm,
    pub error: Option<String>,
}
