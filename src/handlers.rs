use axum::{
    Form,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    AppState,
    auth::{AdminSession, LOGIN_PATH},
    error::AppError,
    identifier::ArticleId,
    models::{ArticleForm, LoginForm},
    session::Session,
    views::{self, AddView, ArticleView, DashboardView, EditView, HomeView, LoginView},
};

/// Landing page after every successful admin action.
pub const DASHBOARD_PATH: &str = "/admin/dashboard";

/// found
///
/// A `302 Found` redirect. State-changing form posts and guard denials both answer
/// with one.
pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

/// Runs a path-supplied id through the sanitizer. A rejected id short-circuits the
/// request with a 400 before any store access.
fn parse_id(raw: &str) -> Result<ArticleId, AppError> {
    ArticleId::sanitize(raw).ok_or_else(|| {
        tracing::debug!(raw_id = raw, "rejected article id");
        AppError::InvalidIdentifier
    })
}

// --- Public Handlers ---

/// home
///
/// [Public Route] Lists every readable article, newest first.
pub async fn home(State(state): State<AppState>) -> Result<Response, AppError> {
    let articles = state.repo.list_articles().await?;
    Ok(views::render(&HomeView { articles })?.into_response())
}

/// show_article
///
/// [Public Route] Renders one article. 400 for a malformed id, 404 for a missing record,
/// 500 for a record that exists but cannot be read.
pub async fn show_article(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Response, AppError> {
    let id = parse_id(&raw_id)?;
    let article = state.repo.get_article(&id).await?;
    Ok(views::render(&ArticleView { article })?.into_response())
}

// --- Session Handlers ---

pub async fn login_form() -> Result<Response, AppError> {
    Ok(views::render(&LoginView { error: None })?.into_response())
}

/// login
///
/// On success the rotated session id is written to the cookie and the caller lands on the
/// dashboard. On failure the form is shown again with a generic error.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    match state
        .auth
        .login(session, &form.username, &form.password)
        .await
    {
        Ok(session) => {
            let jar = state.cookies.apply(jar, &session);
            Ok((jar, found(DASHBOARD_PATH)).into_response())
        }
        Err(err) => Ok(views::render(&LoginView {
            error: Some(err.to_string()),
        })?
        .into_response()),
    }
}

/// logout
///
/// Destroys the session and clears the cookie, then returns to the login page.
pub async fn logout(State(state): State<AppState>, session: Session, jar: CookieJar) -> Response {
    let session = state.auth.logout(session).await;
    let jar = state.cookies.apply(jar, &session);
    (jar, found(LOGIN_PATH)).into_response()
}

// --- Admin Handlers ---

/// dashboard
///
/// [Admin Route] The same listing as the home page, with edit and delete controls.
pub async fn dashboard(
    _admin: AdminSession,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let articles = state.repo.list_articles().await?;
    Ok(views::render(&DashboardView { articles })?.into_response())
}

pub async fn add_form(_admin: AdminSession) -> Result<Response, AppError> {
    Ok(views::render(&AddView {
        form: ArticleForm::default(),
        error: None,
    })?
    .into_response())
}

/// add_article
///
/// [Admin Route] Creates a record under a freshly generated id. A missing field
/// re-renders the form with the submitted values and writes nothing.
pub async fn add_article(
    _admin: AdminSession,
    State(state): State<AppState>,
    Form(form): Form<ArticleForm>,
) -> Result<Response, AppError> {
    let fields = match form.validate() {
        Ok(fields) => fields,
        Err(err) => {
            return Ok(views::render(&AddView {
                error: Some(err.to_string()),
                form,
            })?
            .into_response());
        }
    };

    state.repo.create_article(fields).await?;
    Ok(found(DASHBOARD_PATH))
}

/// edit_form
///
/// [Admin Route] Loads the record into the edit form.
pub async fn edit_form(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Response, AppError> {
    let id = parse_id(&raw_id)?;
    let article = state.repo.get_article(&id).await?;

    Ok(views::render(&EditView {
        id: id.to_string(),
        form: ArticleForm::from(&article),
        error: None,
    })?
    .into_response())
}

/// edit_article
///
/// [Admin Route] Replaces all three fields of an existing record.
pub async fn edit_article(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Form(form): Form<ArticleForm>,
) -> Result<Response, AppError> {
    let id = parse_id(&raw_id)?;

    let fields = match form.validate() {
        Ok(fields) => fields,
        Err(err) => {
            return Ok(views::render(&EditView {
                id: id.to_string(),
                error: Some(err.to_string()),
                form,
            })?
            .into_response());
        }
    };

    state.repo.update_article(&id, fields).await?;
    Ok(found(DASHBOARD_PATH))
}

/// delete_article
///
/// [Admin Route] Removes a record permanently. 404 if it is already gone.
pub async fn delete_article(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Response, AppError> {
    let id = parse_id(&raw_id)?;
    state.repo.delete_article(&id).await?;
    Ok(found(DASHBOARD_PATH))
}
