//! Site settings singletons: hero section and footer.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use tracing::instrument;

use atelier_core::{FieldErrors, FooterSettings, HeroSection};
use atelier_store::{SiteSetting, paths};

use crate::error::{AppError, Result};
use crate::middleware::{RequireAdmin, RequireWriter};
use crate::state::AppState;

async fn read<T: DeserializeOwned>(state: &AppState, setting: SiteSetting) -> Result<Json<T>> {
    state
        .store()
        .get(&paths::site_setting(setting)?)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("{setting:?} settings")))
}

async fn write<T: Serialize + Sync>(
    state: &AppState,
    setting: SiteSetting,
    value: &T,
) -> Result<()> {
    state
        .store()
        .put(&paths::site_setting(setting)?, value)
        .await?;
    tracing::info!(?setting, "Site settings saved");
    Ok(())
}

async fn remove(state: &AppState, setting: SiteSetting) -> Result<StatusCode> {
    state
        .store()
        .delete(&paths::site_setting(setting)?)
        .await?;
    tracing::info!(?setting, "Site settings deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /settings/hero`
#[instrument(skip_all)]
pub async fn hero(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<HeroSection>> {
    read(&state, SiteSetting::Hero).await
}

/// `PUT /settings/hero`
#[instrument(skip_all)]
pub async fn put_hero(
    State(state): State<AppState>,
    RequireWriter(_): RequireWriter,
    Json(hero): Json<HeroSection>,
) -> Result<Json<HeroSection>> {
    let mut errors = FieldErrors::new();
    errors.check(hero.title.trim().is_empty(), "title", "Title is required");
    errors.into_result(())?;

    write(&state, SiteSetting::Hero, &hero).await?;
    Ok(Json(hero))
}

/// `DELETE /settings/hero`
#[instrument(skip_all)]
pub async fn delete_hero(
    State(state): State<AppState>,
    RequireWriter(_): RequireWriter,
) -> Result<StatusCode> {
    remove(&state, SiteSetting::Hero).await
}

/// `GET /settings/footer`
#[instrument(skip_all)]
pub async fn footer(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<FooterSettings>> {
    read(&state, SiteSetting::Footer).await
}

/// `PUT /settings/footer`
#[instrument(skip_all)]
pub async fn put_footer(
    State(state): State<AppState>,
    RequireWriter(_): RequireWriter,
    Json(footer): Json<FooterSettings>,
) -> Result<Json<FooterSettings>> {
    write(&state, SiteSetting::Footer, &footer).await?;
    Ok(Json(footer))
}

/// `DELETE /settings/footer`
#[instrument(skip_all)]
pub async fn delete_footer(
    State(state): State<AppState>,
    RequireWriter(_): RequireWriter,
) -> Result<StatusCode> {
    remove(&state, SiteSetting::Footer).await
}
