use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use tracing::{error, warn};

use super::{NoticeQuery, SearchForm};
use crate::error::StoreError;
use crate::forms::{ArtistForm, FieldErrors, FormPairs};
use crate::metrics::{self, MetricName};
use crate::web::notice::{Notice, NoticeCode};
use crate::web::state::AppState;
use crate::web::templates::{ArtistDetailTemplate, ArtistFormTemplate, ArtistsTemplate, HomeTemplate, SearchTemplate};
use crate::web::{not_found_page, parse_path_id, render, PageError};

pub async fn list(State(state): State<AppState>) -> Result<Response, PageError> {
    let artists = state.storage.list_artists().await?;
    Ok(render(StatusCode::OK, ArtistsTemplate { artists }))
}

pub async fn search(
    State(state): State<AppState>,
    Form(form): Form<SearchForm>,
) -> Result<Response, PageError> {
    let results = state.storage.search_artists(&form.search_term).await?;
    Ok(render(
        StatusCode::OK,
        SearchTemplate {
            kind: "artists",
            search_term: form.search_term,
            results,
        },
    ))
}

pub async fn detail(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Query(query): Query<NoticeQuery>,
) -> Result<Response, PageError> {
    let artist_id = parse_path_id(&raw_id)?;
    let detail = state
        .storage
        .artist_detail(artist_id, state.clock.now())
        .await?
        .ok_or(PageError::NotFound)?;
    Ok(render(
        StatusCode::OK,
        ArtistDetailTemplate {
            artist: detail.artist,
            shows: detail.shows,
            notice: NoticeCode::from_query(query.notice.as_deref(), "Artist"),
        },
    ))
}

pub async fn create_form() -> Response {
    render(
        StatusCode::OK,
        ArtistFormTemplate::create(ArtistForm::default(), FieldErrors::default()),
    )
}

pub async fn create_submission(
    State(state): State<AppState>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Response {
    let form = ArtistForm::from_pairs(&FormPairs::from(pairs));
    let new_artist = match form.validate() {
        Ok(artist) => artist,
        Err(errors) => {
            warn!("Rejected artist submission: {}", errors.summary());
            metrics::record(MetricName::ValidationRejects, "artist", "create");
            return render(
                StatusCode::UNPROCESSABLE_ENTITY,
                ArtistFormTemplate::create(form, errors),
            );
        }
    };

    let name = new_artist.name.clone();
    let notice = match state.storage.create_artist(new_artist).await {
        Ok(artist) => {
            metrics::record(MetricName::EntityWrites, "artist", "create");
            Notice::success(format!("Artist {} was successfully listed!", artist.name))
        }
        Err(e) => {
            error!("Failed to create artist '{}': {}", name, e);
            metrics::record(MetricName::EntityWriteFailures, "artist", "create");
            Notice::error(format!("An error occurred. Artist {name} could not be listed."))
        }
    };
    render(StatusCode::OK, HomeTemplate { notice: Some(notice) })
}

pub async fn edit_form(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Response, PageError> {
    let artist_id = parse_path_id(&raw_id)?;
    let artist = state
        .storage
        .get_artist(artist_id)
        .await?
        .ok_or(PageError::NotFound)?;
    Ok(render(
        StatusCode::OK,
        ArtistFormTemplate::edit(artist_id, ArtistForm::from(&artist), FieldErrors::default()),
    ))
}

pub async fn edit_submission(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Response {
    let artist_id = match parse_path_id(&raw_id) {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };
    let form = ArtistForm::from_pairs(&FormPairs::from(pairs));
    let code = match form.validate() {
        Err(errors) => {
            warn!("Rejected edit of artist {}: {}", artist_id, errors.summary());
            metrics::record(MetricName::ValidationRejects, "artist", "update");
            NoticeCode::Invalid
        }
        Ok(artist) => match state.storage.update_artist(artist_id, artist).await {
            Ok(_) => {
                metrics::record(MetricName::EntityWrites, "artist", "update");
                NoticeCode::Updated
            }
            Err(StoreError::NotFound { .. }) => return not_found_page(),
            Err(e) => {
                error!("Failed to update artist {}: {}", artist_id, e);
                metrics::record(MetricName::EntityWriteFailures, "artist", "update");
                NoticeCode::UpdateFailed
            }
        },
    };
    Redirect::to(&format!("/artists/{artist_id}?notice={}", code.as_str())).into_response()
}
