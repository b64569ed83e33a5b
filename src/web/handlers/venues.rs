use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use tracing::{error, info, warn};

use super::{NoticeQuery, SearchForm};
use crate::error::StoreError;
use crate::forms::{FieldErrors, FormPairs, VenueForm};
use crate::metrics::{self, MetricName};
use crate::web::notice::{Notice, NoticeCode};
use crate::web::state::AppState;
use crate::web::templates::{HomeTemplate, SearchTemplate, VenueDetailTemplate, VenueFormTemplate, VenuesTemplate};
use crate::web::{not_found_page, parse_path_id, render, server_error_page, PageError};

/// Venues grouped by city and state.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<NoticeQuery>,
) -> Result<Response, PageError> {
    let areas = state.storage.list_venue_areas().await?;
    let notice = NoticeCode::from_query(query.notice.as_deref(), "Venue");
    Ok(render(StatusCode::OK, VenuesTemplate { areas, notice }))
}

pub async fn search(
    State(state): State<AppState>,
    Form(form): Form<SearchForm>,
) -> Result<Response, PageError> {
    let results = state.storage.search_venues(&form.search_term).await?;
    Ok(render(
        StatusCode::OK,
        SearchTemplate {
            kind: "venues",
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
    let venue_id = parse_path_id(&raw_id)?;
    let detail = state
        .storage
        .venue_detail(venue_id, state.clock.now())
        .await?
        .ok_or(PageError::NotFound)?;
    Ok(render(
        StatusCode::OK,
        VenueDetailTemplate {
            venue: detail.venue,
            shows: detail.shows,
            notice: NoticeCode::from_query(query.notice.as_deref(), "Venue"),
        },
    ))
}

pub async fn create_form() -> Response {
    render(
        StatusCode::OK,
        VenueFormTemplate::create(VenueForm::default(), FieldErrors::default()),
    )
}

pub async fn create_submission(
    State(state): State<AppState>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Response {
    let form = VenueForm::from_pairs(&FormPairs::from(pairs));
    let new_venue = match form.validate() {
        Ok(venue) => venue,
        Err(errors) => {
            warn!("Rejected venue submission: {}", errors.summary());
            metrics::record(MetricName::ValidationRejects, "venue", "create");
            return render(
                StatusCode::UNPROCESSABLE_ENTITY,
                VenueFormTemplate::create(form, errors),
            );
        }
    };

    let name = new_venue.name.clone();
    let notice = match state.storage.create_venue(new_venue).await {
        Ok(venue) => {
            metrics::record(MetricName::EntityWrites, "venue", "create");
            Notice::success(format!("Venue {} was successfully listed!", venue.name))
        }
        Err(e) => {
            error!("Failed to create venue '{}': {}", name, e);
            metrics::record(MetricName::EntityWriteFailures, "venue", "create");
            Notice::error(format!("An error occurred. Venue {name} could not be listed."))
        }
    };
    render(StatusCode::OK, HomeTemplate { notice: Some(notice) })
}

pub async fn edit_form(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Response, PageError> {
    let venue_id = parse_path_id(&raw_id)?;
    let venue = state
        .storage
        .get_venue(venue_id)
        .await?
        .ok_or(PageError::NotFound)?;
    Ok(render(
        StatusCode::OK,
        VenueFormTemplate::edit(venue_id, VenueForm::from(&venue), FieldErrors::default()),
    ))
}

/// Full overwrite of a venue. Always ends in a redirect to the detail page
/// except for unknown ids, which get the 404 page.
pub async fn edit_submission(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Response {
    let venue_id = match parse_path_id(&raw_id) {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };
    let form = VenueForm::from_pairs(&FormPairs::from(pairs));
    let code = match form.validate() {
        Err(errors) => {
            warn!("Rejected edit of venue {}: {}", venue_id, errors.summary());
            metrics::record(MetricName::ValidationRejects, "venue", "update");
            NoticeCode::Invalid
        }
        Ok(venue) => match state.storage.update_venue(venue_id, venue).await {
            Ok(_) => {
                metrics::record(MetricName::EntityWrites, "venue", "update");
                NoticeCode::Updated
            }
            Err(StoreError::NotFound { .. }) => return not_found_page(),
            Err(e) => {
                error!("Failed to update venue {}: {}", venue_id, e);
                metrics::record(MetricName::EntityWriteFailures, "venue", "update");
                NoticeCode::UpdateFailed
            }
        },
    };
    Redirect::to(&format!("/venues/{venue_id}?notice={}", code.as_str())).into_response()
}

pub async fn delete(State(state): State<AppState>, Path(raw_id): Path<String>) -> Response {
    let venue_id = match parse_path_id(&raw_id) {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };
    match state.storage.delete_venue(venue_id, state.delete_policy).await {
        Ok(()) => {
            info!("Venue {} deleted ({:?} policy)", venue_id, state.delete_policy);
            metrics::record(MetricName::EntityWrites, "venue", "delete");
            Redirect::to(&format!("/venues?notice={}", NoticeCode::Deleted.as_str())).into_response()
        }
        Err(StoreError::NotFound { .. }) => not_found_page(),
        Err(e @ StoreError::HasShows { .. }) => {
            warn!("Refused to delete venue {}: {}", venue_id, e);
            metrics::record(MetricName::EntityWriteFailures, "venue", "delete");
            (
                StatusCode::CONFLICT,
                format!("Venue {venue_id} still has shows and cannot be deleted."),
            )
                .into_response()
        }
        Err(e) => {
            error!("Failed to delete venue {}: {}", venue_id, e);
            metrics::record(MetricName::EntityWriteFailures, "venue", "delete");
            server_error_page()
        }
    }
}
