use axum::{extract::State, http::StatusCode, response::Response, Form};
use tracing::{error, warn};

use crate::error::StoreError;
use crate::forms::{FieldError, FieldErrors, FormPairs, ShowForm};
use crate::metrics::{self, MetricName};
use crate::web::notice::Notice;
use crate::web::state::AppState;
use crate::web::templates::{HomeTemplate, ShowFormTemplate, ShowsTemplate};
use crate::web::{render, PageError};

/// Every show, earliest first.
pub async fn list(State(state): State<AppState>) -> Result<Response, PageError> {
    let shows = state.storage.list_shows().await?;
    Ok(render(StatusCode::OK, ShowsTemplate { shows }))
}

pub async fn create_form() -> Response {
    render(
        StatusCode::OK,
        ShowFormTemplate {
            form: ShowForm::default(),
            errors: FieldErrors::default(),
        },
    )
}

pub async fn create_submission(
    State(state): State<AppState>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Response {
    let form = ShowForm::from_pairs(&FormPairs::from(pairs));
    let new_show = match form.validate() {
        Ok(show) => show,
        Err(errors) => {
            warn!("Rejected show submission: {}", errors.summary());
            metrics::record(MetricName::ValidationRejects, "show", "create");
            return render(StatusCode::UNPROCESSABLE_ENTITY, ShowFormTemplate { form, errors });
        }
    };

    let notice = match state.storage.create_show(new_show).await {
        Ok(_) => {
            metrics::record(MetricName::EntityWrites, "show", "create");
            Notice::success("Show was successfully listed!")
        }
        Err(StoreError::MissingReference { entity, id }) => {
            warn!("Rejected show: {} {} does not exist", entity, id);
            metrics::record(MetricName::ValidationRejects, "show", "create");
            let field = if entity == "artist" { "artist_id" } else { "venue_id" };
            let errors = FieldErrors(vec![FieldError {
                field,
                message: format!("No {entity} with id {id}."),
            }]);
            return render(StatusCode::UNPROCESSABLE_ENTITY, ShowFormTemplate { form, errors });
        }
        Err(StoreError::StartTimeOutOfRange(start_time)) => {
            warn!("Rejected show: start time {} out of range", start_time);
            metrics::record(MetricName::ValidationRejects, "show", "create");
            let errors = FieldErrors(vec![FieldError {
                field: "start_time",
                message: "Start time must fall in a four-digit year.".to_string(),
            }]);
            return render(StatusCode::UNPROCESSABLE_ENTITY, ShowFormTemplate { form, errors });
        }
        Err(e) => {
            error!("Failed to create show: {}", e);
            metrics::record(MetricName::EntityWriteFailures, "show", "create");
            Notice::error("An error occurred. Show could not be listed.")
        }
    };
    render(StatusCode::OK, HomeTemplate { notice: Some(notice) })
}
