use askama::Template;

use crate::domain::{AreaGroup, Artist, EntitySummary, PartitionedShows, SearchResults, ShowListing, Venue};
use crate::forms::{ArtistForm, FieldErrors, ShowForm, VenueForm, GENRE_CHOICES, STATE_CHOICES};
use crate::web::notice::Notice;

/// Select option with its pre-selected flag.
pub struct Choice {
    pub value: &'static str,
    pub selected: bool,
}

fn choices(all: &[&'static str], selected: &[String]) -> Vec<Choice> {
    all.iter()
        .map(|&value| Choice {
            value,
            selected: selected.iter().any(|s| s == value),
        })
        .collect()
}

#[derive(Template)]
#[template(path = "pages/home.html")]
pub struct HomeTemplate {
    pub notice: Option<Notice>,
}

#[derive(Template)]
#[template(path = "pages/venues.html")]
pub struct VenuesTemplate {
    pub areas: Vec<AreaGroup>,
    pub notice: Option<Notice>,
}

#[derive(Template)]
#[template(path = "pages/artists.html")]
pub struct ArtistsTemplate {
    pub artists: Vec<EntitySummary>,
}

/// Search results for either venues or artists; `kind` is the path prefix.
#[derive(Template)]
#[template(path = "pages/search.html")]
pub struct SearchTemplate {
    pub kind: &'static str,
    pub search_term: String,
    pub results: SearchResults,
}

#[derive(Template)]
#[template(path = "pages/show_venue.html")]
pub struct VenueDetailTemplate {
    pub venue: Venue,
    pub shows: PartitionedShows,
    pub notice: Option<Notice>,
}

#[derive(Template)]
#[template(path = "pages/show_artist.html")]
pub struct ArtistDetailTemplate {
    pub artist: Artist,
    pub shows: PartitionedShows,
    pub notice: Option<Notice>,
}

#[derive(Template)]
#[template(path = "pages/shows.html")]
pub struct ShowsTemplate {
    pub shows: Vec<ShowListing>,
}

#[derive(Template)]
#[template(path = "forms/venue.html")]
pub struct VenueFormTemplate {
    pub heading: String,
    pub action: String,
    pub form: VenueForm,
    pub errors: FieldErrors,
    pub state_options: Vec<Choice>,
    pub genre_options: Vec<Choice>,
}

impl VenueFormTemplate {
    pub fn create(form: VenueForm, errors: FieldErrors) -> Self {
        Self::build("List a new venue".to_string(), "/venues/create".to_string(), form, errors)
    }

    pub fn edit(venue_id: i64, form: VenueForm, errors: FieldErrors) -> Self {
        Self::build(
            format!("Edit venue {}", form.name),
            format!("/venues/{venue_id}/edit"),
            form,
            errors,
        )
    }

    fn build(heading: String, action: String, form: VenueForm, errors: FieldErrors) -> Self {
        let state_options = choices(STATE_CHOICES, std::slice::from_ref(&form.state));
        let genre_options = choices(GENRE_CHOICES, &form.genres);
        Self {
            heading,
            action,
            form,
            errors,
            state_options,
            genre_options,
        }
    }
}

#[derive(Template)]
#[template(path = "forms/artist.html")]
pub struct ArtistFormTemplate {
    pub heading: String,
    pub action: String,
    pub form: ArtistForm,
    pub errors: FieldErrors,
    pub state_options: Vec<Choice>,
    pub genre_options: Vec<Choice>,
}

impl ArtistFormTemplate {
    pub fn create(form: ArtistForm, errors: FieldErrors) -> Self {
        Self::build("List a new artist".to_string(), "/artists/create".to_string(), form, errors)
    }

    pub fn edit(artist_id: i64, form: ArtistForm, errors: FieldErrors) -> Self {
        Self::build(
            format!("Edit artist {}", form.name),
            format!("/artists/{artist_id}/edit"),
            form,
            errors,
        )
    }

    fn build(heading: String, action: String, form: ArtistForm, errors: FieldErrors) -> Self {
        let state_options = choices(STATE_CHOICES, std::slice::from_ref(&form.state));
        let genre_options = choices(GENRE_CHOICES, &form.genres);
        Self {
            heading,
            action,
            form,
            errors,
            state_options,
            genre_options,
        }
    }
}

#[derive(Template)]
#[template(path = "forms/show.html")]
pub struct ShowFormTemplate {
    pub form: ShowForm,
    pub errors: FieldErrors,
}

#[derive(Template)]
#[template(path = "errors/error.html")]
pub struct ErrorTemplate {
    pub status_code: u16,
    pub title: &'static str,
    pub message: String,
}

mod filters {
    use chrono::NaiveDateTime;

    use crate::domain::TIMESTAMP_FORMAT;

    /// `{{ t|datetime("full") }}` / `{{ t|datetime("medium") }}`. Anything
    /// that does not parse as a stored timestamp is printed unchanged.
    pub fn datetime<T: std::fmt::Display>(value: T, style: &str) -> ::askama::Result<String> {
        let raw = value.to_string();
        let Ok(parsed) = NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT) else {
            return Ok(raw);
        };
        let pattern = match style {
            "full" => "%A %B %-d, %Y at %-I:%M%p",
            _ => "%a %m, %d, %Y %-I:%M%p",
        };
        Ok(parsed.format(pattern).to_string())
    }

}
