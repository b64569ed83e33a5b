pub mod artists;
pub mod pages;
pub mod shows;
pub mod venues;

use serde::Deserialize;

/// Body of the venue/artist search forms.
#[derive(Debug, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub search_term: String,
}

/// `?notice=<code>` on detail and listing pages.
#[derive(Debug, Default, Deserialize)]
pub struct NoticeQuery {
    pub notice: Option<String>,
}
