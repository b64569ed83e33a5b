//! Typed create/edit forms.
//!
//! Each form is built from the url-encoded body pairs (so repeated `genres`
//! keys survive) and then validated into a write model or a list of field
//! errors. Checkbox fields are true when their key is present at all.

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::domain::{start_time_in_range, Artist, NewArtist, NewShow, NewVenue, Venue};

pub const STATE_CHOICES: &[&str] = &[
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "DC", "FL", "GA", "HI", "ID", "IL", "IN", "IA",
    "KS", "KY", "LA", "ME", "MT", "MD", "MA", "MI", "MN", "MS", "MO", "NE", "NV", "NH", "NJ", "NM",
    "NY", "NC", "ND", "OH", "OK", "OR", "PA", "RI", "SC", "SD", "TN", "TX", "UT", "VT", "VA", "WA",
    "WV", "WI", "WY",
];

pub const GENRE_CHOICES: &[&str] = &[
    "Alternative",
    "Blues",
    "Classical",
    "Country",
    "Electronic",
    "Folk",
    "Funk",
    "Hip-Hop",
    "Heavy Metal",
    "Instrumental",
    "Jazz",
    "Musical Theatre",
    "Pop",
    "Punk",
    "R&B",
    "Reggae",
    "Rock n Roll",
    "Soul",
    "Other",
];

/// North American numbers: optional +1, area code, exchange and line with
/// optional separators. UK-style `+44`/`07` numbers are not accepted.
static PHONE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:\+?1[\s.-]?)?(?:\(\d{3}\)|\d{3})[\s.-]?\d{3}[\s.-]?\d{4}$")
        .expect("phone pattern is valid")
});

static URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9-]+)*(?::\d+)?(?:[/?#]\S*)?$")
        .expect("url pattern is valid")
});

const START_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors(pub Vec<FieldError>);

impl FieldErrors {
    fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// One-line summary for logs and notices.
    pub fn summary(&self) -> String {
        self.0
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Url-encoded body as ordered key/value pairs.
#[derive(Debug, Clone, Default)]
pub struct FormPairs(pub Vec<(String, String)>);

impl FormPairs {
    /// First value for `key`, trimmed; empty when absent.
    fn text(&self, key: &str) -> String {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.trim().to_string())
            .unwrap_or_default()
    }

    /// Every non-empty value for `key`, in submission order.
    fn all(&self, key: &str) -> Vec<String> {
        self.0
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .collect()
    }

    fn present(&self, key: &str) -> bool {
        self.0.iter().any(|(k, _)| k == key)
    }
}

impl From<Vec<(String, String)>> for FormPairs {
    fn from(pairs: Vec<(String, String)>) -> Self {
        Self(pairs)
    }
}

fn require(errors: &mut FieldErrors, field: &'static str, value: &str) -> bool {
    if value.is_empty() {
        errors.push(field, "This field is required.");
        false
    } else {
        true
    }
}

fn check_state(errors: &mut FieldErrors, state: &str) {
    if require(errors, "state", state) && !STATE_CHOICES.contains(&state) {
        errors.push("state", format!("'{state}' is not a valid choice."));
    }
}

fn check_genres(errors: &mut FieldErrors, genres: &[String]) {
    if genres.is_empty() {
        errors.push("genres", "Select at least one genre.");
        return;
    }
    for genre in genres {
        if !GENRE_CHOICES.contains(&genre.as_str()) {
            errors.push("genres", format!("'{genre}' is not a valid choice."));
        }
    }
}

fn check_phone(errors: &mut FieldErrors, phone: &str) {
    if require(errors, "phone", phone) && !PHONE_PATTERN.is_match(phone) {
        errors.push("phone", "Invalid phone number.");
    }
}

/// Links may be left blank; anything entered must be an http(s) URL.
fn check_optional_url(errors: &mut FieldErrors, field: &'static str, value: &str) {
    if !value.is_empty() && !URL_PATTERN.is_match(value) {
        errors.push(field, "Invalid URL.");
    }
}

/// `%Y` also takes signed years of any width (`+12345-01-01`); those are
/// refused along with anything else outside four-digit years.
pub fn parse_start_time(raw: &str) -> Option<NaiveDateTime> {
    START_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .filter(start_time_in_range)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VenueForm {
    pub name: String,
    pub city: String,
    pub state: String,
    pub address: String,
    pub phone: String,
    pub image_link: String,
    pub genres: Vec<String>,
    pub website: String,
    pub facebook_link: String,
    pub seeking_talent: bool,
    pub seeking_description: String,
}

impl VenueForm {
    pub fn from_pairs(pairs: &FormPairs) -> Self {
        Self {
            name: pairs.text("name"),
            city: pairs.text("city"),
            state: pairs.text("state"),
            address: pairs.text("address"),
            phone: pairs.text("phone"),
            image_link: pairs.text("image_link"),
            genres: pairs.all("genres"),
            website: pairs.text("website"),
            facebook_link: pairs.text("facebook_link"),
            seeking_talent: pairs.present("seeking_talent"),
            seeking_description: pairs.text("seeking_description"),
        }
    }

    pub fn validate(&self) -> Result<NewVenue, FieldErrors> {
        let mut errors = FieldErrors::default();
        require(&mut errors, "name", &self.name);
        require(&mut errors, "city", &self.city);
        check_state(&mut errors, &self.state);
        require(&mut errors, "address", &self.address);
        check_phone(&mut errors, &self.phone);
        check_optional_url(&mut errors, "image_link", &self.image_link);
        check_genres(&mut errors, &self.genres);
        check_optional_url(&mut errors, "website", &self.website);
        check_optional_url(&mut errors, "facebook_link", &self.facebook_link);

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(NewVenue {
            name: self.name.clone(),
            genres: self.genres.clone(),
            address: self.address.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            phone: self.phone.clone(),
            website: self.website.clone(),
            facebook_link: self.facebook_link.clone(),
            seeking_talent: self.seeking_talent,
            seeking_description: self.seeking_description.clone(),
            image_link: self.image_link.clone(),
        })
    }
}

impl From<&Venue> for VenueForm {
    fn from(venue: &Venue) -> Self {
        Self {
            name: venue.name.clone(),
            city: venue.city.clone(),
            state: venue.state.clone(),
            address: venue.address.clone(),
            phone: venue.phone.clone(),
            image_link: venue.image_link.clone(),
            genres: venue.genres.clone(),
            website: venue.website.clone(),
            facebook_link: venue.facebook_link.clone(),
            seeking_talent: venue.seeking_talent,
            seeking_description: venue.seeking_description.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArtistForm {
    pub name: String,
    pub city: String,
    pub state: String,
    pub phone: String,
    pub image_link: String,
    pub genres: Vec<String>,
    pub website: String,
    pub facebook_link: String,
    pub seeking_venue: bool,
    pub seeking_description: String,
}

impl ArtistForm {
    pub fn from_pairs(pairs: &FormPairs) -> Self {
        Self {
            name: pairs.text("name"),
            city: pairs.text("city"),
            state: pairs.text("state"),
            phone: pairs.text("phone"),
            image_link: pairs.text("image_link"),
            genres: pairs.all("genres"),
            website: pairs.text("website"),
            facebook_link: pairs.text("facebook_link"),
            seeking_venue: pairs.present("seeking_venue"),
            seeking_description: pairs.text("seeking_description"),
        }
    }

    pub fn validate(&self) -> Result<NewArtist, FieldErrors> {
        let mut errors = FieldErrors::default();
        require(&mut errors, "name", &self.name);
        require(&mut errors, "city", &self.city);
        check_state(&mut errors, &self.state);
        check_phone(&mut errors, &self.phone);
        check_optional_url(&mut errors, "image_link", &self.image_link);
        check_genres(&mut errors, &self.genres);
        check_optional_url(&mut errors, "website", &self.website);
        check_optional_url(&mut errors, "facebook_link", &self.facebook_link);

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(NewArtist {
            name: self.name.clone(),
            genres: self.genres.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            phone: self.phone.clone(),
            website: self.website.clone(),
            facebook_link: self.facebook_link.clone(),
            seeking_venue: self.seeking_venue,
            seeking_description: self.seeking_description.clone(),
            image_link: self.image_link.clone(),
        })
    }
}

impl From<&Artist> for ArtistForm {
    fn from(artist: &Artist) -> Self {
        Self {
            name: artist.name.clone(),
            city: artist.city.clone(),
            state: artist.state.clone(),
            phone: artist.phone.clone(),
            image_link: artist.image_link.clone(),
            genres: artist.genres.clone(),
            website: artist.website.clone(),
            facebook_link: artist.facebook_link.clone(),
            seeking_venue: artist.seeking_venue,
            seeking_description: artist.seeking_description.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShowForm {
    pub artist_id: String,
    pub venue_id: String,
    pub start_time: String,
}

impl ShowForm {
    pub fn from_pairs(pairs: &FormPairs) -> Self {
        Self {
            artist_id: pairs.text("artist_id"),
            venue_id: pairs.text("venue_id"),
            start_time: pairs.text("start_time"),
        }
    }

    pub fn validate(&self) -> Result<NewShow, FieldErrors> {
        let mut errors = FieldErrors::default();
        let artist_id = parse_id(&mut errors, "artist_id", &self.artist_id);
        let venue_id = parse_id(&mut errors, "venue_id", &self.venue_id);
        let start_time = if require(&mut errors, "start_time", &self.start_time) {
            let parsed = parse_start_time(&self.start_time);
            if parsed.is_none() {
                errors.push("start_time", "Expected a date and time like 2024-05-01 20:00.");
            }
            parsed
        } else {
            None
        };

        match (artist_id, venue_id, start_time) {
            (Some(artist_id), Some(venue_id), Some(start_time)) if errors.is_empty() => Ok(NewShow {
                venue_id,
                artist_id,
                start_time,
            }),
            _ => Err(errors),
        }
    }
}

fn parse_id(errors: &mut FieldErrors, field: &'static str, raw: &str) -> Option<i64> {
    if !require(errors, field, raw) {
        return None;
    }
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Some(id),
        _ => {
            errors.push(field, "Must be a positive whole number.");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> FormPairs {
        FormPairs(
            items
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    fn fillmore() -> FormPairs {
        pairs(&[
            ("name", "The Fillmore"),
            ("city", "San Francisco"),
            ("state", "CA"),
            ("address", "1805 Geary Blvd"),
            ("phone", "415-346-6000"),
            ("genres", "Rock n Roll"),
            ("genres", "Blues"),
            ("website", "https://www.thefillmore.com"),
            ("facebook_link", ""),
            ("image_link", ""),
            ("seeking_description", ""),
        ])
    }

    #[test]
    fn valid_venue_form_builds_write_model() {
        let venue = VenueForm::from_pairs(&fillmore()).validate().unwrap();
        assert_eq!(venue.name, "The Fillmore");
        assert_eq!(venue.genres, vec!["Rock n Roll", "Blues"]);
        assert!(!venue.seeking_talent);
    }

    #[test]
    fn checkbox_presence_means_true() {
        let mut body = fillmore();
        body.0.push(("seeking_talent".into(), "y".into()));
        let venue = VenueForm::from_pairs(&body).validate().unwrap();
        assert!(venue.seeking_talent);
    }

    #[test]
    fn empty_name_is_rejected() {
        let mut body = fillmore();
        body.0[0].1 = "   ".into();
        let errors = VenueForm::from_pairs(&body).validate().unwrap_err();
        assert!(errors.has("name"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn bad_state_genre_phone_and_url_are_reported() {
        let body = pairs(&[
            ("name", "Somewhere"),
            ("city", "Nowhere"),
            ("state", "XX"),
            ("address", "1 Road"),
            ("phone", "not a phone"),
            ("genres", "Polka"),
            ("website", "ftp://example.com"),
        ]);
        let errors = VenueForm::from_pairs(&body).validate().unwrap_err();
        assert!(errors.has("state"));
        assert!(errors.has("genres"));
        assert!(errors.has("phone"));
        assert!(errors.has("website"));
        assert!(!errors.has("name"));
    }

    #[test]
    fn missing_genres_is_rejected() {
        let body = pairs(&[
            ("name", "Guns N Petals"),
            ("city", "San Francisco"),
            ("state", "CA"),
            ("phone", "326-123-5000"),
        ]);
        let errors = ArtistForm::from_pairs(&body).validate().unwrap_err();
        assert!(errors.has("genres"));
        assert!(!errors.has("address"));
    }

    #[test]
    fn phone_pattern_accepts_common_shapes() {
        for phone in ["415-346-6000", "(415) 346-6000", "+1 415 346 6000", "4153466000"] {
            assert!(PHONE_PATTERN.is_match(phone), "{phone}");
        }
        for phone in ["346-6000", "phone", "415-346-60000", "07123456789", "+447123456789"] {
            assert!(!PHONE_PATTERN.is_match(phone), "{phone}");
        }
    }

    #[test]
    fn show_form_parses_ids_and_time() {
        let body = pairs(&[
            ("artist_id", "4"),
            ("venue_id", "1"),
            ("start_time", "2019-05-21T21:30"),
        ]);
        let show = ShowForm::from_pairs(&body).validate().unwrap();
        assert_eq!(show.artist_id, 4);
        assert_eq!(show.venue_id, 1);
        assert_eq!(show.start_time.to_string(), "2019-05-21 21:30:00");
    }

    #[test]
    fn show_form_rejects_bad_input() {
        let body = pairs(&[("artist_id", "abc"), ("venue_id", "0"), ("start_time", "tomorrow")]);
        let errors = ShowForm::from_pairs(&body).validate().unwrap_err();
        assert!(errors.has("artist_id"));
        assert!(errors.has("venue_id"));
        assert!(errors.has("start_time"));
    }

    #[test]
    fn start_time_rejects_years_without_four_digits() {
        assert!(parse_start_time("+12345-01-01 20:00").is_none());
        assert!(parse_start_time("-0001-01-01 20:00").is_none());
        assert!(parse_start_time("9999-12-31 23:59").is_some());

        let body = pairs(&[
            ("artist_id", "4"),
            ("venue_id", "1"),
            ("start_time", "+12345-01-01 20:00"),
        ]);
        let errors = ShowForm::from_pairs(&body).validate().unwrap_err();
        assert!(errors.has("start_time"));
    }

    #[test]
    fn edit_form_round_trips_stored_artist() {
        let artist = Artist {
            id: 7,
            name: "The Wild Sax Band".into(),
            genres: vec!["Jazz".into(), "Classical".into()],
            city: "San Francisco".into(),
            state: "CA".into(),
            phone: "432-325-5432".into(),
            website: String::new(),
            facebook_link: String::new(),
            seeking_venue: true,
            seeking_description: String::new(),
            image_link: String::new(),
        };
        let form = ArtistForm::from(&artist);
        let rebuilt = form.validate().unwrap().into_artist(7);
        assert_eq!(rebuilt, artist);
    }
}
