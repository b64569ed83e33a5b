#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use fyuur::domain::{NewArtist, NewShow, NewVenue};
use fyuur::storage::DatabaseStorage;
use tempfile::TempDir;

/// The instant every fixed-clock test treats as "now".
pub fn now() -> NaiveDateTime {
    at(2024, 6, 1, 12, 0)
}

pub fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, mo, d)
        .unwrap()
        .and_hms_opt(h, mi, 0)
        .unwrap()
}

pub fn venue(name: &str, city: &str, state: &str) -> NewVenue {
    NewVenue {
        name: name.to_string(),
        genres: vec!["Jazz".to_string(), "Reggae".to_string()],
        address: "1015 Folsom Street".to_string(),
        city: city.to_string(),
        state: state.to_string(),
        phone: "123-123-1234".to_string(),
        website: "https://www.themusicalhop.com".to_string(),
        facebook_link: String::new(),
        seeking_talent: true,
        seeking_description: "We are on the lookout for a local artist.".to_string(),
        image_link: "https://example.com/venue.jpg".to_string(),
    }
}

pub fn artist(name: &str) -> NewArtist {
    NewArtist {
        name: name.to_string(),
        genres: vec!["Rock n Roll".to_string()],
        city: "San Francisco".to_string(),
        state: "CA".to_string(),
        phone: "326-123-5000".to_string(),
        website: String::new(),
        facebook_link: String::new(),
        seeking_venue: false,
        seeking_description: String::new(),
        image_link: format!("https://example.com/{}.jpg", name.len()),
    }
}

pub fn show(venue_id: i64, artist_id: i64, start_time: NaiveDateTime) -> NewShow {
    NewShow {
        venue_id,
        artist_id,
        start_time,
    }
}

/// A migrated database in a temporary directory. Keep the `TempDir` alive
/// for as long as the storage is used.
pub async fn database_storage() -> (TempDir, DatabaseStorage) {
    let dir = tempfile::tempdir().unwrap();
    let storage = DatabaseStorage::open(dir.path().join("fyuur.db"))
        .await
        .unwrap();
    (dir, storage)
}
