use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Storage format for show start times. Lexicographic order matches
/// chronological order, which the SQL filters rely on, only while the year
/// has exactly four digits.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Years a show may start in.
pub const SHOW_YEARS: RangeInclusive<i32> = 0..=9999;

/// Whether `start_time` can be stored without breaking timestamp ordering.
pub fn start_time_in_range(start_time: &NaiveDateTime) -> bool {
    SHOW_YEARS.contains(&start_time.year())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    pub id: i64,
    pub name: String,
    pub genres: Vec<String>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub phone: String,
    pub website: String,
    pub facebook_link: String,
    pub seeking_talent: bool,
    pub seeking_description: String,
    pub image_link: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artist {
    pub id: i64,
    pub name: String,
    pub genres: Vec<String>,
    pub city: String,
    pub state: String,
    pub phone: String,
    pub website: String,
    pub facebook_link: String,
    pub seeking_venue: bool,
    pub seeking_description: String,
    pub image_link: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Show {
    pub id: i64,
    pub venue_id: i64,
    pub artist_id: i64,
    pub start_time: NaiveDateTime,
}

/// Every mutable venue field; used for both create and full-overwrite update.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewVenue {
    pub name: String,
    pub genres: Vec<String>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub phone: String,
    pub website: String,
    pub facebook_link: String,
    pub seeking_talent: bool,
    pub seeking_description: String,
    pub image_link: String,
}

impl NewVenue {
    pub fn into_venue(self, id: i64) -> Venue {
        Venue {
            id,
            name: self.name,
            genres: self.genres,
            address: self.address,
            city: self.city,
            state: self.state,
            phone: self.phone,
            website: self.website,
            facebook_link: self.facebook_link,
            seeking_talent: self.seeking_talent,
            seeking_description: self.seeking_description,
            image_link: self.image_link,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewArtist {
    pub name: String,
    pub genres: Vec<String>,
    pub city: String,
    pub state: String,
    pub phone: String,
    pub website: String,
    pub facebook_link: String,
    pub seeking_venue: bool,
    pub seeking_description: String,
    pub image_link: String,
}

impl NewArtist {
    pub fn into_artist(self, id: i64) -> Artist {
        Artist {
            id,
            name: self.name,
            genres: self.genres,
            city: self.city,
            state: self.state,
            phone: self.phone,
            website: self.website,
            facebook_link: self.facebook_link,
            seeking_venue: self.seeking_venue,
            seeking_description: self.seeking_description,
            image_link: self.image_link,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewShow {
    pub venue_id: i64,
    pub artist_id: i64,
    pub start_time: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySummary {
    pub id: i64,
    pub name: String,
}

/// Venues sharing one (city, state) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AreaGroup {
    pub city: String,
    pub state: String,
    pub venues: Vec<EntitySummary>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResults {
    pub count: usize,
    pub data: Vec<EntitySummary>,
}

impl SearchResults {
    pub fn new(data: Vec<EntitySummary>) -> Self {
        Self {
            count: data.len(),
            data,
        }
    }
}

/// One show seen from the venue or artist side: the counterpart entity plus
/// the start time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowAppearance {
    pub id: i64,
    pub name: String,
    pub image_link: String,
    pub start_time: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PartitionedShows {
    pub past_shows: Vec<ShowAppearance>,
    pub upcoming_shows: Vec<ShowAppearance>,
    pub past_shows_count: usize,
    pub upcoming_shows_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VenueDetail {
    pub venue: Venue,
    pub shows: PartitionedShows,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArtistDetail {
    pub artist: Artist,
    pub shows: PartitionedShows,
}

/// Row of the global `/shows` listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowListing {
    pub show_id: i64,
    pub venue_id: i64,
    pub venue_name: String,
    pub artist_id: i64,
    pub artist_name: String,
    pub artist_image_link: String,
    pub start_time: NaiveDateTime,
}

/// What happens to a venue's shows when the venue is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeletePolicy {
    /// Refuse to delete a venue that still has shows.
    #[default]
    Reject,
    /// Delete the venue's shows together with the venue.
    Cascade,
}

impl std::str::FromStr for DeletePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(DeletePolicy::Reject),
            "cascade" => Ok(DeletePolicy::Cascade),
            other => Err(format!("unknown delete policy '{other}'")),
        }
    }
}
