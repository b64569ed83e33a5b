use super::traits::Storage;
use crate::domain::*;
use crate::error::{StoreError, StoreResult};
use crate::query;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

#[derive(Default)]
struct Tables {
    venues: BTreeMap<i64, Venue>,
    artists: BTreeMap<i64, Artist>,
    shows: BTreeMap<i64, Show>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-memory storage implementation for development/testing.
///
/// A single mutex guards all three tables, so each write is applied
/// atomically and validated before anything is mutated.
#[derive(Default)]
pub struct InMemoryStorage {
    tables: Mutex<Tables>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Tables>> {
        self.tables.lock().map_err(|e| StoreError::Database {
            message: format!("in-memory store poisoned: {e}"),
        })
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn list_venue_areas(&self) -> StoreResult<Vec<AreaGroup>> {
        let tables = self.lock()?;
        Ok(query::group_by_area(tables.venues.values()))
    }

    async fn search_venues(&self, search_term: &str) -> StoreResult<SearchResults> {
        let tables = self.lock()?;
        let data = tables
            .venues
            .values()
            .filter(|v| query::name_matches(&v.name, search_term))
            .map(|v| EntitySummary {
                id: v.id,
                name: v.name.clone(),
            })
            .collect();
        Ok(SearchResults::new(data))
    }

    async fn venue_detail(&self, venue_id: i64, now: NaiveDateTime) -> StoreResult<Option<VenueDetail>> {
        let tables = self.lock()?;
        let Some(venue) = tables.venues.get(&venue_id).cloned() else {
            return Ok(None);
        };
        let appearances = tables
            .shows
            .values()
            .filter(|s| s.venue_id == venue_id)
            .filter_map(|s| {
                tables.artists.get(&s.artist_id).map(|a| ShowAppearance {
                    id: a.id,
                    name: a.name.clone(),
                    image_link: a.image_link.clone(),
                    start_time: s.start_time,
                })
            });
        let shows = query::partition_shows(appearances, now);
        Ok(Some(VenueDetail { venue, shows }))
    }

    async fn get_venue(&self, venue_id: i64) -> StoreResult<Option<Venue>> {
        Ok(self.lock()?.venues.get(&venue_id).cloned())
    }

    async fn create_venue(&self, venue: NewVenue) -> StoreResult<Venue> {
        let mut tables = self.lock()?;
        let id = tables.next_id();
        let venue = venue.into_venue(id);
        tables.venues.insert(id, venue.clone());
        debug!("Created venue: {} with id {}", venue.name, id);
        Ok(venue)
    }

    async fn update_venue(&self, venue_id: i64, venue: NewVenue) -> StoreResult<Venue> {
        let mut tables = self.lock()?;
        let slot = tables.venues.get_mut(&venue_id).ok_or(StoreError::NotFound {
            entity: "venue",
            id: venue_id,
        })?;
        *slot = venue.into_venue(venue_id);
        Ok(slot.clone())
    }

    async fn delete_venue(&self, venue_id: i64, policy: DeletePolicy) -> StoreResult<()> {
        let mut tables = self.lock()?;
        if !tables.venues.contains_key(&venue_id) {
            return Err(StoreError::NotFound {
                entity: "venue",
                id: venue_id,
            });
        }
        let count = tables.shows.values().filter(|s| s.venue_id == venue_id).count() as i64;
        if count > 0 && policy == DeletePolicy::Reject {
            return Err(StoreError::HasShows { venue_id, count });
        }
        tables.shows.retain(|_, s| s.venue_id != venue_id);
        tables.venues.remove(&venue_id);
        debug!("Deleted venue {} and {} show(s)", venue_id, count);
        Ok(())
    }

    async fn list_artists(&self) -> StoreResult<Vec<EntitySummary>> {
        let tables = self.lock()?;
        Ok(tables
            .artists
            .values()
            .map(|a| EntitySummary {
                id: a.id,
                name: a.name.clone(),
            })
            .collect())
    }

    async fn search_artists(&self, search_term: &str) -> StoreResult<SearchResults> {
        let tables = self.lock()?;
        let data = tables
            .artists
            .values()
            .filter(|a| query::name_matches(&a.name, search_term))
            .map(|a| EntitySummary {
                id: a.id,
                name: a.name.clone(),
            })
            .collect();
        Ok(SearchResults::new(data))
    }

    async fn artist_detail(&self, artist_id: i64, now: NaiveDateTime) -> StoreResult<Option<ArtistDetail>> {
        let tables = self.lock()?;
        let Some(artist) = tables.artists.get(&artist_id).cloned() else {
            return Ok(None);
        };
        let appearances = tables
            .shows
            .values()
            .filter(|s| s.artist_id == artist_id)
            .filter_map(|s| {
                tables.venues.get(&s.venue_id).map(|v| ShowAppearance {
                    id: v.id,
                    name: v.name.clone(),
                    image_link: v.image_link.clone(),
                    start_time: s.start_time,
                })
            });
        let shows = query::partition_shows(appearances, now);
        Ok(Some(ArtistDetail { artist, shows }))
    }

    async fn get_artist(&self, artist_id: i64) -> StoreResult<Option<Artist>> {
        Ok(self.lock()?.artists.get(&artist_id).cloned())
    }

    async fn create_artist(&self, artist: NewArtist) -> StoreResult<Artist> {
        let mut tables = self.lock()?;
        let id = tables.next_id();
        let artist = artist.into_artist(id);
        tables.artists.insert(id, artist.clone());
        debug!("Created artist: {} with id {}", artist.name, id);
        Ok(artist)
    }

    async fn update_artist(&self, artist_id: i64, artist: NewArtist) -> StoreResult<Artist> {
        let mut tables = self.lock()?;
        let slot = tables.artists.get_mut(&artist_id).ok_or(StoreError::NotFound {
            entity: "artist",
            id: artist_id,
        })?;
        *slot = artist.into_artist(artist_id);
        Ok(slot.clone())
    }

    async fn list_shows(&self) -> StoreResult<Vec<ShowListing>> {
        let tables = self.lock()?;
        let mut rows: Vec<ShowListing> = tables
            .shows
            .values()
            .filter_map(|s| {
                let venue = tables.venues.get(&s.venue_id)?;
                let artist = tables.artists.get(&s.artist_id)?;
                Some(ShowListing {
                    show_id: s.id,
                    venue_id: venue.id,
                    venue_name: venue.name.clone(),
                    artist_id: artist.id,
                    artist_name: artist.name.clone(),
                    artist_image_link: artist.image_link.clone(),
                    start_time: s.start_time,
                })
            })
            .collect();
        query::sort_show_listing(&mut rows);
        Ok(rows)
    }

    async fn create_show(&self, show: NewShow) -> StoreResult<Show> {
        if !start_time_in_range(&show.start_time) {
            return Err(StoreError::StartTimeOutOfRange(show.start_time));
        }
        let mut tables = self.lock()?;
        if !tables.artists.contains_key(&show.artist_id) {
            return Err(StoreError::MissingReference {
                entity: "artist",
                id: show.artist_id,
            });
        }
        if !tables.venues.contains_key(&show.venue_id) {
            return Err(StoreError::MissingReference {
                entity: "venue",
                id: show.venue_id,
            });
        }
        let id = tables.next_id();
        let show = Show {
            id,
            venue_id: show.venue_id,
            artist_id: show.artist_id,
            start_time: show.start_time,
        };
        tables.shows.insert(id, show.clone());
        debug!("Created show {} (venue {}, artist {})", id, show.venue_id, show.artist_id);
        Ok(show)
    }
}
