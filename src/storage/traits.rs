use crate::domain::*;
use crate::error::StoreResult;
use async_trait::async_trait;
use chrono::NaiveDateTime;

/// Storage trait for venues, artists and the shows joining them.
///
/// Writes are all-or-nothing: a failed write leaves the store unchanged.
/// Detail views take `now` explicitly so callers decide which instant splits
/// past from upcoming shows.
#[async_trait]
pub trait Storage: Send + Sync {
    // Venue operations
    async fn list_venue_areas(&self) -> StoreResult<Vec<AreaGroup>>;
    async fn search_venues(&self, search_term: &str) -> StoreResult<SearchResults>;
    async fn venue_detail(&self, venue_id: i64, now: NaiveDateTime) -> StoreResult<Option<VenueDetail>>;
    async fn get_venue(&self, venue_id: i64) -> StoreResult<Option<Venue>>;
    async fn create_venue(&self, venue: NewVenue) -> StoreResult<Venue>;
    async fn update_venue(&self, venue_id: i64, venue: NewVenue) -> StoreResult<Venue>;
    async fn delete_venue(&self, venue_id: i64, policy: DeletePolicy) -> StoreResult<()>;

    // Artist operations
    async fn list_artists(&self) -> StoreResult<Vec<EntitySummary>>;
    async fn search_artists(&self, search_term: &str) -> StoreResult<SearchResults>;
    async fn artist_detail(&self, artist_id: i64, now: NaiveDateTime) -> StoreResult<Option<ArtistDetail>>;
    async fn get_artist(&self, artist_id: i64) -> StoreResult<Option<Artist>>;
    async fn create_artist(&self, artist: NewArtist) -> StoreResult<Artist>;
    async fn update_artist(&self, artist_id: i64, artist: NewArtist) -> StoreResult<Artist>;

    // Show operations
    async fn list_shows(&self) -> StoreResult<Vec<ShowListing>>;
    async fn create_show(&self, show: NewShow) -> StoreResult<Show>;
}
