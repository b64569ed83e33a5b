use super::traits::Storage;
use crate::db::DatabaseManager;
use crate::domain::*;
use crate::error::{StoreError, StoreResult};
use crate::query;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use libsql::{Connection, Row, Transaction};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

const VENUE_COLUMNS: &str = "id, name, genres, address, city, state, phone, website, \
     facebook_link, seeking_talent, seeking_description, image_link";

const ARTIST_COLUMNS: &str = "id, name, genres, city, state, phone, website, \
     facebook_link, seeking_venue, seeking_description, image_link";

/// Single-pass detail query: the entity row joined to its shows and their
/// counterpart, with two filtered aggregates over the same rowset. `{side}`
/// is the entity table, `{other}` the counterpart table. Counts are the
/// lengths of the decoded lists.
fn detail_sql(columns: &str, side: &str, side_fk: &str, other: &str, other_fk: &str) -> String {
    let appearance = "json_object('id', o.id, 'name', o.name, 'image_link', o.image_link, 'start_time', s.start_time)";
    let prefixed: Vec<String> = columns.split(',').map(|c| format!("e.{}", c.trim())).collect();
    format!(
        "SELECT {cols},
                json_group_array({appearance}) FILTER (WHERE s.start_time < ?2) AS past_shows,
                json_group_array({appearance}) FILTER (WHERE s.start_time > ?2) AS upcoming_shows
         FROM {side} e
         LEFT JOIN shows s ON s.{side_fk} = e.id
         LEFT JOIN {other} o ON o.id = s.{other_fk}
         WHERE e.id = ?1
         GROUP BY e.id",
        cols = prefixed.join(", "),
    )
}

#[derive(Deserialize)]
struct AppearanceRow {
    id: i64,
    name: String,
    image_link: String,
    start_time: String,
}

#[derive(Deserialize)]
struct SummaryRow {
    id: i64,
    name: String,
}

/// Database storage implementation using a local libSQL file with one table
/// per entity.
pub struct DatabaseStorage {
    db: Arc<DatabaseManager>,
}

impl DatabaseStorage {
    /// Open the database at `path` and bring its schema up to date.
    pub async fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let db_manager = DatabaseManager::open(path).await?;
        db_manager.run_migrations().await?;

        Ok(Self {
            db: Arc::new(db_manager),
        })
    }

    async fn search(&self, table: &str, search_term: &str) -> StoreResult<SearchResults> {
        let conn = self.db.connect().await?;
        let sql = format!("SELECT id, name FROM {table} WHERE instr(lower(name), lower(?1)) > 0 ORDER BY id");
        let mut rows = conn.query(&sql, libsql::params![search_term]).await?;

        let mut data = Vec::new();
        while let Some(row) = rows.next().await? {
            data.push(EntitySummary {
                id: row.get(0)?,
                name: row.get(1)?,
            });
        }
        debug!("Search '{}' on {} matched {} row(s)", search_term, table, data.len());
        Ok(SearchResults::new(data))
    }

    /// Runs the detail query. The entity is decoded by `decode`, the
    /// partitioned shows from columns `offset` and `offset + 1`. Both are read
    /// while the cursor is still open.
    async fn detail_row<T>(
        &self,
        sql: &str,
        id: i64,
        now: NaiveDateTime,
        offset: i32,
        decode: fn(&Row) -> StoreResult<T>,
    ) -> StoreResult<Option<(T, PartitionedShows)>> {
        let conn = self.db.connect().await?;
        let now = now.format(TIMESTAMP_FORMAT).to_string();
        let mut rows = conn.query(sql, libsql::params![id, now]).await?;

        let Some(row) = rows.next().await? else {
            return Ok(None);
        };
        let entity = decode(&row)?;
        let past = parse_appearances(&row.get::<String>(offset)?)?;
        let upcoming = parse_appearances(&row.get::<String>(offset + 1)?)?;
        let shows = query::from_buckets(past, upcoming);
        debug!(
            "Detail for id {}: {} past, {} upcoming",
            id, shows.past_shows_count, shows.upcoming_shows_count
        );
        Ok(Some((entity, shows)))
    }
}

fn parse_timestamp(raw: &str) -> StoreResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT).map_err(|e| StoreError::Database {
        message: format!("Invalid start_time '{raw}': {e}"),
    })
}

fn parse_appearances(json: &str) -> StoreResult<Vec<ShowAppearance>> {
    let rows: Vec<AppearanceRow> = serde_json::from_str(json)?;
    rows.into_iter()
        .map(|r| {
            Ok(ShowAppearance {
                id: r.id,
                name: r.name,
                image_link: r.image_link,
                start_time: parse_timestamp(&r.start_time)?,
            })
        })
        .collect()
}

fn venue_from_row(row: &Row) -> StoreResult<Venue> {
    Ok(Venue {
        id: row.get(0)?,
        name: row.get(1)?,
        genres: serde_json::from_str(&row.get::<String>(2)?)?,
        address: row.get(3)?,
        city: row.get(4)?,
        state: row.get(5)?,
        phone: row.get(6)?,
        website: row.get(7)?,
        facebook_link: row.get(8)?,
        seeking_talent: row.get::<i64>(9)? != 0,
        seeking_description: row.get(10)?,
        image_link: row.get(11)?,
    })
}

fn artist_from_row(row: &Row) -> StoreResult<Artist> {
    Ok(Artist {
        id: row.get(0)?,
        name: row.get(1)?,
        genres: serde_json::from_str(&row.get::<String>(2)?)?,
        city: row.get(3)?,
        state: row.get(4)?,
        phone: row.get(5)?,
        website: row.get(6)?,
        facebook_link: row.get(7)?,
        seeking_venue: row.get::<i64>(8)? != 0,
        seeking_description: row.get(9)?,
        image_link: row.get(10)?,
    })
}

/// Commit on success, roll back on failure. The write error wins over a
/// rollback error.
async fn finish<T>(tx: Transaction, result: StoreResult<T>) -> StoreResult<T> {
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!("Rollback failed after '{}': {}", e, rollback_err);
            }
            Err(e)
        }
    }
}

async fn exists(conn: &Connection, table: &str, id: i64) -> StoreResult<bool> {
    let sql = format!("SELECT 1 FROM {table} WHERE id = ?1");
    let mut rows = conn.query(&sql, libsql::params![id]).await?;
    Ok(rows.next().await?.is_some())
}

async fn insert_venue(conn: &Connection, venue: &NewVenue) -> StoreResult<i64> {
    conn.execute(
        "INSERT INTO venues (name, genres, address, city, state, phone, website,
                             facebook_link, seeking_talent, seeking_description, image_link)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        libsql::params![
            venue.name.as_str(),
            serde_json::to_string(&venue.genres)?,
            venue.address.as_str(),
            venue.city.as_str(),
            venue.state.as_str(),
            venue.phone.as_str(),
            venue.website.as_str(),
            venue.facebook_link.as_str(),
            i64::from(venue.seeking_talent),
            venue.seeking_description.as_str(),
            venue.image_link.as_str()
        ],
    )
    .await?;
    Ok(conn.last_insert_rowid())
}

async fn overwrite_venue(conn: &Connection, venue_id: i64, venue: &NewVenue) -> StoreResult<()> {
    let changed = conn
        .execute(
            "UPDATE venues SET name = ?2, genres = ?3, address = ?4, city = ?5, state = ?6,
                               phone = ?7, website = ?8, facebook_link = ?9, seeking_talent = ?10,
                               seeking_description = ?11, image_link = ?12
             WHERE id = ?1",
            libsql::params![
                venue_id,
                venue.name.as_str(),
                serde_json::to_string(&venue.genres)?,
                venue.address.as_str(),
                venue.city.as_str(),
                venue.state.as_str(),
                venue.phone.as_str(),
                venue.website.as_str(),
                venue.facebook_link.as_str(),
                i64::from(venue.seeking_talent),
                venue.seeking_description.as_str(),
                venue.image_link.as_str()
            ],
        )
        .await?;
    if changed == 0 {
        return Err(StoreError::NotFound {
            entity: "venue",
            id: venue_id,
        });
    }
    Ok(())
}

async fn remove_venue(conn: &Connection, venue_id: i64, policy: DeletePolicy) -> StoreResult<i64> {
    if !exists(conn, "venues", venue_id).await? {
        return Err(StoreError::NotFound {
            entity: "venue",
            id: venue_id,
        });
    }
    let count: i64 = {
        let mut rows = conn
            .query("SELECT COUNT(*) FROM shows WHERE venue_id = ?1", libsql::params![venue_id])
            .await?;
        match rows.next().await? {
            Some(row) => row.get(0)?,
            None => 0,
        }
    };
    if count > 0 {
        if policy == DeletePolicy::Reject {
            return Err(StoreError::HasShows { venue_id, count });
        }
        conn.execute("DELETE FROM shows WHERE venue_id = ?1", libsql::params![venue_id])
            .await?;
    }
    conn.execute("DELETE FROM venues WHERE id = ?1", libsql::params![venue_id])
        .await?;
    Ok(count)
}

async fn insert_artist(conn: &Connection, artist: &NewArtist) -> StoreResult<i64> {
    conn.execute(
        "INSERT INTO artists (name, genres, city, state, phone, website, facebook_link,
                              seeking_venue, seeking_description, image_link)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        libsql::params![
            artist.name.as_str(),
            serde_json::to_string(&artist.genres)?,
            artist.city.as_str(),
            artist.state.as_str(),
            artist.phone.as_str(),
            artist.website.as_str(),
            artist.facebook_link.as_str(),
            i64::from(artist.seeking_venue),
            artist.seeking_description.as_str(),
            artist.image_link.as_str()
        ],
    )
    .await?;
    Ok(conn.last_insert_rowid())
}

async fn overwrite_artist(conn: &Connection, artist_id: i64, artist: &NewArtist) -> StoreResult<()> {
    let changed = conn
        .execute(
            "UPDATE artists SET name = ?2, genres = ?3, city = ?4, state = ?5, phone = ?6,
                                website = ?7, facebook_link = ?8, seeking_venue = ?9,
                                seeking_description = ?10, image_link = ?11
             WHERE id = ?1",
            libsql::params![
                artist_id,
                artist.name.as_str(),
                serde_json::to_string(&artist.genres)?,
                artist.city.as_str(),
                artist.state.as_str(),
                artist.phone.as_str(),
                artist.website.as_str(),
                artist.facebook_link.as_str(),
                i64::from(artist.seeking_venue),
                artist.seeking_description.as_str(),
                artist.image_link.as_str()
            ],
        )
        .await?;
    if changed == 0 {
        return Err(StoreError::NotFound {
            entity: "artist",
            id: artist_id,
        });
    }
    Ok(())
}

async fn insert_show(conn: &Connection, show: &NewShow) -> StoreResult<i64> {
    if !start_time_in_range(&show.start_time) {
        return Err(StoreError::StartTimeOutOfRange(show.start_time));
    }
    if !exists(conn, "artists", show.artist_id).await? {
        return Err(StoreError::MissingReference {
            entity: "artist",
            id: show.artist_id,
        });
    }
    if !exists(conn, "venues", show.venue_id).await? {
        return Err(StoreError::MissingReference {
            entity: "venue",
            id: show.venue_id,
        });
    }
    conn.execute(
        "INSERT INTO shows (venue_id, artist_id, start_time) VALUES (?1, ?2, ?3)",
        libsql::params![
            show.venue_id,
            show.artist_id,
            show.start_time.format(TIMESTAMP_FORMAT).to_string()
        ],
    )
    .await?;
    Ok(conn.last_insert_rowid())
}

#[async_trait]
impl Storage for DatabaseStorage {
    async fn list_venue_areas(&self) -> StoreResult<Vec<AreaGroup>> {
        let conn = self.db.connect().await?;
        let mut rows = conn
            .query(
                "SELECT city, state, json_group_array(json_object('id', id, 'name', name)) AS venues
                 FROM (SELECT id, name, city, state FROM venues ORDER BY id)
                 GROUP BY city, state
                 ORDER BY MIN(id)",
                libsql::params![],
            )
            .await?;

        let mut groups = Vec::new();
        while let Some(row) = rows.next().await? {
            let venues: Vec<SummaryRow> = serde_json::from_str(&row.get::<String>(2)?)?;
            let mut venues: Vec<EntitySummary> = venues
                .into_iter()
                .map(|v| EntitySummary { id: v.id, name: v.name })
                .collect();
            venues.sort_by_key(|v| v.id);
            groups.push(AreaGroup {
                city: row.get(0)?,
                state: row.get(1)?,
                venues,
            });
        }
        Ok(groups)
    }

    async fn search_venues(&self, search_term: &str) -> StoreResult<SearchResults> {
        self.search("venues", search_term).await
    }

    async fn venue_detail(&self, venue_id: i64, now: NaiveDateTime) -> StoreResult<Option<VenueDetail>> {
        let sql = detail_sql(VENUE_COLUMNS, "venues", "venue_id", "artists", "artist_id");
        let detail = self.detail_row(&sql, venue_id, now, 12, venue_from_row).await?;
        Ok(detail.map(|(venue, shows)| VenueDetail { venue, shows }))
    }

    async fn get_venue(&self, venue_id: i64) -> StoreResult<Option<Venue>> {
        let conn = self.db.connect().await?;
        let sql = format!("SELECT {VENUE_COLUMNS} FROM venues WHERE id = ?1");
        let mut rows = conn.query(&sql, libsql::params![venue_id]).await?;
        match rows.next().await? {
            Some(row) => Ok(Some(venue_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn create_venue(&self, venue: NewVenue) -> StoreResult<Venue> {
        let conn = self.db.connect().await?;
        let tx = conn.transaction().await?;
        let result = insert_venue(&tx, &venue).await;
        let id = finish(tx, result).await?;

        info!("Created venue: {} with id {}", venue.name, id);
        Ok(venue.into_venue(id))
    }

    async fn update_venue(&self, venue_id: i64, venue: NewVenue) -> StoreResult<Venue> {
        let conn = self.db.connect().await?;
        let tx = conn.transaction().await?;
        let result = overwrite_venue(&tx, venue_id, &venue).await;
        finish(tx, result).await?;

        info!("Updated venue: {} with id {}", venue.name, venue_id);
        Ok(venue.into_venue(venue_id))
    }

    async fn delete_venue(&self, venue_id: i64, policy: DeletePolicy) -> StoreResult<()> {
        let conn = self.db.connect().await?;
        let tx = conn.transaction().await?;
        let result = remove_venue(&tx, venue_id, policy).await;
        let removed_shows = finish(tx, result).await?;

        info!("Deleted venue {} ({} show(s) removed)", venue_id, removed_shows);
        Ok(())
    }

    async fn list_artists(&self) -> StoreResult<Vec<EntitySummary>> {
        let conn = self.db.connect().await?;
        let mut rows = conn
            .query("SELECT id, name FROM artists ORDER BY id", libsql::params![])
            .await?;

        let mut artists = Vec::new();
        while let Some(row) = rows.next().await? {
            artists.push(EntitySummary {
                id: row.get(0)?,
                name: row.get(1)?,
            });
        }
        Ok(artists)
    }

    async fn search_artists(&self, search_term: &str) -> StoreResult<SearchResults> {
        self.search("artists", search_term).await
    }

    async fn artist_detail(&self, artist_id: i64, now: NaiveDateTime) -> StoreResult<Option<ArtistDetail>> {
        let sql = detail_sql(ARTIST_COLUMNS, "artists", "artist_id", "venues", "venue_id");
        let detail = self.detail_row(&sql, artist_id, now, 11, artist_from_row).await?;
        Ok(detail.map(|(artist, shows)| ArtistDetail { artist, shows }))
    }

    async fn get_artist(&self, artist_id: i64) -> StoreResult<Option<Artist>> {
        let conn = self.db.connect().await?;
        let sql = format!("SELECT {ARTIST_COLUMNS} FROM artists WHERE id = ?1");
        let mut rows = conn.query(&sql, libsql::params![artist_id]).await?;
        match rows.next().await? {
            Some(row) => Ok(Some(artist_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn create_artist(&self, artist: NewArtist) -> StoreResult<Artist> {
        let conn = self.db.connect().await?;
        let tx = conn.transaction().await?;
        let result = insert_artist(&tx, &artist).await;
        let id = finish(tx, result).await?;

        info!("Created artist: {} with id {}", artist.name, id);
        Ok(artist.into_artist(id))
    }

    async fn update_artist(&self, artist_id: i64, artist: NewArtist) -> StoreResult<Artist> {
        let conn = self.db.connect().await?;
        let tx = conn.transaction().await?;
        let result = overwrite_artist(&tx, artist_id, &artist).await;
        finish(tx, result).await?;

        info!("Updated artist: {} with id {}", artist.name, artist_id);
        Ok(artist.into_artist(artist_id))
    }

    async fn list_shows(&self) -> StoreResult<Vec<ShowListing>> {
        let conn = self.db.connect().await?;
        let mut rows = conn
            .query(
                "SELECT s.id, s.venue_id, v.name, s.artist_id, a.name, a.image_link, s.start_time
                 FROM shows s
                 JOIN venues v ON v.id = s.venue_id
                 JOIN artists a ON a.id = s.artist_id
                 ORDER BY s.start_time ASC, s.id ASC",
                libsql::params![],
            )
            .await?;

        let mut shows = Vec::new();
        while let Some(row) = rows.next().await? {
            shows.push(ShowListing {
                show_id: row.get(0)?,
                venue_id: row.get(1)?,
                venue_name: row.get(2)?,
                artist_id: row.get(3)?,
                artist_name: row.get(4)?,
                artist_image_link: row.get(5)?,
                start_time: parse_timestamp(&row.get::<String>(6)?)?,
            });
        }
        Ok(shows)
    }

    async fn create_show(&self, show: NewShow) -> StoreResult<Show> {
        let conn = self.db.connect().await?;
        let tx = conn.transaction().await?;
        let result = insert_show(&tx, &show).await;
        let id = finish(tx, result).await?;

        info!(
            "Created show {} (venue {}, artist {}) at {}",
            id, show.venue_id, show.artist_id, show.start_time
        );
        Ok(Show {
            id,
            venue_id: show.venue_id,
            artist_id: show.artist_id,
            start_time: show.start_time,
        })
    }
}
