//! Aggregations over venues, artists and shows that do not depend on a
//! particular store. `InMemoryStorage` builds every view from these; the
//! database backend pushes the same shapes into SQL and only reuses the
//! ordering helpers.

use chrono::NaiveDateTime;

use crate::domain::{AreaGroup, EntitySummary, PartitionedShows, ShowAppearance, ShowListing, Venue};

/// Group venues by their (city, state) pair. Groups appear in the order their
/// first venue is seen, venues keep their input order inside a group.
pub fn group_by_area<'a, I>(venues: I) -> Vec<AreaGroup>
where
    I: IntoIterator<Item = &'a Venue>,
{
    let mut groups: Vec<AreaGroup> = Vec::new();
    for venue in venues {
        let summary = EntitySummary {
            id: venue.id,
            name: venue.name.clone(),
        };
        match groups
            .iter_mut()
            .find(|g| g.city == venue.city && g.state == venue.state)
        {
            Some(group) => group.venues.push(summary),
            None => groups.push(AreaGroup {
                city: venue.city.clone(),
                state: venue.state.clone(),
                venues: vec![summary],
            }),
        }
    }
    groups
}

/// Case-insensitive substring test. ASCII folding only, matching SQLite's
/// `lower()`. An empty term matches every name.
pub fn name_matches(name: &str, search_term: &str) -> bool {
    name.to_ascii_lowercase()
        .contains(&search_term.to_ascii_lowercase())
}

/// Split shows into past (`start_time < now`) and upcoming
/// (`start_time > now`). A show starting exactly at `now` is in neither.
pub fn partition_shows<I>(shows: I, now: NaiveDateTime) -> PartitionedShows
where
    I: IntoIterator<Item = ShowAppearance>,
{
    let mut past_shows = Vec::new();
    let mut upcoming_shows = Vec::new();
    for show in shows {
        if show.start_time < now {
            past_shows.push(show);
        } else if show.start_time > now {
            upcoming_shows.push(show);
        }
    }
    from_buckets(past_shows, upcoming_shows)
}

/// Build the partitioned view from buckets that were already filtered
/// elsewhere, sorting each by start time and deriving the counts.
pub fn from_buckets(
    mut past_shows: Vec<ShowAppearance>,
    mut upcoming_shows: Vec<ShowAppearance>,
) -> PartitionedShows {
    past_shows.sort_by(|a, b| a.start_time.cmp(&b.start_time).then(a.id.cmp(&b.id)));
    upcoming_shows.sort_by(|a, b| a.start_time.cmp(&b.start_time).then(a.id.cmp(&b.id)));
    PartitionedShows {
        past_shows_count: past_shows.len(),
        upcoming_shows_count: upcoming_shows.len(),
        past_shows,
        upcoming_shows,
    }
}

pub fn sort_show_listing(shows: &mut [ShowListing]) {
    shows.sort_by(|a, b| {
        a.start_time
            .cmp(&b.start_time)
            .then(a.show_id.cmp(&b.show_id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn venue(id: i64, name: &str, city: &str, state: &str) -> Venue {
        Venue {
            id,
            name: name.to_string(),
            genres: vec![],
            address: String::new(),
            city: city.to_string(),
            state: state.to_string(),
            phone: String::new(),
            website: String::new(),
            facebook_link: String::new(),
            seeking_talent: false,
            seeking_description: String::new(),
            image_link: String::new(),
        }
    }

    fn appearance(id: i64, start_time: NaiveDateTime) -> ShowAppearance {
        ShowAppearance {
            id,
            name: format!("act {id}"),
            image_link: String::new(),
            start_time,
        }
    }

    #[test]
    fn groups_each_venue_into_its_own_area() {
        let venues = vec![
            venue(1, "The Fillmore", "San Francisco", "CA"),
            venue(2, "Dueling Pianos", "New York", "NY"),
            venue(3, "Park Square", "San Francisco", "CA"),
            venue(4, "Elsewhere", "San Francisco", "NY"),
        ];

        let groups = group_by_area(&venues);

        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].city, "San Francisco");
        assert_eq!(groups[0].state, "CA");
        assert_eq!(
            groups[0].venues.iter().map(|v| v.id).collect::<Vec<_>>(),
            vec![1, 3]
        );
        let total: usize = groups.iter().map(|g| g.venues.len()).sum();
        assert_eq!(total, venues.len());
        for group in &groups {
            for summary in &group.venues {
                let v = venues.iter().find(|v| v.id == summary.id).unwrap();
                assert_eq!((v.city.as_str(), v.state.as_str()), (group.city.as_str(), group.state.as_str()));
            }
        }
    }

    #[test]
    fn grouping_is_stable_across_calls() {
        let venues = vec![venue(1, "A", "X", "CA"), venue(2, "B", "Y", "CA")];
        assert_eq!(group_by_area(&venues), group_by_area(&venues));
    }

    #[test]
    fn name_match_ignores_case() {
        assert!(name_matches("The Musical Hop", "hop"));
        assert!(name_matches("The Musical Hop", "MUSICAL"));
        assert!(!name_matches("Park Square Live", "hop"));
        assert!(name_matches("anything", ""));
    }

    #[test]
    fn name_match_treats_wildcards_literally() {
        assert!(!name_matches("Guns N Petals", "%"));
        assert!(name_matches("100% Live", "0%"));
        assert!(!name_matches("Guns N Petals", "N_P"));
    }

    #[test]
    fn partition_uses_strict_bounds() {
        let now = at(12, 0);
        let shows = vec![
            appearance(1, at(11, 59)),
            appearance(2, at(12, 0)),
            appearance(3, at(12, 1)),
        ];

        let partitioned = partition_shows(shows, now);

        assert_eq!(partitioned.past_shows_count, 1);
        assert_eq!(partitioned.upcoming_shows_count, 1);
        assert_eq!(partitioned.past_shows[0].id, 1);
        assert_eq!(partitioned.upcoming_shows[0].id, 3);
    }

    #[test]
    fn partition_sorts_each_bucket() {
        let now = at(12, 0);
        let shows = vec![
            appearance(1, at(20, 0)),
            appearance(2, at(9, 0)),
            appearance(3, at(14, 0)),
            appearance(4, at(8, 0)),
        ];

        let partitioned = partition_shows(shows, now);

        let past: Vec<i64> = partitioned.past_shows.iter().map(|s| s.id).collect();
        let upcoming: Vec<i64> = partitioned.upcoming_shows.iter().map(|s| s.id).collect();
        assert_eq!(past, vec![4, 2]);
        assert_eq!(upcoming, vec![3, 1]);
    }

    #[test]
    fn show_listing_sorted_ascending() {
        let row = |show_id: i64, start_time| ShowListing {
            show_id,
            venue_id: 1,
            venue_name: "V".into(),
            artist_id: 1,
            artist_name: "A".into(),
            artist_image_link: String::new(),
            start_time,
        };
        let mut rows = vec![row(1, at(20, 0)), row(2, at(8, 0)), row(3, at(8, 0))];

        sort_show_listing(&mut rows);

        assert_eq!(rows.iter().map(|r| r.show_id).collect::<Vec<_>>(), vec![2, 3, 1]);
    }
}
