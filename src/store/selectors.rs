//! Derived reads over [`AppState`]. Nothing here is stored.

use chrono::{DateTime, Utc};

use super::AppState;

const LABEL_MAX_CHARS: usize = 25;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackRow {
    /// 1-based position in API order.
    pub index: usize,
    pub id: String,
    pub title: String,
    pub album: String,
    pub added: String,
    pub duration: String,
    pub is_active: bool,
}

pub fn track_rows(state: &AppState, now: DateTime<Utc>) -> Vec<TrackRow> {
    let Some(playlist) = state.current_playlist.value() else {
        return Vec::new();
    };

    playlist
        .tracks
        .iter()
        .enumerate()
        .map(|(i, entry)| TrackRow {
            index: i + 1,
            id: entry.track.id.clone(),
            title: truncate_label(&entry.track.name, LABEL_MAX_CHARS),
            album: truncate_label(&entry.track.album.name, LABEL_MAX_CHARS),
            added: entry
                .added_at
                .map(|added| time_since(added, now))
                .unwrap_or_default(),
            duration: format_duration(entry.track.duration_ms),
            is_active: state.player.is_active(&entry.track.id),
        })
        .collect()
}

/// Whether layout must leave room for the playback bar.
pub fn reserves_player_space(state: &AppState) -> bool {
    state.player.is_track_selected()
}

pub fn is_active_track(state: &AppState, track_id: &str) -> bool {
    state.player.is_active(track_id)
}

pub fn format_duration(duration_ms: u64) -> String {
    let total_secs = duration_ms / 1000;
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}

pub fn truncate_label(text: &str, max_chars: usize) -> String {
    if text.chars().count() >= max_chars {
        let head: String = text.chars().take(max_chars).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

pub fn time_since(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(then);
    let minutes = elapsed.num_minutes().max(0);
    let hours = elapsed.num_hours().max(0);
    let days = elapsed.num_days().max(0);
    let weeks = elapsed.num_weeks().max(0);

    if minutes < 60 {
        plural(minutes, "minute")
    } else if hours < 24 {
        plural(hours, "hour")
    } else if days < 7 {
        plural(days, "day")
    } else if weeks < 52 {
        plural(weeks, "week")
    } else {
        plural(weeks / 52, "year")
    }
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("{} {} ago", count, unit)
    } else {
        format!("{} {}s ago", count, unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spotify::models::{CurrentlyPlayingTrack, Playlist, Track};
    use crate::store::{Action, SliceKey, Store};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_time_since_units() {
        assert_eq!(time_since(now() - Duration::minutes(1), now()), "1 minute ago");
        assert_eq!(time_since(now() - Duration::minutes(59), now()), "59 minutes ago");
        assert_eq!(time_since(now() - Duration::hours(5), now()), "5 hours ago");
        assert_eq!(time_since(now() - Duration::days(1), now()), "1 day ago");
        assert_eq!(time_since(now() - Duration::weeks(3), now()), "3 weeks ago");
        assert_eq!(time_since(now() - Duration::weeks(110), now()), "2 years ago");
        assert_eq!(time_since(now() + Duration::minutes(5), now()), "0 minutes ago");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(215_000), "3:35");
        assert_eq!(format_duration(61_000), "1:01");
        assert_eq!(format_duration(999), "0:00");
    }

    #[test]
    fn test_truncate_label() {
        assert_eq!(truncate_label("Short", 25), "Short");
        assert_eq!(
            truncate_label("An Extremely Long Song Title Indeed", 25),
            "An Extremely Long Song Ti..."
        );
    }

    #[test]
    fn test_track_rows_follow_playlist_order() {
        let store = Store::new();
        assert!(track_rows(&store.snapshot(), now()).is_empty());

        let mut playlist = Playlist::mock("p1", &["c", "a", "b"]);
        playlist.tracks[0].added_at = Some(now() - Duration::days(2));
        let generation = store.begin_request(SliceKey::CurrentPlaylist);
        store.dispatch(Action::CurrentPlaylistLoaded { generation, playlist });
        store.dispatch(Action::SetCurrentlyPlayingTrack(CurrentlyPlayingTrack::start(
            Track::mock("a", "Track a"),
            false,
        )));

        let state = store.snapshot();
        let rows = track_rows(&state, now());
        let order: Vec<(usize, &str)> = rows.iter().map(|r| (r.index, r.id.as_str())).collect();
        assert_eq!(order, vec![(1, "c"), (2, "a"), (3, "b")]);
        assert_eq!(rows[0].added, "2 days ago");
        assert_eq!(rows[1].added, "");
        assert_eq!(rows[0].duration, "3:00");

        let active: Vec<&str> = rows.iter().filter(|r| r.is_active).map(|r| r.id.as_str()).collect();
        assert_eq!(active, vec!["a"]);
        assert!(reserves_player_space(&state));
        assert!(is_active_track(&state, "a"));
        assert!(!is_active_track(&state, "c"));
    }
}
