use crate::spotify::models::CurrentlyPlayingTrack;

/// Request tag; only the newest generation of a slice may commit.
pub type Generation = u64;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Loaded,
    Errored(String),
}

/// A fetched partition of state. The value is only ever replaced whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slice<T> {
    value: Option<T>,
    status: LoadStatus,
    generation: Generation,
}

impl<T> Default for Slice<T> {
    fn default() -> Self {
        Self {
            value: None,
            status: LoadStatus::Idle,
            generation: 0,
        }
    }
}

impl<T> Slice<T> {
    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn is_loading(&self) -> bool {
        self.status == LoadStatus::Loading
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            LoadStatus::Errored(message) => Some(message),
            _ => None,
        }
    }

    /// Issue a new request, superseding any in flight.
    pub(crate) fn begin(&mut self) -> Generation {
        self.generation += 1;
        self.status = LoadStatus::Loading;
        self.generation
    }

    pub(crate) fn resolve(&mut self, generation: Generation, value: T) -> bool {
        if generation != self.generation {
            return false;
        }
        self.value = Some(value);
        self.status = LoadStatus::Loaded;
        true
    }

    /// Record a failure; the previous value stays visible.
    pub(crate) fn reject(&mut self, generation: Generation, message: String) -> bool {
        if generation != self.generation {
            return false;
        }
        self.status = LoadStatus::Errored(message);
        true
    }

    /// The request was dropped before it finished.
    pub(crate) fn abandon(&mut self, generation: Generation) -> bool {
        if generation != self.generation || self.status != LoadStatus::Loading {
            return false;
        }
        self.status = if self.value.is_some() {
            LoadStatus::Loaded
        } else {
            LoadStatus::Idle
        };
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerPhase {
    Idle,
    Loaded,
    Playing,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerState {
    currently_playing: Option<CurrentlyPlayingTrack>,
}

impl PlayerState {
    pub fn currently_playing(&self) -> Option<&CurrentlyPlayingTrack> {
        self.currently_playing.as_ref()
    }

    pub fn phase(&self) -> PlayerPhase {
        match &self.currently_playing {
            None => PlayerPhase::Idle,
            Some(current) if current.is_playing => PlayerPhase::Playing,
            Some(_) => PlayerPhase::Loaded,
        }
    }

    /// Read by layout to reserve room for the playback bar.
    pub fn is_track_selected(&self) -> bool {
        self.currently_playing.is_some()
    }

    pub fn is_active(&self, track_id: &str) -> bool {
        self.currently_playing
            .as_ref()
            .is_some_and(|current| current.track_id() == track_id)
    }

    pub(crate) fn set_current(&mut self, track: CurrentlyPlayingTrack) -> bool {
        if self.currently_playing.as_ref() == Some(&track) {
            return false;
        }
        self.currently_playing = Some(track);
        true
    }

    pub(crate) fn set_playing(&mut self, is_playing: bool) -> bool {
        match self.currently_playing.as_mut() {
            Some(current) if current.is_playing != is_playing => {
                current.is_playing = is_playing;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn mark_ready(&mut self, track_id: &str) -> bool {
        match self.currently_playing.as_mut() {
            Some(current) if current.track_id() == track_id && current.item.is_loading => {
                current.item.is_loading = false;
                true
            }
            _ => false,
        }
    }
}

/// Chrome flags outside the session core proper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiState {
    pub dark_mode: bool,
    pub navbar_open: bool,
    pub create_playlist_modal_open: bool,
    pub add_tracks_modal_open: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            dark_mode: true,
            navbar_open: false,
            create_playlist_modal_open: false,
            add_tracks_modal_open: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spotify::models::Track;

    #[test]
    fn test_only_newest_generation_commits() {
        let mut slice: Slice<&str> = Slice::default();
        let first = slice.begin();
        let second = slice.begin();

        assert!(slice.resolve(second, "second"));
        assert!(!slice.resolve(first, "first"));
        assert_eq!(slice.value(), Some(&"second"));
        assert_eq!(slice.status(), &LoadStatus::Loaded);
    }

    #[test]
    fn test_reject_keeps_prior_value() {
        let mut slice: Slice<&str> = Slice::default();
        let generation = slice.begin();
        slice.resolve(generation, "kept");

        let generation = slice.begin();
        assert!(slice.reject(generation, "boom".to_string()));
        assert_eq!(slice.value(), Some(&"kept"));
        assert_eq!(slice.error(), Some("boom"));
    }

    #[test]
    fn test_stale_reject_ignored() {
        let mut slice: Slice<&str> = Slice::default();
        let stale = slice.begin();
        slice.begin();
        assert!(!slice.reject(stale, "late".to_string()));
        assert!(slice.is_loading());
    }

    #[test]
    fn test_abandon_restores_status() {
        let mut slice: Slice<&str> = Slice::default();
        let generation = slice.begin();
        assert!(slice.abandon(generation));
        assert_eq!(slice.status(), &LoadStatus::Idle);

        let generation = slice.begin();
        slice.resolve(generation, "value");
        let generation = slice.begin();
        assert!(slice.abandon(generation));
        assert_eq!(slice.status(), &LoadStatus::Loaded);
        assert!(!slice.abandon(generation));
    }

    #[test]
    fn test_player_phases() {
        let mut player = PlayerState::default();
        assert_eq!(player.phase(), PlayerPhase::Idle);
        assert!(!player.set_playing(true));

        player.set_current(CurrentlyPlayingTrack::start(Track::mock("t1", "One"), true));
        assert_eq!(player.phase(), PlayerPhase::Playing);
        assert!(player.is_active("t1"));

        assert!(player.set_playing(false));
        assert_eq!(player.phase(), PlayerPhase::Loaded);
        assert!(!player.set_playing(false));

        assert!(!player.mark_ready("t2"));
        assert!(player.mark_ready("t1"));
        assert!(!player.mark_ready("t1"));
    }
}
