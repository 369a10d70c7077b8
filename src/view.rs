//! View lifecycles: what a screen starts when it mounts and cancels when it
//! goes away.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use crate::config::Timings;
use crate::error::Result;
use crate::session::{FetchOutcome, Session};
use crate::task::ScheduledTask;

/// Per-view loading flags used purely for smoothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewFlags {
    pub show_animated_loader: bool,
    pub is_loading: bool,
}

impl Default for ViewFlags {
    fn default() -> Self {
        Self {
            show_animated_loader: true,
            is_loading: true,
        }
    }
}

/// A mounted view. Dropping it cancels its timers and pending fetches.
pub struct MountedView {
    name: &'static str,
    flags: watch::Receiver<ViewFlags>,
    tasks: Vec<ScheduledTask>,
}

impl MountedView {
    fn start(name: &'static str, timings: Timings) -> (Self, Arc<watch::Sender<ViewFlags>>) {
        let (tx, rx) = watch::channel(ViewFlags::default());
        let tx = Arc::new(tx);

        let loader = tx.clone();
        let loader_timer = ScheduledTask::after("animated-loader", timings.loader_min_display, move || {
            loader.send_modify(|flags| flags.show_animated_loader = false);
        });

        let view = Self {
            name,
            flags: rx,
            tasks: vec![loader_timer],
        };
        (view, tx)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn flags(&self) -> ViewFlags {
        *self.flags.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewFlags> {
        self.flags.clone()
    }

    /// Play a row of this view; the item carries the view's loading flag.
    pub fn play_track(&self, session: &Session, track_id: &str) -> Result<()> {
        session.play_track(track_id, self.flags().is_loading)
    }

    pub fn unmount(self) {
        debug!("Unmounting {} view", self.name);
    }
}

impl Drop for MountedView {
    fn drop(&mut self) {
        for task in self.tasks.drain(..) {
            task.cancel();
        }
    }
}

pub struct HomeView;

impl HomeView {
    /// Trending albums and popular artists load side by side; each clears
    /// `is_loading` on its own schedule.
    pub fn mount(session: &Session, timings: Timings) -> MountedView {
        let (mut view, flags) = MountedView::start("home", timings);

        if !session.is_authenticated() {
            debug!("Home mounted without an access token; nothing to load");
            return view;
        }

        let albums_session = session.clone();
        let albums_flags = flags.clone();
        view.tasks.push(ScheduledTask::spawn("trending-albums", async move {
            if let Ok(FetchOutcome::Committed) = albums_session.load_trending_albums().await {
                tokio::time::sleep(timings.loading_grace).await;
                albums_flags.send_modify(|f| f.is_loading = false);
            }
        }));

        let artists_session = session.clone();
        view.tasks.push(ScheduledTask::spawn("popular-artists", async move {
            if let Ok(FetchOutcome::Committed) = artists_session.load_popular_artists().await {
                tokio::time::sleep(timings.loading_grace).await;
                flags.send_modify(|f| f.is_loading = false);
            }
        }));

        view
    }
}

pub struct PlaylistView;

impl PlaylistView {
    pub fn mount(session: &Session, playlist_id: &str, timings: Timings) -> MountedView {
        let (mut view, flags) = MountedView::start("playlist", timings);

        if !session.is_authenticated() || playlist_id.is_empty() {
            debug!("Playlist view has nothing to load");
            return view;
        }

        let session = session.clone();
        let playlist_id = playlist_id.to_string();
        view.tasks.push(ScheduledTask::spawn("playlist", async move {
            if let Ok(FetchOutcome::Committed) = session.load_playlist(&playlist_id).await {
                tokio::time::sleep(timings.loading_grace).await;
                flags.send_modify(|f| f.is_loading = false);
                settle_playing_item(&session);
            }
        }));

        view
    }
}

/// Once the playlist's loading grace ends, an item started from it is ready.
fn settle_playing_item(session: &Session) {
    let ready = session.store().read(|state| {
        let current = state.player.currently_playing()?;
        let playlist = state.current_playlist.value()?;
        playlist
            .find_track(current.track_id())
            .map(|track| track.id.clone())
    });
    if let Some(track_id) = ready {
        session.mark_track_ready(&track_id);
    }
}
