pub mod client;
pub mod models;

pub use client::{SpotifyWebClient, WebApi};
pub use models::{
    Album, Artist, ArtistRef, CurrentlyPlayingTrack, Image, Owner, PlayingItem, Playlist,
    PlaylistSummary, PlaylistTrack, Token, TokenResponse, Track, UserProfile,
};
