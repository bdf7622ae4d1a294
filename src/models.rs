use serde::Deserialize;

use crate::entities::{appearance, episode, guest};

pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 5;

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("rating must be between 1 and 5, got {0}")]
    RatingOutOfRange(i64),

    #[error("episode {0} does not exist")]
    UnknownEpisode(i32),

    #[error("guest {0} does not exist")]
    UnknownGuest(i32),

    #[error("malformed request body: {0}")]
    MalformedBody(String),
}

/// Checked before every write of an appearance rating.
pub fn validate_rating(rating: i64) -> Result<i32, ValidationError> {
    if (MIN_RATING..=MAX_RATING).contains(&rating) {
        // Bounded to 1..=5 above.
        Ok(rating as i32)
    } else {
        Err(ValidationError::RatingOutOfRange(rating))
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewAppearance {
    pub rating: i64,
    pub episode_id: i32,
    pub guest_id: i32,
}

impl NewAppearance {
    pub fn validate(&self) -> Result<i32, ValidationError> {
        validate_rating(self.rating)
    }
}

/// An episode together with whatever relations were explicitly loaded.
/// `None` means the relation was not fetched, not that it is empty.
#[derive(Clone, Debug)]
pub struct EpisodeNode {
    pub episode: episode::Model,
    pub appearances: Option<Vec<AppearanceNode>>,
}

#[derive(Clone, Debug)]
pub struct GuestNode {
    pub guest: guest::Model,
    pub appearances: Option<Vec<AppearanceNode>>,
}

#[derive(Clone, Debug)]
pub struct AppearanceNode {
    pub appearance: appearance::Model,
    pub episode: Option<Box<EpisodeNode>>,
    pub guest: Option<Box<GuestNode>>,
}

impl EpisodeNode {
    pub fn bare(episode: episode::Model) -> Self {
        Self { episode, appearances: None }
    }
}

impl GuestNode {
    pub fn bare(guest: guest::Model) -> Self {
        Self { guest, appearances: None }
    }
}

impl AppearanceNode {
    pub fn bare(appearance: appearance::Model) -> Self {
        Self { appearance, episode: None, guest: None }
    }
}
