use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use tracing::debug;

use crate::{
    entities::{appearance, episode, guest},
    error::AppResult,
    models::{AppearanceNode, EpisodeNode, GuestNode, NewAppearance, ValidationError},
};

#[derive(Clone)]
pub struct Repository {
    db: DatabaseConnection,
}

impl Repository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub async fn list_episodes(&self) -> AppResult<Vec<EpisodeNode>> {
        let rows = episode::Entity::find().order_by_asc(episode::Column::Id).all(&self.db).await?;
        Ok(rows.into_iter().map(EpisodeNode::bare).collect())
    }

    pub async fn list_guests(&self) -> AppResult<Vec<GuestNode>> {
        let rows = guest::Entity::find().order_by_asc(guest::Column::Id).all(&self.db).await?;
        Ok(rows.into_iter().map(GuestNode::bare).collect())
    }

    pub async fn list_appearances(&self) -> AppResult<Vec<AppearanceNode>> {
        let rows =
            appearance::Entity::find().order_by_asc(appearance::Column::Id).all(&self.db).await?;
        Ok(rows.into_iter().map(AppearanceNode::bare).collect())
    }

    /// Loads the episode, its appearances, and each appearance's guest.
    pub async fn find_episode(&self, id: i32) -> AppResult<Option<EpisodeNode>> {
        let Some(ep) = episode::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let rows = ep
            .find_related(appearance::Entity)
            .order_by_asc(appearance::Column::Id)
            .find_also_related(guest::Entity)
            .all(&self.db)
            .await?;

        let appearances = rows
            .into_iter()
            .map(|(app, guest)| AppearanceNode {
                appearance: app,
                episode: None,
                guest: guest.map(|g| Box::new(GuestNode::bare(g))),
            })
            .collect();

        Ok(Some(EpisodeNode { episode: ep, appearances: Some(appearances) }))
    }

    /// Loads the guest, its appearances, and each appearance's episode.
    pub async fn find_guest(&self, id: i32) -> AppResult<Option<GuestNode>> {
        let Some(g) = guest::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let rows = g
            .find_related(appearance::Entity)
            .order_by_asc(appearance::Column::Id)
            .find_also_related(episode::Entity)
            .all(&self.db)
            .await?;

        let appearances = rows
            .into_iter()
            .map(|(app, ep)| AppearanceNode {
                appearance: app,
                episode: ep.map(|e| Box::new(EpisodeNode::bare(e))),
                guest: None,
            })
            .collect();

        Ok(Some(GuestNode { guest: g, appearances: Some(appearances) }))
    }

    /// Validates, then inserts inside a transaction after confirming both
    /// parents exist. Nothing is written when any check fails.
    pub async fn create_appearance(&self, new: NewAppearance) -> AppResult<AppearanceNode> {
        let rating = new.validate()?;

        let txn = self.db.begin().await?;

        let Some(ep) = episode::Entity::find_by_id(new.episode_id).one(&txn).await? else {
            return Err(ValidationError::UnknownEpisode(new.episode_id).into());
        };
        let Some(g) = guest::Entity::find_by_id(new.guest_id).one(&txn).await? else {
            return Err(ValidationError::UnknownGuest(new.guest_id).into());
        };

        let model = appearance::ActiveModel {
            id: Default::default(),
            rating: Set(rating),
            episode_id: Set(ep.id),
            guest_id: Set(g.id),
        };
        let res = appearance::Entity::insert(model).exec(&txn).await?;

        txn.commit().await?;

        debug!(id = res.last_insert_id, episode_id = ep.id, guest_id = g.id, "created appearance");

        Ok(AppearanceNode {
            appearance: appearance::Model {
                id: res.last_insert_id,
                rating,
                episode_id: ep.id,
                guest_id: g.id,
            },
            episode: Some(Box::new(EpisodeNode::bare(ep))),
            guest: Some(Box::new(GuestNode::bare(g))),
        })
    }

    /// Removes the episode and every appearance referencing it. Returns
    /// `false` without touching anything when the episode does not exist.
    pub async fn delete_episode(&self, id: i32) -> AppResult<bool> {
        let txn = self.db.begin().await?;

        if episode::Entity::find_by_id(id).one(&txn).await?.is_none() {
            return Ok(false);
        }

        let removed = appearance::Entity::delete_many()
            .filter(appearance::Column::EpisodeId.eq(id))
            .exec(&txn)
            .await?;
        episode::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;

        debug!(id, appearances = removed.rows_affected, "deleted episode");
        Ok(true)
    }

    pub async fn delete_guest(&self, id: i32) -> AppResult<bool> {
        let txn = self.db.begin().await?;

        if guest::Entity::find_by_id(id).one(&txn).await?.is_none() {
            return Ok(false);
        }

        let removed = appearance::Entity::delete_many()
            .filter(appearance::Column::GuestId.eq(id))
            .exec(&txn)
            .await?;
        guest::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;

        debug!(id, appearances = removed.rows_affected, "deleted guest");
        Ok(true)
    }

    /// Clears all three tables and loads the starter dataset. Ids are fixed
    /// so a reseeded database always looks the same.
    pub async fn seed(&self) -> AppResult<()> {
        let txn = self.db.begin().await?;

        appearance::Entity::delete_many().exec(&txn).await?;
        episode::Entity::delete_many().exec(&txn).await?;
        guest::Entity::delete_many().exec(&txn).await?;

        let episodes = [(1, "1/11/99", 1), (2, "1/12/99", 2)];
        for (id, date, number) in episodes {
            let model = episode::ActiveModel {
                id: Set(id),
                date: Set(date.to_string()),
                number: Set(number),
            };
            episode::Entity::insert(model).exec(&txn).await?;
        }

        let guests = [
            (1, "Michael J. Fox", "actor"),
            (2, "Sandra Bernhard", "Comedian"),
            (3, "Tracey Ullman", "television actress"),
        ];
        for (id, name, occupation) in guests {
            let model = guest::ActiveModel {
                id: Set(id),
                name: Set(name.to_string()),
                occupation: Set(occupation.to_string()),
            };
            guest::Entity::insert(model).exec(&txn).await?;
        }

        let appearances = [(1, 4, 1, 1), (2, 5, 2, 3)];
        for (id, rating, episode_id, guest_id) in appearances {
            let model = appearance::ActiveModel {
                id: Set(id),
                rating: Set(rating),
                episode_id: Set(episode_id),
                guest_id: Set(guest_id),
            };
            appearance::Entity::insert(model).exec(&txn).await?;
        }

        txn.commit().await?;

        debug!(
            episodes = episodes.len(),
            guests = guests.len(),
            appearances = appearances.len(),
            "seeded database"
        );
        Ok(())
    }
}
