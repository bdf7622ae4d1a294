use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Episodes::Table)
                    .if_not_exists()
                    .col(pk_auto(Episodes::Id))
                    .col(string(Episodes::Date))
                    .col(integer(Episodes::Number))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Guests::Table)
                    .if_not_exists()
                    .col(pk_auto(Guests::Id))
                    .col(string(Guests::Name))
                    .col(string(Guests::Occupation))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Appearances::Table)
                    .if_not_exists()
                    .col(pk_auto(Appearances::Id))
                    .col(integer(Appearances::Rating))
                    .col(integer(Appearances::EpisodeId))
                    .col(integer(Appearances::GuestId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_appearances_episode_id_episodes")
                            .from(Appearances::Table, Appearances::EpisodeId)
                            .to(Episodes::Table, Episodes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_appearances_guest_id_guests")
                            .from(Appearances::Table, Appearances::GuestId)
                            .to(Guests::Table, Guests::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_appearances_episode_id")
                    .table(Appearances::Table)
                    .col(Appearances::EpisodeId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_appearances_guest_id")
                    .table(Appearances::Table)
                    .col(Appearances::GuestId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Appearances::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Guests::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Episodes::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Episodes {
    Table,
    Id,
    Date,
    Number,
}

#[derive(DeriveIden)]
enum Guests {
    Table,
    Id,
    Name,
    Occupation,
}

#[derive(DeriveIden)]
enum Appearances {
    Table,
    Id,
    Rating,
    EpisodeId,
    GuestId,
}
