use sea_orm_migration::prelude::*;

use super::m20250201_000001_participants::Participants;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Winners::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Winners::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Winners::ParticipantId).uuid().not_null())
                    .col(
                        ColumnDef::new(Winners::DrawnAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Winners::DrawnBy).uuid())
                    .col(
                        ColumnDef::new(Winners::Notified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Winners::NotifiedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Winners::PrizeDescription).text().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_winners_participant_id")
                            .from(Winners::Table, Winners::ParticipantId)
                            .to(Participants::Table, Participants::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_winners_drawn_by")
                            .from(Winners::Table, Winners::DrawnBy)
                            .to(Participants::Table, Participants::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_winners_drawn_at")
                    .table(Winners::Table)
                    .col(Winners::DrawnAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Winners::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Winners {
    Table,
    Id,
    ParticipantId,
    DrawnAt,
    DrawnBy,
    Notified,
    NotifiedAt,
    PrizeDescription,
}
