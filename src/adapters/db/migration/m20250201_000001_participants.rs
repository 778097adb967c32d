use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Participants::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Participants::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Participants::Email)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Participants::FullName).string_len(200).not_null())
                    .col(ColumnDef::new(Participants::Phone).string_len(20).not_null())
                    .col(ColumnDef::new(Participants::PasswordHash).string())
                    .col(
                        ColumnDef::new(Participants::IsVerified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Participants::VerificationToken).uuid().not_null())
                    .col(ColumnDef::new(Participants::PasswordToken).uuid())
                    .col(ColumnDef::new(Participants::VerifiedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Participants::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Participants::IsStaff)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Participants::IsAdmin)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Participants::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Participants::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_participants_is_verified")
                    .table(Participants::Table)
                    .col(Participants::IsVerified)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_participants_created_at")
                    .table(Participants::Table)
                    .col(Participants::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_participants_verification_token")
                    .table(Participants::Table)
                    .col(Participants::VerificationToken)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Participants::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(super) enum Participants {
    Table,
    Id,
    Email,
    FullName,
    Phone,
    PasswordHash,
    IsVerified,
    VerificationToken,
    PasswordToken,
    VerifiedAt,
    IsActive,
    IsStaff,
    IsAdmin,
    CreatedAt,
    UpdatedAt,
}
