use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One row per draw. Only `notified` / `notified_at` change after insert.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "winners")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub participant_id: Uuid,

    pub drawn_at: DateTimeUtc,

    /// Operator who ran the draw; nulled if that account is deleted.
    pub drawn_by: Option<Uuid>,

    pub notified: bool,

    pub notified_at: Option<DateTimeUtc>,

    #[sea_orm(column_type = "Text")]
    pub prize_description: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::participant::Entity",
        from = "Column::ParticipantId",
        to = "super::participant::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Participant,
    #[sea_orm(
        belongs_to = "super::participant::Entity",
        from = "Column::DrawnBy",
        to = "super::participant::Column::Id",
        on_update = "Cascade",
        on_delete = "SetNull"
    )]
    DrawnBy,
}

impl ActiveModelBehavior for ActiveModel {}
