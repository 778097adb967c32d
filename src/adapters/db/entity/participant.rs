use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Raffle participants and administrators share this table.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "participants")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(unique)]
    pub email: String,

    pub full_name: String,

    pub phone: String,

    /// `pbkdf2_sha256$iterations$salt$hash`; `None` until set-password.
    pub password_hash: Option<String>,

    pub is_verified: bool,

    /// Spent once the email is verified.
    pub verification_token: Uuid,

    /// Issued at verification, cleared when the password is set.
    pub password_token: Option<Uuid>,

    pub verified_at: Option<DateTimeUtc>,

    pub is_active: bool,

    pub is_staff: bool,

    pub is_admin: bool,

    pub created_at: DateTimeUtc,

    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
