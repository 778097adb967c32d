pub mod entity;
pub mod migration;

use crate::config::DatabaseConfig;
use crate::domain::model::{Page, Participant, ParticipantOrdering, ParticipantQuery, Winner};
use crate::domain::ports::{ParticipantStore, WinnerStore};
use crate::utils::error::{RaffleError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use entity::{participant, winner};
use migration::Migrator;
use sea_orm::sea_query::{Expr, Func, LikeExpr, SimpleExpr};
use sea_orm::{
    ActiveValue::Set, ColumnTrait, Condition, ConnectOptions, Database, DatabaseConnection, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, SqlErr,
};
use sea_orm_migration::MigratorTrait;
use uuid::Uuid;

/// Opens the pool described by `config` and applies pending migrations when enabled.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .sqlx_logging(false);

    let db = Database::connect(options).await?;
    tracing::info!(max_connections = config.max_connections, "Database connected");

    if config.run_migrations {
        Migrator::up(&db, None).await?;
        tracing::info!("Database migrations applied");
    }
    Ok(db)
}

/// sea-orm backed implementation of both stores.
#[derive(Debug, Clone)]
pub struct SeaOrmStore {
    db: DatabaseConnection,
}

impl SeaOrmStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl From<participant::Model> for Participant {
    fn from(m: participant::Model) -> Self {
        Self {
            id: m.id,
            email: m.email,
            full_name: m.full_name,
            phone: m.phone,
            password_hash: m.password_hash,
            is_verified: m.is_verified,
            verification_token: m.verification_token,
            password_token: m.password_token,
            verified_at: m.verified_at,
            is_active: m.is_active,
            is_staff: m.is_staff,
            is_admin: m.is_admin,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

fn participant_row(p: &Participant) -> participant::ActiveModel {
    participant::ActiveModel {
        id: Set(p.id),
        email: Set(p.email.clone()),
        full_name: Set(p.full_name.clone()),
        phone: Set(p.phone.clone()),
        password_hash: Set(p.password_hash.clone()),
        is_verified: Set(p.is_verified),
        verification_token: Set(p.verification_token),
        password_token: Set(p.password_token),
        verified_at: Set(p.verified_at),
        is_active: Set(p.is_active),
        is_staff: Set(p.is_staff),
        is_admin: Set(p.is_admin),
        created_at: Set(p.created_at),
        updated_at: Set(p.updated_at),
    }
}

impl From<winner::Model> for Winner {
    fn from(m: winner::Model) -> Self {
        Self {
            id: m.id,
            participant_id: m.participant_id,
            drawn_at: m.drawn_at,
            drawn_by: m.drawn_by,
            notified: m.notified,
            notified_at: m.notified_at,
            prize_description: m.prize_description,
        }
    }
}

fn winner_row(w: &Winner) -> winner::ActiveModel {
    winner::ActiveModel {
        id: Set(w.id),
        participant_id: Set(w.participant_id),
        drawn_at: Set(w.drawn_at),
        drawn_by: Set(w.drawn_by),
        notified: Set(w.notified),
        notified_at: Set(w.notified_at),
        prize_description: Set(w.prize_description.clone()),
    }
}

/// `%needle%` with the needle lowercased and LIKE wildcards escaped.
fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// `LOWER(col) LIKE pattern`.
fn lower_like(column: participant::Column, pattern: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col((participant::Entity, column))))
        .like(LikeExpr::new(pattern).escape('\\'))
}

#[async_trait]
impl ParticipantStore for SeaOrmStore {
    async fn create(&self, p: Participant) -> Result<Participant> {
        let result = participant::Entity::insert(participant_row(&p))
            .exec_without_returning(&self.db)
            .await;
        match result {
            Ok(_) => Ok(p),
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Err(RaffleError::DuplicateEmail { email: p.email })
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get(&self, id: Uuid) -> Result<Option<Participant>> {
        let row = participant::Entity::find_by_id(id).one(&self.db).await?;
        Ok(row.map(Participant::from))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Participant>> {
        let row = participant::Entity::find()
            .filter(participant::Column::Email.eq(email))
            .one(&self.db)
            .await?;
        Ok(row.map(Participant::from))
    }

    async fn find_by_verification_token(&self, token: Uuid) -> Result<Option<Participant>> {
        let row = participant::Entity::find()
            .filter(participant::Column::VerificationToken.eq(token))
            .one(&self.db)
            .await?;
        Ok(row.map(Participant::from))
    }

    async fn find_by_password_token(&self, token: Uuid) -> Result<Option<Participant>> {
        let row = participant::Entity::find()
            .filter(participant::Column::PasswordToken.eq(token))
            .one(&self.db)
            .await?;
        Ok(row.map(Participant::from))
    }

    async fn save(&self, p: &Participant) -> Result<()> {
        match participant::Entity::update(participant_row(p)).exec(&self.db).await {
            Ok(_) => Ok(()),
            Err(DbErr::RecordNotUpdated | DbErr::RecordNotFound(_)) => Err(RaffleError::NotFound {
                entity: "Participant",
                id: p.id,
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn eligible(&self) -> Result<Vec<Participant>> {
        let rows = participant::Entity::find()
            .filter(participant::Column::IsVerified.eq(true))
            .filter(participant::Column::IsActive.eq(true))
            .filter(participant::Column::IsAdmin.eq(false))
            .order_by_asc(participant::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Participant::from).collect())
    }

    async fn list(&self, query: &ParticipantQuery) -> Result<Page<Participant>> {
        let mut select =
            participant::Entity::find().filter(participant::Column::IsAdmin.eq(false));

        if let Some(verified) = query.is_verified {
            select = select.filter(participant::Column::IsVerified.eq(verified));
        }
        if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let pattern = contains_pattern(search);
            select = select.filter(
                Condition::any()
                    .add(lower_like(participant::Column::Email, &pattern))
                    .add(lower_like(participant::Column::FullName, &pattern))
                    .add(lower_like(participant::Column::Phone, &pattern)),
            );
        }
        select = match query.ordering {
            ParticipantOrdering::CreatedAtAsc => select.order_by_asc(participant::Column::CreatedAt),
            ParticipantOrdering::CreatedAtDesc => select.order_by_desc(participant::Column::CreatedAt),
            ParticipantOrdering::FullNameAsc => select.order_by_asc(participant::Column::FullName),
            ParticipantOrdering::FullNameDesc => select.order_by_desc(participant::Column::FullName),
            ParticipantOrdering::VerifiedAsc => select.order_by_asc(participant::Column::IsVerified),
            ParticipantOrdering::VerifiedDesc => select.order_by_desc(participant::Column::IsVerified),
        };

        let page = query.page.max(1);
        let page_size = query.page_size.max(1);
        let paginator = select.paginate(&self.db, page_size);
        let count = paginator.num_items().await?;
        // 位移超出 i64 代表遠超過最後一頁，且 binder 無法綁定
        let offset = (page - 1)
            .checked_mul(page_size)
            .and_then(|offset| i64::try_from(offset).ok());
        let rows = if offset.is_some() {
            paginator.fetch_page(page - 1).await?
        } else {
            Vec::new()
        };

        Ok(Page {
            count,
            page,
            page_size,
            results: rows.into_iter().map(Participant::from).collect(),
        })
    }

    async fn count(&self, is_verified: Option<bool>) -> Result<u64> {
        let mut select =
            participant::Entity::find().filter(participant::Column::IsAdmin.eq(false));
        if let Some(verified) = is_verified {
            select = select.filter(participant::Column::IsVerified.eq(verified));
        }
        Ok(select.count(&self.db).await?)
    }

    async fn clear_non_admins(&self) -> Result<u64> {
        let result = participant::Entity::delete_many()
            .filter(participant::Column::IsAdmin.eq(false))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }
}

#[async_trait]
impl WinnerStore for SeaOrmStore {
    async fn insert(&self, w: &Winner) -> Result<()> {
        winner::Entity::insert(winner_row(w))
            .exec_without_returning(&self.db)
            .await?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Winner>> {
        let row = winner::Entity::find_by_id(id).one(&self.db).await?;
        Ok(row.map(Winner::from))
    }

    async fn mark_notified(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool> {
        // 只在尚未通知時更新，保證旗標單向
        let result = winner::Entity::update_many()
            .col_expr(winner::Column::Notified, Expr::value(true))
            .col_expr(winner::Column::NotifiedAt, Expr::value(at))
            .filter(winner::Column::Id.eq(id))
            .filter(winner::Column::Notified.eq(false))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected == 1)
    }

    async fn list(&self) -> Result<Vec<Winner>> {
        let rows = winner::Entity::find()
            .order_by_desc(winner::Column::DrawnAt)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Winner::from).collect())
    }

    async fn count(&self) -> Result<u64> {
        Ok(winner::Entity::find().count(&self.db).await?)
    }

    async fn clear(&self) -> Result<u64> {
        let result = winner::Entity::delete_many().exec(&self.db).await?;
        Ok(result.rows_affected)
    }
}
