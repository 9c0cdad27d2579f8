use async_trait::async_trait;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    Set, TransactionTrait,
};
use time::OffsetDateTime;
use tower_sessions::{session::Id, session::Record, session_store, ExpiredDeletion, SessionStore};

use crate::entity::session::{self, ActiveModel as SessionActiveModel, Entity as SessionEntity};

/// Server-side session storage for `tower-sessions`, persisted through Sea-ORM.
///
/// The cookie handed to the client only carries the session [`Id`]; the
/// session contents (for this service, the authenticated `user_id`) live in the
/// `sessions` table. Records are serialized with MessagePack.
///
/// Works on any backend the crate is built for (sqlite, postgres) since the
/// queries only go through the [`session`] entity.
///
/// # Error Mapping
///
/// - Database errors → `session_store::Error::Backend`
/// - Serialization errors → `session_store::Error::Encode`
/// - Deserialization errors → `session_store::Error::Decode`
#[derive(Debug, Clone)]
pub struct SeaOrmStore {
    conn: DatabaseConnection,
}

impl SeaOrmStore {
    /// Creates a session store over an existing Sea-ORM connection.
    ///
    /// The `sessions` table must already exist; it is created by the crate's
    /// [`Migrator`](crate::migration::Migrator).
    ///
    /// # Parameters
    ///
    /// * `conn` - A Sea-ORM `DatabaseConnection`, usually the same pool the
    ///   rest of the service uses.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use latam_countries::SeaOrmStore;
    /// use sea_orm::Database;
    /// use time::Duration;
    /// use tower_sessions::{Expiry, SessionManagerLayer};
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let conn = Database::connect("sqlite://latam_countries.db?mode=rwc").await?;
    /// let store = SeaOrmStore::new(conn);
    ///
    /// let session_layer = SessionManagerLayer::new(store)
    ///     .with_expiry(Expiry::OnInactivity(Duration::hours(24)));
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl SessionStore for SeaOrmStore {
    /// Inserts a new session record.
    ///
    /// The id check and the insert share a transaction; on collision a fresh
    /// [`Id`] is generated until it is unused.
    ///
    /// # Parameters
    ///
    /// * `record` - The record to store. Its `id` may be replaced.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The session was stored under `record.id`.
    /// * `Err(session_store::Error)` - `Backend` for database failures,
    ///   `Encode` if the record cannot be serialized.
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        let txn = self.conn.begin().await.map_err(backend)?;

        while SessionEntity::find_by_id(record.id.to_string())
            .one(&txn)
            .await
            .map_err(backend)?
            .is_some()
        {
            record.id = Id::default();
        }

        let data =
            rmp_serde::to_vec(record).map_err(|e| session_store::Error::Encode(e.to_string()))?;
        let expiry_date = convert_time_to_datetime(record.expiry_date)?;

        SessionActiveModel {
            id: Set(record.id.to_string()),
            data: Set(data),
            expiry_date: Set(expiry_date),
        }
        .insert(&txn)
        .await
        .map_err(backend)?;

        txn.commit().await.map_err(backend)?;

        tracing::debug!(session_id = %record.id, "session created");
        Ok(())
    }

    /// Upserts the session record.
    async fn save(&self, record: &Record) -> session_store::Result<()> {
        let data =
            rmp_serde::to_vec(record).map_err(|e| session_store::Error::Encode(e.to_string()))?;
        let expiry_date = convert_time_to_datetime(record.expiry_date)?;

        let txn = self.conn.begin().await.map_err(backend)?;

        match SessionEntity::find_by_id(record.id.to_string())
            .one(&txn)
            .await
            .map_err(backend)?
        {
            Some(existing) => {
                let mut active_model = existing.into_active_model();
                active_model.data = Set(data);
                active_model.expiry_date = Set(expiry_date);
                active_model.update(&txn).await.map_err(backend)?;
            }
            None => {
                SessionActiveModel {
                    id: Set(record.id.to_string()),
                    data: Set(data),
                    expiry_date: Set(expiry_date),
                }
                .insert(&txn)
                .await
                .map_err(backend)?;
            }
        }

        txn.commit().await.map_err(backend)?;
        Ok(())
    }

    /// Loads a session by ID.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(Record))` - The session exists and has not expired.
    /// * `Ok(None)` - Unknown id, or the session is past its expiry date.
    /// * `Err(session_store::Error)` - `Backend` for database failures,
    ///   `Decode` if the stored bytes are not a valid record.
    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        let now_db = convert_time_to_datetime(OffsetDateTime::now_utc())?;

        let session = SessionEntity::find_by_id(session_id.to_string())
            .filter(session::Column::ExpiryDate.gt(now_db))
            .one(&self.conn)
            .await
            .map_err(backend)?;

        match session {
            Some(model) => {
                let record = rmp_serde::from_slice(&model.data)
                    .map_err(|e| session_store::Error::Decode(e.to_string()))?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// Deletes a session; deleting an unknown id is not an error.
    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        SessionEntity::delete_by_id(session_id.to_string())
            .exec(&self.conn)
            .await
            .map_err(backend)?;

        tracing::debug!(session_id = %session_id, "session deleted");
        Ok(())
    }
}

#[async_trait]
impl ExpiredDeletion for SeaOrmStore {
    /// Bulk-deletes every session whose expiry date is in the past.
    ///
    /// Run periodically by [`spawn_session_cleanup`](crate::app::spawn_session_cleanup).
    async fn delete_expired(&self) -> session_store::Result<()> {
        let now_db = convert_time_to_datetime(OffsetDateTime::now_utc())?;

        let res = SessionEntity::delete_many()
            .filter(session::Column::ExpiryDate.lt(now_db))
            .exec(&self.conn)
            .await
            .map_err(backend)?;

        tracing::debug!(removed = res.rows_affected, "expired sessions swept");
        Ok(())
    }
}

fn backend(e: sea_orm::DbErr) -> session_store::Error {
    session_store::Error::Backend(e.to_string())
}

// time::OffsetDateTime -> chrono based DateTimeWithTimeZone, always in UTC so
// stored values compare correctly on backends that keep them as text
fn convert_time_to_datetime(time: OffsetDateTime) -> session_store::Result<DateTimeWithTimeZone> {
    chrono::DateTime::from_timestamp(time.unix_timestamp(), time.nanosecond())
        .map(Into::into)
        .ok_or_else(|| {
            session_store::Error::Encode(format!("expiry date {time} out of range"))
        })
}
