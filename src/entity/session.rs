//! Session entity model for Sea-ORM database interaction.
//!
//! Maps to the `sessions` table created by the crate's migrator. No schema is
//! pinned so the same entity works on sqlite and postgres.

use sea_orm::entity::prelude::*;

/// A persisted session.
///
/// | Column      | Type               | Description                          |
/// |-------------|--------------------|--------------------------------------|
/// | id          | TEXT (Primary Key) | Session ID, the cookie value         |
/// | data        | BLOB / BYTEA       | MessagePack encoded session record   |
/// | expiry_date | TIMESTAMPTZ        | Instant after which the row is dead  |
///
/// Rows are only read and written by [`SeaOrmStore`](crate::session_store::SeaOrmStore).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "sessions")]
pub struct Model {
    /// String form of `tower_sessions::session::Id`.
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub id: String,

    /// The whole `tower_sessions::session::Record`, MessagePack encoded.
    pub data: Vec<u8>,

    /// Expired sessions are filtered out on load and swept by
    /// `ExpiredDeletion::delete_expired`.
    pub expiry_date: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
