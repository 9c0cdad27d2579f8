//! Country entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A country as stored in the `countries` table and returned by the API.
///
/// The `id` column is assigned by the database (autoincrement on sqlite, a
/// sequence on postgres) and never reused, so the application never computes
/// identifiers itself.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "countries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub capital: String,
    pub population: i64,
    pub typical_dish: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
