//! Country repository.
//!
//! Each mutating call runs in its own transaction on a pooled connection that
//! is returned when the call finishes, whatever the outcome.

use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, IntoActiveModel, NotSet, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};

use crate::entity::country::{self, ActiveModel as CountryActiveModel, Entity as CountryEntity};
use crate::error::{Error, Result};

pub const COUNTRY_NOT_FOUND: &str = "Country not found";

/// Body of `POST /countries` and `PUT /countries/{id}`. All fields required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryInput {
    pub name: String,
    pub capital: String,
    pub population: i64,
    pub typical_dish: String,
}

impl CountryInput {
    // Overwrites every column except the primary key
    fn apply(self, model: &mut CountryActiveModel) {
        model.name = Set(self.name);
        model.capital = Set(self.capital);
        model.population = Set(self.population);
        model.typical_dish = Set(self.typical_dish);
    }
}

/// Repository over the `countries` table.
///
/// Ids arrive as `i64` so any 64-bit integer a client sends is a lookup key;
/// ids the column cannot hold were never issued and are reported as
/// [`Error::NotFound`] without touching the database.
#[derive(Debug, Clone)]
pub struct CountryStore {
    conn: DatabaseConnection,
}

impl CountryStore {
    /// Creates a country store over the shared connection pool.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use latam_countries::country::CountryStore;
    /// use sea_orm::Database;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let conn = Database::connect("sqlite://latam_countries.db?mode=rwc").await?;
    /// let countries = CountryStore::new(conn);
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// All countries, ordered by id. Empty when nothing is stored.
    pub async fn list(&self) -> Result<Vec<country::Model>> {
        Ok(CountryEntity::find()
            .order_by_asc(country::Column::Id)
            .all(&self.conn)
            .await?)
    }

    /// Inserts a country.
    ///
    /// # Parameters
    ///
    /// * `input` - Every field of the new country except its id.
    ///
    /// # Returns
    ///
    /// * `Ok(country::Model)` - The stored row, including the id assigned by
    ///   the database.
    /// * `Err(Error::Database)` - The insert or its transaction failed.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use latam_countries::country::{CountryInput, CountryStore};
    ///
    /// # async fn example(countries: CountryStore) -> latam_countries::Result<()> {
    /// let peru = countries
    ///     .create(CountryInput {
    ///         name: "Peru".into(),
    ///         capital: "Lima".into(),
    ///         population: 33_000_000,
    ///         typical_dish: "Ceviche".into(),
    ///     })
    ///     .await?;
    /// assert_eq!(countries.get(peru.id.into()).await?, peru);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn create(&self, input: CountryInput) -> Result<country::Model> {
        let model = CountryActiveModel {
            id: NotSet,
            name: Set(input.name),
            capital: Set(input.capital),
            population: Set(input.population),
            typical_dish: Set(input.typical_dish),
        };

        let txn = self.conn.begin().await?;
        let created = model.insert(&txn).await?;
        txn.commit().await?;

        tracing::info!(country_id = created.id, name = %created.name, "country created");
        Ok(created)
    }

    /// Fetches one country; [`Error::NotFound`] if the id was never issued or
    /// has been deleted.
    pub async fn get(&self, id: i64) -> Result<country::Model> {
        CountryEntity::find_by_id(row_id(id)?)
            .one(&self.conn)
            .await?
            .ok_or(Error::NotFound(COUNTRY_NOT_FOUND))
    }

    /// Full replacement of an existing country.
    ///
    /// The existence check and the overwrite share one transaction, and a
    /// missing id never results in an insert.
    ///
    /// # Parameters
    ///
    /// * `id` - The country to overwrite.
    /// * `input` - The new values for every field but `id`.
    ///
    /// # Returns
    ///
    /// * `Ok(country::Model)` - The row as stored after the update.
    /// * `Err(Error::NotFound)` - No country has this id.
    /// * `Err(Error::Database)` - Backend failure.
    pub async fn update(&self, id: i64, input: CountryInput) -> Result<country::Model> {
        let key = row_id(id)?;
        let txn = self.conn.begin().await?;

        let existing = CountryEntity::find_by_id(key)
            .one(&txn)
            .await?
            .ok_or(Error::NotFound(COUNTRY_NOT_FOUND))?;

        let mut model = existing.into_active_model();
        input.apply(&mut model);
        let updated = model.update(&txn).await?;
        txn.commit().await?;

        tracing::debug!(country_id = id, "country updated");
        Ok(updated)
    }

    /// Permanently removes a country; [`Error::NotFound`] if absent.
    pub async fn delete(&self, id: i64) -> Result<()> {
        let key = row_id(id)?;
        let txn = self.conn.begin().await?;
        let res = CountryEntity::delete_by_id(key).exec(&txn).await?;
        if res.rows_affected == 0 {
            return Err(Error::NotFound(COUNTRY_NOT_FOUND));
        }
        txn.commit().await?;

        tracing::info!(country_id = id, "country deleted");
        Ok(())
    }
}

// Ids outside the column's range cannot have been issued
fn row_id(id: i64) -> Result<i32> {
    i32::try_from(id).map_err(|_| Error::NotFound(COUNTRY_NOT_FOUND))
}

#[cfg(test)]
mod tests {
    use sea_orm::{ConnectOptions, Database};
    use sea_orm_migration::MigratorTrait;

    use super::*;
    use crate::migration::Migrator;

    async fn store() -> CountryStore {
        let mut opt = ConnectOptions::new("sqlite::memory:");
        opt.max_connections(1).sqlx_logging(false);
        let conn = Database::connect(opt).await.unwrap();
        Migrator::up(&conn, None).await.unwrap();
        CountryStore::new(conn)
    }

    fn peru() -> CountryInput {
        CountryInput {
            name: "Peru".into(),
            capital: "Lima".into(),
            population: 33_000_000,
            typical_dish: "Ceviche".into(),
        }
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let store = store().await;
        let first = store.create(peru()).await.unwrap();
        store.delete(first.id.into()).await.unwrap();
        let second = store.create(peru()).await.unwrap();
        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn update_of_missing_country_does_not_insert() {
        let store = store().await;
        let err = store.update(42, peru()).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(COUNTRY_NOT_FOUND)));
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_replaces_every_field() {
        let store = store().await;
        let created = store.create(peru()).await.unwrap();
        let chile = CountryInput {
            name: "Chile".into(),
            capital: "Santiago".into(),
            population: 19_000_000,
            typical_dish: "Pastel de choclo".into(),
        };

        let updated = store.update(created.id.into(), chile.clone()).await.unwrap();
        assert_eq!(
            updated,
            country::Model {
                id: created.id,
                name: chile.name,
                capital: chile.capital,
                population: chile.population,
                typical_dish: chile.typical_dish,
            }
        );
        assert_eq!(store.get(created.id.into()).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn list_is_ordered_by_id() {
        let store = store().await;
        let a = store.create(peru()).await.unwrap();
        let b = store.create(peru()).await.unwrap();
        let ids: Vec<i32> = store.list().await.unwrap().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![a.id, b.id]);
    }

    #[tokio::test]
    async fn ids_beyond_column_range_are_not_found() {
        let store = store().await;
        store.create(peru()).await.unwrap();
        let huge = 99_999_999_999;

        assert!(matches!(
            store.get(huge).await.unwrap_err(),
            Error::NotFound(COUNTRY_NOT_FOUND)
        ));
        assert!(matches!(
            store.update(huge, peru()).await.unwrap_err(),
            Error::NotFound(COUNTRY_NOT_FOUND)
        ));
        assert!(matches!(
            store.delete(i64::MIN).await.unwrap_err(),
            Error::NotFound(COUNTRY_NOT_FOUND)
        ));
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let store = store().await;
        assert!(matches!(
            store.delete(1).await.unwrap_err(),
            Error::NotFound(COUNTRY_NOT_FOUND)
        ));
    }
}
