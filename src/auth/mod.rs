//! Username/password accounts and the cookie session that remembers them.
//!
//! ```text
//! anonymous --login ok--> authenticated(user_id) --logout--> anonymous
//! ```
//!
//! A failed login leaves the session untouched. The only thing stored in the
//! session is the user's id under [`USER_ID_KEY`]; everything else is looked
//! up again on each request by [`current_user`].

mod current_user;
pub mod password;

pub use current_user::{current_user, require_login, CurrentUser};

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet, QueryFilter, Set,
    SqlErr, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::entity::user::{self, ActiveModel as UserActiveModel, Entity as UserEntity};
use crate::error::{Error, Result};

/// Session key holding the authenticated user's id.
pub const USER_ID_KEY: &str = "user_id";

pub const USERNAME_TAKEN: &str = "Username already registered";
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";
pub const NOT_AUTHENTICATED: &str = "Not authenticated";

/// Body of `POST /signup` and `POST /login`.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// The public face of a user. Never carries the hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
}

impl From<user::Model> for UserResponse {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            username: user.username,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UserStore {
    conn: DatabaseConnection,
}

impl UserStore {
    /// Creates a user store over the shared connection pool.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use latam_countries::auth::UserStore;
    /// use sea_orm::Database;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let conn = Database::connect("sqlite://latam_countries.db?mode=rwc").await?;
    /// let users = UserStore::new(conn);
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Registers a new account.
    ///
    /// The password is hashed off the async runtime before the row is
    /// written.
    ///
    /// # Parameters
    ///
    /// * `credentials` - The requested username and the plaintext password.
    ///
    /// # Returns
    ///
    /// * `Ok(user::Model)` - The stored user, with its database-assigned id.
    /// * `Err(Error::Conflict)` - The username is taken. The stored user is
    ///   left untouched, including when two signups race and the unique index
    ///   is what catches the second one.
    /// * `Err(Error::Database)` / `Err(Error::Password)` - Backend failures.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use latam_countries::auth::{Credentials, UserStore};
    ///
    /// # async fn example(users: UserStore) -> latam_countries::Result<()> {
    /// let alice = users
    ///     .signup(Credentials {
    ///         username: "alice".into(),
    ///         password: "secret".into(),
    ///     })
    ///     .await?;
    /// println!("registered user {}", alice.id);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn signup(&self, credentials: Credentials) -> Result<user::Model> {
        let Credentials { username, password } = credentials;

        if self.find_by_username(&username).await?.is_some() {
            return Err(Error::Conflict(USERNAME_TAKEN));
        }

        let hashed_password = password::hash_blocking(password).await?;
        let created = self.insert_user(username, hashed_password).await?;

        tracing::info!(user_id = created.id, username = %created.username, "user registered");
        Ok(created)
    }

    // The unique index on `username` is the final arbiter once the pre-check
    // has passed
    async fn insert_user(&self, username: String, hashed_password: String) -> Result<user::Model> {
        let txn = self.conn.begin().await?;
        let created = UserActiveModel {
            id: NotSet,
            username: Set(username),
            hashed_password: Set(hashed_password),
        }
        .insert(&txn)
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => Error::Conflict(USERNAME_TAKEN),
            _ => Error::Database(e),
        })?;
        txn.commit().await?;
        Ok(created)
    }

    /// Checks a username/password pair.
    ///
    /// Unknown usernames still pay for one Argon2 verification against a
    /// throwaway hash, so response time does not reveal which usernames exist.
    ///
    /// # Parameters
    ///
    /// * `credentials` - The username and plaintext password to check.
    ///
    /// # Returns
    ///
    /// * `Ok(user::Model)` - The matching user.
    /// * `Err(Error::Unauthorized)` - Unknown username or wrong password; both
    ///   cases produce the same error.
    pub async fn authenticate(&self, credentials: Credentials) -> Result<user::Model> {
        let Credentials { username, password } = credentials;

        let Some(user) = self.find_by_username(&username).await? else {
            let decoy = password::dummy_hash().await?;
            password::verify_blocking(password, decoy).await?;
            tracing::warn!(%username, "login failed");
            return Err(Error::Unauthorized(INVALID_CREDENTIALS));
        };

        if !password::verify_blocking(password, user.hashed_password.clone()).await? {
            tracing::warn!(%username, "login failed");
            return Err(Error::Unauthorized(INVALID_CREDENTIALS));
        }

        Ok(user)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<user::Model>> {
        Ok(UserEntity::find_by_id(id).one(&self.conn).await?)
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<user::Model>> {
        Ok(UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.conn)
            .await?)
    }
}

/// Binds the session to `user`.
///
/// The session id is rotated first so an id planted before login is worthless
/// afterwards.
pub async fn log_in(session: &Session, user: &user::Model) -> Result<()> {
    session.cycle_id().await?;
    session.insert(USER_ID_KEY, user.id).await?;
    tracing::info!(user_id = user.id, "logged in");
    Ok(())
}

/// Drops all session state and deletes the stored record. Fine to call on a
/// session that never existed.
pub async fn log_out(session: &Session) -> Result<()> {
    session.flush().await?;
    tracing::info!("logged out");
    Ok(())
}
