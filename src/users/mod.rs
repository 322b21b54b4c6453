//! Read-only view of the people who sign in. Accounts are created
//! elsewhere; the CLI can insert rows for local development.

use async_trait::async_trait;
use rusqlite::OptionalExtension;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::{Connection, params};

use crate::events::{StoreError, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn lookup_user(&self, id: &UserId) -> Result<Option<User>, StoreError>;

    async fn insert_user(&self, user: &User) -> Result<(), StoreError>;
}

#[derive(Clone)]
pub struct SqliteUserDirectory {
    db: Connection,
}

impl SqliteUserDirectory {
    pub fn new(db: Connection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserDirectory for SqliteUserDirectory {
    async fn lookup_user(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        let user_id = id.to_string();
        let user = self
            .db
            .call(move |conn| {
                let user = conn
                    .query_row(
                        "SELECT id, first_name, last_name, email FROM user WHERE id = ?1",
                        [&user_id],
                        |row| {
                            Ok(User {
                                id: UserId::from(row.get::<_, String>(0)?),
                                first_name: row.get(1)?,
                                last_name: row.get(2)?,
                                email: row.get(3)?,
                            })
                        },
                    )
                    .optional()?;
                Ok(user)
            })
            .await?;
        Ok(user)
    }

    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        let User {
            id,
            first_name,
            last_name,
            email,
        } = user.clone();
        self.db
            .call(move |conn| {
                conn.execute(
                    r"
                    INSERT INTO user (id, first_name, last_name, email)
                    VALUES (?1, ?2, ?3, ?4)
                    ON CONFLICT(id) DO UPDATE SET
                        first_name = excluded.first_name,
                        last_name = excluded.last_name,
                        email = excluded.email
                    ",
                    params![id.to_string(), first_name, last_name, email],
                )?;
                Ok(())
            })
            .await?;
        Ok(())
    }
}
