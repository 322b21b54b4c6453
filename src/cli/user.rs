use anyhow::Result;

use crate::core::db::async_db;
use crate::events::UserId;
use crate::users::{SqliteUserDirectory, User, UserDirectory};

pub async fn run(
    db_path: &str,
    id: String,
    first_name: String,
    last_name: String,
    email: String,
) -> Result<()> {
    let db = async_db(db_path).await?;
    let directory = SqliteUserDirectory::new(db);
    let user = User {
        id: UserId::from(id),
        first_name,
        last_name,
        email,
    };
    directory.insert_user(&user).await?;
    println!("Saved user {} <{}>", user.full_name(), user.email);

    Ok(())
}
