use study_core::model::{NewUser, User, UserId};

use super::SqliteRepository;
use super::mapping::{conn, id_to_i64, inserted_id, map_user_row, write_err};
use crate::repository::{StorageError, UserRepository};

#[async_trait::async_trait]
impl UserRepository for SqliteRepository {
    async fn get_user(&self, id: UserId) -> Result<Option<User>, StorageError> {
        let row = sqlx::query(
            "SELECT id, username, password, first_name, last_name, email FROM users WHERE id = ?1",
        )
        .bind(id_to_i64(id)?)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.as_ref().map(map_user_row).transpose()
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StorageError> {
        let row = sqlx::query(
            "SELECT id, username, password, first_name, last_name, email FROM users WHERE username = ?1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.as_ref().map(map_user_row).transpose()
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StorageError> {
        let res = sqlx::query(
            r"
            INSERT INTO users (username, password, first_name, last_name, email)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ",
        )
        .bind(&user.username)
        .bind(&user.password)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .execute(&self.pool)
        .await
        .map_err(write_err)?;

        Ok(User::from_new(inserted_id(res.last_insert_rowid())?, user))
    }
}
