use crate::auth::repo_types::User;
use sqlx::PgPool;
use uuid::Uuid;

use super::dto::UpdateProfileRequest;

const USER_COLUMNS: &str = "id, email, password_hash, first_name, last_name, birth_date, \
                            weight, height, fitness_goal, dietary_restrictions, created_at";

pub struct NewUser<'a> {
    pub email: &'a str,
    pub password_hash: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
}

impl User {
    /// Find a user by email.
    pub async fn find_by_email(db: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(db)
            .await
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await
    }

    /// Create a new user with hashed password.
    pub async fn create(db: &PgPool, new: NewUser<'_>) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, password_hash, first_name, last_name) \
             VALUES ($1, $2, $3, $4) RETURNING {USER_COLUMNS}"
        ))
        .bind(new.email)
        .bind(new.password_hash)
        .bind(new.first_name)
        .bind(new.last_name)
        .fetch_one(db)
        .await
    }

    /// Applies the fields present in `patch`; absent fields keep their value.
    pub async fn update_profile(
        db: &PgPool,
        id: Uuid,
        patch: &UpdateProfileRequest,
        fitness_goal: Option<&str>,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                birth_date = COALESCE($4, birth_date),
                weight = COALESCE($5, weight),
                height = COALESCE($6, height),
                fitness_goal = COALESCE($7, fitness_goal),
                dietary_restrictions = COALESCE($8, dietary_restrictions)
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(patch.first_name.as_deref())
        .bind(patch.last_name.as_deref())
        .bind(patch.birth_date)
        .bind(patch.weight)
        .bind(patch.height)
        .bind(fitness_goal)
        .bind(patch.dietary_restrictions.clone())
        .fetch_optional(db)
        .await
    }
}
