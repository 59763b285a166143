use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::ChatMessage;

pub async fn insert(
    db: &PgPool,
    user_id: Uuid,
    user_message: &str,
    bot_response: &str,
) -> Result<ChatMessage, sqlx::Error> {
    sqlx::query_as::<_, ChatMessage>(
        r#"
        INSERT INTO chat_messages (user_id, user_message, bot_response)
        VALUES ($1, $2, $3)
        RETURNING id, user_id, user_message, bot_response, created_at
        "#,
    )
    .bind(user_id)
    .bind(user_message)
    .bind(bot_response)
    .fetch_one(db)
    .await
}

pub async fn history(db: &PgPool, user_id: Uuid, limit: i64) -> Result<Vec<ChatMessage>, sqlx::Error> {
    sqlx::query_as::<_, ChatMessage>(
        r#"
        SELECT id, user_id, user_message, bot_response, created_at
        FROM chat_messages
        WHERE user_id = $1
        ORDER BY created_at DESC
        LIMIT $2
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(db)
    .await
}
