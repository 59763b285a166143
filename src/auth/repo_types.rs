use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 hash, not exposed in JSON
    pub first_name: String,
    pub last_name: String,
    pub birth_date: Option<Date>,
    pub weight: Option<f64>, // kg
    pub height: Option<f64>, // cm
    pub fitness_goal: Option<String>,
    pub dietary_restrictions: Vec<String>,
    pub created_at: OffsetDateTime,
}

impl User {
    /// Whole years between `birth_date` and `today`.
    pub fn age_on(&self, today: Date) -> Option<i32> {
        let born = self.birth_date?;
        let mut age = today.year() - born.year();
        if (today.month() as u8, today.day()) < (born.month() as u8, born.day()) {
            age -= 1;
        }
        Some(age.max(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    fn user(birth: Option<Date>) -> User {
        User {
            id: Uuid::new_v4(),
            email: "a@b.co".into(),
            password_hash: "x".into(),
            first_name: "Ana".into(),
            last_name: "Lima".into(),
            birth_date: birth,
            weight: None,
            height: None,
            fitness_goal: None,
            dietary_restrictions: vec![],
            created_at: datetime!(2024-01-01 0:00 UTC),
        }
    }

    #[test]
    fn age_counts_completed_years() {
        let u = user(Some(date!(1990 - 06 - 15)));
        assert_eq!(u.age_on(date!(2024 - 06 - 14)), Some(33));
        assert_eq!(u.age_on(date!(2024 - 06 - 15)), Some(34));
        assert_eq!(user(None).age_on(date!(2024 - 01 - 01)), None);
    }

    #[test]
    fn password_hash_is_never_serialized() {
        let json = serde_json::to_string(&user(None)).unwrap();
        assert!(!json.contains("password_hash"));
    }
}
