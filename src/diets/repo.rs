use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use time::Date;
use uuid::Uuid;

use super::repo_types::{DietFeedbackRow, MealSlotRow};
use crate::engine::types::{Goal, MacroTarget, MealType};

const SLOT_COLUMNS: &str = "id, user_id, plan_date, meal_type, calories, protein_g, carbs_g, fat_g, \
                            name, description, ingredients, prep_minutes, goal, calorie_target, \
                            dietary_restrictions, preferred_cuisine, rating, created_at, updated_at";

/// Plan context stored on every slot. Generated slots carry the day's
/// calorie target; manually registered ones carry none.
pub struct PlanContext<'a> {
    pub goal: Option<Goal>,
    pub calorie_target: Option<f64>,
    pub dietary_restrictions: &'a [String],
    pub preferred_cuisine: Option<&'a str>,
}

impl PlanContext<'_> {
    pub fn manual() -> Self {
        PlanContext {
            goal: None,
            calorie_target: None,
            dietary_restrictions: &[],
            preferred_cuisine: None,
        }
    }

    pub fn is_generated(&self) -> bool {
        self.calorie_target.is_some()
    }
}

const CLEAR_GENERATED_DAY: &str = "DELETE FROM meal_slots \
                                   WHERE user_id = $1 AND plan_date = $2 AND calorie_target IS NOT NULL";

pub struct NewSlot<'a> {
    pub meal_type: MealType,
    pub target: MacroTarget,
    pub name: &'a str,
    pub description: &'a str,
    pub ingredients: &'a [String],
    pub prep_minutes: i32,
}

/// Takes a connection so callers can run several inserts in one transaction.
pub async fn insert_slot(
    conn: &mut PgConnection,
    user_id: Uuid,
    plan_date: Date,
    ctx: &PlanContext<'_>,
    slot: NewSlot<'_>,
) -> Result<MealSlotRow, sqlx::Error> {
    sqlx::query_as::<_, MealSlotRow>(&format!(
        r#"
        INSERT INTO meal_slots (
            user_id, plan_date, meal_type, calories, protein_g, carbs_g, fat_g,
            name, description, ingredients, prep_minutes,
            goal, calorie_target, dietary_restrictions, preferred_cuisine
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
        RETURNING {SLOT_COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(plan_date)
    .bind(slot.meal_type.as_str())
    .bind(slot.target.calories)
    .bind(slot.target.protein_g)
    .bind(slot.target.carbs_g)
    .bind(slot.target.fat_g)
    .bind(slot.name)
    .bind(slot.description)
    .bind(slot.ingredients.to_vec())
    .bind(slot.prep_minutes)
    .bind(ctx.goal.map(|g| g.as_str()))
    .bind(ctx.calorie_target)
    .bind(ctx.dietary_restrictions.to_vec())
    .bind(ctx.preferred_cuisine)
    .fetch_one(conn)
    .await
}

/// Drops the generated slots of one day so a new plan replaces them.
/// Manually registered slots stay.
pub async fn clear_generated_day(conn: &mut PgConnection, user_id: Uuid, plan_date: Date) -> Result<u64, sqlx::Error> {
    let res = sqlx::query(CLEAR_GENERATED_DAY)
        .bind(user_id)
        .bind(plan_date)
        .execute(conn)
        .await?;
    Ok(res.rows_affected())
}

/// Calories of every slot planned for the day.
pub async fn day_calories(db: &PgPool, user_id: Uuid, plan_date: Date) -> Result<f64, sqlx::Error> {
    sqlx::query_scalar::<_, f64>(
        "SELECT COALESCE(SUM(calories), 0)::float8 FROM meal_slots WHERE user_id = $1 AND plan_date = $2",
    )
    .bind(user_id)
    .bind(plan_date)
    .fetch_one(db)
    .await
}

pub async fn list(
    db: &PgPool,
    user_id: Uuid,
    date: Option<Date>,
    meal_type: Option<MealType>,
    min_calories: Option<f64>,
    max_calories: Option<f64>,
) -> Result<Vec<MealSlotRow>, sqlx::Error> {
    let mut qb: QueryBuilder<Postgres> =
        QueryBuilder::new(format!("SELECT {SLOT_COLUMNS} FROM meal_slots WHERE user_id = "));
    qb.push_bind(user_id);
    if let Some(d) = date {
        qb.push(" AND plan_date = ").push_bind(d);
    }
    if let Some(m) = meal_type {
        qb.push(" AND meal_type = ").push_bind(m.as_str());
    }
    if let Some(min) = min_calories {
        qb.push(" AND calories >= ").push_bind(min);
    }
    if let Some(max) = max_calories {
        qb.push(" AND calories <= ").push_bind(max);
    }
    qb.push(" ORDER BY plan_date DESC, created_at");
    qb.build_query_as::<MealSlotRow>().fetch_all(db).await
}

pub async fn list_between(
    db: &PgPool,
    user_id: Uuid,
    start: Option<Date>,
    end: Option<Date>,
) -> Result<Vec<MealSlotRow>, sqlx::Error> {
    sqlx::query_as::<_, MealSlotRow>(&format!(
        r#"
        SELECT {SLOT_COLUMNS}
        FROM meal_slots
        WHERE user_id = $1
          AND ($2::date IS NULL OR plan_date >= $2)
          AND ($3::date IS NULL OR plan_date <= $3)
        ORDER BY plan_date DESC, created_at
        "#
    ))
    .bind(user_id)
    .bind(start)
    .bind(end)
    .fetch_all(db)
    .await
}

pub async fn get(db: &PgPool, user_id: Uuid, id: Uuid) -> Result<Option<MealSlotRow>, sqlx::Error> {
    sqlx::query_as::<_, MealSlotRow>(&format!(
        "SELECT {SLOT_COLUMNS} FROM meal_slots WHERE id = $1 AND user_id = $2"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(db)
    .await
}

pub async fn delete(db: &PgPool, user_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
    let res = sqlx::query("DELETE FROM meal_slots WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(res.rows_affected() > 0)
}

pub async fn insert_feedback(
    db: &PgPool,
    meal_slot_id: Uuid,
    rating: i32,
    comment: Option<&str>,
) -> Result<DietFeedbackRow, sqlx::Error> {
    sqlx::query_as::<_, DietFeedbackRow>(
        r#"
        INSERT INTO diet_feedback (meal_slot_id, rating, comment)
        VALUES ($1, $2, $3)
        RETURNING id, meal_slot_id, rating, comment, created_at
        "#,
    )
    .bind(meal_slot_id)
    .bind(rating)
    .bind(comment)
    .fetch_one(db)
    .await
}

/// Stores the adjusted calories and refreshes the average rating.
pub async fn apply_feedback(
    db: &PgPool,
    user_id: Uuid,
    id: Uuid,
    calories: f64,
) -> Result<Option<MealSlotRow>, sqlx::Error> {
    sqlx::query_as::<_, MealSlotRow>(&format!(
        r#"
        UPDATE meal_slots SET
            calories = $3,
            rating = (SELECT AVG(rating)::float8 FROM diet_feedback WHERE meal_slot_id = $1),
            updated_at = now()
        WHERE id = $1 AND user_id = $2
        RETURNING {SLOT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(user_id)
    .bind(calories)
    .fetch_optional(db)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regeneration_only_clears_generated_slots_of_that_day() {
        assert!(!PlanContext::manual().is_generated());
        let generated = PlanContext {
            calorie_target: Some(2000.0),
            ..PlanContext::manual()
        };
        assert!(generated.is_generated());

        assert!(CLEAR_GENERATED_DAY.contains("user_id = $1 AND plan_date = $2"));
        assert!(CLEAR_GENERATED_DAY.contains("calorie_target IS NOT NULL"));
    }
}
