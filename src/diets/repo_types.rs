use serde::Serialize;
use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::engine::types::{Goal, MacroTarget, MealType};
use crate::error::AppError;

#[derive(Debug, Clone, FromRow)]
pub struct MealSlotRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan_date: Date,
    pub meal_type: String,
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub name: String,
    pub description: String,
    pub ingredients: Vec<String>,
    pub prep_minutes: i32,
    pub goal: Option<String>,
    pub calorie_target: Option<f64>,
    pub dietary_restrictions: Vec<String>,
    pub preferred_cuisine: Option<String>,
    pub rating: Option<f64>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// One persisted meal of a day's plan.
#[derive(Debug, Clone, Serialize)]
pub struct MealSlot {
    pub id: Uuid,
    pub plan_date: Date,
    pub meal_type: MealType,
    #[serde(flatten)]
    pub target: MacroTarget,
    pub name: String,
    pub description: String,
    pub ingredients: Vec<String>,
    pub prep_minutes: i32,
    pub goal: Option<Goal>,
    pub calorie_target: Option<f64>,
    pub dietary_restrictions: Vec<String>,
    pub preferred_cuisine: Option<String>,
    pub rating: Option<f64>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl TryFrom<MealSlotRow> for MealSlot {
    type Error = AppError;

    fn try_from(r: MealSlotRow) -> Result<Self, Self::Error> {
        let meal_type = r
            .meal_type
            .parse::<MealType>()
            .map_err(|e| AppError::Internal(e.into()))?;
        let goal = r
            .goal
            .as_deref()
            .map(str::parse::<Goal>)
            .transpose()
            .map_err(|e| AppError::Internal(e.into()))?;
        Ok(Self {
            id: r.id,
            plan_date: r.plan_date,
            meal_type,
            target: MacroTarget {
                calories: r.calories,
                protein_g: r.protein_g,
                carbs_g: r.carbs_g,
                fat_g: r.fat_g,
            },
            name: r.name,
            description: r.description,
            ingredients: r.ingredients,
            prep_minutes: r.prep_minutes,
            goal,
            calorie_target: r.calorie_target,
            dietary_restrictions: r.dietary_restrictions,
            preferred_cuisine: r.preferred_cuisine,
            rating: r.rating,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

pub fn into_slots(rows: Vec<MealSlotRow>) -> Result<Vec<MealSlot>, AppError> {
    rows.into_iter().map(MealSlot::try_from).collect()
}

#[derive(Debug, Clone, FromRow)]
pub struct DietFeedbackRow {
    pub id: Uuid,
    pub meal_slot_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: OffsetDateTime,
}
