use std::collections::BTreeMap;

use time::{Date, OffsetDateTime};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::{CreateMealSlotRequest, DailyPlan, DateRange, DietFeedbackRequest, GenerateDietRequest, MealSlotFilter};
use super::repo::{self, NewSlot, PlanContext};
use super::repo_types::{into_slots, MealSlot};
use crate::engine::{
    allocator::{macro_percentages, round1},
    assembler::plan_meals,
    feedback::{adjust_slot_calories, Rating},
    types::MacroTarget,
};
use crate::error::AppError;
use crate::state::AppState;

/// Daily water suggestion, in ml per planned kcal.
pub const WATER_ML_PER_KCAL: f64 = 1.0;

/// Groups slots by day, newest day first, meals in day order.
pub fn aggregate_daily_plans(slots: Vec<MealSlot>) -> Vec<DailyPlan> {
    let mut by_date: BTreeMap<Date, Vec<MealSlot>> = BTreeMap::new();
    for slot in slots {
        by_date.entry(slot.plan_date).or_default().push(slot);
    }

    by_date
        .into_iter()
        .rev()
        .map(|(date, mut meals)| {
            meals.sort_by_key(|m| m.meal_type.day_order());
            let target = MacroTarget::sum(meals.iter().map(|m| &m.target));
            let target = MacroTarget {
                calories: round1(target.calories),
                protein_g: round1(target.protein_g),
                carbs_g: round1(target.carbs_g),
                fat_g: round1(target.fat_g),
            };
            let (protein_pct, carbs_pct, fat_pct) = macro_percentages(&target);
            let ratings: Vec<f64> = meals.iter().filter_map(|m| m.rating).collect();
            let rating = (!ratings.is_empty())
                .then(|| round1(ratings.iter().sum::<f64>() / ratings.len() as f64));
            DailyPlan {
                date,
                calorie_target: meals.iter().find_map(|m| m.calorie_target),
                goal: meals.iter().find_map(|m| m.goal),
                water_ml: (target.calories * WATER_ML_PER_KCAL).round(),
                target,
                meals,
                rating,
                protein_pct,
                carbs_pct,
                fat_pct,
            }
        })
        .collect()
}

#[instrument(skip(state, req))]
pub async fn generate_diet_plan(
    state: &AppState,
    user_id: Uuid,
    req: GenerateDietRequest,
) -> Result<DailyPlan, AppError> {
    let input = req.validate()?;
    let plan_date = req.date.unwrap_or_else(|| OffsetDateTime::now_utc().date());
    let planned = plan_meals(&input, state.config.template_variety)?;

    let ctx = PlanContext {
        goal: Some(input.goal),
        calorie_target: Some(input.calorie_target),
        dietary_restrictions: &input.dietary_restrictions,
        preferred_cuisine: input.preferred_cuisine.as_deref(),
    };

    let mut tx = state.db.begin().await?;
    let replaced = repo::clear_generated_day(&mut tx, user_id, plan_date).await?;
    if replaced > 0 {
        info!(%user_id, %plan_date, replaced, "replacing previously generated day");
    }
    let mut rows = Vec::with_capacity(planned.len());
    for meal in &planned {
        let row = repo::insert_slot(
            &mut tx,
            user_id,
            plan_date,
            &ctx,
            NewSlot {
                meal_type: meal.meal_type,
                target: meal.target,
                name: &meal.content.name,
                description: &meal.content.description,
                ingredients: &meal.content.ingredients,
                prep_minutes: meal.content.prep_minutes,
            },
        )
        .await?;
        rows.push(row);
    }
    tx.commit().await?;

    info!(%user_id, %plan_date, meals = rows.len(), calories = input.calorie_target, "diet plan generated");
    aggregate_daily_plans(into_slots(rows)?)
        .into_iter()
        .next()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("generated plan has no meals")))
}

#[instrument(skip(state, req))]
pub async fn create_slot(
    state: &AppState,
    user_id: Uuid,
    req: CreateMealSlotRequest,
) -> Result<MealSlot, AppError> {
    let (meal_type, target) = req.validate()?;
    let plan_date = req.date.unwrap_or_else(|| OffsetDateTime::now_utc().date());
    let ingredients: Vec<String> = req.ingredients.iter().map(|i| i.trim().to_string()).collect();

    let mut conn = state.db.acquire().await?;
    let row = repo::insert_slot(
        &mut conn,
        user_id,
        plan_date,
        &PlanContext::manual(),
        NewSlot {
            meal_type,
            target,
            name: req.name.trim(),
            description: req.description.trim(),
            ingredients: &ingredients,
            prep_minutes: req.prep_minutes,
        },
    )
    .await?;

    info!(%user_id, slot_id = %row.id, "meal slot registered");
    row.try_into()
}

pub async fn list_slots(
    state: &AppState,
    user_id: Uuid,
    filter: MealSlotFilter,
) -> Result<Vec<MealSlot>, AppError> {
    let meal_type = filter.meal_type()?;
    let rows = repo::list(
        &state.db,
        user_id,
        filter.date,
        meal_type,
        filter.min_calories,
        filter.max_calories,
    )
    .await?;
    into_slots(rows)
}

pub async fn list_daily_plans(
    state: &AppState,
    user_id: Uuid,
    range: DateRange,
) -> Result<Vec<DailyPlan>, AppError> {
    range.validate()?;
    let rows = repo::list_between(&state.db, user_id, range.start_date, range.end_date).await?;
    Ok(aggregate_daily_plans(into_slots(rows)?))
}

pub async fn get_slot(state: &AppState, user_id: Uuid, id: Uuid) -> Result<MealSlot, AppError> {
    repo::get(&state.db, user_id, id)
        .await?
        .ok_or(AppError::NotFound("meal slot"))?
        .try_into()
}

pub async fn delete_slot(state: &AppState, user_id: Uuid, id: Uuid) -> Result<(), AppError> {
    if !repo::delete(&state.db, user_id, id).await? {
        return Err(AppError::NotFound("meal slot"));
    }
    info!(%user_id, slot_id = %id, "meal slot deleted");
    Ok(())
}

/// Records the rating, then moves the slot's calories by the day's change.
#[instrument(skip(state, req))]
pub async fn submit_feedback(
    state: &AppState,
    user_id: Uuid,
    id: Uuid,
    req: DietFeedbackRequest,
) -> Result<MealSlot, AppError> {
    let rating = Rating::try_from(req.rating)?;
    let current = get_slot(state, user_id, id).await?;

    let comment = req.comment.as_deref().map(str::trim).filter(|c| !c.is_empty());
    let event = repo::insert_feedback(&state.db, id, rating.value(), comment).await?;

    let day = repo::day_calories(&state.db, user_id, current.plan_date).await?;
    let calories = adjust_slot_calories(current.target.calories, day, rating);
    let updated = repo::apply_feedback(&state.db, user_id, id, calories)
        .await?
        .ok_or_else(|| {
            warn!(%user_id, slot_id = %id, feedback_id = %event.id, "slot vanished after feedback");
            AppError::NotFound("meal slot")
        })?;

    info!(
        %user_id,
        slot_id = %id,
        rating = event.rating,
        day_calories = day,
        from = current.target.calories,
        to = calories,
        "diet feedback applied"
    );
    updated.try_into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::{Goal, MealType};
    use time::macros::{date, datetime};

    fn slot(day: Date, meal_type: MealType, calories: f64, rating: Option<f64>) -> MealSlot {
        MealSlot {
            id: Uuid::new_v4(),
            plan_date: day,
            meal_type,
            target: MacroTarget {
                calories,
                protein_g: calories * 0.3 / 4.0,
                carbs_g: calories * 0.4 / 4.0,
                fat_g: calories * 0.3 / 9.0,
            },
            name: "x".into(),
            description: String::new(),
            ingredients: vec![],
            prep_minutes: 10,
            goal: Some(Goal::Maintenance),
            calorie_target: Some(2000.0),
            dietary_restrictions: vec![],
            preferred_cuisine: None,
            rating,
            created_at: datetime!(2024-01-01 0:00 UTC),
            updated_at: datetime!(2024-01-01 0:00 UTC),
        }
    }

    #[test]
    fn slots_are_grouped_per_day_newest_first() {
        let d1 = date!(2024 - 03 - 01);
        let d2 = date!(2024 - 03 - 02);
        let plans = aggregate_daily_plans(vec![
            slot(d1, MealType::Dinner, 700.0, Some(4.0)),
            slot(d2, MealType::Lunch, 900.0, None),
            slot(d1, MealType::Breakfast, 500.0, Some(2.0)),
        ]);
        assert_eq!(plans.len(), 2);
        assert_eq!(plans[0].date, d2);
        assert_eq!(plans[0].rating, None);

        let day1 = &plans[1];
        assert_eq!(day1.meals[0].meal_type, MealType::Breakfast);
        assert_eq!(day1.target.calories, 1200.0);
        assert_eq!(day1.water_ml, 1200.0);
        assert_eq!(day1.rating, Some(3.0));
        assert_eq!(day1.calorie_target, Some(2000.0));
        assert_eq!((day1.protein_pct, day1.carbs_pct, day1.fat_pct), (30.0, 40.0, 30.0));
    }

    #[test]
    fn empty_input_gives_no_plans() {
        assert!(aggregate_daily_plans(vec![]).is_empty());
    }
}
