use serde::{Deserialize, Serialize};
use time::Date;

use super::repo_types::MealSlot;
use crate::engine::{
    allocator::MAX_MEALS,
    assembler::DietPlanInput,
    types::{Goal, MacroTarget, MealType},
};
use crate::error::{AppError, FieldError, Validator};

fn default_meal_count() -> i64 {
    3
}

#[derive(Debug, Deserialize)]
pub struct GenerateDietRequest {
    pub goal: String,
    pub calorie_target: f64,
    #[serde(default = "default_meal_count")]
    pub meal_count: i64,
    #[serde(default)]
    pub dietary_restrictions: Vec<String>,
    pub preferred_cuisine: Option<String>,
    /// Day the plan is for; today when omitted.
    pub date: Option<Date>,
}

impl GenerateDietRequest {
    pub fn validate(&self) -> Result<DietPlanInput, AppError> {
        let goal = self.goal.parse::<Goal>();
        let mut v = Validator::new();
        v.check(goal.is_ok(), "goal", "unknown goal")
            .check(
                self.calorie_target.is_finite() && self.calorie_target > 0.0,
                "calorie_target",
                "must be a positive number",
            )
            .check(
                (1..=MAX_MEALS as i64).contains(&self.meal_count),
                "meal_count",
                "must be between 1 and 6",
            );
        v.finish()?;

        Ok(DietPlanInput {
            goal: goal.map_err(|e| AppError::field("goal", e.to_string()))?,
            calorie_target: self.calorie_target,
            meal_count: self.meal_count as usize,
            dietary_restrictions: self
                .dietary_restrictions
                .iter()
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty())
                .collect(),
            preferred_cuisine: self
                .preferred_cuisine
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string),
        })
    }
}

/// Manually registered meal.
#[derive(Debug, Deserialize)]
pub struct CreateMealSlotRequest {
    pub date: Option<Date>,
    pub meal_type: String,
    pub calories: f64,
    #[serde(default)]
    pub protein_g: f64,
    #[serde(default)]
    pub carbs_g: f64,
    #[serde(default)]
    pub fat_g: f64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub prep_minutes: i32,
}

impl CreateMealSlotRequest {
    pub fn validate(&self) -> Result<(MealType, MacroTarget), AppError> {
        let meal_type = self.meal_type.parse::<MealType>();
        let non_negative = |x: f64| x.is_finite() && x >= 0.0;
        let mut v = Validator::new();
        v.check(meal_type.is_ok(), "meal_type", "unknown meal type")
            .check(non_negative(self.calories), "calories", "must not be negative")
            .check(non_negative(self.protein_g), "protein_g", "must not be negative")
            .check(non_negative(self.carbs_g), "carbs_g", "must not be negative")
            .check(non_negative(self.fat_g), "fat_g", "must not be negative")
            .check(!self.name.trim().is_empty(), "name", "is required")
            .check(self.prep_minutes >= 0, "prep_minutes", "must not be negative");
        v.finish()?;

        let meal_type = meal_type.map_err(|e| AppError::field("meal_type", e.to_string()))?;
        Ok((
            meal_type,
            MacroTarget {
                calories: self.calories,
                protein_g: self.protein_g,
                carbs_g: self.carbs_g,
                fat_g: self.fat_g,
            },
        ))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct MealSlotFilter {
    pub date: Option<Date>,
    pub meal_type: Option<String>,
    pub min_calories: Option<f64>,
    pub max_calories: Option<f64>,
}

impl MealSlotFilter {
    pub fn meal_type(&self) -> Result<Option<MealType>, AppError> {
        self.meal_type
            .as_deref()
            .map(str::parse::<MealType>)
            .transpose()
            .map_err(|e| AppError::field("meal_type", e.to_string()))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DateRange {
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
}

impl DateRange {
    pub fn validate(&self) -> Result<(), AppError> {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) if start > end => Err(AppError::Validation(vec![
                FieldError::new("start_date", "must not be after end_date"),
            ])),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DietFeedbackRequest {
    pub rating: i64,
    pub comment: Option<String>,
}

/// All meals of one day plus their totals.
#[derive(Debug, Clone, Serialize)]
pub struct DailyPlan {
    pub date: Date,
    pub target: MacroTarget,
    pub calorie_target: Option<f64>,
    pub goal: Option<Goal>,
    pub meals: Vec<MealSlot>,
    pub water_ml: f64,
    pub rating: Option<f64>,
    pub protein_pct: f64,
    pub carbs_pct: f64,
    pub fat_pct: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(goal: &str, calories: f64, meals: i64) -> GenerateDietRequest {
        GenerateDietRequest {
            goal: goal.into(),
            calorie_target: calories,
            meal_count: meals,
            dietary_restrictions: vec!["  vegan ".into(), "".into()],
            preferred_cuisine: Some("  ".into()),
            date: None,
        }
    }

    #[test]
    fn valid_request_normalises_inputs() {
        let input = request("ganho_muscular", 2500.0, 3).validate().unwrap();
        assert_eq!(input.goal, Goal::MuscleGain);
        assert_eq!(input.meal_count, 3);
        assert_eq!(input.dietary_restrictions, vec!["vegan".to_string()]);
        assert_eq!(input.preferred_cuisine, None);
    }

    #[test]
    fn every_bad_field_is_reported() {
        let err = request("bulking", -10.0, 9).validate().unwrap_err();
        match err {
            AppError::Validation(fields) => {
                let names: Vec<_> = fields.iter().map(|f| f.field.as_str()).collect();
                assert_eq!(names, vec!["goal", "calorie_target", "meal_count"]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn zero_calorie_target_is_rejected() {
        assert!(request("maintenance", 0.0, 3).validate().is_err());
        assert!(request("maintenance", f64::NAN, 3).validate().is_err());
    }

    #[test]
    fn manual_slot_rejects_negative_macros() {
        let req = CreateMealSlotRequest {
            date: None,
            meal_type: "lanche".into(),
            calories: 300.0,
            protein_g: -1.0,
            carbs_g: 10.0,
            fat_g: 5.0,
            name: "Fruit".into(),
            description: String::new(),
            ingredients: vec![],
            prep_minutes: 0,
        };
        let err = req.validate().unwrap_err();
        assert!(matches!(err, AppError::Validation(ref f) if f[0].field == "protein_g"));
    }

    #[test]
    fn inverted_date_range_is_rejected() {
        let range = DateRange {
            start_date: Some(time::macros::date!(2024 - 02 - 02)),
            end_date: Some(time::macros::date!(2024 - 02 - 01)),
        };
        assert!(range.validate().is_err());
        assert!(DateRange::default().validate().is_ok());
    }
}
