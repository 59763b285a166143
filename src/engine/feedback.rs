//! Rating-driven plan adjustment.

use serde::{Deserialize, Serialize};

use super::types::Intensity;
use crate::error::AppError;

/// A day's planned calories never drop below this through feedback.
pub const MIN_DAILY_CALORIES: f64 = 1200.0;
pub const CALORIE_STEP: f64 = 100.0;
/// Load change per rating, in kg.
pub const LOAD_STEP: f64 = 2.5;

/// A user rating, guaranteed to be within 1..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i32")]
pub struct Rating(u8);

impl Rating {
    pub fn value(self) -> i32 {
        self.0 as i32
    }

    fn direction(self) -> Direction {
        match self.0 {
            4..=5 => Direction::Up,
            1..=2 => Direction::Down,
            _ => Direction::Hold,
        }
    }
}

impl TryFrom<i64> for Rating {
    type Error = AppError;

    fn try_from(v: i64) -> Result<Self, Self::Error> {
        if (1..=5).contains(&v) {
            Ok(Rating(v as u8))
        } else {
            Err(AppError::field("rating", "must be between 1 and 5"))
        }
    }
}

impl From<Rating> for i32 {
    fn from(r: Rating) -> i32 {
        r.value()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Up,
    Hold,
    Down,
}

/// New daily total for a rating. A low rating never raises the day, so a
/// day already under the floor stays where it is.
pub fn adjust_calories(day_calories: f64, rating: Rating) -> f64 {
    match rating.direction() {
        Direction::Up => day_calories + CALORIE_STEP,
        Direction::Down => (day_calories - CALORIE_STEP).max(MIN_DAILY_CALORIES.min(day_calories)),
        Direction::Hold => day_calories,
    }
}

/// Applies the daily change to one rated meal. `day_calories` is the sum of
/// every slot planned for the same day, the rated one included.
pub fn adjust_slot_calories(slot_calories: f64, day_calories: f64, rating: Rating) -> f64 {
    let delta = adjust_calories(day_calories, rating) - day_calories;
    (slot_calories + delta).max(0.0)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkoutParams {
    pub load: f64,
    pub intensity: Intensity,
}

pub fn adjust_workout(params: WorkoutParams, rating: Rating) -> WorkoutParams {
    match rating.direction() {
        Direction::Up => WorkoutParams {
            load: params.load + LOAD_STEP,
            intensity: params.intensity.step_up(),
        },
        Direction::Down => WorkoutParams {
            load: (params.load - LOAD_STEP).max(0.0),
            intensity: params.intensity.step_down(),
        },
        Direction::Hold => params,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(v: i64) -> Rating {
        Rating::try_from(v).unwrap()
    }

    #[test]
    fn out_of_range_ratings_are_rejected() {
        for v in [-1, 0, 6, 100] {
            let err = Rating::try_from(v).unwrap_err();
            assert!(matches!(err, AppError::Validation(ref f) if f[0].field == "rating"));
        }
    }

    #[test]
    fn rating_deserialization_validates() {
        assert_eq!(serde_json::from_str::<Rating>("4").unwrap(), r(4));
        assert!(serde_json::from_str::<Rating>("0").is_err());
        assert!(serde_json::from_str::<Rating>("7").is_err());
        assert_eq!(serde_json::to_string(&r(3)).unwrap(), "3");
    }

    #[test]
    fn high_rating_adds_calories_each_time() {
        assert_eq!(adjust_calories(2000.0, r(5)), 2100.0);
        assert_eq!(adjust_calories(adjust_calories(2000.0, r(5)), r(5)), 2200.0);
        assert_eq!(adjust_calories(1800.0, r(4)), 1900.0);
    }

    #[test]
    fn low_rating_respects_daily_floor() {
        assert_eq!(adjust_calories(1250.0, r(1)), 1200.0);
        assert_eq!(adjust_calories(2000.0, r(2)), 1900.0);
        for start in [0.0, 500.0, 1200.0, 1299.0, 2500.0] {
            let after = adjust_calories(start, r(2));
            assert!(after <= start, "{start} -> {after}");
            assert!(after >= MIN_DAILY_CALORIES.min(start));
        }
    }

    #[test]
    fn slot_takes_the_daily_change() {
        assert_eq!(adjust_slot_calories(700.0, 2500.0, r(5)), 800.0);
        assert_eq!(adjust_slot_calories(700.0, 2500.0, r(1)), 600.0);
        // only 50 kcal of headroom above the floor
        assert_eq!(adjust_slot_calories(400.0, 1250.0, r(2)), 350.0);
        assert_eq!(adjust_slot_calories(400.0, 1000.0, r(1)), 400.0);
        assert_eq!(adjust_slot_calories(40.0, 3000.0, r(1)), 0.0);
    }

    #[test]
    fn low_rating_never_raises_a_generated_meal() {
        use crate::engine::assembler::{plan_meals, DietPlanInput};
        use crate::engine::templates::TemplateVariety;
        use crate::engine::types::Goal;

        for (target, meals) in [(2500.0, 3), (1300.0, 4), (1800.0, 6), (900.0, 2)] {
            let input = DietPlanInput {
                goal: Goal::Maintenance,
                calorie_target: target,
                meal_count: meals,
                dietary_restrictions: vec![],
                preferred_cuisine: None,
            };
            let plan = plan_meals(&input, TemplateVariety::Deterministic).unwrap();
            let day: f64 = plan.iter().map(|m| m.target.calories).sum();
            for meal in &plan {
                for rating in [r(1), r(2)] {
                    let before = meal.target.calories;
                    let after = adjust_slot_calories(before, day, rating);
                    assert!(after <= before, "{:?}: {before} -> {after}", meal.meal_type);
                    assert!(day - before + after >= MIN_DAILY_CALORIES.min(day));
                }
            }
        }
    }

    #[test]
    fn neutral_rating_changes_nothing() {
        assert_eq!(adjust_calories(1500.0, r(3)), 1500.0);
        let p = WorkoutParams {
            load: 20.0,
            intensity: Intensity::Moderate,
        };
        assert_eq!(adjust_workout(p, r(3)), p);
    }

    #[test]
    fn workout_steps_load_and_intensity() {
        let p = WorkoutParams {
            load: 20.0,
            intensity: Intensity::Moderate,
        };
        assert_eq!(
            adjust_workout(p, r(5)),
            WorkoutParams {
                load: 22.5,
                intensity: Intensity::High
            }
        );
        let high = WorkoutParams {
            load: 1.0,
            intensity: Intensity::High,
        };
        assert_eq!(
            adjust_workout(high, r(1)),
            WorkoutParams {
                load: 0.0,
                intensity: Intensity::Moderate
            }
        );
    }
}
