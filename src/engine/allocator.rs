//! Splits a daily calorie target across meals and derives per-meal macros.

use std::collections::HashMap;

use thiserror::Error;

use super::types::{MacroTarget, MealType};

pub const KCAL_PER_G_PROTEIN: f64 = 4.0;
pub const KCAL_PER_G_CARBS: f64 = 4.0;
pub const KCAL_PER_G_FAT: f64 = 9.0;

pub const MAX_MEALS: usize = 6;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AllocationError {
    #[error("daily calorie target must be a non-negative number, got {0}")]
    InvalidTarget(f64),
    #[error("meal count must be between 1 and {MAX_MEALS}, got {0}")]
    InvalidMealCount(usize),
    #[error("meal weights must be finite and non-negative with a positive sum")]
    InvalidWeights,
}

/// Fraction of a meal's calories coming from each macronutrient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacroSplit {
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl MacroSplit {
    pub const BALANCED: MacroSplit = MacroSplit {
        protein: 0.30,
        carbs: 0.40,
        fat: 0.30,
    };

    /// Built-in per-meal ratios: breakfast and pre-workout lean on carbs,
    /// post-workout on protein. Unlisted meal types use [`MacroSplit::BALANCED`].
    pub fn meal_type_table() -> HashMap<MealType, MacroSplit> {
        HashMap::from([
            (
                MealType::Breakfast,
                MacroSplit {
                    protein: 0.25,
                    carbs: 0.50,
                    fat: 0.25,
                },
            ),
            (
                MealType::PreWorkout,
                MacroSplit {
                    protein: 0.20,
                    carbs: 0.60,
                    fat: 0.20,
                },
            ),
            (
                MealType::PostWorkout,
                MacroSplit {
                    protein: 0.40,
                    carbs: 0.45,
                    fat: 0.15,
                },
            ),
        ])
    }

    fn apply(&self, calories: f64) -> MacroTarget {
        MacroTarget {
            calories,
            protein_g: round1(calories * self.protein / KCAL_PER_G_PROTEIN),
            carbs_g: round1(calories * self.carbs / KCAL_PER_G_CARBS),
            fat_g: round1(calories * self.fat / KCAL_PER_G_FAT),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AllocationOptions {
    /// Relative calorie weight per meal type; need not sum to 1. When set,
    /// only meal types with a positive weight are used.
    pub weights: Option<HashMap<MealType, f64>>,
    /// Per-meal-type macro ratios; missing entries fall back to 30/40/30.
    pub ratios: Option<HashMap<MealType, MacroSplit>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    pub meal_type: MealType,
    pub target: MacroTarget,
}

/// Picks `count` meal types in priority order, cycling when fewer are
/// available than requested.
pub fn select_meal_types(count: usize, available: &[MealType]) -> Vec<MealType> {
    let pool: Vec<MealType> = MealType::PRIORITY
        .iter()
        .copied()
        .filter(|m| available.is_empty() || available.contains(m))
        .collect();
    if pool.is_empty() {
        return Vec::new();
    }
    (0..count).map(|i| pool[i % pool.len()]).collect()
}

/// Allocates `daily_target` kcal over `meal_count` meals.
///
/// Each meal's calories are rounded to whole kcal and the rounding residual
/// goes to the last meal, so the sum always equals the rounded target.
/// A zero target yields all-zero meals.
pub fn allocate(
    daily_target: f64,
    meal_count: usize,
    opts: &AllocationOptions,
) -> Result<Vec<Allocation>, AllocationError> {
    if !daily_target.is_finite() || daily_target < 0.0 {
        return Err(AllocationError::InvalidTarget(daily_target));
    }
    if meal_count == 0 || meal_count > MAX_MEALS {
        return Err(AllocationError::InvalidMealCount(meal_count));
    }

    let available: Vec<MealType> = match &opts.weights {
        Some(w) => {
            let valid = w.values().all(|v| v.is_finite() && *v >= 0.0);
            if !valid || w.values().sum::<f64>() <= 0.0 {
                return Err(AllocationError::InvalidWeights);
            }
            w.iter().filter(|(_, v)| **v > 0.0).map(|(m, _)| *m).collect()
        }
        None => Vec::new(),
    };
    let meal_types = select_meal_types(meal_count, &available);

    let weights: Vec<f64> = match &opts.weights {
        Some(w) => meal_types
            .iter()
            .map(|m| w.get(m).copied().unwrap_or(0.0))
            .collect(),
        None => vec![1.0; meal_count],
    };
    let weight_sum: f64 = weights.iter().sum();
    if weight_sum <= 0.0 {
        return Err(AllocationError::InvalidWeights);
    }

    let total = daily_target.round();
    let mut assigned = 0.0;
    let mut out = Vec::with_capacity(meal_count);
    for (i, (meal_type, weight)) in meal_types.iter().zip(&weights).enumerate() {
        let calories = if i + 1 == meal_count {
            (total - assigned).max(0.0)
        } else {
            (daily_target * weight / weight_sum).round()
        };
        assigned += calories;

        let split = opts
            .ratios
            .as_ref()
            .and_then(|r| r.get(meal_type))
            .copied()
            .unwrap_or(MacroSplit::BALANCED);
        out.push(Allocation {
            meal_type: *meal_type,
            target: split.apply(calories),
        });
    }
    Ok(out)
}

/// Percent of calories from protein, carbs and fat. A zero total is treated
/// as 1 so an empty plan reports zeros instead of NaN.
pub fn macro_percentages(m: &MacroTarget) -> (f64, f64, f64) {
    let total = if m.calories == 0.0 { 1.0 } else { m.calories };
    (
        round1(m.protein_g * KCAL_PER_G_PROTEIN / total * 100.0),
        round1(m.carbs_g * KCAL_PER_G_CARBS / total * 100.0),
        round1(m.fat_g * KCAL_PER_G_FAT / total * 100.0),
    )
}

pub(crate) fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}
