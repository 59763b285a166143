//! Builds diet days and workout sessions from the allocator and the
//! template tables. Persistence happens in the `diets` and `workouts`
//! services; everything here is pure apart from the optional LLM call.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use tracing::{debug, warn};

use super::allocator::{allocate, AllocationOptions, MacroSplit};
use super::templates::{
    canonical_equipment, equipment_allows, exercise_table, fullbody_table, generic_exercise,
    select_meal, workout_type_table, ExerciseTemplate, MealContent, TemplateVariety,
};
use super::types::{Difficulty, Exercise, Goal, Intensity, MacroTarget, MealType, WorkoutType};
use crate::error::AppError;
use crate::llm::LlmClient;

/// Relative share of the day's calories per meal type.
pub const DEFAULT_MEAL_WEIGHTS: [(MealType, f64); 7] = [
    (MealType::Breakfast, 25.0),
    (MealType::Lunch, 35.0),
    (MealType::Dinner, 30.0),
    (MealType::Snack, 10.0),
    (MealType::AfternoonSnack, 10.0),
    (MealType::PostWorkout, 15.0),
    (MealType::PreWorkout, 10.0),
];

#[derive(Debug, Clone)]
pub struct DietPlanInput {
    pub goal: Goal,
    pub calorie_target: f64,
    pub meal_count: usize,
    pub dietary_restrictions: Vec<String>,
    pub preferred_cuisine: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlannedMeal {
    pub meal_type: MealType,
    pub target: MacroTarget,
    pub content: MealContent,
}

/// Allocates the day and picks content per slot, in day order.
pub fn plan_meals(
    input: &DietPlanInput,
    variety: TemplateVariety,
) -> Result<Vec<PlannedMeal>, AppError> {
    let opts = AllocationOptions {
        weights: Some(DEFAULT_MEAL_WEIGHTS.into_iter().collect()),
        ratios: Some(MacroSplit::meal_type_table()),
    };
    let allocations = allocate(input.calorie_target, input.meal_count, &opts)
        .map_err(|e| AppError::field("calorie_target", e.to_string()))?;

    let mut meals: Vec<PlannedMeal> = allocations
        .into_iter()
        .map(|a| PlannedMeal {
            meal_type: a.meal_type,
            target: a.target,
            content: select_meal(
                a.meal_type,
                input.goal,
                &input.dietary_restrictions,
                input.preferred_cuisine.as_deref(),
                variety,
            ),
        })
        .collect();
    meals.sort_by_key(|m| m.meal_type.day_order());
    Ok(meals)
}

#[derive(Debug, Clone)]
pub struct WorkoutPlanInput {
    pub workout_type: WorkoutType,
    pub difficulty: Difficulty,
    pub duration_minutes: u32,
    pub muscle_groups: Vec<String>,
    pub equipment: Vec<String>,
    pub intensity: Intensity,
}

/// How many exercises fit a session: 2-4 up to 20 min, 4-7 up to 40,
/// 7-10 up to 60 and 10-15 beyond, growing linearly within each band.
pub fn exercise_count(duration_minutes: u32) -> usize {
    let (lo, hi, start, span) = match duration_minutes {
        0..=20 => (2usize, 4usize, 0u32, 20u32),
        21..=40 => (4, 7, 20, 20),
        41..=60 => (7, 10, 40, 20),
        _ => (10, 15, 60, 60),
    };
    let pos = (duration_minutes - start).min(span) as f64 / span as f64;
    lo + ((hi - lo) as f64 * pos).floor() as usize
}

/// Comma-joined muscle groups, or `fullbody` when none are given.
pub fn focus_label(muscle_groups: &[String]) -> String {
    let groups: Vec<&str> = muscle_groups
        .iter()
        .map(|g| g.trim())
        .filter(|g| !g.is_empty())
        .collect();
    if groups.is_empty() {
        "fullbody".to_string()
    } else {
        groups.join(", ")
    }
}

/// Single fallback entry used when nothing better can be produced.
pub fn placeholder_exercise() -> Exercise {
    Exercise {
        id: 1,
        name: "Mixed exercises".to_string(),
        sets: 3,
        reps: 10,
        weight: 0.0,
        duration: 0,
        rest_time: 60,
        instructions: "A full-body circuit adapted to your level.".to_string(),
    }
}

fn from_template(t: &ExerciseTemplate, difficulty: Difficulty, intensity: Intensity) -> Exercise {
    let (extra_sets, extra_reps, weight_factor) = match difficulty {
        Difficulty::Beginner => (0, 0, 1.0),
        Difficulty::Intermediate => (1, 0, 1.25),
        Difficulty::Advanced => (1, 2, 1.5),
    };
    let rest_time = match intensity {
        Intensity::Low => t.rest_time + 15,
        Intensity::Moderate => t.rest_time,
        Intensity::High if t.rest_time > 30 => t.rest_time - 15,
        Intensity::High => t.rest_time,
    };
    // timed holds keep a single rep
    let reps = if t.duration > 0 { t.reps } else { t.reps + extra_reps };
    Exercise {
        id: 0,
        name: t.name.to_string(),
        sets: t.sets + extra_sets,
        reps,
        weight: (t.weight * weight_factor * 2.0).round() / 2.0,
        duration: t.duration,
        rest_time,
        instructions: t.instructions.to_string(),
    }
}

/// Builds a session from the static tables.
pub fn static_exercises(input: &WorkoutPlanInput, variety: TemplateVariety) -> Vec<Exercise> {
    let count = exercise_count(input.duration_minutes);
    let equipment: Vec<String> = input.equipment.iter().map(|e| canonical_equipment(e)).collect();
    let mut rng = rand::thread_rng();

    let mut ordered = |table: &'static [ExerciseTemplate]| -> Vec<&'static ExerciseTemplate> {
        let mut v: Vec<_> = table.iter().filter(|t| equipment_allows(t, &equipment)).collect();
        if variety == TemplateVariety::Random {
            v.shuffle(&mut rng);
        }
        v
    };

    let mut pool: Vec<Exercise> = Vec::with_capacity(count);
    let mut seen: HashSet<&str> = HashSet::new();
    let mut push = |pool: &mut Vec<Exercise>, t: &'static ExerciseTemplate| {
        if pool.len() < count && seen.insert(t.name) {
            pool.push(from_template(t, input.difficulty, input.intensity));
        }
    };

    for t in ordered(workout_type_table(input.workout_type)) {
        push(&mut pool, t);
    }

    let mut unknown_groups = Vec::new();
    let mut group_lists = Vec::new();
    for group in &input.muscle_groups {
        match exercise_table(group) {
            Some(table) => group_lists.push(ordered(table)),
            None if !group.trim().is_empty() => unknown_groups.push(group.trim().to_string()),
            None => {}
        }
    }
    let longest = group_lists.iter().map(Vec::len).max().unwrap_or(0);
    for i in 0..longest {
        for list in &group_lists {
            if let Some(t) = list.get(i) {
                push(&mut pool, *t);
            }
        }
    }
    for group in &unknown_groups {
        if pool.len() < count {
            pool.push(generic_entry(group));
        }
    }
    for t in ordered(fullbody_table()) {
        push(&mut pool, t);
    }

    let fallback = focus_label(&input.muscle_groups);
    while pool.len() < count {
        pool.push(generic_entry(&fallback));
    }

    renumber(&mut pool);
    pool
}

fn generic_entry(category: &str) -> Exercise {
    let content = generic_exercise(category);
    Exercise {
        id: 0,
        name: content.name,
        sets: 3,
        reps: 10,
        weight: 0.0,
        duration: 0,
        rest_time: 60,
        instructions: content.instructions,
    }
}

fn renumber(exercises: &mut [Exercise]) {
    for (i, e) in exercises.iter_mut().enumerate() {
        e.id = i as i64 + 1;
    }
}

pub const WORKOUT_SYSTEM_PROMPT: &str =
    "You are a smart, motivating fitness coach. Reply with JSON only.";

pub fn workout_prompt(input: &WorkoutPlanInput) -> String {
    let equipment = if input.equipment.is_empty() {
        "any".to_string()
    } else {
        input.equipment.join(", ")
    };
    format!(
        "Create a {workout_type} workout for a {difficulty} trainee lasting {duration} minutes \
         at {intensity} intensity, targeting: {groups}. Available equipment: {equipment}. \
         Return a JSON array of about {count} exercises. Each element must have the fields \
         \"id\" (integer), \"name\" (string), \"sets\" (integer), \"reps\" (integer), \
         \"weight\" (number, kg), \"duration\" (integer, seconds), \"rest_time\" (integer, seconds) \
         and \"instructions\" (string).",
        workout_type = input.workout_type,
        difficulty = input.difficulty,
        duration = input.duration_minutes,
        intensity = input.intensity,
        groups = focus_label(&input.muscle_groups),
        count = exercise_count(input.duration_minutes),
    )
}

/// Parses the first `[` .. last `]` span of an LLM reply as exercises.
pub fn parse_exercise_reply(reply: &str) -> Option<Vec<Exercise>> {
    let start = reply.find('[')?;
    let end = reply.rfind(']')?;
    if end <= start {
        return None;
    }
    let mut exercises: Vec<Exercise> = serde_json::from_str(&reply[start..=end]).ok()?;
    if exercises.is_empty() {
        return None;
    }
    renumber(&mut exercises);
    Some(exercises)
}

/// Asks the LLM for a session. Upstream failures and unparseable replies are
/// logged and masked with a single placeholder exercise.
pub async fn llm_exercises(llm: &dyn LlmClient, input: &WorkoutPlanInput, max_tokens: u32) -> Vec<Exercise> {
    let prompt = workout_prompt(input);
    match llm.complete(WORKOUT_SYSTEM_PROMPT, &prompt, max_tokens).await {
        Ok(reply) => match parse_exercise_reply(&reply) {
            Some(exercises) => {
                debug!(count = exercises.len(), "llm workout parsed");
                exercises
            }
            None => {
                warn!(reply_len = reply.len(), "llm workout reply not parseable; using placeholder");
                vec![placeholder_exercise()]
            }
        },
        Err(e) => {
            warn!(error = %e, "llm workout generation failed; using placeholder");
            vec![placeholder_exercise()]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ScriptedLlm;

    fn diet(calories: f64, meals: usize) -> DietPlanInput {
        DietPlanInput {
            goal: Goal::MuscleGain,
            calorie_target: calories,
            meal_count: meals,
            dietary_restrictions: vec![],
            preferred_cuisine: None,
        }
    }

    fn workout(duration: u32, groups: &[&str]) -> WorkoutPlanInput {
        WorkoutPlanInput {
            workout_type: WorkoutType::Strength,
            difficulty: Difficulty::Beginner,
            duration_minutes: duration,
            muscle_groups: groups.iter().map(|g| g.to_string()).collect(),
            equipment: vec![],
            intensity: Intensity::Moderate,
        }
    }

    #[test]
    fn three_meal_day_sums_to_target() {
        let meals = plan_meals(&diet(2500.0, 3), TemplateVariety::Deterministic).unwrap();
        assert_eq!(meals.len(), 3);
        let total: f64 = meals.iter().map(|m| m.target.calories).sum();
        assert!((total - 2500.0).abs() <= 3.0);
        let types: Vec<_> = meals.iter().map(|m| m.meal_type).collect();
        assert_eq!(types, vec![MealType::Breakfast, MealType::Lunch, MealType::Dinner]);
        assert!(meals.iter().all(|m| !m.content.name.is_empty()));
    }

    #[test]
    fn six_meals_are_presented_in_day_order() {
        let meals = plan_meals(&diet(3000.0, 6), TemplateVariety::Deterministic).unwrap();
        let order: Vec<_> = meals.iter().map(|m| m.meal_type.day_order()).collect();
        let mut sorted = order.clone();
        sorted.sort();
        assert_eq!(order, sorted);
    }

    #[test]
    fn exercise_count_bands() {
        assert!((2..=4).contains(&exercise_count(15)));
        assert!((2..=4).contains(&exercise_count(20)));
        assert!((4..=7).contains(&exercise_count(30)));
        assert!((7..=10).contains(&exercise_count(60)));
        assert!((10..=15).contains(&exercise_count(90)));
        assert_eq!(exercise_count(600), 15);
    }

    #[test]
    fn short_leg_session_has_two_to_four_exercises() {
        let ex = static_exercises(&workout(15, &["pernas"]), TemplateVariety::Deterministic);
        assert!((2..=4).contains(&ex.len()), "got {}", ex.len());
        assert_eq!(ex[0].name, "Squat");
        let ids: Vec<_> = ex.iter().map(|e| e.id).collect();
        assert_eq!(ids, (1..=ex.len() as i64).collect::<Vec<_>>());
    }

    #[test]
    fn long_session_fills_band_without_duplicates() {
        let ex = static_exercises(&workout(90, &["peito", "costas"]), TemplateVariety::Random);
        assert!((10..=15).contains(&ex.len()));
        let names: HashSet<_> = ex.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names.len(), ex.len());
    }

    #[test]
    fn unknown_group_yields_generic_entry() {
        let ex = static_exercises(&workout(10, &["pescoco"]), TemplateVariety::Deterministic);
        assert!((2..=4).contains(&ex.len()));
        assert_eq!(ex[0].name, "Generic exercise for pescoco");
    }

    #[test]
    fn difficulty_scales_volume() {
        let mut input = workout(15, &["legs"]);
        input.difficulty = Difficulty::Advanced;
        let ex = static_exercises(&input, TemplateVariety::Deterministic);
        assert_eq!(ex[0].sets, 4);
        assert_eq!(ex[0].reps, 12);
        assert_eq!(ex[1].weight, 75.0);
    }

    #[test]
    fn focus_label_joins_or_defaults() {
        assert_eq!(focus_label(&["pernas".into(), "peito".into()]), "pernas, peito");
        assert_eq!(focus_label(&[]), "fullbody");
        assert_eq!(focus_label(&["  ".into()]), "fullbody");
    }

    #[test]
    fn parses_first_array_in_chatty_reply() {
        let reply = r#"Sure! Here you go:
```json
[{"id": 7, "name": "Squat", "sets": 3, "reps": 10, "weight": 0, "duration": 0, "rest_time": 60, "instructions": "Go low."},
 {"name": "Plank", "sets": 3, "reps": 1, "duration": 45}]
```
Have fun."#;
        let ex = parse_exercise_reply(reply).unwrap();
        assert_eq!(ex.len(), 2);
        assert_eq!(ex[0].id, 1);
        assert_eq!(ex[1].name, "Plank");
        assert_eq!(ex[1].rest_time, 0);
    }

    #[test]
    fn rejects_replies_without_valid_array() {
        assert!(parse_exercise_reply("no json here").is_none());
        assert!(parse_exercise_reply("] backwards [").is_none());
        assert!(parse_exercise_reply("[]").is_none());
        assert!(parse_exercise_reply("[{\"name\": 3}]").is_none());
    }

    #[tokio::test]
    async fn malformed_llm_reply_falls_back_to_placeholder() {
        let llm = ScriptedLlm::reply("I think you should do some squats, maybe [three of them");
        let ex = llm_exercises(&llm, &workout(30, &["legs"]), 1500).await;
        assert_eq!(ex, vec![placeholder_exercise()]);
    }

    #[tokio::test]
    async fn failing_llm_falls_back_to_placeholder() {
        let llm = ScriptedLlm::failing();
        let ex = llm_exercises(&llm, &workout(30, &["legs"]), 1500).await;
        assert_eq!(ex.len(), 1);
        assert_eq!(ex[0].name, "Mixed exercises");
    }

    #[tokio::test]
    async fn well_formed_llm_reply_is_used() {
        let llm = ScriptedLlm::reply(
            r#"[{"id":1,"name":"Goblet Squat","sets":3,"reps":12,"weight":16,"duration":0,"rest_time":60,"instructions":"Hold the bell at the chest."}]"#,
        );
        let ex = llm_exercises(&llm, &workout(30, &["legs"]), 1500).await;
        assert_eq!(ex[0].name, "Goblet Squat");
        assert_eq!(ex[0].weight, 16.0);
    }
}
