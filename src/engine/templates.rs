//! Static meal and exercise content.
//!
//! Lookups never fail: an unknown category produces a generic entry named
//! after it.

use rand::seq::SliceRandom;
use serde::Deserialize;

use super::types::{Goal, MealType, WorkoutType};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateVariety {
    /// Always the first admissible entry; reproducible output.
    #[default]
    Deterministic,
    Random,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MealContent {
    pub name: String,
    pub description: String,
    pub ingredients: Vec<String>,
    pub prep_minutes: i32,
}

struct MealTemplate {
    name: &'static str,
    description: &'static str,
    ingredients: &'static [&'static str],
    prep_minutes: i32,
    cuisine: &'static str,
    /// Dietary restrictions this dish already satisfies.
    suits: &'static [&'static str],
    goals: &'static [Goal],
}

const VEGAN: &[&str] = &["vegan", "vegetarian", "lactose_free"];
const VEGETARIAN: &[&str] = &["vegetarian"];
const VEG_GF: &[&str] = &["vegetarian", "gluten_free"];
const GF_LF: &[&str] = &["gluten_free", "lactose_free"];
const LF: &[&str] = &["lactose_free"];
const NONE: &[&str] = &[];

const ALL_GOALS: &[Goal] = &[Goal::WeightLoss, Goal::MuscleGain, Goal::Flexibility, Goal::Maintenance];

fn meal_table(meal_type: MealType) -> &'static [MealTemplate] {
    match meal_type {
        MealType::Breakfast => {
            const T: &[MealTemplate] = &[
                MealTemplate {
                    name: "Oatmeal with banana and peanut butter",
                    description: "Rolled oats cooked in milk, topped with sliced banana and a spoon of peanut butter.",
                    ingredients: &["rolled oats", "milk", "banana", "peanut butter", "cinnamon"],
                    prep_minutes: 10,
                    cuisine: "international",
                    suits: VEGETARIAN,
                    goals: &[Goal::MuscleGain, Goal::Maintenance],
                },
                MealTemplate {
                    name: "Scrambled eggs with tapioca",
                    description: "Two eggs scrambled with tomato, served in a tapioca crepe.",
                    ingredients: &["eggs", "tapioca flour", "tomato", "olive oil"],
                    prep_minutes: 12,
                    cuisine: "brazilian",
                    suits: &["vegetarian", "gluten_free", "lactose_free"],
                    goals: ALL_GOALS,
                },
                MealTemplate {
                    name: "Greek yogurt bowl",
                    description: "Plain Greek yogurt with berries, chia seeds and a drizzle of honey.",
                    ingredients: &["greek yogurt", "mixed berries", "chia seeds", "honey"],
                    prep_minutes: 5,
                    cuisine: "mediterranean",
                    suits: VEG_GF,
                    goals: &[Goal::WeightLoss, Goal::Flexibility],
                },
                MealTemplate {
                    name: "Tofu scramble toast",
                    description: "Turmeric tofu scramble with spinach on whole-grain toast.",
                    ingredients: &["firm tofu", "spinach", "turmeric", "whole-grain bread"],
                    prep_minutes: 15,
                    cuisine: "international",
                    suits: VEGAN,
                    goals: ALL_GOALS,
                },
            ];
            T
        }
        MealType::Lunch => {
            const T: &[MealTemplate] = &[
                MealTemplate {
                    name: "Grilled chicken with rice and beans",
                    description: "Grilled chicken breast with white rice, black beans and a green salad.",
                    ingredients: &["chicken breast", "rice", "black beans", "lettuce", "tomato"],
                    prep_minutes: 30,
                    cuisine: "brazilian",
                    suits: GF_LF,
                    goals: &[Goal::MuscleGain, Goal::Maintenance],
                },
                MealTemplate {
                    name: "Salmon quinoa salad",
                    description: "Baked salmon over quinoa with cucumber, avocado and lemon dressing.",
                    ingredients: &["salmon", "quinoa", "cucumber", "avocado", "lemon"],
                    prep_minutes: 25,
                    cuisine: "mediterranean",
                    suits: GF_LF,
                    goals: &[Goal::WeightLoss, Goal::Flexibility, Goal::Maintenance],
                },
                MealTemplate {
                    name: "Chickpea curry with brown rice",
                    description: "Chickpeas simmered in a tomato and coconut curry, served with brown rice.",
                    ingredients: &["chickpeas", "coconut milk", "tomato", "curry paste", "brown rice"],
                    prep_minutes: 35,
                    cuisine: "indian",
                    suits: &["vegan", "vegetarian", "gluten_free", "lactose_free"],
                    goals: ALL_GOALS,
                },
                MealTemplate {
                    name: "Whole-wheat pasta with turkey bolognese",
                    description: "Lean ground turkey in tomato sauce over whole-wheat pasta.",
                    ingredients: &["whole-wheat pasta", "ground turkey", "tomato sauce", "onion", "garlic"],
                    prep_minutes: 30,
                    cuisine: "italian",
                    suits: LF,
                    goals: &[Goal::MuscleGain],
                },
            ];
            T
        }
        MealType::Dinner => {
            const T: &[MealTemplate] = &[
                MealTemplate {
                    name: "Baked fish with roasted vegetables",
                    description: "White fish fillet baked with olive oil, served with roasted zucchini and carrots.",
                    ingredients: &["white fish", "zucchini", "carrot", "olive oil", "herbs"],
                    prep_minutes: 30,
                    cuisine: "mediterranean",
                    suits: GF_LF,
                    goals: ALL_GOALS,
                },
                MealTemplate {
                    name: "Beef stir-fry",
                    description: "Lean beef strips stir-fried with broccoli and peppers over rice noodles.",
                    ingredients: &["lean beef", "broccoli", "bell pepper", "rice noodles", "tamari"],
                    prep_minutes: 20,
                    cuisine: "asian",
                    suits: GF_LF,
                    goals: &[Goal::MuscleGain, Goal::Maintenance],
                },
                MealTemplate {
                    name: "Lentil soup",
                    description: "Red lentil soup with carrot, celery and cumin.",
                    ingredients: &["red lentils", "carrot", "celery", "onion", "cumin"],
                    prep_minutes: 35,
                    cuisine: "international",
                    suits: &["vegan", "vegetarian", "gluten_free", "lactose_free"],
                    goals: &[Goal::WeightLoss, Goal::Flexibility],
                },
            ];
            T
        }
        MealType::Snack | MealType::AfternoonSnack => {
            const T: &[MealTemplate] = &[
                MealTemplate {
                    name: "Apple with almonds",
                    description: "One apple and a handful of almonds.",
                    ingredients: &["apple", "almonds"],
                    prep_minutes: 2,
                    cuisine: "international",
                    suits: &["vegan", "vegetarian", "gluten_free", "lactose_free"],
                    goals: ALL_GOALS,
                },
                MealTemplate {
                    name: "Cottage cheese with pineapple",
                    description: "Cottage cheese topped with pineapple chunks.",
                    ingredients: &["cottage cheese", "pineapple"],
                    prep_minutes: 3,
                    cuisine: "international",
                    suits: VEG_GF,
                    goals: &[Goal::MuscleGain, Goal::WeightLoss],
                },
                MealTemplate {
                    name: "Hummus with carrot sticks",
                    description: "Chickpea hummus with carrot and cucumber sticks.",
                    ingredients: &["hummus", "carrot", "cucumber"],
                    prep_minutes: 5,
                    cuisine: "mediterranean",
                    suits: &["vegan", "vegetarian", "gluten_free", "lactose_free"],
                    goals: ALL_GOALS,
                },
            ];
            T
        }
        MealType::PreWorkout => {
            const T: &[MealTemplate] = &[
                MealTemplate {
                    name: "Banana and rice cakes",
                    description: "Rice cakes with honey and a banana, eaten 30-60 minutes before training.",
                    ingredients: &["rice cakes", "honey", "banana"],
                    prep_minutes: 3,
                    cuisine: "international",
                    suits: &["vegetarian", "gluten_free", "lactose_free"],
                    goals: ALL_GOALS,
                },
                MealTemplate {
                    name: "Toast with jam",
                    description: "White toast with fruit jam for quick carbohydrates.",
                    ingredients: &["white bread", "fruit jam"],
                    prep_minutes: 3,
                    cuisine: "international",
                    suits: VEGAN,
                    goals: ALL_GOALS,
                },
            ];
            T
        }
        MealType::PostWorkout => {
            const T: &[MealTemplate] = &[
                MealTemplate {
                    name: "Whey protein shake with oats",
                    description: "Whey protein blended with milk, oats and a banana.",
                    ingredients: &["whey protein", "milk", "rolled oats", "banana"],
                    prep_minutes: 5,
                    cuisine: "international",
                    suits: VEGETARIAN,
                    goals: ALL_GOALS,
                },
                MealTemplate {
                    name: "Chicken wrap",
                    description: "Shredded chicken, lettuce and yogurt sauce in a whole-wheat wrap.",
                    ingredients: &["chicken breast", "whole-wheat tortilla", "lettuce", "yogurt sauce"],
                    prep_minutes: 10,
                    cuisine: "international",
                    suits: NONE,
                    goals: &[Goal::MuscleGain, Goal::Maintenance],
                },
                MealTemplate {
                    name: "Soy protein smoothie",
                    description: "Soy protein with frozen berries and oat milk.",
                    ingredients: &["soy protein", "frozen berries", "oat milk"],
                    prep_minutes: 5,
                    cuisine: "international",
                    suits: VEGAN,
                    goals: ALL_GOALS,
                },
            ];
            T
        }
    }
}

/// Restriction names the meal table understands. Anything else is advisory
/// and ignored when filtering.
const KNOWN_RESTRICTIONS: &[&str] = &["vegan", "vegetarian", "gluten_free", "lactose_free"];

fn canonical_restriction(raw: &str) -> Option<&'static str> {
    let key = raw.trim().to_lowercase().replace([' ', '-'], "_");
    let canonical = match key.as_str() {
        "vegano" | "vegana" => "vegan",
        "vegetariano" | "vegetariana" => "vegetarian",
        "sem_gluten" | "gluten" | "celiac" => "gluten_free",
        "sem_lactose" | "lactose" | "dairy_free" => "lactose_free",
        other => return KNOWN_RESTRICTIONS.iter().copied().find(|k| *k == other),
    };
    Some(canonical)
}

/// Picks content for one meal slot.
pub fn select_meal(
    meal_type: MealType,
    goal: Goal,
    restrictions: &[String],
    cuisine: Option<&str>,
    variety: TemplateVariety,
) -> MealContent {
    let wanted: Vec<&str> = restrictions
        .iter()
        .filter_map(|r| canonical_restriction(r))
        .collect();
    let cuisine = cuisine.map(|c| c.trim().to_lowercase());

    let admissible: Vec<(u8, &MealTemplate)> = meal_table(meal_type)
        .iter()
        .filter(|t| wanted.iter().all(|r| t.suits.contains(r)))
        .map(|t| {
            let mut score = 0;
            if t.goals.contains(&goal) {
                score += 1;
            }
            if cuisine.as_deref() == Some(t.cuisine) {
                score += 2;
            }
            (score, t)
        })
        .collect();

    let Some(best) = admissible.iter().map(|(s, _)| *s).max() else {
        return generic_meal(meal_type.as_str());
    };
    let top: Vec<&MealTemplate> = admissible
        .iter()
        .filter(|(s, _)| *s == best)
        .map(|(_, t)| *t)
        .collect();

    let chosen = match variety {
        TemplateVariety::Deterministic => top[0],
        TemplateVariety::Random => top.choose(&mut rand::thread_rng()).copied().unwrap_or(top[0]),
    };
    MealContent {
        name: chosen.name.to_string(),
        description: chosen.description.to_string(),
        ingredients: chosen.ingredients.iter().map(|s| s.to_string()).collect(),
        prep_minutes: chosen.prep_minutes,
    }
}

pub fn generic_meal(category: &str) -> MealContent {
    MealContent {
        name: format!("Meal for {category}"),
        description: format!("A balanced {category} matching your calorie and macro targets."),
        ingredients: Vec::new(),
        prep_minutes: 15,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseTemplate {
    pub name: &'static str,
    pub sets: u32,
    pub reps: u32,
    pub weight: f64,
    /// Seconds, for timed movements.
    pub duration: u32,
    pub rest_time: u32,
    pub instructions: &'static str,
    /// Everything listed is required; empty means bodyweight.
    pub equipment: &'static [&'static str],
}

macro_rules! ex {
    ($name:literal, $sets:literal x $reps:literal @ $weight:literal, $dur:literal s, rest $rest:literal, [$($eq:literal),*], $instr:literal) => {
        ExerciseTemplate {
            name: $name,
            sets: $sets,
            reps: $reps,
            weight: $weight,
            duration: $dur,
            rest_time: $rest,
            instructions: $instr,
            equipment: &[$($eq),*],
        }
    };
}

const LEGS: &[ExerciseTemplate] = &[
    ex!("Squat", 3 x 10 @ 0.0, 0 s, rest 60, [], "Squat with good form, keeping your back straight and knees tracking your toes."),
    ex!("Leg Press", 3 x 12 @ 50.0, 0 s, rest 60, ["machine"], "Push the platform with your heels and control the descent."),
    ex!("Walking Lunge", 3 x 12 @ 0.0, 0 s, rest 60, [], "Step forward until both knees reach 90 degrees, alternating legs."),
    ex!("Romanian Deadlift", 3 x 10 @ 30.0, 0 s, rest 90, ["barbell"], "Hinge at the hips with a slight knee bend, bar close to the legs."),
    ex!("Glute Bridge", 3 x 15 @ 0.0, 0 s, rest 45, [], "Drive through the heels and squeeze the glutes at the top."),
    ex!("Standing Calf Raise", 3 x 15 @ 0.0, 0 s, rest 45, [], "Rise onto the balls of your feet and lower slowly."),
];

const CHEST: &[ExerciseTemplate] = &[
    ex!("Bench Press", 4 x 8 @ 40.0, 0 s, rest 90, ["barbell", "bench"], "Lie on the bench, grip the bar and press it up over the chest."),
    ex!("Push-up", 3 x 15 @ 0.0, 0 s, rest 45, [], "Keep the body straight and lower the chest towards the floor."),
    ex!("Incline Dumbbell Press", 3 x 10 @ 14.0, 0 s, rest 75, ["dumbbells", "bench"], "Press the dumbbells up from an inclined bench."),
    ex!("Dumbbell Fly", 3 x 12 @ 8.0, 0 s, rest 60, ["dumbbells", "bench"], "Open the arms in a wide arc and squeeze the chest to return."),
];

const BACK: &[ExerciseTemplate] = &[
    ex!("Bent-over Row", 3 x 10 @ 30.0, 0 s, rest 75, ["barbell"], "Lean the torso forward and pull the bar towards the abdomen."),
    ex!("Lat Pulldown", 3 x 12 @ 35.0, 0 s, rest 60, ["machine"], "Pull the bar towards the chest, squeezing the back."),
    ex!("Pull-up", 3 x 6 @ 0.0, 0 s, rest 90, ["pullup_bar"], "Hang with straight arms and pull your chin over the bar."),
    ex!("Superman Hold", 3 x 12 @ 0.0, 0 s, rest 45, [], "Lie face down and lift arms and legs off the floor."),
];

const SHOULDERS: &[ExerciseTemplate] = &[
    ex!("Overhead Press", 3 x 10 @ 25.0, 0 s, rest 75, ["barbell"], "Press the bar overhead without arching the lower back."),
    ex!("Lateral Raise", 3 x 12 @ 6.0, 0 s, rest 45, ["dumbbells"], "Raise the dumbbells to shoulder height with soft elbows."),
    ex!("Pike Push-up", 3 x 10 @ 0.0, 0 s, rest 60, [], "From a pike position, lower the head towards the floor and press back."),
];

const ARMS: &[ExerciseTemplate] = &[
    ex!("Barbell Curl", 3 x 12 @ 15.0, 0 s, rest 45, ["barbell"], "Curl the bar keeping the elbows fixed at your sides."),
    ex!("Triceps Dip", 3 x 12 @ 0.0, 0 s, rest 45, ["bench"], "Lower your body by bending the elbows, then press back up."),
    ex!("Hammer Curl", 3 x 12 @ 8.0, 0 s, rest 45, ["dumbbells"], "Curl with a neutral grip, palms facing each other."),
    ex!("Diamond Push-up", 3 x 10 @ 0.0, 0 s, rest 45, [], "Push-up with hands close together under the chest."),
];

const CORE: &[ExerciseTemplate] = &[
    ex!("Plank", 3 x 1 @ 0.0, 45 s, rest 30, [], "Hold a straight line from head to heels, bracing the abs."),
    ex!("Crunch", 3 x 20 @ 0.0, 0 s, rest 30, [], "Curl the shoulders off the floor without pulling the neck."),
    ex!("Russian Twist", 3 x 20 @ 0.0, 0 s, rest 30, [], "Lean back slightly and rotate the torso side to side."),
    ex!("Hanging Leg Raise", 3 x 10 @ 0.0, 0 s, rest 60, ["pullup_bar"], "Hang from the bar and raise straight legs to hip height."),
];

const FULLBODY: &[ExerciseTemplate] = &[
    ex!("Burpee", 3 x 10 @ 0.0, 0 s, rest 60, [], "Squat, kick back to a plank, push up and jump."),
    ex!("Kettlebell Swing", 3 x 15 @ 12.0, 0 s, rest 60, ["kettlebell"], "Hinge and snap the hips to swing the bell to chest height."),
    ex!("Mountain Climber", 3 x 1 @ 0.0, 40 s, rest 30, [], "From a plank, drive the knees towards the chest alternately."),
    ex!("Deadlift", 3 x 8 @ 40.0, 0 s, rest 90, ["barbell"], "Lift the bar from the floor with a neutral spine."),
    ex!("Jumping Jack", 3 x 1 @ 0.0, 45 s, rest 30, [], "Jump feet apart while raising the arms, then return."),
];

const CARDIO: &[ExerciseTemplate] = &[
    ex!("Running", 1 x 1 @ 0.0, 1200 s, rest 0, [], "Run at a steady, conversational pace."),
    ex!("Cycling", 1 x 1 @ 0.0, 1200 s, rest 0, ["bike"], "Cycle at a steady cadence with moderate resistance."),
    ex!("Jump Rope", 5 x 1 @ 0.0, 60 s, rest 30, ["jump_rope"], "Skip on the balls of your feet with relaxed shoulders."),
    ex!("High Knees", 4 x 1 @ 0.0, 45 s, rest 30, [], "Run in place driving the knees to hip height."),
];

const HIIT: &[ExerciseTemplate] = &[
    ex!("Sprint Intervals", 8 x 1 @ 0.0, 20 s, rest 40, [], "Sprint all-out, then walk to recover."),
    ex!("Jump Squat", 4 x 12 @ 0.0, 0 s, rest 30, [], "Squat down and explode upward, landing softly."),
    ex!("Burpee", 4 x 10 @ 0.0, 0 s, rest 30, [], "Squat, kick back to a plank, push up and jump."),
    ex!("Mountain Climber", 4 x 1 @ 0.0, 30 s, rest 30, [], "From a plank, drive the knees towards the chest alternately."),
];

const FLEXIBILITY: &[ExerciseTemplate] = &[
    ex!("Hamstring Stretch", 2 x 1 @ 0.0, 45 s, rest 15, [], "Sit with legs extended and reach towards your toes."),
    ex!("Hip Flexor Stretch", 2 x 1 @ 0.0, 45 s, rest 15, [], "Kneel in a lunge and push the hips forward gently."),
    ex!("Cat-Cow", 2 x 10 @ 0.0, 0 s, rest 15, ["mat"], "On all fours, alternate arching and rounding the spine."),
    ex!("Shoulder Stretch", 2 x 1 @ 0.0, 30 s, rest 15, [], "Pull one arm across the chest and hold, then switch."),
];

const YOGA: &[ExerciseTemplate] = &[
    ex!("Sun Salutation", 3 x 1 @ 0.0, 120 s, rest 15, ["mat"], "Flow through the sun salutation sequence with the breath."),
    ex!("Downward Dog", 3 x 1 @ 0.0, 45 s, rest 15, ["mat"], "Press the hips up and back, lengthening the spine."),
    ex!("Warrior II", 2 x 1 @ 0.0, 45 s, rest 15, ["mat"], "Hold a wide stance with arms extended, gaze over the front hand."),
    ex!("Child's Pose", 2 x 1 @ 0.0, 60 s, rest 0, ["mat"], "Sit back on the heels and rest the forehead on the mat."),
];

/// Maps English and Portuguese muscle-group names onto table keys.
pub fn canonical_muscle_group(raw: &str) -> Option<&'static str> {
    let key = raw.trim().to_lowercase().replace(['-', ' '], "_");
    let group = match key.as_str() {
        "legs" | "leg" | "pernas" | "perna" | "lower_body" | "gluteos" | "glutes" => "legs",
        "chest" | "peito" | "peitoral" => "chest",
        "back" | "costas" | "dorsal" => "back",
        "shoulders" | "ombros" | "ombro" => "shoulders",
        "arms" | "bracos" | "braços" | "biceps" | "triceps" => "arms",
        "core" | "abs" | "abdomen" | "abdominais" | "abdominal" => "core",
        "fullbody" | "full_body" | "corpo_inteiro" => "fullbody",
        _ => return None,
    };
    Some(group)
}

pub fn canonical_equipment(raw: &str) -> String {
    let key = raw.trim().to_lowercase().replace(['-', ' '], "_");
    match key.as_str() {
        "barra" => "barbell".into(),
        "halteres" | "halter" | "dumbbell" => "dumbbells".into(),
        "maquina" | "máquina" | "machines" => "machine".into(),
        "banco" => "bench".into(),
        "barra_fixa" | "pull_up_bar" => "pullup_bar".into(),
        "colchonete" | "yoga_mat" => "mat".into(),
        "bicicleta" | "bicycle" => "bike".into(),
        "corda" | "corda_de_pular" => "jump_rope".into(),
        _ => key,
    }
}

/// Exercise options for a muscle group, or `None` when the group is unknown.
pub fn exercise_table(muscle_group: &str) -> Option<&'static [ExerciseTemplate]> {
    let table = match canonical_muscle_group(muscle_group)? {
        "legs" => LEGS,
        "chest" => CHEST,
        "back" => BACK,
        "shoulders" => SHOULDERS,
        "arms" => ARMS,
        "core" => CORE,
        _ => FULLBODY,
    };
    Some(table)
}

/// Type-specific options that lead a non-strength session.
pub fn workout_type_table(workout_type: WorkoutType) -> &'static [ExerciseTemplate] {
    match workout_type {
        WorkoutType::Strength => &[],
        WorkoutType::Cardio => CARDIO,
        WorkoutType::Hiit => HIIT,
        WorkoutType::Flexibility => FLEXIBILITY,
        WorkoutType::Yoga => YOGA,
    }
}

pub fn fullbody_table() -> &'static [ExerciseTemplate] {
    FULLBODY
}

/// An empty equipment list means the user did not restrict equipment.
pub fn equipment_allows(template: &ExerciseTemplate, available: &[String]) -> bool {
    available.is_empty() || template.equipment.iter().all(|e| available.iter().any(|a| a == e))
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseContent {
    pub name: String,
    pub description: String,
    pub instructions: String,
}

/// Single-entry lookup for one muscle group.
pub fn select_exercise(
    muscle_group: &str,
    equipment: &[String],
    variety: TemplateVariety,
) -> ExerciseContent {
    let options: Vec<&ExerciseTemplate> = exercise_table(muscle_group)
        .unwrap_or(&[])
        .iter()
        .filter(|t| equipment_allows(t, equipment))
        .collect();
    let chosen = match variety {
        TemplateVariety::Deterministic => options.first().copied(),
        TemplateVariety::Random => options.choose(&mut rand::thread_rng()).copied(),
    };
    match chosen {
        Some(t) => ExerciseContent {
            name: t.name.to_string(),
            description: format!("{} x {} for {}", t.sets, t.reps, muscle_group),
            instructions: t.instructions.to_string(),
        },
        None => generic_exercise(muscle_group),
    }
}

pub fn generic_exercise(category: &str) -> ExerciseContent {
    ExerciseContent {
        name: format!("Generic exercise for {category}"),
        description: format!("A general movement targeting {category}."),
        instructions: "Perform with controlled form, adapted to your level.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_selection_is_stable() {
        let a = select_meal(MealType::Lunch, Goal::MuscleGain, &[], None, TemplateVariety::Deterministic);
        let b = select_meal(MealType::Lunch, Goal::MuscleGain, &[], None, TemplateVariety::Deterministic);
        assert_eq!(a, b);
        assert_eq!(a.name, "Grilled chicken with rice and beans");
    }

    #[test]
    fn restrictions_filter_meals() {
        let meal = select_meal(
            MealType::Lunch,
            Goal::MuscleGain,
            &["Vegano".to_string()],
            None,
            TemplateVariety::Deterministic,
        );
        assert_eq!(meal.name, "Chickpea curry with brown rice");
    }

    #[test]
    fn cuisine_preference_wins_over_goal() {
        let meal = select_meal(
            MealType::Lunch,
            Goal::MuscleGain,
            &[],
            Some("Italian"),
            TemplateVariety::Deterministic,
        );
        assert_eq!(meal.name, "Whole-wheat pasta with turkey bolognese");
    }

    #[test]
    fn unknown_restrictions_are_ignored() {
        let meal = select_meal(
            MealType::Dinner,
            Goal::WeightLoss,
            &["no_cilantro".to_string()],
            None,
            TemplateVariety::Deterministic,
        );
        assert!(!meal.name.starts_with("Meal for"));
    }

    #[test]
    fn impossible_restrictions_fall_back_to_generic() {
        let meal = select_meal(
            MealType::PostWorkout,
            Goal::MuscleGain,
            &["vegan".to_string(), "gluten_free".to_string()],
            None,
            TemplateVariety::Deterministic,
        );
        assert_eq!(meal.name, "Meal for post_workout");
    }

    #[test]
    fn random_selection_stays_within_admissible_entries() {
        for _ in 0..20 {
            let meal = select_meal(
                MealType::Snack,
                Goal::Maintenance,
                &["vegan".to_string()],
                None,
                TemplateVariety::Random,
            );
            assert!(meal.name == "Apple with almonds" || meal.name == "Hummus with carrot sticks");
        }
    }

    #[test]
    fn muscle_groups_accept_portuguese_names() {
        assert_eq!(canonical_muscle_group("Pernas"), Some("legs"));
        assert_eq!(canonical_muscle_group("peito"), Some("chest"));
        assert_eq!(canonical_muscle_group("costas"), Some("back"));
        assert_eq!(canonical_muscle_group("pescoço"), None);
        assert_eq!(canonical_equipment("Halteres"), "dumbbells");
    }

    #[test]
    fn unknown_muscle_group_gets_generic_exercise() {
        let ex = select_exercise("neck", &[], TemplateVariety::Deterministic);
        assert_eq!(ex.name, "Generic exercise for neck");
    }

    #[test]
    fn equipment_filter_skips_unavailable_gear() {
        let ex = select_exercise("chest", &["dumbbells".to_string()], TemplateVariety::Deterministic);
        assert_eq!(ex.name, "Push-up");
        let ex = select_exercise(
            "chest",
            &["barbell".to_string(), "bench".to_string()],
            TemplateVariety::Deterministic,
        );
        assert_eq!(ex.name, "Bench Press");
    }
}
