use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Stored enum values round-trip through TEXT columns as their snake_case
/// names; Portuguese spellings are accepted on input only.
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $variant:ident => $text:literal $(| $alias:literal)* ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $text $(, alias = $alias)*)]
                $variant,
            )+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let key = s.trim().to_lowercase();
                match key.as_str() {
                    $($text $(| $alias)* => Ok($name::$variant),)+
                    _ => Err(UnknownVariant {
                        kind: stringify!($name),
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} value {value:?}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

text_enum! {
    pub enum MealType {
        Breakfast => "breakfast" | "cafe_da_manha",
        Lunch => "lunch" | "almoco",
        Dinner => "dinner" | "jantar",
        Snack => "snack" | "lanche",
        AfternoonSnack => "afternoon_snack" | "lanche_da_tarde",
        PreWorkout => "pre_workout" | "pre_treino",
        PostWorkout => "post_workout" | "pos_treino",
    }
}

impl MealType {
    /// Order in which meal types are picked to fill a day's slots.
    pub const PRIORITY: [MealType; 7] = [
        MealType::Breakfast,
        MealType::Lunch,
        MealType::Dinner,
        MealType::Snack,
        MealType::AfternoonSnack,
        MealType::PostWorkout,
        MealType::PreWorkout,
    ];

    /// Position within a day, used to present slots chronologically.
    pub fn day_order(&self) -> u8 {
        match self {
            MealType::Breakfast => 0,
            MealType::Snack => 1,
            MealType::Lunch => 2,
            MealType::AfternoonSnack => 3,
            MealType::PreWorkout => 4,
            MealType::PostWorkout => 5,
            MealType::Dinner => 6,
        }
    }
}

text_enum! {
    pub enum Goal {
        WeightLoss => "weight_loss" | "perda_peso" | "perda de peso",
        MuscleGain => "muscle_gain" | "ganho_muscular" | "ganho muscular",
        Flexibility => "flexibility" | "flexibilidade",
        Maintenance => "maintenance" | "manutencao",
    }
}

text_enum! {
    pub enum WorkoutType {
        Cardio => "cardio",
        Strength => "strength" | "musculacao",
        Flexibility => "flexibility" | "flexibilidade",
        Yoga => "yoga",
        Hiit => "hiit",
    }
}

text_enum! {
    pub enum Intensity {
        Low => "low" | "baixa",
        Moderate => "moderate" | "moderada",
        High => "high" | "alta",
    }
}

impl Default for Intensity {
    fn default() -> Self {
        Intensity::Moderate
    }
}

impl Intensity {
    pub fn step_up(self) -> Self {
        match self {
            Intensity::Low => Intensity::Moderate,
            Intensity::Moderate | Intensity::High => Intensity::High,
        }
    }

    pub fn step_down(self) -> Self {
        match self {
            Intensity::High => Intensity::Moderate,
            Intensity::Moderate | Intensity::Low => Intensity::Low,
        }
    }
}

text_enum! {
    pub enum Difficulty {
        Beginner => "beginner" | "iniciante",
        Intermediate => "intermediate" | "intermediario" | "moderado",
        Advanced => "advanced" | "avancado",
    }
}

text_enum! {
    pub enum WorkoutStatus {
        Pending => "pending",
        Completed => "completed",
        Skipped => "skipped",
    }
}

/// Calories and macronutrients for one meal or a whole day.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MacroTarget {
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
}

impl MacroTarget {
    pub fn sum<'a>(items: impl IntoIterator<Item = &'a MacroTarget>) -> MacroTarget {
        items.into_iter().fold(MacroTarget::default(), |acc, m| MacroTarget {
            calories: acc.calories + m.calories,
            protein_g: acc.protein_g + m.protein_g,
            carbs_g: acc.carbs_g + m.carbs_g,
            fat_g: acc.fat_g + m.fat_g,
        })
    }
}

/// One exercise inside a workout's `exercises` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    pub sets: u32,
    pub reps: u32,
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub duration: u32,
    #[serde(default)]
    pub rest_time: u32,
    #[serde(default)]
    pub instructions: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn portuguese_aliases_parse_to_canonical_variants() {
        assert_eq!("musculacao".parse::<WorkoutType>().unwrap(), WorkoutType::Strength);
        assert_eq!("Iniciante".parse::<Difficulty>().unwrap(), Difficulty::Beginner);
        assert_eq!("ganho_muscular".parse::<Goal>().unwrap(), Goal::MuscleGain);
        assert_eq!(" alta ".parse::<Intensity>().unwrap(), Intensity::High);
        assert_eq!(WorkoutType::Strength.to_string(), "strength");
    }

    #[test]
    fn serde_accepts_aliases_and_writes_canonical_names() {
        let t: WorkoutType = serde_json::from_str("\"musculacao\"").unwrap();
        assert_eq!(t, WorkoutType::Strength);
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"strength\"");
        let m: MealType = serde_json::from_str("\"afternoon_snack\"").unwrap();
        assert_eq!(m, MealType::AfternoonSnack);
    }

    #[test]
    fn unknown_value_is_reported() {
        let err = "pilates".parse::<WorkoutType>().unwrap_err();
        assert_eq!(err.kind, "WorkoutType");
        assert!(err.to_string().contains("pilates"));
    }

    #[test]
    fn intensity_steps_saturate() {
        assert_eq!(Intensity::Moderate.step_up(), Intensity::High);
        assert_eq!(Intensity::High.step_up(), Intensity::High);
        assert_eq!(Intensity::High.step_down(), Intensity::Moderate);
        assert_eq!(Intensity::Low.step_down(), Intensity::Low);
    }

    #[test]
    fn exercises_round_trip_through_json_in_order() {
        let exercises = vec![
            Exercise {
                id: 1,
                name: "Squat".into(),
                sets: 3,
                reps: 10,
                weight: 0.0,
                duration: 0,
                rest_time: 60,
                instructions: "Keep your back straight.".into(),
            },
            Exercise {
                id: 2,
                name: "Leg Press".into(),
                sets: 3,
                reps: 12,
                weight: 50.0,
                duration: 0,
                rest_time: 60,
                instructions: "Push through the heels.".into(),
            },
        ];
        let json = serde_json::to_string(&exercises).unwrap();
        let back: Vec<Exercise> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, exercises);
    }
}
