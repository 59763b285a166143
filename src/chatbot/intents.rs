//! Keyword routing for chat messages. The first matching predicate wins;
//! anything unmatched goes to the LLM.

use crate::engine::allocator::round1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    CurrentWeight,
    LegWorkout,
    CurlLoad,
    SuggestedLoad,
    Fallback,
}

type Predicate = fn(&str) -> bool;

fn contains_any(msg: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| msg.contains(n))
}

fn asks_current_weight(msg: &str) -> bool {
    contains_any(msg, &["peso atual", "current weight"])
}

fn asks_leg_workout(msg: &str) -> bool {
    contains_any(
        msg,
        &[
            "treino de pernas",
            "sugestão de treino",
            "sugestao de treino",
            "quero um treino",
            "leg workout",
            "workout suggestion",
            "suggest a workout",
        ],
    )
}

pub const CURL_NAMES: &[&str] = &["rosca direta", "bicep curl", "biceps curl", "barbell curl"];

fn asks_curl_load(msg: &str) -> bool {
    contains_any(msg, &["carga", "load", "weight"]) && contains_any(msg, CURL_NAMES)
}

fn asks_suggested_load(msg: &str) -> bool {
    contains_any(
        msg,
        &["carga ideal", "carga sugerida", "ideal load", "suggested load", "recommended load"],
    )
}

const ROUTES: &[(Predicate, Intent)] = &[
    (asks_current_weight, Intent::CurrentWeight),
    (asks_leg_workout, Intent::LegWorkout),
    (asks_curl_load, Intent::CurlLoad),
    (asks_suggested_load, Intent::SuggestedLoad),
];

pub fn classify(message: &str) -> Intent {
    let msg = message.to_lowercase();
    ROUTES
        .iter()
        .find(|(matches, _)| matches(&msg))
        .map(|(_, intent)| *intent)
        .unwrap_or(Intent::Fallback)
}

/// Terms identifying leg sessions by focus or name.
pub const LEG_TERMS: &[&str] = &["pernas", "legs"];
pub const LOAD_HISTORY: i64 = 5;
pub const SUGGESTED_REPS: u32 = 10;

/// Ten percent over the average of recent loads, for ten reps.
pub fn suggest_load(recent: &[f64]) -> Option<(f64, u32)> {
    if recent.is_empty() {
        return None;
    }
    let avg = recent.iter().sum::<f64>() / recent.len() as f64;
    Some((round1(avg * 1.1), SUGGESTED_REPS))
}
