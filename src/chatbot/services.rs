use time::macros::format_description;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::intents::{classify, suggest_load, Intent, CURL_NAMES, LEG_TERMS, LOAD_HISTORY};
use super::repo;
use super::repo_types::ChatMessage;
use crate::engine::templates::select_exercise;
use crate::error::AppError;
use crate::state::AppState;
use crate::{progress, workouts};

pub const CHAT_SYSTEM_PROMPT: &str = "You are a smart, motivating fitness coach.";
pub const MAX_MESSAGE_LEN: usize = 2000;
pub const MAX_HISTORY: i64 = 200;

const DEGRADED_REPLY: &str =
    "Sorry, I couldn't process your message right now. Please try again later.";

async fn current_weight(state: &AppState, user_id: Uuid) -> Result<String, AppError> {
    let Some(entry) = progress::repo::latest(&state.db, user_id).await? else {
        return Ok("You haven't recorded your weight yet. Add your first entry under Progress.".into());
    };
    let day = entry
        .date
        .format(format_description!("[day]/[month]/[year]"))
        .unwrap_or_else(|_| entry.date.to_string());
    Ok(format!("Your current recorded weight is {} kg on {}.", entry.weight, day))
}

async fn leg_workout(state: &AppState, user_id: Uuid) -> Result<String, AppError> {
    match workouts::repo::latest_matching(&state.db, user_id, LEG_TERMS).await? {
        Some(row) => {
            let names: Vec<&str> = row.exercises.0.iter().map(|e| e.name.as_str()).collect();
            Ok(format!(
                "Your last leg workout was: {}. If you want a new one, generate it under Workouts.",
                names.join(", ")
            ))
        }
        None => {
            let pick = select_exercise("legs", &[], state.config.template_variety);
            Ok(format!(
                "I can build you a personalised workout under Workouts. A good start: {}. {}",
                pick.name, pick.instructions
            ))
        }
    }
}

async fn curl_load(state: &AppState, user_id: Uuid) -> Result<String, AppError> {
    let recent = workouts::repo::recent(&state.db, user_id, 20).await?;
    let found = recent.iter().find_map(|w| {
        w.exercises
            .0
            .iter()
            .find(|e| {
                let name = e.name.to_lowercase();
                CURL_NAMES.iter().any(|c| name.contains(c))
            })
            .map(|e| if e.weight > 0.0 { e.weight } else { w.load })
    });
    Ok(match found {
        Some(load) if load > 0.0 => format!("You usually use about {load} kg for bicep curls."),
        _ => "I couldn't find bicep curls in your workouts yet. Log your sessions so I can give \
              better suggestions."
            .into(),
    })
}

async fn suggested_load(state: &AppState, user_id: Uuid) -> Result<String, AppError> {
    let loads = workouts::repo::recent_loads(&state.db, user_id, LEG_TERMS, LOAD_HISTORY).await?;
    Ok(match suggest_load(&loads) {
        Some((load, reps)) => format!("Suggested load for your leg workout: {load} kg for {reps} reps."),
        None => "There isn't enough recent data to suggest a load. Log a few more leg workouts first."
            .into(),
    })
}

async fn ask_llm(state: &AppState, message: &str) -> String {
    let budget = state.config.llm.chat_max_tokens;
    match state.llm.complete(CHAT_SYSTEM_PROMPT, message, budget).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!(error = %e, "chat llm fallback failed");
            DEGRADED_REPLY.to_string()
        }
    }
}

/// Answers a message. Never fails: lookup errors become an apology.
pub async fn answer(state: &AppState, user_id: Uuid, message: &str) -> String {
    let intent = classify(message);
    let result = match intent {
        Intent::CurrentWeight => current_weight(state, user_id).await,
        Intent::LegWorkout => leg_workout(state, user_id).await,
        Intent::CurlLoad => curl_load(state, user_id).await,
        Intent::SuggestedLoad => suggested_load(state, user_id).await,
        Intent::Fallback => Ok(ask_llm(state, message).await),
    };
    match result {
        Ok(reply) => {
            info!(%user_id, ?intent, "chat answered");
            reply
        }
        Err(e) => {
            error!(%user_id, ?intent, error = %e, "chat intent failed");
            DEGRADED_REPLY.to_string()
        }
    }
}

#[instrument(skip(state, message))]
pub async fn chat(state: &AppState, user_id: Uuid, message: &str) -> Result<String, AppError> {
    let message = message.trim();
    if message.is_empty() {
        return Err(AppError::field("message", "must not be empty"));
    }
    if message.chars().count() > MAX_MESSAGE_LEN {
        return Err(AppError::field("message", "is too long"));
    }

    let reply = answer(state, user_id, message).await;
    repo::insert(&state.db, user_id, message, &reply).await?;
    Ok(reply)
}

pub async fn history(state: &AppState, user_id: Uuid, limit: i64) -> Result<Vec<ChatMessage>, AppError> {
    Ok(repo::history(&state.db, user_id, limit.clamp(1, MAX_HISTORY)).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ScriptedLlm;
    use std::sync::Arc;

    #[tokio::test]
    async fn unmatched_message_goes_to_llm() {
        let llm = Arc::new(ScriptedLlm::reply("Drink water and sleep well."));
        let state = AppState::fake_with_llm(llm.clone());
        let reply = answer(&state, Uuid::new_v4(), "how do I recover faster?").await;
        assert_eq!(reply, "Drink water and sleep well.");
        assert_eq!(llm.prompts.lock().unwrap().as_slice(), ["how do I recover faster?"]);
        assert_eq!(llm.budgets.lock().unwrap().as_slice(), [state.config.llm.chat_max_tokens]);
    }

    #[tokio::test]
    async fn llm_failure_yields_degraded_reply() {
        let state = AppState::fake_with_llm(Arc::new(ScriptedLlm::failing()));
        let reply = answer(&state, Uuid::new_v4(), "tell me a joke").await;
        assert_eq!(reply, DEGRADED_REPLY);
    }

    #[tokio::test]
    async fn empty_message_is_rejected() {
        let state = AppState::fake();
        let err = chat(&state, Uuid::new_v4(), "   ").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
