use time::OffsetDateTime;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::{ProgressQuery, ProgressRequest, ProgressStats};
use super::repo;
use super::repo_types::ProgressEntry;
use crate::engine::allocator::round1;
use crate::error::AppError;
use crate::state::AppState;

pub const CSV_HEADER: [&str; 4] = ["date", "weight_kg", "body_fat_pct", "muscle_mass_kg"];

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| round1(sum / n as f64))
}

/// Expects entries in ascending date order.
pub fn compute_stats(entries: &[ProgressEntry]) -> ProgressStats {
    let weights = || entries.iter().map(|e| e.weight);
    ProgressStats {
        count: entries.len(),
        avg_weight: mean(weights()),
        max_weight: weights().reduce(f64::max),
        min_weight: weights().reduce(f64::min),
        avg_body_fat: mean(entries.iter().filter_map(|e| e.body_fat)),
        avg_muscle_mass: mean(entries.iter().filter_map(|e| e.muscle_mass)),
        weight_change: match (entries.first(), entries.last()) {
            (Some(first), Some(last)) if entries.len() > 1 => Some(round1(last.weight - first.weight)),
            _ => None,
        },
    }
}

pub fn export_csv(entries: &[ProgressEntry]) -> Result<String, AppError> {
    let mut w = csv::Writer::from_writer(Vec::new());
    w.write_record(CSV_HEADER).map_err(anyhow::Error::from)?;
    for e in entries {
        let opt = |v: Option<f64>| v.map(|x| x.to_string()).unwrap_or_default();
        w.write_record([
            e.date.to_string(),
            e.weight.to_string(),
            opt(e.body_fat),
            opt(e.muscle_mass),
        ])
        .map_err(anyhow::Error::from)?;
    }
    let bytes = w.into_inner().map_err(|e| anyhow::anyhow!(e.to_string()))?;
    Ok(String::from_utf8(bytes).map_err(anyhow::Error::from)?)
}

fn duplicate_date(e: sqlx::Error) -> AppError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            warn!("progress entry already exists for date");
            AppError::Conflict("A progress entry already exists for this date".into())
        }
        _ => AppError::Persistence(e),
    }
}

#[instrument(skip(state, req))]
pub async fn create_entry(
    state: &AppState,
    user_id: Uuid,
    req: ProgressRequest,
) -> Result<ProgressEntry, AppError> {
    req.validate()?;
    let date = req.date.unwrap_or_else(|| OffsetDateTime::now_utc().date());
    let entry = repo::insert(&state.db, user_id, date, req.weight, req.body_fat, req.muscle_mass)
        .await
        .map_err(duplicate_date)?;
    info!(%user_id, entry_id = %entry.id, %date, "progress recorded");
    Ok(entry)
}

pub async fn list_entries(
    state: &AppState,
    user_id: Uuid,
    q: ProgressQuery,
) -> Result<Vec<ProgressEntry>, AppError> {
    if let (Some(start), Some(end)) = (q.start_date, q.end_date) {
        if start > end {
            return Err(AppError::field("start_date", "must not be after end_date"));
        }
    }
    Ok(repo::list(&state.db, user_id, q.start_date, q.end_date).await?)
}

pub async fn get_entry(state: &AppState, user_id: Uuid, id: Uuid) -> Result<ProgressEntry, AppError> {
    repo::get(&state.db, user_id, id)
        .await?
        .ok_or(AppError::NotFound("progress entry"))
}

#[instrument(skip(state, req))]
pub async fn update_entry(
    state: &AppState,
    user_id: Uuid,
    id: Uuid,
    req: ProgressRequest,
) -> Result<ProgressEntry, AppError> {
    req.validate()?;
    let date = match req.date {
        Some(d) => d,
        None => get_entry(state, user_id, id).await?.date,
    };
    let entry = repo::update(&state.db, user_id, id, date, req.weight, req.body_fat, req.muscle_mass)
        .await
        .map_err(duplicate_date)?
        .ok_or(AppError::NotFound("progress entry"))?;
    info!(%user_id, entry_id = %id, "progress updated");
    Ok(entry)
}

pub async fn delete_entry(state: &AppState, user_id: Uuid, id: Uuid) -> Result<(), AppError> {
    if !repo::delete(&state.db, user_id, id).await? {
        return Err(AppError::NotFound("progress entry"));
    }
    info!(%user_id, entry_id = %id, "progress deleted");
    Ok(())
}

pub async fn stats(state: &AppState, user_id: Uuid) -> Result<ProgressStats, AppError> {
    let entries = repo::list(&state.db, user_id, None, None).await?;
    Ok(compute_stats(&entries))
}

pub async fn export(state: &AppState, user_id: Uuid) -> Result<String, AppError> {
    let entries = repo::list(&state.db, user_id, None, None).await?;
    info!(%user_id, rows = entries.len(), "progress exported");
    export_csv(&entries)
}
