use serde::{Deserialize, Serialize};
use time::Date;

use crate::error::{AppError, Validator};

#[derive(Debug, Deserialize)]
pub struct ProgressRequest {
    /// Today when omitted.
    pub date: Option<Date>,
    pub weight: f64,
    pub body_fat: Option<f64>,
    pub muscle_mass: Option<f64>,
}

impl ProgressRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        let non_negative = |v: Option<f64>| v.map_or(true, |x| x.is_finite() && x >= 0.0);
        let mut v = Validator::new();
        v.check(
            self.weight.is_finite() && self.weight > 0.0,
            "weight",
            "must be a positive number",
        )
        .check(
            non_negative(self.body_fat) && self.body_fat.map_or(true, |x| x <= 100.0),
            "body_fat",
            "must be between 0 and 100",
        )
        .check(non_negative(self.muscle_mass), "muscle_mass", "must not be negative");
        v.finish()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ProgressQuery {
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
}

/// Aggregates over all of a user's entries; every field is `None` (and
/// `count` zero) when there are none.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProgressStats {
    pub count: usize,
    pub avg_weight: Option<f64>,
    pub max_weight: Option<f64>,
    pub min_weight: Option<f64>,
    pub avg_body_fat: Option<f64>,
    pub avg_muscle_mass: Option<f64>,
    /// Latest weight minus earliest weight.
    pub weight_change: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weight_must_be_positive() {
        let req = ProgressRequest {
            date: None,
            weight: 0.0,
            body_fat: Some(-1.0),
            muscle_mass: None,
        };
        match req.validate().unwrap_err() {
            AppError::Validation(f) => {
                let names: Vec<_> = f.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(names, vec!["weight", "body_fat"]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
