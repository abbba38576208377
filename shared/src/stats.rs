use serde::{Deserialize, Serialize};

use crate::user::{Gender, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GenderCounts {
    pub male: usize,
    pub female: usize,
}

/// Every aggregate for one area's users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaStats {
    pub user_count: usize,
    /// `None` when the area has no users.
    pub average_age: Option<i64>,
    pub total_matches: u64,
    pub gender: GenderCounts,
    pub pro_users: usize,
}

impl AreaStats {
    pub fn compute(users: &[User]) -> Self {
        Self {
            user_count: user_count(users),
            average_age: average_age(users),
            total_matches: total_matches(users),
            gender: gender_counts(users),
            pro_users: pro_user_count(users),
        }
    }
}

/// Mean age rounded half up (20.5 -> 21). Returns `None` for an empty slice
/// instead of dividing by zero.
pub fn average_age(users: &[User]) -> Option<i64> {
    if users.is_empty() {
        return None;
    }
    let sum: f64 = users.iter().map(|user| user.age).sum();
    let mean = sum / users.len() as f64;
    Some(round_half_up(mean) as i64)
}

pub fn total_matches(users: &[User]) -> u64 {
    users.iter().map(|user| user.total_matches).sum()
}

pub fn gender_counts(users: &[User]) -> GenderCounts {
    users
        .iter()
        .fold(GenderCounts::default(), |mut counts, user| {
            match user.gender {
                Gender::Male => counts.male += 1,
                Gender::Female => counts.female += 1,
                Gender::Other(_) => {}
            }
            counts
        })
}

pub fn pro_user_count(users: &[User]) -> usize {
    users.iter().filter(|user| user.is_pro_user).count()
}

pub fn user_count(users: &[User]) -> usize {
    users.len()
}

// Ties go towards positive infinity, also for negative inputs.
fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}
