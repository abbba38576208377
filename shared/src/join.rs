use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::area::{Area, AreaId};
use crate::user::User;

/// An area together with the users located in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedArea {
    #[serde(flatten)]
    pub area: Area,
    pub users: Vec<User>,
}

/// Attach to every area the users whose `area_id` matches, keeping the
/// users' input order. Users pointing at unknown areas are dropped.
pub fn join(areas: &[Area], users: &[User]) -> Vec<EnrichedArea> {
    if areas.is_empty() {
        return Vec::new();
    }

    let mut by_area: HashMap<AreaId, Vec<&User>> = HashMap::new();
    for user in users {
        by_area.entry(user.area_id).or_default().push(user);
    }

    areas
        .iter()
        .map(|area| EnrichedArea {
            area: area.clone(),
            users: by_area
                .get(&area.area_id)
                .map(|group| group.iter().map(|&user| user.clone()).collect())
                .unwrap_or_default(),
        })
        .collect()
}

/// Number of users whose area is not in `areas`.
pub fn unmatched_user_count(areas: &[Area], users: &[User]) -> usize {
    let known: std::collections::HashSet<AreaId> = areas.iter().map(|area| area.area_id).collect();
    users
        .iter()
        .filter(|user| !known.contains(&user.area_id))
        .count()
}

/// Joined areas plus a lookup table keyed by area id, so hover handlers
/// can find an area's users without scanning.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AreaIndex {
    areas: Vec<EnrichedArea>,
    positions: HashMap<AreaId, usize>,
}

impl AreaIndex {
    pub fn build(areas: Vec<EnrichedArea>) -> Self {
        let mut positions = HashMap::with_capacity(areas.len());
        for (position, enriched) in areas.iter().enumerate() {
            // First occurrence wins if upstream repeats an id.
            positions.entry(enriched.area.area_id).or_insert(position);
        }
        Self { areas, positions }
    }

    pub fn get(&self, area_id: AreaId) -> Option<&EnrichedArea> {
        self.positions
            .get(&area_id)
            .and_then(|&position| self.areas.get(position))
    }

    pub fn users(&self, area_id: AreaId) -> Option<&[User]> {
        self.get(area_id).map(|enriched| enriched.users.as_slice())
    }

    pub fn areas(&self) -> &[EnrichedArea] {
        &self.areas
    }

    pub fn len(&self) -> usize {
        self.areas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    /// Users attached to a distinct area id. Repeated ids share one user
    /// group, so only the indexed entry is counted.
    pub fn joined_user_count(&self) -> usize {
        self.positions
            .values()
            .filter_map(|&position| self.areas.get(position))
            .map(|enriched| enriched.users.len())
            .sum()
    }
}
