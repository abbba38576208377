use crate::area::Area;
use crate::join::{AreaIndex, join};
use crate::statistic::Statistic;
use crate::user::User;

/// Loaded collections, their join, and the active statistic.
///
/// `None` for a source collection means it has not been loaded (or its
/// last fetch failed); it joins as an empty collection. Every change to a
/// source collection rebuilds the join from scratch.
#[derive(Debug, Clone, Default)]
pub struct MapState {
    areas: Option<Vec<Area>>,
    users: Option<Vec<User>>,
    index: AreaIndex,
    statistic: Statistic,
    generation: u64,
}

impl MapState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn statistic(&self) -> Statistic {
        self.statistic
    }

    /// Returns whether the active statistic changed. Never touches the join.
    pub fn set_statistic(&mut self, statistic: Statistic) -> bool {
        let changed = self.statistic != statistic;
        self.statistic = statistic;
        changed
    }

    pub fn set_areas(&mut self, areas: Option<Vec<Area>>) {
        self.areas = areas;
        self.recompute_join();
    }

    pub fn set_users(&mut self, users: Option<Vec<User>>) {
        self.users = users;
        self.recompute_join();
    }

    /// Replace both collections and join once.
    pub fn apply_load(&mut self, areas: Option<Vec<Area>>, users: Option<Vec<User>>) {
        self.areas = areas;
        self.users = users;
        self.recompute_join();
    }

    pub fn recompute_join(&mut self) {
        let areas = self.areas.as_deref().unwrap_or_default();
        let users = self.users.as_deref().unwrap_or_default();
        self.index = AreaIndex::build(join(areas, users));
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn enriched(&self) -> &AreaIndex {
        &self.index
    }

    /// Bumped on every recompute; 0 until the first one.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn areas(&self) -> &[Area] {
        self.areas.as_deref().unwrap_or_default()
    }

    pub fn users(&self) -> &[User] {
        self.users.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::MapState;
    use crate::area::{Area, Coordinates, Geometry};
    use crate::statistic::Statistic;
    use crate::stats::average_age;
    use crate::user::{Gender, User};

    fn area(area_id: i64) -> Area {
        Area {
            area_id,
            name: format!("Area {area_id}"),
            pin_code: area_id,
            geometry: Geometry {
                kind: "Polygon".to_string(),
                coordinates: Coordinates::Polygon(Vec::new()),
            },
        }
    }

    fn user(area_id: i64) -> User {
        User {
            user_id: format!("user-{area_id}"),
            area_id,
            age: 30.0,
            gender: Gender::Male,
            is_pro_user: true,
            total_matches: 1,
        }
    }

    #[test]
    fn statistic_changes_do_not_rejoin() {
        let mut state = MapState::new();
        state.apply_load(Some(vec![area(1)]), Some(vec![user(1)]));
        let generation = state.generation();

        assert!(state.set_statistic(Statistic::Age));
        assert!(!state.set_statistic(Statistic::Age));
        assert_eq!(state.statistic(), Statistic::Age);
        assert_eq!(state.generation(), generation);
    }

    #[test]
    fn each_source_change_replaces_the_join() {
        let mut state = MapState::new();
        state.set_areas(Some(vec![area(1), area(2)]));
        assert_eq!(state.enriched().len(), 2);
        assert_eq!(state.enriched().joined_user_count(), 0);

        state.set_users(Some(vec![user(1), user(2), user(2)]));
        assert_eq!(state.enriched().users(2).map(<[_]>::len), Some(2));

        state.set_areas(Some(vec![area(2)]));
        assert_eq!(state.enriched().len(), 1);
        assert!(state.enriched().get(1).is_none());
        assert_eq!(state.enriched().joined_user_count(), 2);
        assert_eq!(state.generation(), 3);
    }

    #[test]
    fn failed_user_fetch_leaves_areas_without_users() {
        let mut state = MapState::new();
        state.apply_load(Some(vec![area(1), area(2)]), None);

        assert!(state.users().is_empty());
        assert_eq!(state.enriched().len(), 2);
        for enriched in state.enriched().areas() {
            assert!(enriched.users.is_empty());
            assert_eq!(average_age(&enriched.users), None);
        }
    }

    #[test]
    fn failed_area_fetch_yields_empty_join() {
        let mut state = MapState::new();
        state.apply_load(None, Some(vec![user(1)]));

        assert!(state.enriched().is_empty());
        assert_eq!(state.users().len(), 1);
        assert!(state.areas().is_empty());
    }
}
