//! Tracked entity populations
//!
//! An [`EntitySet`] is the pure bookkeeping half of the tracker: it knows
//! which ids we believe exist remotely, which of them are protected seed
//! data, and how many entities a delete may still remove without
//! undercutting the configured minimum.

use std::collections::HashSet;
use std::hash::Hash;

/// What to do when the simulation wants to delete one entity of a kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletePlan<T> {
    /// Delete this id; it is not protected and the population can spare it.
    Delete(T),
    /// Deleting would undercut the minimum (or only protected ids remain);
    /// create a new entity instead so traffic volume is preserved.
    CreateInstead,
    /// Nothing is tracked at all; skip the operation.
    Skip,
}

/// One kind of tracked entity (pets, users or orders).
///
/// Insertion order is kept so random sampling is a plain index pick.
#[derive(Debug, Clone)]
pub struct EntitySet<T> {
    ids: Vec<T>,
    protected: HashSet<T>,
    minimum: usize,
}

impl<T> EntitySet<T>
where
    T: Clone + Eq + Hash,
{
    pub fn new(minimum: usize, protected: impl IntoIterator<Item = T>) -> Self {
        Self {
            ids: Vec::new(),
            protected: protected.into_iter().collect(),
            minimum,
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: &T) -> bool {
        self.ids.contains(id)
    }

    pub fn is_protected(&self, id: &T) -> bool {
        self.protected.contains(id)
    }

    pub fn ids(&self) -> &[T] {
        &self.ids
    }

    /// Track an id; returns false if it was already known.
    pub fn insert(&mut self, id: T) -> bool {
        if self.ids.contains(&id) {
            return false;
        }
        self.ids.push(id);
        true
    }

    /// Track every id not already known; returns how many were new.
    pub fn merge(&mut self, ids: impl IntoIterator<Item = T>) -> usize {
        ids.into_iter().filter(|id| self.insert(id.clone())).count()
    }

    /// Stop tracking an id. Idempotent: forgetting an unknown id is a no-op
    /// and returns false, so concurrent 404 reconciliation cannot double-count.
    pub fn forget(&mut self, id: &T) -> bool {
        match self.ids.iter().position(|known| known == id) {
            Some(index) => {
                self.ids.swap_remove(index);
                true
            }
            None => false,
        }
    }

    /// How many entities must be created to reach the minimum.
    pub fn shortfall(&self) -> usize {
        self.minimum.saturating_sub(self.ids.len())
    }

    /// Pick one tracked id uniformly at random.
    pub fn sample(&self) -> Option<T> {
        if self.ids.is_empty() {
            return None;
        }
        Some(self.ids[fastrand::usize(..self.ids.len())].clone())
    }

    /// Decide whether a delete may proceed, and against which id.
    ///
    /// Protected ids are never candidates. The non-protected population
    /// must stay above the share of the minimum it is responsible for,
    /// so a delete is downgraded to a create once the deletable count
    /// reaches that floor.
    pub fn deletion_plan(&self) -> DeletePlan<T> {
        if self.ids.is_empty() {
            return DeletePlan::Skip;
        }

        let deletable: Vec<&T> = self
            .ids
            .iter()
            .filter(|id| !self.protected.contains(id))
            .collect();
        if deletable.is_empty() {
            return DeletePlan::CreateInstead;
        }

        let floor = self.minimum.saturating_sub(self.protected.len());
        if deletable.len() <= floor {
            return DeletePlan::CreateInstead;
        }

        DeletePlan::Delete(deletable[fastrand::usize(..deletable.len())].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_with(minimum: usize, protected: &[i64], ids: &[i64]) -> EntitySet<i64> {
        let mut set = EntitySet::new(minimum, protected.iter().copied());
        set.merge(ids.iter().copied());
        set
    }

    #[test]
    fn test_merge_is_idempotent() {
        let mut set = set_with(3, &[], &[1, 2, 3]);
        assert_eq!(set.merge([2, 3, 4]), 1);
        assert_eq!(set.len(), 4);
    }

    #[test]
    fn test_forget_is_idempotent() {
        let mut set = set_with(3, &[], &[1, 2, 3]);
        assert!(set.forget(&2));
        assert!(!set.forget(&2));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_shortfall_counts_missing_entities() {
        assert_eq!(set_with(10, &[], &[]).shortfall(), 10);
        assert_eq!(set_with(10, &[], &[1, 2, 3]).shortfall(), 7);
        let full: Vec<i64> = (1..=12).collect();
        assert_eq!(set_with(10, &[], &full).shortfall(), 0);
    }

    #[test]
    fn test_sample_from_empty_set_is_none() {
        assert_eq!(set_with(3, &[], &[]).sample(), None);
    }

    #[test]
    fn test_deletion_skipped_when_nothing_tracked() {
        assert_eq!(set_with(3, &[1, 2], &[]).deletion_plan(), DeletePlan::Skip);
    }

    #[test]
    fn test_protected_ids_never_planned_for_deletion() {
        let ids: Vec<i64> = (1..=20).collect();
        let set = set_with(10, &[1, 2, 3, 4, 5], &ids);
        for _ in 0..200 {
            match set.deletion_plan() {
                DeletePlan::Delete(id) => assert!(id > 5, "picked protected id {}", id),
                other => panic!("unexpected plan: {:?}", other),
            }
        }
    }

    #[test]
    fn test_delete_downgraded_when_only_protected_remain() {
        let set = set_with(10, &[1, 2, 3, 4, 5], &[1, 2, 3]);
        assert_eq!(set.deletion_plan(), DeletePlan::CreateInstead);
    }

    #[test]
    fn test_delete_downgraded_at_population_floor() {
        // minimum 10, 5 protected: the non-protected population may not
        // shrink below 5, so exactly 5 deletable ids means create instead.
        let ids: Vec<i64> = (1..=10).collect();
        let set = set_with(10, &[1, 2, 3, 4, 5], &ids);
        assert_eq!(set.deletion_plan(), DeletePlan::CreateInstead);

        // One extra deletable id and the delete goes ahead.
        let ids: Vec<i64> = (1..=11).collect();
        let set = set_with(10, &[1, 2, 3, 4, 5], &ids);
        assert!(matches!(set.deletion_plan(), DeletePlan::Delete(_)));
    }

    #[test]
    fn test_string_ids_supported() {
        let mut set: EntitySet<String> = EntitySet::new(5, ["user1".to_string()]);
        set.insert("user1".to_string());
        set.insert("user_abcdefgh".to_string());
        assert!(set.is_protected(&"user1".to_string()));
        assert!(!set.is_protected(&"user_abcdefgh".to_string()));
    }
}
