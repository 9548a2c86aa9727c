//! Merge-by-identity of remote and local document lists.

use std::collections::HashSet;

use liftsync_db::schema::{Workout, WorkoutTemplate};

/// Documents that carry a stable, globally unique id.
pub trait Identified {
    fn identity(&self) -> &str;
}

impl Identified for Workout {
    fn identity(&self) -> &str {
        &self.id
    }
}

impl Identified for WorkoutTemplate {
    fn identity(&self) -> &str {
        &self.id
    }
}

/// Remote entries win by id; local entries unknown remotely are appended.
///
/// The result never contains two entries with the same id. Relative order is
/// remote order followed by local order.
pub fn merge_by_identity<T: Identified + Clone>(remote: Vec<T>, local: &[T]) -> Vec<T> {
    let mut seen = HashSet::new();
    let mut merged = Vec::with_capacity(remote.len() + local.len());
    for item in remote {
        if seen.insert(item.identity().to_string()) {
            merged.push(item);
        }
    }
    for item in local {
        if seen.insert(item.identity().to_string()) {
            merged.push(item.clone());
        }
    }
    merged
}

/// Newest completion first; workouts without a completion date sink to the end.
pub fn sort_history(history: &mut [Workout]) {
    history.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;

    fn completed(id: &str, name: &str, minutes_ago: i64) -> Workout {
        let mut w = Workout::new(name);
        w.id = id.into();
        w.completed_at = Some(Utc::now() - Duration::minutes(minutes_ago));
        w
    }

    #[test]
    fn remote_wins_and_local_only_survives() {
        let local = vec![completed("a", "local A", 10), completed("c", "pending C", 1)];
        let remote = vec![completed("a", "remote A", 10), completed("b", "B", 5)];

        let mut merged = merge_by_identity(remote, &local);
        sort_history(&mut merged);

        let ids: Vec<&str> = merged.iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
        assert_eq!(merged[2].name, "remote A");
    }

    #[test]
    fn duplicate_remote_ids_collapse() {
        let remote = vec![completed("a", "first", 1), completed("a", "second", 1)];
        let merged = merge_by_identity(remote, &[]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].name, "first");
    }

    #[test]
    fn undated_workouts_sort_last() {
        let mut undated = Workout::new("x");
        undated.id = "x".into();
        let mut list = vec![undated, completed("a", "a", 3)];
        sort_history(&mut list);
        assert_eq!(list[0].id, "a");
    }
}
