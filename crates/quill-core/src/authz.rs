//! Resource authorization predicate.
//!
//! Ownership checks used to be scattered through handlers and services; every
//! mutating operation now goes through [`can`] before touching the store.

/// Actions an authenticated user can attempt on an owned resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Edit,
    Delete,
}

/// A resource with a recorded owner.
pub trait Owned {
    fn owner_id(&self) -> i64;
}

/// Whether `actor_id` may perform `action` on `resource`.
///
/// Policy: mutation is owner-only. The action is matched explicitly so that
/// a future non-symmetric rule has an obvious place to land.
pub fn can(actor_id: i64, action: Action, resource: &impl Owned) -> bool {
    match action {
        Action::Edit | Action::Delete => resource.owner_id() == actor_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Doc {
        owner: i64,
    }

    impl Owned for Doc {
        fn owner_id(&self) -> i64 {
            self.owner
        }
    }

    #[test]
    fn owner_may_edit_and_delete() {
        let doc = Doc { owner: 7 };
        assert!(can(7, Action::Edit, &doc));
        assert!(can(7, Action::Delete, &doc));
    }

    #[test]
    fn non_owner_is_denied() {
        let doc = Doc { owner: 7 };
        assert!(!can(8, Action::Edit, &doc));
        assert!(!can(8, Action::Delete, &doc));
    }
}
