//! In-memory user store.
//!
//! Records live in a `Vec` in insertion order; every lookup is a linear scan.
//! Each operation holds the lock for its own duration only, so the list is
//! never torn, but a handler that reads and then writes does so in two
//! separate steps. Two clients racing on the same id can interleave between
//! them.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::Error;

/// Status every new user starts with, whatever the client asked for.
pub const DEFAULT_STATUS: &str = "Inactive";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: i64,
    #[schema(example = "John Michael Doe")]
    pub name: String,
    #[schema(example = "Active")]
    pub status: String,
}

#[derive(Debug, Default)]
pub struct UserStore {
    users: RwLock<Vec<User>>,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_users(users: Vec<User>) -> Self {
        Self { users: RwLock::new(users) }
    }

    /// The two records the service starts with.
    pub fn seeded() -> Self {
        Self::from_users(vec![
            User { id: 1, name: "John Michael Doe".into(), status: "Active".into() },
            User { id: 2, name: "Jane Marie Smith".into(), status: "Inactive".into() },
        ])
    }

    pub fn list(&self) -> Result<Vec<User>, Error> {
        Ok(self.read()?.clone())
    }

    pub fn get(&self, id: i64) -> Result<Option<User>, Error> {
        Ok(self.read()?.iter().find(|u| u.id == id).cloned())
    }

    /// Appends a user with the next id and the default status.
    pub fn add(&self, name: String) -> Result<User, Error> {
        let mut users = self.write()?;
        let id = users.iter().map(|u| u.id).max().map_or(1, |max| max + 1);
        let user = User { id, name, status: DEFAULT_STATUS.to_string() };
        users.push(user.clone());
        Ok(user)
    }

    /// Replaces name and status in place. `None` if no such id.
    pub fn update(&self, id: i64, name: String, status: String) -> Result<Option<User>, Error> {
        let mut users = self.write()?;
        let Some(user) = users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        user.name = name;
        user.status = status;
        Ok(Some(user.clone()))
    }

    /// Removes the user with `id`, returning it. `None` if no such id.
    pub fn remove(&self, id: i64) -> Result<Option<User>, Error> {
        let mut users = self.write()?;
        let Some(index) = users.iter().position(|u| u.id == id) else {
            return Ok(None);
        };
        Ok(Some(users.remove(index)))
    }

    pub fn len(&self) -> Result<usize, Error> {
        Ok(self.read()?.len())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<User>>, Error> {
        self.users.read().map_err(|_| Error::StorePoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<User>>, Error> {
        self.users.write().map_err(|_| Error::StorePoisoned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_follow_the_current_maximum() {
        let store = UserStore::seeded();
        let created = store.add("Ann Marie Lee".into()).unwrap();

        assert_eq!(created.id, 3);
        assert_eq!(created.status, DEFAULT_STATUS);
        assert_eq!(store.list().unwrap().last(), Some(&created));
    }

    #[test]
    fn first_id_in_an_empty_store_is_one() {
        let store = UserStore::new();
        assert_eq!(store.add("A B C".into()).unwrap().id, 1);
    }

    #[test]
    fn gaps_do_not_lower_the_next_id() {
        let store = UserStore::seeded();
        store.remove(1).unwrap();
        assert_eq!(store.add("A B C".into()).unwrap().id, 3);
    }

    #[test]
    fn update_changes_name_and_status_in_place() {
        let store = UserStore::seeded();
        let updated = store.update(2, "Jane Q Public".into(), "Active".into()).unwrap().unwrap();

        assert_eq!(updated, User { id: 2, name: "Jane Q Public".into(), status: "Active".into() });
        assert_eq!(store.get(2).unwrap(), Some(updated));
        assert_eq!(store.list().unwrap()[1].id, 2);
    }

    #[test]
    fn missing_ids_leave_the_store_alone() {
        let store = UserStore::seeded();
        assert_eq!(store.update(99, "A B C".into(), "Active".into()).unwrap(), None);
        assert_eq!(store.remove(99).unwrap(), None);
        assert_eq!(store.len().unwrap(), 2);
    }

    #[test]
    fn remove_takes_exactly_one_record() {
        let store = UserStore::seeded();
        let removed = store.remove(1).unwrap().unwrap();

        assert_eq!(removed.id, 1);
        assert_eq!(store.get(1).unwrap(), None);
        assert_eq!(store.len().unwrap(), 1);
    }
}
