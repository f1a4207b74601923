mod user;

use std::sync::Arc;

use dashmap::DashMap;
use log::info;

pub use user::*;

/// Every user known to the current event, created on first interaction
#[derive(Debug, Default)]
pub struct UserRegistry {
    identities: DashMap<Identity, Arc<User>>,
    users: DashMap<UserId, Arc<User>>,
}

impl UserRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the user with this identity, creating it if it doesn't exist yet
    pub fn find_or_create(&self, identity: Identity, name: &str) -> Arc<User> {
        self.identities
            .entry(identity.clone())
            .or_insert_with(|| {
                let user = Arc::new(User::new(identity, name));
                self.users.insert(user.id, user.clone());

                info!("New user {} ({})", user.name(), user.id);
                user
            })
            .clone()
    }

    pub fn find_or_create_remote(&self, remote_id: &str, name: &str) -> Arc<User> {
        self.find_or_create(Identity::Remote(remote_id.to_string()), name)
    }

    pub fn find_or_create_named(&self, name: &str) -> Arc<User> {
        self.find_or_create(Identity::Named(name.to_string()), name)
    }

    pub fn get(&self, id: UserId) -> Option<Arc<User>> {
        self.users.get(&id).map(|u| u.clone())
    }

    pub fn find(&self, identity: &Identity) -> Option<Arc<User>> {
        self.identities.get(identity).map(|u| u.clone())
    }

    pub fn all(&self) -> Vec<Arc<User>> {
        self.users.iter().map(|u| u.value().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[cfg(test)]
mod test {
    use std::{sync::Arc, thread};

    use super::{Identity, UserRegistry};

    #[test]
    fn same_identity_gives_same_user() {
        let registry = UserRegistry::new();

        let first = registry.find_or_create_remote("42", "sam");
        let again = registry.find_or_create_remote("42", "sam but renamed");
        let named = registry.find_or_create_named("42");

        assert!(Arc::ptr_eq(&first, &again));
        assert_ne!(first.id, named.id);
        assert_eq!(again.name(), "sam");
        assert_eq!(registry.len(), 2);

        assert!(registry.get(first.id).is_some());
        assert!(registry
            .find(&Identity::Named("42".to_string()))
            .is_some_and(|u| u.id == named.id));
    }

    #[test]
    fn concurrent_creation_is_atomic() {
        let registry = Arc::new(UserRegistry::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                thread::spawn(move || registry.find_or_create_remote("7", "lee").id)
            })
            .collect();

        let ids: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert!(ids.iter().all(|id| *id == ids[0]));
        assert_eq!(registry.all().len(), 1);
    }
}
