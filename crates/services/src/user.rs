use storage::local::{LocalStore, StorageKey};
use study_core::model::User;

/// The signed-in user, persisted under the `user` key.
///
/// Without a stored user the demo account is used.
#[derive(Debug)]
pub struct UserContext {
    local: LocalStore,
    user: User,
    loading: bool,
}

impl UserContext {
    #[must_use]
    pub fn new(local: LocalStore) -> Self {
        Self {
            local,
            user: User::demo(),
            loading: true,
        }
    }

    /// Read the stored user and persist it back.
    pub fn load(&mut self) {
        self.user = self.local.get_or(StorageKey::User, User::demo());
        self.loading = false;
        self.local.save(StorageKey::User, &self.user);
    }

    #[must_use]
    pub fn user(&self) -> &User {
        &self.user
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn set_user(&mut self, user: User) {
        tracing::info!(user_id = %user.id, username = %user.username, "switching user");
        self.user = user;
        self.local.save(StorageKey::User, &self.user);
    }

    /// Return to the demo account.
    pub fn logout(&mut self) {
        self.set_user(User::demo());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use study_core::model::UserId;

    #[test]
    fn defaults_to_demo_user_and_marks_store_initialized() {
        let local = LocalStore::in_memory();
        assert!(!local.is_initialized());

        let mut ctx = UserContext::new(local.clone());
        assert!(ctx.is_loading());
        ctx.load();

        assert_eq!(ctx.user().username, "john_student");
        assert!(local.is_initialized());
    }

    #[test]
    fn set_user_persists_until_logout() {
        let local = LocalStore::in_memory();
        let mut ctx = UserContext::new(local.clone());
        ctx.load();

        let mut ada = User::demo();
        ada.id = UserId::new(7);
        ada.username = "ada".into();
        ctx.set_user(ada.clone());

        let mut reopened = UserContext::new(local.clone());
        reopened.load();
        assert_eq!(reopened.user(), &ada);

        reopened.logout();
        let stored: User = local.load(StorageKey::User).unwrap().unwrap();
        assert_eq!(stored.username, "john_student");
    }
}
