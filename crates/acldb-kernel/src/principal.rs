use indexmap::IndexMap;

/// Pre-existing principal that passes every authority check.
pub const ADMIN: &str = "admin";
/// Pre-existing principal whose delegations every other principal inherits.
pub const ANYONE: &str = "anyone";

/// Initial password of `anyone`; never accepted at authentication.
pub const ANYONE_PASSWORD: &str = "unspecified";

/// Principal name to password.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrincipalRegistry {
    passwords: IndexMap<String, String>,
}

impl PrincipalRegistry {
    /// Registry holding only `admin` and `anyone`.
    pub fn bootstrap(admin_password: impl Into<String>) -> Self {
        let mut registry = Self::default();
        registry.insert(ADMIN, admin_password);
        registry.insert(ANYONE, ANYONE_PASSWORD);
        registry
    }

    pub fn contains(&self, name: &str) -> bool {
        self.passwords.contains_key(name)
    }

    /// Adds or overwrites a principal.
    pub fn insert(&mut self, name: impl Into<String>, password: impl Into<String>) {
        self.passwords.insert(name.into(), password.into());
    }

    /// Overwrites an existing password; returns false if the principal is unknown.
    pub fn set_password(&mut self, name: &str, password: impl Into<String>) -> bool {
        match self.passwords.get_mut(name) {
            Some(slot) => {
                *slot = password.into();
                true
            }
            None => false,
        }
    }

    /// Exact password comparison. `anyone` never authenticates.
    pub fn verify(&self, name: &str, password: &str) -> bool {
        name != ANYONE && self.passwords.get(name).is_some_and(|stored| stored == password)
    }

    pub fn len(&self) -> usize {
        self.passwords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passwords.is_empty()
    }
}
