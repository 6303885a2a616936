//! Bcrypt-backed password hashing.

use crate::auth::PasswordHasher;

pub struct BcryptPasswordHasher {
    cost: u32,
}

impl BcryptPasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for BcryptPasswordHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

impl PasswordHasher for BcryptPasswordHasher {
    fn hash(&self, plain: &str) -> anyhow::Result<String> {
        Ok(bcrypt::hash(plain, self.cost)?)
    }

    fn verify(&self, plain: &str, hash: &str) -> bool {
        bcrypt::verify(plain, hash).unwrap_or(false)
    }
}
