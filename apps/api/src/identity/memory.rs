//! In-process identity provider used by tests. Ids are assigned as
//! `U1`, `U2`, ... in creation order.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{AccountId, IdentityProvider, LoginMode, ProviderError};

pub struct MemoryIdentityProvider {
    mode: LoginMode,
    /// email -> (uid, password)
    accounts: Mutex<HashMap<String, (AccountId, String)>>,
    unavailable: AtomicBool,
}

impl MemoryIdentityProvider {
    pub fn new(mode: LoginMode) -> Self {
        Self {
            mode,
            accounts: Mutex::new(HashMap::new()),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Simulates a provider outage for every subsequent call.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), ProviderError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(ProviderError::Unavailable("simulated outage".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentityProvider {
    async fn create_account(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AccountId, ProviderError> {
        self.check_available()?;
        if !email.contains('@') {
            return Err(ProviderError::Rejected("INVALID_EMAIL".to_string()));
        }
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.contains_key(email) {
            return Err(ProviderError::Rejected("EMAIL_EXISTS".to_string()));
        }
        let uid = format!("U{}", accounts.len() + 1);
        accounts.insert(email.to_string(), (uid.clone(), password.to_string()));
        Ok(uid)
    }

    async fn lookup_account_by_email(&self, email: &str) -> Result<AccountId, ProviderError> {
        self.check_available()?;
        let accounts = self.accounts.lock().unwrap();
        accounts
            .get(email)
            .map(|(uid, _)| uid.clone())
            .ok_or(ProviderError::NotFound)
    }

    async fn verify_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AccountId, ProviderError> {
        self.check_available()?;
        let accounts = self.accounts.lock().unwrap();
        match accounts.get(email) {
            Some((uid, stored)) if stored == password => Ok(uid.clone()),
            Some(_) => Err(ProviderError::InvalidCredentials),
            None => Err(ProviderError::NotFound),
        }
    }

    fn login_mode(&self) -> LoginMode {
        self.mode
    }
}
