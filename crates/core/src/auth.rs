use std::cell::RefCell;
use std::rc::{Rc, Weak};

use chrono::{DateTime, Utc};
use thiserror::Error;
use ulid::Ulid;

pub type UserId = String;

#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub uid: UserId,
    pub username: String,
    pub email: String,
}

/// Public profile stored alongside each account.
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Stored account record: the public profile plus credentials.
#[derive(Debug, Clone)]
struct Account {
    user: AuthUser,
    password: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AuthError {
    #[error("an account with email '{0}' already exists")]
    EmailInUse(String),
    #[error("invalid email or password")]
    InvalidCredentials,
}

/// Sign-in state change notifications. Dropping the watch releases the
/// callback, so a torn-down view cannot leak its listener.
pub struct AuthWatch {
    listeners: Weak<RefCell<Vec<AuthListener>>>,
    token: u64,
}

impl Drop for AuthWatch {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners.borrow_mut().retain(|l| l.token != self.token);
        }
    }
}

struct AuthListener {
    token: u64,
    callback: Rc<dyn Fn(Option<&AuthUser>)>,
}

/// The authentication collaborator the remote persistence adapter consumes.
pub trait AuthPort {
    fn register(&mut self, username: &str, email: &str, password: &str)
        -> Result<AuthUser, AuthError>;
    fn login(&mut self, email: &str, password: &str) -> Result<AuthUser, AuthError>;
    fn logout(&mut self);
    fn current_user(&self) -> Option<AuthUser>;
    fn on_change(&mut self, callback: Rc<dyn Fn(Option<&AuthUser>)>) -> AuthWatch;
}

/// In-process account directory standing in for the hosted identity service.
/// Issues opaque uids and pushes sign-in state changes to subscribers.
pub struct DirectoryAuth {
    accounts: Vec<Account>,
    current: Option<UserId>,
    listeners: Rc<RefCell<Vec<AuthListener>>>,
    next_token: u64,
}

impl Default for DirectoryAuth {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectoryAuth {
    pub fn new() -> Self {
        Self {
            accounts: Vec::new(),
            current: None,
            listeners: Rc::new(RefCell::new(Vec::new())),
            next_token: 0,
        }
    }

    pub fn shared() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::new()))
    }

    pub fn profile(&self, uid: &str) -> Option<UserProfile> {
        self.accounts
            .iter()
            .find(|a| a.user.uid == uid)
            .map(|a| UserProfile {
                username: a.user.username.clone(),
                email: a.user.email.clone(),
                created_at: a.created_at,
            })
    }

    fn find_by_email(&self, email: &str) -> Option<&Account> {
        self.accounts
            .iter()
            .find(|a| a.user.email.eq_ignore_ascii_case(email))
    }

    fn notify(&self) {
        let user = self.current_user();
        let callbacks: Vec<Rc<dyn Fn(Option<&AuthUser>)>> = self
            .listeners
            .borrow()
            .iter()
            .map(|l| Rc::clone(&l.callback))
            .collect();
        for callback in callbacks {
            callback(user.as_ref());
        }
    }
}

impl AuthPort for DirectoryAuth {
    /// Create an account and sign it in, mirroring the usual
    /// register-then-redirect flow.
    fn register(
        &mut self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthUser, AuthError> {
        if self.find_by_email(email).is_some() {
            return Err(AuthError::EmailInUse(email.to_string()));
        }

        let user = AuthUser {
            uid: Ulid::new().to_string(),
            username: username.trim().to_string(),
            email: email.trim().to_string(),
        };
        self.accounts.push(Account {
            user: user.clone(),
            password: password.to_string(),
            created_at: Utc::now(),
        });
        self.current = Some(user.uid.clone());
        tracing::debug!(uid = %user.uid, "registered account");
        self.notify();
        Ok(user)
    }

    fn login(&mut self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        let account = self
            .find_by_email(email)
            .filter(|a| a.password == password)
            .ok_or(AuthError::InvalidCredentials)?;
        let user = account.user.clone();
        self.current = Some(user.uid.clone());
        self.notify();
        Ok(user)
    }

    fn logout(&mut self) {
        if self.current.take().is_some() {
            self.notify();
        }
    }

    fn current_user(&self) -> Option<AuthUser> {
        let uid = self.current.as_ref()?;
        self.accounts
            .iter()
            .find(|a| &a.user.uid == uid)
            .map(|a| a.user.clone())
    }

    fn on_change(&mut self, callback: Rc<dyn Fn(Option<&AuthUser>)>) -> AuthWatch {
        self.next_token += 1;
        let token = self.next_token;
        self.listeners
            .borrow_mut()
            .push(AuthListener { token, callback });
        AuthWatch {
            listeners: Rc::downgrade(&self.listeners),
            token,
        }
    }
}
