//! Session context
//!
//! Who is signed in, whether the connection is usable, and the local
//! cooldown. Updated by identity-change notifications, which may arrive any
//! number of times and in any order (including user -> none -> user).

use crate::cooldown::Cooldown;
use crate::store::{AuthorId, Identity};

/// Connection lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Connection {
    /// Waiting for the first identity
    #[default]
    Connecting,
    /// Signed in
    Ready,
    /// Anonymous sign-in failed; terminal for this page load
    Lost,
}

/// What the controller should do after an identity change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityChange {
    /// A user is now signed in (possibly the same one again)
    SignedIn(AuthorId),
    /// Nobody is signed in; request an anonymous identity
    NeedsAnonymousSignIn,
    /// Connection already lost; ignore
    Ignored,
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    identity: Option<Identity>,
    pub connection: Connection,
    pub cooldown: Cooldown,
    /// Anonymous sign-in already requested and not yet answered
    sign_in_pending: bool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an identity-change notification
    pub fn on_identity_changed(&mut self, identity: Option<Identity>) -> IdentityChange {
        if self.connection == Connection::Lost {
            return IdentityChange::Ignored;
        }
        match identity {
            Some(identity) => {
                let uid = identity.uid.clone();
                if self.identity.as_ref() != Some(&identity) {
                    log::info!("Signed in as {} (admin: {})", uid, identity.admin);
                }
                self.identity = Some(identity);
                self.connection = Connection::Ready;
                self.sign_in_pending = false;
                IdentityChange::SignedIn(uid)
            }
            None => {
                self.identity = None;
                self.connection = Connection::Connecting;
                if self.sign_in_pending {
                    IdentityChange::Ignored
                } else {
                    self.sign_in_pending = true;
                    IdentityChange::NeedsAnonymousSignIn
                }
            }
        }
    }

    /// Anonymous sign-in failed
    pub fn on_sign_in_failed(&mut self) {
        self.identity = None;
        self.sign_in_pending = false;
        self.connection = Connection::Lost;
    }

    pub fn user(&self) -> Option<&AuthorId> {
        self.identity.as_ref().map(|i| &i.uid)
    }

    pub fn is_admin(&self) -> bool {
        self.identity.as_ref().is_some_and(|i| i.admin)
    }

    pub fn is_ready(&self) -> bool {
        self.connection == Connection::Ready && self.identity.is_some()
    }
}
