//! Authentication for the order services.
//!
//! Two halves of one protocol. The credential authority owns bearer
//! tokens: it issues one per successful login and validates them on
//! request, serving validation over the broker's request/reply channel.
//! The delegation guard runs inside every protected service: it pulls the
//! token out of an inbound call, asks the authority to validate it, and
//! attaches the resolved identity to the call before handlers run.

pub mod authority;
pub mod error;
pub mod guard;
pub mod identity;
pub mod token;
pub mod worker;

pub use authority::CredentialAuthority;
pub use error::{AuthError, Result};
pub use guard::{AUTH_TOKEN_FIELD, AuthGuard, CallContext, MessageCall};
pub use identity::{
    Identity, IdentityDirectory, IdentityRecord, InMemoryDirectory, PasswordVerifier,
    PlaintextVerifier,
};
pub use token::{Claims, TokenCodec};
pub use worker::ValidationWorker;
