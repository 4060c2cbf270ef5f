//! Credential models, secret wrappers, and the time-bound signature generator.

pub mod credentials;
pub mod secret;
pub mod signature;
pub mod token;

pub use credentials::*;
pub use secret::*;
pub use signature::*;
pub use token::*;
