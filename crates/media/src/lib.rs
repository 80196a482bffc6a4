//! Private media access for LiveStream recordings.
//!
//! Objects live in a private S3 bucket; clients get time-limited
//! pre-signed `GET` links from [`Presigner`], and stored links can be
//! mapped back to their object key with [`extract_key_from_url`].

mod error;
mod location;
mod presign;

pub use error::{PresignError, PresignResult};
pub use location::{extract_key_from_url, S3Location, StorageCredentials};
pub use presign::{Presigner, DEFAULT_EXPIRY, MAX_EXPIRY};
