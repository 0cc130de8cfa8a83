//! AWS backends for language detection and translation.
//!
//! Both services speak the JSON 1.1 protocol, so a single signed client
//! (`client`) carries every call; `comprehend` and `translate` only define
//! their request shapes and adapt the results to the core ports. Credentials
//! come from `provider`, which walks the usual AWS default chain.

pub mod client;
pub mod comprehend;
pub mod credentials;
pub mod provider;
pub mod sigv4;
pub mod translate;

pub use client::{AwsError, AwsJsonClient};
pub use comprehend::ComprehendDetector;
pub use credentials::Credentials;
pub use provider::{
    default_provider, CredentialsChain, CredentialsError, ProvideCredentials,
    SharedCredentialsProvider,
};
pub use sigv4::SigningError;
pub use translate::AwsTranslator;
