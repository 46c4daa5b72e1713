//! External service integrations.

pub mod source_client {
    pub use crate::source_client::*;
}

pub mod provider_models {
    pub use crate::provider_models::*;
}
