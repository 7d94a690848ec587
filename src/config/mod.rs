//! Configuration module for Tekst.
//!
//! Handles loading application settings and resolving backend credentials.

mod credentials;
mod settings;

pub use credentials::Credentials;
pub use settings::{
    AssistSettings, CredentialSettings, GeneralSettings, Settings, TranscriptionBackend,
    TranscriptionSettings, TranslationBackend, TranslationSettings,
};
