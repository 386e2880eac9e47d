//! Persona / system instruction for the assistant
//!
//! One canonical persona is built in. Deployments can swap it for their own
//! text by pointing `MEDASSIST_PERSONA_FILE` at a file.

use std::path::Path;

/// Built-in persona sent as the system message on every generation call
pub const DEFAULT_PERSONA: &str = r"You are MedAssist, a medical information assistant. You give clear, accurate, evidence-based general health information in plain language.

Guidelines:
1. GENERAL INFORMATION ONLY: Explain conditions, symptoms, medications and test results in general terms. Never present a diagnosis or prescribe treatment for the user.
2. ASK WHEN UNCLEAR: If a question depends on age, medical history or current medications, say what additional information would matter.
3. DOCUMENTS AND IMAGES: When shown a lab report, prescription or medical image, describe what it shows and explain the terms, and recommend reviewing the results with the clinician who ordered them.
4. EMERGENCY TRIAGE: Immediately prioritize emergency room advice for red-flag symptoms (chest pain, stroke signs, severe breathing difficulty, heavy bleeding, suicidal thoughts).

For any question regarding news, updates, or current events, rely strictly on the external search context provided (if any). Always include a medical disclaimer.";

/// The system instruction prepended to every model call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Persona(String);

impl Persona {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Load the persona from `path` if given, otherwise use the built-in one.
    ///
    /// A missing, unreadable or empty file falls back to [`DEFAULT_PERSONA`]
    /// with a warning rather than stopping startup.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(text) if !text.trim().is_empty() => {
                tracing::info!(path = %path.display(), "Loaded persona override");
                Self(text.trim().to_string())
            }
            Ok(_) => {
                tracing::warn!(path = %path.display(), "Persona file is empty, using built-in persona");
                Self::default()
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read persona file, using built-in persona");
                Self::default()
            }
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Persona {
    fn default() -> Self {
        Self(DEFAULT_PERSONA.to_string())
    }
}
