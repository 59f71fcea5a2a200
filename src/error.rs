use thiserror::Error;

/// Failures while building a session from a template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// Blank workouts (no template) are not supported.
    #[error("no template specified")]
    NoTemplateSpecified,

    #[error("template `{0}` not found")]
    TemplateNotFound(String),

    #[error("template `{0}` has no exercises")]
    EmptyTemplate(String),
}

/// A transition was invoked in a state that does not allow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("session is not in progress")]
    NotInProgress,

    #[error("session is resting")]
    Resting,
}

/// Problems found in a template file.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to parse template file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("category name must not be empty")]
    EmptyCategory,

    #[error("template in category `{0}` has an empty id")]
    EmptyId(String),

    #[error("template `{0}` has an empty name")]
    EmptyName(String),

    #[error("template id `{0}` is defined more than once")]
    DuplicateId(String),

    #[error("template `{template}`: exercise `{exercise}` has an empty name or zero sets/reps")]
    InvalidExercise { template: String, exercise: String },

    #[error("template `{template}`: exercise `{exercise}` has a negative weight")]
    NegativeWeight { template: String, exercise: String },
}
