/// Result type used across the crate.
pub type AvatarResult<T> = Result<T, AvatarError>;

/// Everything that can go wrong while loading, building or drawing an avatar.
#[derive(thiserror::Error, Debug)]
pub enum AvatarError {
    /// Invalid caller-provided values such as a zero canvas size.
    #[error("validation error: {0}")]
    Validation(String),

    /// The configuration could not be read or fetched.
    #[error("config load error: {0}")]
    ConfigLoad(String),

    /// A style code outside its declared domain.
    #[error("unknown attribute value: {field} = \"{value}\"")]
    UnknownAttribute {
        /// JSON name of the field.
        field: &'static str,
        /// The value as given.
        value: String,
    },

    /// A color that is not `#RRGGBB`.
    #[error("malformed color: {field} = \"{value}\"")]
    MalformedColor {
        /// JSON name of the field.
        field: &'static str,
        /// The value as given.
        value: String,
    },

    /// Drawing, compositing or encoding failed.
    #[error("render error: {0}")]
    Render(String),

    /// JSON (de)serialization failed.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AvatarError {
    /// Build an [`AvatarError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build an [`AvatarError::ConfigLoad`] value.
    pub fn config_load(msg: impl Into<String>) -> Self {
        Self::ConfigLoad(msg.into())
    }

    /// Build an [`AvatarError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build an [`AvatarError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for AvatarError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serde(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
