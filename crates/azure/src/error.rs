//! Error taxonomy for gateway and persisted-state failures

/// Errors raised while talking to the Azure CLI or reading persisted state
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AzureError {
    /// The `az` executable could not be found or started
    #[error("Azure CLI is not installed")]
    Unavailable,

    /// `az` is installed but has no signed-in account
    #[error("Azure CLI is not logged in")]
    Unauthenticated,

    /// A specific `az` command failed
    #[error("az {command} failed: {message}")]
    Gateway { command: String, message: String },

    /// A persisted blob could not be decoded
    ///
    /// Always recovered locally as an empty collection.
    #[error("Persisted state '{key}' is unreadable: {message}")]
    CorruptState { key: String, message: String },
}

pub type AzResult<T> = std::result::Result<T, AzureError>;

impl AzureError {
    /// Build a gateway error for the given `az` subcommand
    pub fn gateway(command: impl Into<String>, message: impl Into<String>) -> Self {
        AzureError::Gateway {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Short title suitable for a toast or empty-state header
    pub fn title(&self) -> &'static str {
        match self {
            AzureError::Unavailable => "Azure CLI is not installed",
            AzureError::Unauthenticated => "Azure CLI is not logged in",
            AzureError::Gateway { .. } => "Azure CLI command failed",
            AzureError::CorruptState { .. } => "Saved data could not be read",
        }
    }

    /// Actionable hint shown under the title
    pub fn remediation(&self) -> String {
        match self {
            AzureError::Unavailable => "Install it with `brew install azure-cli`".to_string(),
            AzureError::Unauthenticated => "Run `az login` in a terminal".to_string(),
            AzureError::Gateway { message, .. } => message.clone(),
            AzureError::CorruptState { .. } => "The saved list was reset".to_string(),
        }
    }

    /// Whether this error must block every further data operation
    pub fn is_blocking(&self) -> bool {
        matches!(self, AzureError::Unavailable | AzureError::Unauthenticated)
    }

    /// Recover the typed error from an `anyhow` chain, if one is present
    pub fn classify(err: &anyhow::Error) -> Option<&AzureError> {
        err.chain().find_map(|cause| cause.downcast_ref::<AzureError>())
    }
}
