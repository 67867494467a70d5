//! Error types for the game simulation.

use thiserror::Error;

use crate::agent::AgentId;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for all game simulation errors.
///
/// Economy shortfalls (not enough SG, a stat already at its cap) are not
/// errors: those operations report `false`/`None` and leave state untouched.
#[derive(Debug, Error)]
pub enum GameError {
    /// A match was requested without a single player-controlled agent.
    #[error("Match roster has no player-controlled agents")]
    EmptyPlayerRoster,

    /// Archetype key or id not present in the catalog.
    #[error("Unknown archetype: {0}")]
    UnknownArchetype(String),

    /// Invalid agent reference.
    #[error("Agent not found: {0}")]
    AgentNotFound(AgentId),

    /// Command addressed to an agent the player does not control.
    #[error("Agent {0} is not player-controlled")]
    NotPlayerControlled(AgentId),

    /// Command addressed to an agent that is currently knocked out.
    #[error("Agent {0} is knocked out")]
    AgentKnockedOut(AgentId),

    /// Configuration or catalog data failed validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Data file parsing error.
    #[error("Failed to parse data '{source_name}': {message}")]
    DataParseError {
        /// Name of the source that failed to parse.
        source_name: String,
        /// Error message.
        message: String,
    },

    /// Invalid game state.
    #[error("Invalid game state: {0}")]
    InvalidState(String),
}
