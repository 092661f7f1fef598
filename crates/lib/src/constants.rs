//! # Shared Constants
//!
//! Fixed replies and default locations shared by the library and the server.

/// The reply to a chat request that carries no message.
pub const NO_MESSAGE_REPLY: &str = "No message provided.";

/// The narrative answer for a query that returned no rows.
pub const NO_RESULTS_MESSAGE: &str = "No results found for your query.";

/// The default path of the training example store.
pub const DEFAULT_EXAMPLES_FILE: &str = "data/training_examples.json";

/// The default directory for uploaded datasets.
pub const DEFAULT_UPLOAD_DIR: &str = "data/uploads";

/// The default path for the application SQLite database.
pub const DEFAULT_DB_FILE: &str = "db/sqlchat.db";
