pub mod autocomplete;
pub mod embedding;
pub mod fallback;
pub mod fan_out;
pub mod filter_compiler;
pub mod provider_aliases;
pub mod ranking;
pub mod search;
pub mod tmdb;

pub use autocomplete::{AutocompleteIndex, Suggestion};
pub use embedding::{EmbeddingService, OpenAiEmbedder, UnconfiguredEmbedder};
pub use filter_compiler::FilterCompiler;
pub use provider_aliases::ProviderAliases;
pub use search::{MatchKind, SearchOutcome, SearchService, SearchTimeouts};
pub use tmdb::{TmdbClient, TmdbResponse};
