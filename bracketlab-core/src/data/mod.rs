//! Standings retrieval, table normalization and caching

pub mod cache;
pub mod html;
pub mod loader;
pub mod normalize;
pub mod provider;
pub mod torvik;

pub use cache::{CacheStatus, TableCache, DEFAULT_CACHE_FILE};
pub use html::{extract_first_table, HtmlTable, TableError};
pub use loader::{load_tournament_data, TournamentLoader, DEFAULT_YEARS};
pub use normalize::{normalize_year, parse_standings_page};
pub use provider::{DataError, LoadProgress, NoProgress, StandingsSource, StdoutProgress};
pub use torvik::TorvikSource;
