//! External service clients and library reconciliation logic

pub mod audible;
pub mod audiobookshelf;
pub mod library;
pub mod next_book;
pub mod notifications;
pub mod resolver;
pub mod series_parser;

pub use audible::{AudibleClient, CatalogClient};
pub use audiobookshelf::{AbsClient, LibraryClient};
pub use library::{build_series_snapshots, SeriesSnapshot};
pub use next_book::select_next_book;
pub use notifications::DiscordNotifier;
pub use resolver::{resolve_series_books, SeriesBook};
