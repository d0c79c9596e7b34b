//! Fluent builder for CouchDB-style query documents: projection fields, a
//! selector assembled from filters, conditions and nested `$and`/`$or`/`$nor`/`$all`
//! groups, sort order and paging.

pub mod combination;
pub mod command;
pub mod condition;
pub mod config;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod query_builder;
pub mod token;

pub use combination::{Combination, CombinationItem, CombinationOperator, Filter};
pub use condition::Condition;
pub use config::BuilderConfig;
pub use error::{BuildError, BuildResult};
pub use query_builder::{QueryBuilder, QueryDocument};
