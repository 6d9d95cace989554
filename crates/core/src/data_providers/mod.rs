//! Data providers: paginated sources of raw records.

mod csv_provider;
mod provider_registry;
mod provider_traits;
mod sqlite_query_provider;

pub use csv_provider::{CsvDataProvider, CsvOptions};
pub use provider_registry::{DataProviderFactory, DataProviderRegistry};
pub use provider_traits::{DataProvider, ProviderContext, ProviderRequest, Record};
pub use sqlite_query_provider::{SqliteQueryDataProvider, SqliteQueryOptions};
