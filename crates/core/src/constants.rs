/// Record key holding the external identifier unless an importer overrides it
pub const DEFAULT_EXTERNAL_IDENTIFIER_KEY: &str = "__externalIdentifier";

/// Record key holding a human readable label
pub const DEFAULT_LABEL_KEY: &str = "__label";

/// Record key that forces the identifier of a newly created node
pub const NODE_IDENTIFIER_KEY: &str = "__identifier";

/// Record key holding per-dimension property overrides
pub const DIMENSIONS_KEY: &str = "@dimensions";

/// Property receiving the slug of the record label
pub const URI_PATH_SEGMENT_PROPERTY: &str = "uriPathSegment";

/// Event data keys used for message events
pub const EVENT_MESSAGE_KEY: &str = "__message";
pub const EVENT_SEVERITY_KEY: &str = "__severity";

/// Node type used for storage nodes when none is configured
pub const DEFAULT_STORAGE_NODE_TYPE: &str = "Page";

/// Default storage node path, relative to the site node
pub const DEFAULT_STORAGE_NODE_PATH: &str = "storage";

pub const DEFAULT_STORAGE_NODE_TITLE: &str = "Storage";

/// Name of the database source used when a provider does not name one
pub const DEFAULT_SOURCE: &str = "default";

/// Number of recent import runs listed by `show`
pub const RECENT_RUNS_LIMIT: i64 = 5;
