pub mod canonical;
pub mod debounce;
pub mod errors;
pub mod events;
pub mod id;
pub mod inflight;
pub mod store;
pub mod types;

pub use canonical::{canonical_url, is_same_destination, DestinationClass, InternalRoute, INTERNAL_SCHEME};
pub use debounce::Debouncer;
pub use errors::{ConfigError, HostError, ShellError, StoreError};
pub use events::{EventBus, ShellEvent};
pub use id::{new_id, TabId, ViewId};
pub use inflight::InflightMap;
pub use store::{MemoryStore, RecordStore, Table};
pub use types::{Point, Rect};

pub type Result<T> = std::result::Result<T, ShellError>;
