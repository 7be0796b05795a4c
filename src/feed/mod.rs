//! Message feed subsystem.
//!
//! # Data Flow
//! ```text
//! Empty ──start()──▶ Loading ──list_all() ok──▶ Live ──stop()──▶ Empty
//!                       │                       │
//!                       └─ failure: stays ◀─────┘ NewWave events appended
//! ```
//!
//! # Design Decisions
//! - The feed is written only by the synchronizer; everyone else reads snapshots
//! - The event subscription only exists in `Live`, which is only reachable
//!   after the bulk load completed, so historical and live data never overlap
//! - No dedup by comparison: ordering alone keeps the feed duplicate free

pub mod store;
pub mod synchronizer;

pub use store::Feed;
pub use synchronizer::{FeedSynchronizer, SyncState};
