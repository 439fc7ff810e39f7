//! Peak Cache Adapters
//!
//! Two implementations of `PeakCachePort`:
//! - `InMemoryPeakCache`: process-local map, permanent by default with an
//!   optional TTL
//! - `SupabasePeakCache`: durable PostgREST table keyed by contract, written
//!   with upsert semantics (last write wins)

mod memory;
mod supabase;

pub use memory::InMemoryPeakCache;
pub use supabase::{SupabaseConfig, SupabasePeakCache};
