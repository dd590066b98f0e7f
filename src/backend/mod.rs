pub mod memory;
pub mod supabase;
pub mod traits;
pub mod types;

pub use memory::MemoryBackend;
pub use supabase::SupabaseBackend;
pub use traits::ListingBackend;
pub use types::{SearchPage, SearchRequest};
