//! Solution rewrites
//!
//! Post-processing passes that specialize a general index-scan solution:
//! the count rewrite (fetch+ixscan → count) and the distinct rewrite
//! (project+ixscan → project+distinct-scan). Both consume the subtree
//! they replace; ownership stays strictly tree-shaped.

mod count;
mod distinct;

pub use count::turn_ixscan_into_count;
pub use distinct::turn_ixscan_into_distinct;
