pub mod router;

pub use router::{InventoryState, inventory_router};
