//! Client-side state and workflows.
//!
//! - `cart` - Cart state manager (persisted, observable)
//! - `session` - Signed-in identity and bearer credential
//! - `checkout` - Turning the cart into an order
//! - `search_history` - Recent catalog search terms

pub mod cart;
pub mod checkout;
pub mod search_history;
pub mod session;

pub use cart::CartManager;
pub use checkout::{CheckoutError, default_address, place_order};
pub use search_history::{MAX_RECENT_SEARCHES, SearchHistory};
pub use session::{SessionEvent, SessionManager};
