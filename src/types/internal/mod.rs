// Internal types that never cross the datastore or wire boundary directly.
pub mod session;

pub use session::{Claims, SessionUser};
