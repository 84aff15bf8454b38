//! Infrastructure adapters and concurrency primitives.

pub mod broadcast;
pub mod catalog;
pub mod grace;
pub mod session_lock;
pub mod store;

pub use broadcast::{EventPublisher, InProcessEventBus};
pub use catalog::{CardCatalog, CardInfo, GeneratedCatalog, TransformationInfo};
pub use grace::DisconnectGraceScheduler;
pub use session_lock::SessionLockRegistry;
pub use store::{MemorySessionStore, SessionStore};
