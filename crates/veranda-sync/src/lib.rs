pub mod engine;
pub mod session;
pub mod view;
pub mod visit;

pub use engine::{Phase, SubmitOutcome, SyncEngine};
pub use session::Session;
pub use view::{Delivery, LocalView, ViewEntry};
pub use visit::VisitRecorder;
