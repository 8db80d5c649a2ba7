pub mod observation;
pub mod session;

pub use observation::Observation;
pub use session::{SessionPayload, SessionRecord, SessionStatus, SessionSummary};
