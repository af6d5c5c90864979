pub mod error;
pub mod lifecycle;
pub mod mailto;
pub mod model;
pub mod portal;
pub mod report;
pub mod session;

// Re-export commonly used types
pub use error::{FnolError, Result};
pub use lifecycle::{SessionConfig, SessionEvent, SessionManager};
pub use mailto::{
    CLIPBOARD_PLACEHOLDER, EmailLink, MAX_MAILTO_LEN, OversizeHandler, SilentOversizeHandler,
};
pub use model::{
    Address, AuthorityReport, FormSnapshot, Loss, LossLocation, Party, Policy, Reporter,
};
pub use portal::{FnolPortal, Submission};
pub use session::{InMemorySessionStorage, Session, SessionState, SessionStorage};
