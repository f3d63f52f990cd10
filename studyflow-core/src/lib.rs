pub mod errors;
pub mod haptics;
pub mod models;
pub mod motion;
pub mod queue;
pub mod repo;
pub mod scheduler;
pub mod session;
pub mod stats;
pub mod timer;

pub use errors::*;
pub use haptics::*;
pub use models::*;
pub use motion::*;
pub use queue::*;
pub use repo::*;
pub use scheduler::*;
pub use session::*;
pub use stats::*;
pub use timer::*;
