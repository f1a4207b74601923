mod config;
mod queuing;
mod session;
mod songs;
mod users;
mod util;

pub use config::*;
pub use queuing::*;
pub use session::*;
pub use songs::*;
pub use users::*;
pub use util::*;
