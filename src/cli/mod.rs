pub mod command;
pub mod preview;
pub mod session;
pub mod setup;

pub use command::{command_matches, Command};
pub use session::{Prepared, Session};
pub use setup::prompt_api_key;
