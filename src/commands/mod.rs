//! Command implementations

mod add;
mod chat;
mod init;
mod sites;

pub use add::*;
pub use chat::*;
pub use init::*;
pub use sites::*;
