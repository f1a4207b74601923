mod catalog;
mod client;
mod command;
mod config;
mod connection;
mod error;
mod events;
mod player;
mod status;
mod xml;

pub use catalog::*;
pub use client::*;
pub use command::*;
pub use config::*;
pub use error::*;
pub use events::*;
pub use player::*;
pub use status::*;
