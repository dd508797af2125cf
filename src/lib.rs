#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod ai;
mod bitboard;
mod common;
mod config;
mod game;
mod grid;
mod moves;
mod placement;
mod score;
mod ship;
#[cfg(feature = "std")]
mod logging;
#[cfg(feature = "std")]
pub mod notify;
#[cfg(feature = "std")]
pub mod protocol;
#[cfg(feature = "std")]
mod service;
#[cfg(feature = "std")]
pub mod store;
#[cfg(feature = "std")]
pub mod ui;

pub use ai::*;
pub use bitboard::{BitBoard, BitBoardError, Bits};
pub use common::*;
pub use config::*;
pub use game::*;
pub use grid::*;
pub use moves::*;
pub use placement::*;
pub use score::*;
pub use ship::*;
#[cfg(feature = "std")]
pub use logging::{init_logging, log_level_from_env};
#[cfg(feature = "std")]
pub use notify::{ChannelNotifier, LogNotifier, Notifier};
#[cfg(feature = "std")]
pub use service::{BattleshipService, ServiceError, ServiceResult};
#[cfg(feature = "std")]
pub use store::{GameStore, InMemoryStore};
