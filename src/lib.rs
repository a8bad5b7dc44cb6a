#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

/// A separate-chaining table with a fixed bucket array and overflow pool.
pub mod chaining;

/// Errors returned when a table cannot be constructed.
pub mod error;

/// Integer keys and their bucket reduction.
pub mod key;

/// A linear-probing table with tombstones.
pub mod open_addressing;

pub mod stats;

mod storage;

/// The interface shared by both tables.
pub mod table;

pub use chaining::ChainingTable;
pub use error::Error;
pub use key::Key;
pub use open_addressing::OpenAddressingTable;
pub use stats::ChainingStats;
pub use stats::OpenAddressingStats;
pub use table::FixedTable;
