#![cfg_attr(not(test), no_std)]
#![cfg_attr(feature = "strict", deny(warnings))]

extern crate alloc;

pub mod adapter;
pub mod commands;
pub mod config;
pub mod connection;
pub mod diagnostics;
pub mod error;
pub mod responses;
pub mod stack;
pub mod transport;
pub mod wifi;

#[cfg(feature = "examples")]
pub mod example;

#[cfg(test)]
mod tests;
