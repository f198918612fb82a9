#![allow(dead_code)]

#[macro_use]
extern crate serde_derive;

#[cfg(test)]
extern crate pretty_assertions;

pub mod bus;
pub mod config;
pub mod cpu;
pub mod dmac;
pub mod error;
pub mod intc;
pub mod machine;
pub mod timers;
pub mod tools;
