//! Pure workshop logic for Keystone.
//!
//! This crate holds the crafting and construction-gating rules of the
//! workshop independent of any UI, clock, or storage. Functions take plain
//! data and return results; time is always passed in by the caller.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`materials`] | Raw materials (with shop cost) and crafted items |
//! | [`recipes`] | Validated recipe catalog, furnace temperatures |
//! | [`ledger`] | Raw, crafted and currency balances with atomic debits |
//! | [`workbench`] | Four staging slots, recipe resolution, mixing |
//! | [`furnace`] | Single-slot timed firing state machine |
//! | [`progress`] | Per-building badges, sketch, quiz and lesson bookmark |
//! | [`buildings`] | Building requirement specs and registry |
//! | [`gate`] | Construction gate and raw-material shortfall pricing |

pub mod buildings;
pub mod furnace;
pub mod gate;
pub mod ledger;
pub mod materials;
pub mod progress;
pub mod recipes;
pub mod workbench;
