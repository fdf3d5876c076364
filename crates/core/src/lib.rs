//! Domain logic for the Prev-IX parameters page.
//!
//! Pure, I/O-free building blocks: the wear-coefficient and
//! construction-cost models, filtering, grouping, cascading cost selection,
//! the cost calculator and input debouncing. HTTP access lives in
//! `previx-client`; page state lives in `previx-parameters`.

pub mod calculator;
pub mod cascade;
pub mod construction_cost;
pub mod debounce;
pub mod decimal;
pub mod error;
pub mod filter;
pub mod grouping;
pub mod types;
pub mod wear;
