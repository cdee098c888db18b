//! `todoboard-seed` — synthetic data generation for the todo board schema.
//!
//! A [`Plan`] describes rows to create per table. Generating a plan against a
//! [`Store`] yields a new store holding the generated rows, which can be
//! rendered to SQL with [`Store::to_sql`] or written to Postgres through
//! [`SeedClient`]. Values are derived from a string seed, so the same plan
//! and seed always produce the same rows.
//!
//! ```ignore
//! use todoboard_seed::{inputs::*, Plan, PlanOptions, Store};
//!
//! let plan = Plan::users(Children::x_with(3, |_| UserInputs {
//!     todos: Some(Children::x(2)),
//!     ..Default::default()
//! }))
//! .with_options(PlanOptions::seeded("demo"));
//!
//! let store = plan.generate(&Store::new())?;
//! for stmt in store.to_sql() {
//!     println!("{stmt};");
//! }
//! ```

pub mod client;
pub mod inputs;
pub mod model;
pub mod plan;
pub mod store;
pub mod synth;

pub use client::{SeedClient, SeedError};
pub use model::Table;
pub use plan::{Models, Plan, PlanError, PlanOptions};
pub use store::Store;
