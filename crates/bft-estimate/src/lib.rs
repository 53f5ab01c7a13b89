//! Row-count projection and strategy enumeration for BFT report tables.

pub mod model;
pub mod report;
pub mod rows;
pub mod strategies;
pub mod table;

pub use model::{
    ChainEstimate, EntityStrategy, Governance, MetricStrategies, PlaceholderContribution,
    RowEstimate, TableEstimate,
};
pub use report::{render_strategies, render_table_estimate};
pub use rows::estimate_rows;
pub use strategies::table_strategies;
pub use table::{
    ActiveChain, active_chains, estimate_table_rows, placeholder_contributions, placeholder_kinds,
};
