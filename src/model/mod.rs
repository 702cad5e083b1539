pub mod codes;
pub mod transaction;

pub use transaction::{Categorical, Classification, Transaction};
