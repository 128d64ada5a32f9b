//! Shared numeric utilities.

mod matrix;

pub use matrix::{
    center_columns, center_vector, cholesky_lower, detect_constant_columns, symmetric_eigen,
};
