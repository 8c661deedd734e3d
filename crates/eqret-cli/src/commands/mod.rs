pub mod batch;
pub mod solve;
pub mod validate;
