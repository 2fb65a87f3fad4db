//! Army Intercept - interception planning against predicted army paths

pub mod board;
pub mod core;
pub mod intercept;
pub mod scenario;
pub mod search;
pub mod threat;
