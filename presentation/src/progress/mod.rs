//! Progress reporting while participants respond

pub mod reporter;
