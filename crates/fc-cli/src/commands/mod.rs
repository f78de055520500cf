//! CLI command implementations

pub(crate) mod common;
pub(crate) mod ddl;
pub(crate) mod ls;
pub(crate) mod test;
