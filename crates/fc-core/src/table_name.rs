//! Strongly-typed table name wrapper.

use crate::newtype_string::define_newtype_string;

define_newtype_string! {
    /// Name of a persisted relation in the provider's table tree.
    ///
    /// Distinct from [`ResourceName`](crate::ResourceName): a resource is what
    /// the provider is asked to fetch, a table is where its rows land.
    pub struct TableName;
}
