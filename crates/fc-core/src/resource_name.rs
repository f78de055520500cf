//! Strongly-typed resource name wrapper.

use crate::newtype_string::define_newtype_string;

define_newtype_string! {
    /// Name of a resource a provider can fetch (e.g. `"ec2.instances"`).
    ///
    /// Resource identity is the provider's declared name, never the name of
    /// the table backing it.
    pub struct ResourceName;
}
