mod resolver;

pub use resolver::{AddressResolver, DnsResolver};
