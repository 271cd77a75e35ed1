pub mod address;
pub mod allocator;

pub use address::Ipv4Interface;
pub use allocator::next_host;
