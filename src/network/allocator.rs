use ip_network::Ipv4Network;
use std::net::Ipv4Addr;

use crate::error::AllocationError;

use super::Ipv4Interface;

/// Lowest-block value that is never handed out (network-style address)
const RESERVED_LOW: u32 = 0;
/// Lowest-block value that is never handed out (broadcast-style address)
const RESERVED_HIGH: u32 = 255;

/// Compute the address to hand to the next peer after `current`.
///
/// The address is treated as four 8-bit blocks. The lowest block never takes
/// the values 0 or 255: stepping onto either moves to `.1` of the next
/// 256-address block, carrying into the higher blocks. This applies to every
/// block regardless of the prefix length of `network`.
///
/// The result is always a `/32` host address and must lie inside `network`.
pub fn next_host(
    current: Ipv4Interface,
    network: Ipv4Network,
) -> Result<Ipv4Interface, AllocationError> {
    let exhausted = || AllocationError::AddressPoolExhausted { network };

    let mut candidate = u32::from(current.addr())
        .checked_add(1)
        .ok_or_else(exhausted)?;

    if candidate & 0xff == RESERVED_HIGH {
        // .255 -> .1 of the next block
        candidate = candidate.checked_add(2).ok_or_else(exhausted)?;
    } else if candidate & 0xff == RESERVED_LOW {
        candidate += 1;
    }

    let addr = Ipv4Addr::from(candidate);
    if !network.contains(addr) {
        return Err(exhausted());
    }

    tracing::trace!("Next host after {} in {}: {}", current, network, addr);

    Ok(Ipv4Interface::host(addr))
}
