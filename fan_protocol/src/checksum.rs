/*!
Frame checksum.

A plain additive checksum: every byte is summed as an unsigned value, the low
16 bits of the sum are kept and sent low byte first. Overflow past 16 bits is
discarded.
*/

/// Compute the two checksum bytes for `bytes`
pub fn checksum(bytes: &[u8]) -> [u8; 2] {
    let sum = bytes
        .iter()
        .fold(0u32, |acc, &b| acc.wrapping_add(u32::from(b)));
    (sum as u16).to_le_bytes()
}

/// Check a transmitted checksum against the bytes it covers
pub fn verify(bytes: &[u8], transmitted: [u8; 2]) -> bool {
    checksum(bytes) == transmitted
}
