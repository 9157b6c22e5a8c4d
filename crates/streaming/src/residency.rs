/// Observable lifecycle of one cache key.
///
/// `Empty → Pending → Fresh`, `Fresh → Stale` once the TTL elapses,
/// `Stale → Pending` on the next access. A failed fetch returns the key to
/// `Empty`, or to `Stale` when an older value is still held.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Residency {
    Empty,
    Pending,
    Fresh,
    Stale,
}

impl Default for Residency {
    fn default() -> Self {
        Residency::Empty
    }
}
