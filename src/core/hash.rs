//! World-State Hashing
//!
//! SHA-256 digest of the simulation state, used by diagnostics to compare two
//! runs or two peers. Floats are hashed by bit pattern, so the digest is only
//! stable for bit-identical state.

use sha2::{Sha256, Digest};

use super::vec2::{Direction, Position};

/// Hash output type (256 bits / 32 bytes)
pub type StateHash = [u8; 32];

/// Deterministic hasher for world state.
///
/// Order of updates is significant.
pub struct StateHasher {
    hasher: Sha256,
}

impl StateHasher {
    /// Create a new hasher with domain separator.
    pub fn new(domain: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(domain);
        Self { hasher }
    }

    /// Create hasher for world state.
    pub fn for_world_state() -> Self {
        Self::new(b"TANK_BATTLE_STATE_V1")
    }

    /// Update with raw bytes.
    #[inline]
    pub fn update_bytes(&mut self, bytes: &[u8]) {
        self.hasher.update(bytes);
    }

    /// Update with a u8 value.
    #[inline]
    pub fn update_u8(&mut self, value: u8) {
        self.hasher.update([value]);
    }

    /// Update with a u64 value (little-endian).
    #[inline]
    pub fn update_u64(&mut self, value: u64) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with an i64 value (little-endian).
    #[inline]
    pub fn update_i64(&mut self, value: i64) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with an f64 bit pattern.
    #[inline]
    pub fn update_f64(&mut self, value: f64) {
        self.update_u64(value.to_bits());
    }

    /// Update with a position.
    #[inline]
    pub fn update_position(&mut self, value: Position) {
        self.update_f64(value.x);
        self.update_f64(value.y);
    }

    /// Update with a direction.
    #[inline]
    pub fn update_direction(&mut self, value: Direction) {
        self.update_f64(value.x);
        self.update_f64(value.y);
    }

    /// Update with an optional position. `None` hashes differently from any point.
    pub fn update_opt_position(&mut self, value: Option<Position>) {
        match value {
            Some(p) => {
                self.update_u8(1);
                self.update_position(p);
            }
            None => self.update_u8(0),
        }
    }

    /// Update with a length-prefixed string.
    pub fn update_str(&mut self, value: &str) {
        self.update_u64(value.len() as u64);
        self.hasher.update(value.as_bytes());
    }

    /// Update with a boolean.
    #[inline]
    pub fn update_bool(&mut self, value: bool) {
        self.update_u8(value as u8);
    }

    /// Finalize and return the hash.
    pub fn finalize(self) -> StateHash {
        self.hasher.finalize().into()
    }
}

/// Compute hash with domain separator.
pub fn hash_with_domain(domain: &[u8], data: &[u8]) -> StateHash {
    let mut hasher = Sha256::new();
    hasher.update(domain);
    hasher.update(data);
    hasher.finalize().into()
}

/// Compute the world-state digest.
///
/// The tick is always hashed first; `add_state` appends the entity data.
pub fn compute_state_hash<F>(tick: u64, add_state: F) -> StateHash
where
    F: FnOnce(&mut StateHasher),
{
    let mut hasher = StateHasher::for_world_state();
    hasher.update_u64(tick);
    add_state(&mut hasher);
    hasher.finalize()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_hasher_determinism() {
        let make_hash = || {
            let mut hasher = StateHasher::for_world_state();
            hasher.update_u64(100);
            hasher.update_position(Position::new(1.0, 2.0));
            hasher.update_direction(Direction::UP);
            hasher.update_str("tank-1");
            hasher.update_bool(true);
            hasher.finalize()
        };

        assert_eq!(make_hash(), make_hash());
    }

    #[test]
    fn test_hash_order_matters() {
        let hash1 = {
            let mut h = StateHasher::new(b"test");
            h.update_f64(1.0);
            h.update_f64(2.0);
            h.finalize()
        };

        let hash2 = {
            let mut h = StateHasher::new(b"test");
            h.update_f64(2.0);
            h.update_f64(1.0);
            h.finalize()
        };

        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_optional_position_is_tagged() {
        let none = {
            let mut h = StateHasher::new(b"test");
            h.update_opt_position(None);
            h.finalize()
        };
        let origin = {
            let mut h = StateHasher::new(b"test");
            h.update_opt_position(Some(Position::ORIGIN));
            h.finalize()
        };
        assert_ne!(none, origin);
    }

    #[test]
    fn test_domain_separation() {
        let data = [1u8, 2, 3, 4];
        assert_ne!(hash_with_domain(b"DOMAIN_A", &data), hash_with_domain(b"DOMAIN_B", &data));
    }

    #[test]
    fn test_compute_state_hash() {
        let hash = compute_state_hash(100, |h| h.update_position(Position::new(5.0, 5.0)));
        let hash2 = compute_state_hash(100, |h| h.update_position(Position::new(5.0, 5.0)));
        let hash3 = compute_state_hash(101, |h| h.update_position(Position::new(5.0, 5.0)));

        assert_eq!(hash, hash2);
        assert_ne!(hash, hash3);
    }
}
