use std::{collections::VecDeque, fmt::Write as _, str::FromStr};

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
    seq::SliceRandom,
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::PieceKind;

/// Supplies pieces using the 7-bag system: a shuffled bag of all 7 kinds is
/// drawn in order and refilled before it runs dry, so no kind can drought for
/// more than 12 draws.
#[derive(Debug, Clone)]
pub struct PieceQueue {
    rng: Pcg32,
    bag: VecDeque<PieceKind>,
}

/// Seed for deterministic piece generation.
///
/// A 128-bit seed for the piece queue's random number generator. The same
/// seed produces the same piece sequence, which makes episodes reproducible
/// for debugging and testing. Serializes as a 32-character hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BagSeed([u8; 16]);

impl Serialize for BagSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let num = u128::from_be_bytes(self.0);
        let mut hex_str = String::with_capacity(2 * self.0.len());
        write!(&mut hex_str, "{num:032x}").unwrap();
        serializer.serialize_str(&hex_str)
    }
}

impl<'de> Deserialize<'de> for BagSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        hex_str.parse().map_err(serde::de::Error::custom)
    }
}

/// Parse error for [`BagSeed`] hex strings.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("invalid seed: expected 32 hex characters, got {input:?}")]
pub struct ParseBagSeedError {
    input: String,
}

impl FromStr for BagSeed {
    type Err = ParseBagSeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 32 {
            return Err(ParseBagSeedError {
                input: s.to_owned(),
            });
        }
        let num = u128::from_str_radix(s, 16).map_err(|_| ParseBagSeedError {
            input: s.to_owned(),
        })?;
        Ok(Self(num.to_be_bytes()))
    }
}

/// Allows generating random seeds with `rng.random()`.
impl Distribution<BagSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> BagSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        BagSeed(seed)
    }
}

impl Default for PieceQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl PieceQueue {
    /// Creates a queue with a random seed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    /// Creates a queue with a specific seed for a deterministic sequence.
    #[must_use]
    pub fn with_seed(seed: BagSeed) -> Self {
        let rng = Pcg32::from_seed(seed.0);
        let bag = VecDeque::with_capacity(PieceKind::LEN * 2);
        let mut this = Self { rng, bag };
        this.fill_bag();
        this
    }

    /// Refills the bag with shuffled sets of 7 pieces until more than 7
    /// remain, so one `pop_next` still leaves a full preview.
    fn fill_bag(&mut self) {
        while self.bag.len() <= PieceKind::LEN {
            let mut new_bag = PieceKind::ALL;
            new_bag.shuffle(&mut self.rng);
            self.bag.extend(new_bag);
        }
    }

    /// Draws the next piece.
    ///
    /// # Panics
    ///
    /// Panics if the bag is empty (cannot happen with the refill logic).
    pub fn pop_next(&mut self) -> PieceKind {
        self.fill_bag();
        self.bag
            .pop_front()
            .expect("piece bag should never be empty")
    }

    /// Returns an iterator over the upcoming pieces (at least 8 entries).
    pub fn upcoming(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.bag.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed_from_bytes(bytes: [u8; 16]) -> BagSeed {
        BagSeed(bytes)
    }

    #[test]
    fn seed_roundtrip() {
        let seed: BagSeed = rand::rng().random();
        let serialized = serde_json::to_string(&seed).unwrap();
        let deserialized: BagSeed = serde_json::from_str(&serialized).unwrap();
        assert_eq!(seed, deserialized);
    }

    #[test]
    fn seed_serializes_as_32_char_hex() {
        let seed = seed_from_bytes([
            0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF, 0xFE, 0xDC, 0xBA, 0x98, 0x76, 0x54,
            0x32, 0x10,
        ]);
        let serialized = serde_json::to_string(&seed).unwrap();
        assert_eq!(serialized, "\"0123456789abcdeffedcba9876543210\"");
    }

    #[test]
    fn seed_parse_rejects_bad_input() {
        assert!("0123456789abcdef".parse::<BagSeed>().is_err());
        assert!(
            "ghijklmnopqrstuvwxyzghijklmnopqr"
                .parse::<BagSeed>()
                .is_err()
        );
        assert!("".parse::<BagSeed>().is_err());
        assert!(
            "0123456789ABCDEFFEDCBA9876543210"
                .parse::<BagSeed>()
                .is_ok()
        );
    }

    #[test]
    fn same_seed_same_sequence() {
        let seed = seed_from_bytes([
            0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC, 0xDE, 0xF0, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66,
            0x77, 0x88,
        ]);
        let mut queue1 = PieceQueue::with_seed(seed);
        let mut queue2 = PieceQueue::with_seed(seed);
        for _ in 0..20 {
            assert_eq!(queue1.pop_next(), queue2.pop_next());
        }
    }

    #[test]
    fn first_bag_contains_each_kind_once() {
        let mut queue = PieceQueue::new();
        let mut counts = [0usize; PieceKind::LEN];
        for _ in 0..PieceKind::LEN {
            counts[queue.pop_next() as usize] += 1;
        }
        assert_eq!(counts, [1; PieceKind::LEN]);
    }
}
