//! JSON-RPC request IDs in the shape the web client produces
//!
//! The backend only accepts IDs of the form `(8_300_000 + u) * 1000` with
//! `u` drawn from `[0, 99_999]`, so every ID is a multiple of 1000 between
//! 8_300_000_000 and 8_399_999_000 inclusive.
//!
//! The random source is always passed in. [`generate_request_id`] takes any
//! [`rand::Rng`], and [`RequestIdSource`] lets the provider swap the thread
//! RNG for a seeded or fixed one in tests.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt::Debug;
use std::sync::Mutex;

/// Protocol ID as placed in the `id` field of the request body
pub type RequestId = i64;

const ID_BASE: i64 = 8_300_000;
const ID_SPREAD: u32 = 99_999;
const ID_SCALE: i64 = 1000;

/// Smallest ID the generator can produce
pub const MIN_REQUEST_ID: RequestId = ID_BASE * ID_SCALE;
/// Largest ID the generator can produce
pub const MAX_REQUEST_ID: RequestId = (ID_BASE + ID_SPREAD as i64) * ID_SCALE;

/// Scale a raw draw in `[0, 99_999]` into a request ID
///
/// Draws above the range are clamped so the result stays a valid ID.
pub fn request_id_from_draw(draw: u32) -> RequestId {
    (ID_BASE + draw.min(ID_SPREAD) as i64) * ID_SCALE
}

/// Generate a fresh request ID from the given random source
pub fn generate_request_id<R: Rng + ?Sized>(rng: &mut R) -> RequestId {
    request_id_from_draw(rng.random_range(0..=ID_SPREAD))
}

/// Source of request IDs used by the provider
pub trait RequestIdSource: Send + Sync + Debug {
    fn next_id(&self) -> RequestId;
}

/// Draws from the thread-local RNG on every call; nothing is carried between calls
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomRequestIds;

impl RequestIdSource for RandomRequestIds {
    fn next_id(&self) -> RequestId {
        generate_request_id(&mut rand::rng())
    }
}

/// Reproducible ID sequence from a seed
#[derive(Debug)]
pub struct SeededRequestIds {
    rng: Mutex<StdRng>,
}

impl SeededRequestIds {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RequestIdSource for SeededRequestIds {
    fn next_id(&self) -> RequestId {
        // A poisoned lock still holds a usable RNG state
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        generate_request_id(&mut *rng)
    }
}

/// Always returns the same ID
#[derive(Debug, Clone, Copy)]
pub struct FixedRequestId(pub RequestId);

impl RequestIdSource for FixedRequestId {
    fn next_id(&self) -> RequestId {
        self.0
    }
}
