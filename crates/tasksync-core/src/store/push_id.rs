//! Push key generation
//!
//! Keys are 20 characters: 8 encode the millisecond timestamp, 12 are random.
//! Both parts use an alphabet whose characters are in ASCII order, so keys
//! sort chronologically as plain strings. A key requested in the same
//! millisecond as the previous one (or earlier, if the clock stepped back)
//! reuses the previous random part incremented by one. When that part
//! overflows, the timestamp moves on by one millisecond, so keys from one
//! generator are strictly increasing.

use std::sync::Mutex;

use chrono::Utc;
use uuid::Uuid;

/// Push key alphabet, in ASCII order
const PUSH_CHARS: &[u8; 64] = b"-0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ_abcdefghijklmnopqrstuvwxyz";

const TIME_CHARS: usize = 8;
const RANDOM_CHARS: usize = 12;

/// Push key length
pub const PUSH_ID_LEN: usize = TIME_CHARS + RANDOM_CHARS;

#[derive(Debug, Default)]
struct GeneratorState {
    last_time: i64,
    last_random: [u8; RANDOM_CHARS],
}

/// Generates chronologically ordered, collision-resistant keys
#[derive(Debug, Default)]
pub struct PushIdGenerator {
    state: Mutex<GeneratorState>,
}

impl PushIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a key for the current time
    pub fn generate(&self) -> String {
        self.generate_at(Utc::now().timestamp_millis())
    }

    /// Generate a key for a given millisecond timestamp
    pub fn generate_at(&self, now_millis: i64) -> String {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        if now_millis > state.last_time {
            state.last_time = now_millis;
            state.last_random = random_digits();
        } else if increment(&mut state.last_random) {
            state.last_time += 1;
        }

        encode(state.last_time, &state.last_random)
    }
}

fn encode(time: i64, random: &[u8; RANDOM_CHARS]) -> String {
    let mut id = String::with_capacity(PUSH_ID_LEN);
    let mut time_chars = [0u8; TIME_CHARS];
    let mut t = time.max(0);
    for slot in time_chars.iter_mut().rev() {
        *slot = PUSH_CHARS[(t % 64) as usize];
        t /= 64;
    }
    id.extend(time_chars.iter().map(|&c| c as char));
    id.extend(random.iter().map(|&d| PUSH_CHARS[d as usize] as char));
    id
}

/// Twelve random base-64 digits
fn random_digits() -> [u8; RANDOM_CHARS] {
    let bytes = Uuid::new_v4().into_bytes();
    let mut digits = [0u8; RANDOM_CHARS];
    for (digit, byte) in digits.iter_mut().zip(bytes.iter()) {
        *digit = byte % 64;
    }
    digits
}

/// Add one to a base-64 number stored most significant digit first
///
/// Returns true when the number wrapped around to zero.
fn increment(digits: &mut [u8; RANDOM_CHARS]) -> bool {
    for digit in digits.iter_mut().rev() {
        if *digit == 63 {
            *digit = 0;
        } else {
            *digit += 1;
            return false;
        }
    }
    true
}
