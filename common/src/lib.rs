//! Common types shared among all meeting crates

#[cfg(any(test, feature = "test-utils"))]
pub use test::*;

pub mod fmt;
pub mod logging;

use rand::{
    distributions::{Alphanumeric, DistString},
    RngCore,
};
use vmeet_cryptography::utils as crypto_utils;

pub fn rand_string<const N: usize>() -> String {
    Alphanumeric.sample_string(&mut crypto_utils::rng(), N)
}

pub fn rand_array<const N: usize>() -> [u8; N] {
    let mut buffer = [0u8; N];
    crypto_utils::rng().fill_bytes(&mut buffer);
    buffer
}

pub fn rand_vec<const N: usize>() -> Vec<u8> {
    rand_array::<N>().to_vec()
}
