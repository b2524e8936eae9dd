//! Fixed catalog of number categories: code → upstream resource + fallback data.

use crate::error::{AppError, Result};
use crate::types::Category;

const PRIMES_FALLBACK: [i64; 10] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29];
const FIBO_FALLBACK: [i64; 10] = [1, 1, 2, 3, 5, 8, 13, 21, 34, 55];
const EVEN_FALLBACK: [i64; 10] = [2, 4, 6, 8, 10, 12, 14, 16, 18, 20];
const RAND_FALLBACK: [i64; 10] = [4, 7, 12, 15, 18, 22, 25, 28, 31, 35];

/// Resolve a short code from the request path. Codes are case-sensitive.
pub fn resolve(code: &str) -> Result<Category> {
    match code {
        "p" => Ok(Category::Prime),
        "f" => Ok(Category::Fibonacci),
        "e" => Ok(Category::Even),
        "r" => Ok(Category::Random),
        _ => Err(AppError::UnknownCategory(code.to_string())),
    }
}

impl Category {
    /// Path segment appended to the upstream base URL.
    pub fn resource(self) -> &'static str {
        match self {
            Category::Prime => "primes",
            Category::Fibonacci => "fibo",
            Category::Even => "even",
            Category::Random => "rand",
        }
    }

    /// Numbers served when the upstream provider cannot be reached in time.
    pub fn fallback(self) -> &'static [i64] {
        match self {
            Category::Prime => &PRIMES_FALLBACK,
            Category::Fibonacci => &FIBO_FALLBACK,
            Category::Even => &EVEN_FALLBACK,
            Category::Random => &RAND_FALLBACK,
        }
    }
}
