//! Cache key trait and implementations

use std::fmt::Display;

/// Trait for types that can be used as cache keys
///
/// Implement this trait to use custom types as cache keys. Tuples join their
/// parts with `:`.
pub trait CacheKey: Send + Sync {
    /// Generate the raw key string
    ///
    /// Namespacing is applied later by the provider, so this must not
    /// include any namespace of its own.
    fn cache_key(&self) -> String;
}

// Implementations for common types

impl CacheKey for String {
    fn cache_key(&self) -> String {
        self.clone()
    }
}

impl CacheKey for &str {
    fn cache_key(&self) -> String {
        self.to_string()
    }
}

impl CacheKey for &String {
    fn cache_key(&self) -> String {
        (*self).clone()
    }
}

impl CacheKey for u64 {
    fn cache_key(&self) -> String {
        self.to_string()
    }
}

macro_rules! tuple_key {
    ($first:ident $(, $rest:ident)*) => {
        impl<$first: Display + Send + Sync, $($rest: Display + Send + Sync),*> CacheKey
            for ($first, $($rest,)*)
        {
            #[allow(non_snake_case)]
            fn cache_key(&self) -> String {
                let ($first, $($rest,)*) = self;
                let mut key = $first.to_string();
                $(
                    key.push(':');
                    key.push_str(&$rest.to_string());
                )*
                key
            }
        }
    };
}

tuple_key!(A);
tuple_key!(A, B);
tuple_key!(A, B, C);
tuple_key!(A, B, C, D);
