//! Built-in sanitization transforms.
//!
//! This module holds the pure value-to-value functions behind every built-in
//! rule kind (`transforms`), the provider rules used for email canonicalization
//! (`email`), and the cached compilation of the character classes used by
//! `blacklist` and `whitelist` (`compiler`). The engine only orchestrates these;
//! it never inspects their semantics.

pub mod compiler;
pub mod email;
pub mod transforms;
