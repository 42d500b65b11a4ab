// Text Normalizer + Fuzzy Locator.
// Pure functions over plain strings; no document access here.

pub mod locator;
pub mod normalize;

pub use locator::{locate, Located, MatchKind};
pub use normalize::normalize;
