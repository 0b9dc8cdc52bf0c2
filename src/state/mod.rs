/// State management module
///
/// This module handles state that outlives a single image entity:
/// - The local persistent byte cache keyed by storage location (storage.rs)
pub mod storage;
