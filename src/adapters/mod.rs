// Adapters layer: concrete implementations of the player store and its credentials.

pub mod credentials;
pub mod firestore;
pub mod memory;
