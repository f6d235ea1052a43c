pub mod fetcher;
pub mod reconciler;
pub mod sync;
pub mod writer;
