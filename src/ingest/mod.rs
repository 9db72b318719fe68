/// Retrieval pipeline pieces, leaves first:
/// partition → request → (dwr transport) → tabular → accumulate.
pub mod accumulate;
pub mod dwr;
pub mod partition;
pub mod request;
pub mod tabular;

#[cfg(test)]
pub(crate) mod fixtures;
