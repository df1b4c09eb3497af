//! # Batching
//!
//! Turning a stream of dispatched submissions into batches: the assembler
//! that fills and closes them, the processor that hands closed batches to the
//! pipeline, and the recovery path that splits rejected batches for retry.

pub mod assembler;
pub mod processor;
pub mod recovery;

pub use assembler::BatchAssembler;
pub use processor::BatchProcessor;
pub use recovery::ErrorBatchRecovery;
