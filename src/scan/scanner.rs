//! Scan coordinator: chunked reading fanned out to a bounded worker pool
//!
//! A fixed number of long-lived workers pull chunks from a bounded work
//! channel and push per-chunk candidate sets to a results channel; the
//! coordinating thread feeds chunks and periodically drains results into
//! the aggregate set. The result channel is the only shared mutable
//! resource. With `workers = 1` the scan runs sequentially on the calling
//! thread. There is no cancellation: the scan ends when the reader
//! exhausts the file.

use super::extractor::{CandidateExtractor, CandidateSet};
use super::reader::ChunkedReader;
use super::ScanError;
use crate::config::ScanConfig;
use std::path::Path;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Aggregate result of scanning one file
#[derive(Debug)]
pub struct ScanOutcome {
    /// Deduplicated candidates across all chunks
    pub candidates: CandidateSet,
    pub chunks_processed: u64,
    pub bytes_processed: u64,
}

/// Drives the chunked reader and the extraction workers
pub struct Scanner {
    config: ScanConfig,
}

impl Scanner {
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    /// Scan a backup file end to end. `on_chunk` is invoked once per chunk
    /// with the fresh byte count, for progress reporting.
    pub fn scan(
        &self,
        path: &Path,
        on_chunk: impl Fn(u64) + Sync,
    ) -> Result<ScanOutcome, ScanError> {
        let reader = ChunkedReader::open(path, self.config.chunk_size_bytes)?
            .with_overlap(self.config.overlap_bytes);
        let extractor = CandidateExtractor::new(&self.config);

        let mut outcome = if self.config.workers <= 1 {
            self.scan_sequential(reader, &extractor, &on_chunk)?
        } else {
            self.scan_parallel(reader, &extractor, &on_chunk)?
        };

        outcome.candidates.dedup();
        debug!(
            "Scan complete: {} chunks, {} candidates after dedup",
            outcome.chunks_processed,
            outcome.candidates.len()
        );
        Ok(outcome)
    }

    /// Fresh bytes in a block: every block after the first carries an
    /// `overlap_bytes` prefix repeated from the previous chunk.
    fn fresh_len(&self, block: &[u8], chunk_index: u64) -> u64 {
        if chunk_index == 0 {
            block.len() as u64
        } else {
            (block.len() - self.config.overlap_bytes) as u64
        }
    }

    fn scan_sequential(
        &self,
        reader: ChunkedReader,
        extractor: &CandidateExtractor,
        on_chunk: &impl Fn(u64),
    ) -> Result<ScanOutcome, ScanError> {
        let mut candidates = CandidateSet::default();
        let mut chunks = 0u64;
        let mut bytes = 0u64;

        for block in reader {
            let block = block?;
            candidates.merge(extractor.extract_block(&block));
            let fresh = self.fresh_len(&block, chunks);
            chunks += 1;
            bytes += fresh;
            on_chunk(fresh);
        }

        Ok(ScanOutcome {
            candidates,
            chunks_processed: chunks,
            bytes_processed: bytes,
        })
    }

    fn scan_parallel(
        &self,
        reader: ChunkedReader,
        extractor: &CandidateExtractor,
        on_chunk: &(impl Fn(u64) + Sync),
    ) -> Result<ScanOutcome, ScanError> {
        let workers = self.config.workers;
        let mut candidates = CandidateSet::default();
        let mut chunks = 0u64;
        let mut bytes = 0u64;
        let mut read_error = None;

        std::thread::scope(|scope| {
            // Bounded work queue: the reader blocks once workers fall
            // behind, keeping at most a few chunks in flight.
            let (work_tx, work_rx) = mpsc::sync_channel::<Vec<u8>>(workers * 2);
            let work_rx = Arc::new(Mutex::new(work_rx));
            let (result_tx, result_rx) = mpsc::channel::<CandidateSet>();

            let mut handles = Vec::with_capacity(workers);
            for _ in 0..workers {
                let work_rx = Arc::clone(&work_rx);
                let result_tx = result_tx.clone();
                let extractor = extractor.clone();
                handles.push(scope.spawn(move || loop {
                    let block = {
                        let rx = work_rx.lock().unwrap_or_else(|e| e.into_inner());
                        rx.recv()
                    };
                    match block {
                        Ok(block) => {
                            // Receiver gone means the coordinator bailed
                            if result_tx.send(extractor.extract_block(&block)).is_err() {
                                break;
                            }
                        }
                        Err(_) => break, // work channel closed
                    }
                }));
            }
            drop(result_tx);

            for block in reader {
                let block = match block {
                    Ok(block) => block,
                    Err(e) => {
                        read_error = Some(e);
                        break;
                    }
                };
                let fresh = self.fresh_len(&block, chunks);
                chunks += 1;
                bytes += fresh;
                on_chunk(fresh);
                if work_tx.send(block).is_err() {
                    break; // all workers died
                }

                // Drain whatever results are already available so the
                // result queue stays small.
                while let Ok(set) = result_rx.try_recv() {
                    candidates.merge(set);
                }
            }
            drop(work_tx);

            // Final drain: blocks until every worker has dropped its sender
            while let Ok(set) = result_rx.recv() {
                candidates.merge(set);
            }

            for handle in handles {
                if handle.join().is_err() && read_error.is_none() {
                    read_error = Some(ScanError::WorkerPanic);
                }
            }
        });

        if let Some(e) = read_error {
            return Err(e);
        }

        Ok(ScanOutcome {
            candidates,
            chunks_processed: chunks,
            bytes_processed: bytes,
        })
    }
}
