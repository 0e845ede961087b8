//! Batch validation of many trigger expressions
//!
//! Expressions come from a list or a file (one per line, blank lines and `#`
//! comments skipped) and are validated sequentially or on a bounded set of
//! worker threads. Results always come back in input order.

use crate::config::compile_time::batch_processing::{MAX_EXPRESSIONS_PER_BATCH, MAX_WORKER_THREADS};
use crate::config::runtime::RuntimeConfig;
use crate::diagnostics::ValidationFailure;
use crate::logging::codes;
use crate::pipeline::{ExpressionValidator, ParseOutput, PipelineError};
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

// ============================================================================
// BATCH PROCESSING TYPES
// ============================================================================

/// Batch processing configuration
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub max_threads: usize,
    pub fail_fast: bool,
    pub runtime: RuntimeConfig,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_threads: std::thread::available_parallelism()
                .map(|n| n.get().min(8))
                .unwrap_or(4)
                .min(MAX_WORKER_THREADS),
            fail_fast: false,
            runtime: RuntimeConfig::default(),
        }
    }
}

impl BatchConfig {
    /// Set the worker count, clamped to `1..=MAX_WORKER_THREADS`
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.max_threads = threads.clamp(1, MAX_WORKER_THREADS);
        self
    }

    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }
}

/// One expression to validate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchEntry {
    /// 1-based source line, or position in the input list
    pub line: usize,
    pub expression: String,
}

#[derive(Debug)]
pub struct BatchItem {
    pub line: usize,
    pub expression: String,
    pub outcome: Result<ParseOutput, ValidationFailure>,
}

impl BatchItem {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Batch processing results
#[derive(Debug, Default)]
pub struct BatchResults {
    pub items: Vec<BatchItem>,
    pub processing_duration: Duration,
    pub expressions_submitted: usize,
    /// Processing stopped at a failure because of fail-fast
    pub stopped_early: bool,
}

impl BatchResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success_count(&self) -> usize {
        self.items.iter().filter(|item| item.is_success()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.items.len() - self.success_count()
    }

    pub fn all_succeeded(&self) -> bool {
        !self.stopped_early && self.failure_count() == 0
    }

    pub fn success_rate(&self) -> f64 {
        if self.items.is_empty() {
            0.0
        } else {
            self.success_count() as f64 / self.items.len() as f64
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "Batch validation completed: {} of {} expressions processed, {} valid ({:.1}%), {} invalid, {:.2}s total",
            self.items.len(),
            self.expressions_submitted,
            self.success_count(),
            self.success_rate() * 100.0,
            self.failure_count(),
            self.processing_duration.as_secs_f64()
        )
    }
}

// ============================================================================
// INPUT
// ============================================================================

/// Split file content into expressions, skipping blank lines and `#` comments
pub fn parse_expressions(content: &str) -> Vec<BatchEntry> {
    content
        .lines()
        .enumerate()
        .filter_map(|(index, line)| {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                None
            } else {
                Some(BatchEntry {
                    line: index + 1,
                    expression: trimmed.to_string(),
                })
            }
        })
        .collect()
}

pub fn read_expressions(path: &Path) -> Result<Vec<BatchEntry>, PipelineError> {
    let content = fs::read_to_string(path).map_err(|source| {
        crate::log_error!(codes::input::FILE_READ_ERROR, "Failed to read expression file",
            "file" => path.display(),
            "error" => &source
        );
        PipelineError::FileRead {
            path: path.display().to_string(),
            source,
        }
    })?;
    Ok(parse_expressions(&content))
}

/// Wrap plain expressions, numbering them from 1
pub fn entries_from_expressions<I, S>(expressions: I) -> Vec<BatchEntry>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    expressions
        .into_iter()
        .enumerate()
        .map(|(index, expression)| BatchEntry {
            line: index + 1,
            expression: expression.into(),
        })
        .collect()
}

// ============================================================================
// BATCH PROCESSING
// ============================================================================

/// Validate entries one after another
pub fn validate_sequential(entries: Vec<BatchEntry>, config: &BatchConfig) -> BatchResults {
    let start_time = Instant::now();

    crate::log_info!("Starting sequential batch validation",
        "expressions" => entries.len()
    );

    let validator = ExpressionValidator::with_config(&config.runtime);
    let mut results = BatchResults::new();
    results.expressions_submitted = entries.len();

    for entry in entries {
        let item = validate_entry(&validator, entry);
        let failed = !item.is_success();
        results.items.push(item);

        if failed && config.fail_fast {
            crate::log_warning!("Fail-fast mode enabled, stopping batch validation");
            results.stopped_early = true;
            break;
        }
    }

    results.processing_duration = start_time.elapsed();
    log_completion(&results, 1);
    results
}

/// Validate entries on up to `config.max_threads` worker threads
pub fn validate_parallel(
    entries: Vec<BatchEntry>,
    config: &BatchConfig,
) -> Result<BatchResults, PipelineError> {
    let start_time = Instant::now();
    let threads = config.max_threads.clamp(1, MAX_WORKER_THREADS);

    crate::log_info!("Starting parallel batch validation",
        "expressions" => entries.len(),
        "max_threads" => threads
    );

    let mut results = BatchResults::new();
    results.expressions_submitted = entries.len();

    let chunk_size = calculate_chunk_size(entries.len());
    crate::log_debug!("Parallel validation configuration",
        "total_expressions" => entries.len(),
        "chunk_size" => chunk_size,
        "threads" => threads
    );

    for chunk in entries.chunks(chunk_size) {
        let mut chunk_items = validate_chunk_parallel(chunk, threads, &config.runtime)?;
        chunk_items.sort_by_key(|(position, _)| *position);

        for (_, item) in chunk_items {
            let failed = !item.is_success();
            results.items.push(item);
            // Items after the first failure in this chunk are discarded so the
            // result matches a sequential fail-fast run
            if failed && config.fail_fast {
                results.stopped_early = true;
                break;
            }
        }

        if results.stopped_early {
            crate::log_warning!("Fail-fast mode enabled, stopping batch validation");
            break;
        }
    }

    results.processing_duration = start_time.elapsed();
    log_completion(&results, threads);
    Ok(results)
}

/// Validate one chunk, returning items tagged with their position in it
fn validate_chunk_parallel(
    entries: &[BatchEntry],
    threads: usize,
    runtime: &RuntimeConfig,
) -> Result<Vec<(usize, BatchItem)>, PipelineError> {
    let results = Arc::new(Mutex::new(Vec::with_capacity(entries.len())));
    let per_thread = entries.len().div_ceil(threads);

    let mut handles = Vec::new();
    for (thread_id, slice) in entries.chunks(per_thread.max(1)).enumerate() {
        let thread_entries = slice.to_vec();
        let first_position = thread_id * per_thread;
        let results_clone = Arc::clone(&results);
        let runtime = runtime.clone();

        handles.push(thread::spawn(move || {
            let validator = ExpressionValidator::with_config(&runtime);
            for (offset, entry) in thread_entries.into_iter().enumerate() {
                let item = validate_entry(&validator, entry);
                results_clone
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push((first_position + offset, item));
            }
        }));
    }

    for handle in handles {
        handle.join().map_err(|_| {
            PipelineError::pipeline_error("Worker thread panicked during batch validation")
        })?;
    }

    let items = Arc::try_unwrap(results)
        .map_err(|_| PipelineError::pipeline_error("Failed to collect batch results"))?
        .into_inner()
        .unwrap_or_else(PoisonError::into_inner);
    Ok(items)
}

fn validate_entry(validator: &ExpressionValidator<'_>, entry: BatchEntry) -> BatchItem {
    let outcome = validator
        .validate(&entry.expression)
        .map(|report| report.output);
    BatchItem {
        line: entry.line,
        expression: entry.expression,
        outcome,
    }
}

/// Entries per parallel round; bounded so results are merged regularly
fn calculate_chunk_size(total: usize) -> usize {
    const MIN_CHUNK_SIZE: usize = 1;
    const MAX_CHUNK_SIZE: usize = 1024;

    total.clamp(MIN_CHUNK_SIZE, MAX_CHUNK_SIZE)
}

fn log_completion(results: &BatchResults, threads: usize) {
    crate::log_performance!(
        codes::success::BATCH_COMPLETE,
        "Batch validation completed",
        duration = results.processing_duration,
        "processed" => results.items.len(),
        "valid" => results.success_count(),
        "invalid" => results.failure_count(),
        "threads_used" => threads
    );
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Validate a list of entries, choosing sequential or parallel processing
pub fn validate_batch(
    entries: Vec<BatchEntry>,
    config: &BatchConfig,
) -> Result<BatchResults, PipelineError> {
    if entries.len() > MAX_EXPRESSIONS_PER_BATCH {
        crate::log_error!(codes::input::TOO_MANY_EXPRESSIONS, "Batch exceeds expression limit",
            "count" => entries.len(),
            "max" => MAX_EXPRESSIONS_PER_BATCH
        );
        return Err(PipelineError::TooManyExpressions {
            count: entries.len(),
            max: MAX_EXPRESSIONS_PER_BATCH,
        });
    }

    if config.max_threads <= 1 || entries.len() <= 1 {
        Ok(validate_sequential(entries, config))
    } else {
        validate_parallel(entries, config)
    }
}

/// Read expressions from a file and validate them
pub fn validate_file(path: &Path, config: &BatchConfig) -> Result<BatchResults, PipelineError> {
    let entries = read_expressions(path)?;
    validate_batch(entries, config)
}
