use super::config::BatchConfig;
use super::job::{JobError, JobId, JobStatus, RenderJob};
use super::reporter::{StatusEvent, StatusReporter, StatusSubscription};
use super::result::{BatchResult, JobFailure, PersonalizedDocument};
use crate::error::BatchError;
use crate::template::Template;
use chrono::Utc;
use inscribe_placement::{LayoutSet, PageLayout};
use inscribe_render_core::{PageRenderer, RenderError};
use inscribe_roster::NameEntry;
use log::{debug, info, warn};
use std::any::Any;
use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task;

/// Cooperative cancellation for a running batch.
///
/// Cancelling stops dispatch of new jobs; jobs already running finish and
/// their documents are still assembled. The orchestrator clears the flag
/// when the cancelled run returns, so later runs start normally.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Messages from render workers to the collector.
enum JobMessage {
    Started(JobId),
    Finished(JobId, Result<Vec<u8>, RenderError>),
}

/// Shared, read-only inputs of a running batch.
struct BatchInputs {
    template: Arc<Template>,
    layouts: LayoutSet,
    names: Vec<NameEntry>,
}

impl BatchInputs {
    fn page_count(&self) -> usize {
        self.template.page_count()
    }

    /// Name index and page number of a job.
    fn locate(&self, id: JobId) -> (usize, u32) {
        let pages = self.page_count().max(1);
        (id.0 / pages, (id.0 % pages) as u32 + 1)
    }
}

/// Runs the fan-out of names across template pages.
///
/// Each (name, page) pair becomes one render job. Jobs run on tokio's
/// blocking pool with at most `concurrency` in flight; a single collector
/// owns all job records and assembles each recipient's document once all of
/// its jobs are done.
pub struct BatchOrchestrator {
    renderer: Arc<dyn PageRenderer>,
    config: BatchConfig,
    reporter: StatusReporter,
    cancel: CancelHandle,
}

impl std::fmt::Debug for BatchOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchOrchestrator")
            .field("renderer", &self.renderer.name())
            .field("config", &self.config)
            .finish()
    }
}

impl BatchOrchestrator {
    pub fn new(renderer: Arc<dyn PageRenderer>, config: BatchConfig) -> Self {
        Self {
            renderer,
            config,
            reporter: StatusReporter::new(),
            cancel: CancelHandle::new(),
        }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    pub fn reporter(&self) -> &StatusReporter {
        &self.reporter
    }

    pub fn subscribe(&self) -> StatusSubscription {
        self.reporter.subscribe()
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Decodes the template and runs the batch.
    ///
    /// A cancel requested through [`cancel_handle`](Self::cancel_handle)
    /// before or during the run ends this run only.
    pub async fn run(
        &self,
        template_bytes: &[u8],
        layouts: &[PageLayout],
        names: &[NameEntry],
    ) -> Result<BatchResult, BatchError> {
        let layouts = preflight(layouts, names)?;
        let template = Arc::new(Template::from_bytes(template_bytes)?);
        self.execute(template, layouts, names).await
    }

    /// Runs the batch against an already decoded template.
    pub async fn run_template(
        &self,
        template: Arc<Template>,
        layouts: &[PageLayout],
        names: &[NameEntry],
    ) -> Result<BatchResult, BatchError> {
        let layouts = preflight(layouts, names)?;
        self.execute(template, layouts, names).await
    }

    /// [`run`](Self::run) on a dedicated multi-threaded runtime.
    pub fn run_blocking(
        &self,
        template_bytes: &[u8],
        layouts: &[PageLayout],
        names: &[NameEntry],
    ) -> Result<BatchResult, BatchError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;
        runtime.block_on(self.run(template_bytes, layouts, names))
    }

    async fn execute(
        &self,
        template: Arc<Template>,
        layouts: LayoutSet,
        names: &[NameEntry],
    ) -> Result<BatchResult, BatchError> {
        if layouts.len() != template.page_count() {
            return Err(BatchError::PageCountMismatch {
                layouts: layouts.len(),
                pages: template.page_count(),
            });
        }
        let mut seen = HashSet::with_capacity(names.len());
        for entry in names {
            if !seen.insert(entry.output_id()) {
                return Err(BatchError::DuplicateOutputId(entry.output_id().to_string()));
            }
        }
        if self.config.concurrency == 0 {
            return Err(BatchError::Config("concurrency must be at least 1".into()));
        }

        let inputs = Arc::new(BatchInputs {
            template,
            layouts,
            names: names.to_vec(),
        });
        let start = Instant::now();
        info!(
            "Starting batch: {} names x {} pages, {} jobs in flight at most",
            inputs.names.len(),
            inputs.page_count(),
            self.config.concurrency
        );

        let mut collector = Collector::new(&inputs, &self.reporter);
        let (tx, rx) = async_channel::unbounded::<JobMessage>();
        let dispatch = self.dispatch(Arc::clone(&inputs), tx);
        let collect = async {
            while let Ok(message) = rx.recv().await {
                collector.handle(message);
            }
        };
        let (dispatched, ()) = tokio::join!(dispatch, collect);
        self.cancel.reset();

        let cancelled = dispatched < collector.jobs.len();
        let result = collector.finish(cancelled);
        info!(
            "Batch finished in {:.2?}: {} succeeded, {} failed, {} pending, {} documents",
            start.elapsed(),
            result.succeeded,
            result.failed,
            result.pending,
            result.documents.len()
        );
        self.reporter.emit(StatusEvent::BatchComplete {
            summary: result.summary(),
        });
        Ok(result)
    }

    /// Dispatches jobs in name-major, page-minor order. Returns how many
    /// were dispatched before the batch ended or was cancelled.
    async fn dispatch(
        &self,
        inputs: Arc<BatchInputs>,
        tx: async_channel::Sender<JobMessage>,
    ) -> usize {
        let semaphore = Arc::new(Semaphore::new(self.config.concurrency));
        let total = inputs.names.len() * inputs.page_count();

        for index in 0..total {
            if self.cancel.is_cancelled() {
                info!("[DISPATCH] Cancelled before job {}", index);
                return index;
            }
            let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
                return index;
            };
            if self.cancel.is_cancelled() {
                info!("[DISPATCH] Cancelled before job {}", index);
                return index;
            }

            let id = JobId(index);
            let inputs = Arc::clone(&inputs);
            let renderer = Arc::clone(&self.renderer);
            let tx = tx.clone();
            task::spawn_blocking(move || {
                let _permit = permit;
                if tx.send_blocking(JobMessage::Started(id)).is_err() {
                    warn!("[WORKER] Collector gone, dropping {}", id);
                    return;
                }
                let result = render_job(renderer.as_ref(), &inputs, id);
                if tx.send_blocking(JobMessage::Finished(id, result)).is_err() {
                    warn!("[WORKER] Collector gone, dropping result of {}", id);
                }
            });
        }
        total
    }
}

/// Validates the inputs that need no template: layout set shape, then the
/// batch-level preconditions.
fn preflight(layouts: &[PageLayout], names: &[NameEntry]) -> Result<LayoutSet, BatchError> {
    let layouts = LayoutSet::new(layouts.to_vec())?;
    let enabled = layouts.enabled_count();
    if layouts.is_empty() || (names.is_empty() && enabled == 0) {
        return Err(BatchError::EmptyBatch);
    }
    if names.is_empty() {
        return Err(BatchError::NoRecipients);
    }
    if enabled == 0 {
        return Err(BatchError::NoEnabledPages);
    }
    Ok(layouts)
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "renderer panicked".to_string()
    }
}

fn render_job(
    renderer: &dyn PageRenderer,
    inputs: &BatchInputs,
    id: JobId,
) -> Result<Vec<u8>, RenderError> {
    let (name_index, page_number) = inputs.locate(id);
    let page = inputs
        .template
        .page(page_number)
        .ok_or_else(|| RenderError::Internal(format!("template page {page_number} missing")))?;
    let layout = inputs
        .layouts
        .get(page_number)
        .ok_or_else(|| RenderError::Internal(format!("layout for page {page_number} missing")))?;
    let name = inputs
        .names
        .get(name_index)
        .ok_or_else(|| RenderError::Internal(format!("name {name_index} missing")))?;

    panic::catch_unwind(AssertUnwindSafe(|| renderer.render(&page.bytes, layout, name)))
        .unwrap_or_else(|payload| Err(RenderError::Internal(panic_message(payload))))
}

fn emit_job(reporter: &StatusReporter, inputs: &BatchInputs, job: &RenderJob) {
    reporter.emit(StatusEvent::Job {
        job_id: job.id,
        output_id: inputs.names[job.name_index].output_id().to_string(),
        page_number: job.page_number,
        status: job.status,
        timestamp: Utc::now(),
        error: job.error.clone(),
    });
}

/// Per-recipient assembly state.
struct Assembly {
    pages: Vec<Option<Vec<u8>>>,
    remaining: usize,
    failed: bool,
    document: Option<PersonalizedDocument>,
}

/// Owns every job record and partial document of a batch.
struct Collector<'a> {
    inputs: &'a BatchInputs,
    reporter: &'a StatusReporter,
    jobs: Vec<RenderJob>,
    assemblies: Vec<Assembly>,
    failures: Vec<JobFailure>,
}

impl<'a> Collector<'a> {
    /// Creates every job record up front and announces them as pending.
    fn new(inputs: &'a BatchInputs, reporter: &'a StatusReporter) -> Self {
        let page_count = inputs.page_count();
        let mut jobs = Vec::with_capacity(inputs.names.len() * page_count);
        for name_index in 0..inputs.names.len() {
            for page_index in 0..page_count {
                let id = JobId(jobs.len());
                jobs.push(RenderJob::new(id, name_index, page_index as u32 + 1));
            }
        }
        let assemblies = (0..inputs.names.len())
            .map(|_| Assembly {
                pages: vec![None; page_count],
                remaining: page_count,
                failed: false,
                document: None,
            })
            .collect();

        for job in &jobs {
            emit_job(reporter, inputs, job);
        }
        Self {
            inputs,
            reporter,
            jobs,
            assemblies,
            failures: Vec::new(),
        }
    }

    fn handle(&mut self, message: JobMessage) {
        match message {
            JobMessage::Started(id) => {
                if let Some(job) = self.jobs.get_mut(id.0) {
                    job.start();
                    emit_job(self.reporter, self.inputs, job);
                }
            }
            JobMessage::Finished(id, result) => self.finish_job(id, result),
        }
    }

    fn finish_job(&mut self, id: JobId, result: Result<Vec<u8>, RenderError>) {
        let (inputs, reporter) = (self.inputs, self.reporter);
        let Some(job) = self.jobs.get_mut(id.0) else {
            return;
        };
        let name = &inputs.names[job.name_index];
        let assembly = &mut self.assemblies[job.name_index];
        match result {
            Ok(bytes) => {
                debug!("{} ({} page {}) succeeded", id, name.output_id(), job.page_number);
                job.succeed();
                assembly.pages[job.page_number as usize - 1] = Some(bytes);
            }
            Err(err) => {
                warn!("{} ({} page {}) failed: {}", id, name.output_id(), job.page_number, err);
                let error = JobError::from(&err);
                job.fail(error.clone());
                assembly.failed = true;
                self.failures.push(JobFailure {
                    job_id: id,
                    output_id: name.output_id().to_string(),
                    raw_name: name.raw_name().to_string(),
                    page_number: job.page_number,
                    error,
                });
            }
        }
        assembly.remaining -= 1;
        emit_job(reporter, inputs, job);

        if assembly.remaining == 0 {
            let complete = !assembly.failed;
            if complete {
                let pages = assembly.pages.iter_mut().filter_map(Option::take).collect();
                assembly.document = Some(PersonalizedDocument {
                    output_id: name.output_id().to_string(),
                    raw_name: name.raw_name().to_string(),
                    name_index: job.name_index,
                    pages,
                });
            } else {
                assembly.pages.clear();
            }
            reporter.emit(StatusEvent::Document {
                output_id: name.output_id().to_string(),
                complete,
            });
        }
    }

    fn finish(self, cancelled: bool) -> BatchResult {
        let count = |status: JobStatus| self.jobs.iter().filter(|job| job.status == status).count();
        let succeeded = count(JobStatus::Succeeded);
        let failed = count(JobStatus::Failed);
        let pending = count(JobStatus::Pending);

        let mut incomplete = Vec::new();
        let mut documents = Vec::new();
        for (entry, assembly) in self.inputs.names.iter().zip(self.assemblies) {
            match assembly.document {
                Some(document) => documents.push(document),
                None => incomplete.push(entry.output_id().to_string()),
            }
        }

        BatchResult {
            total_jobs: self.jobs.len(),
            succeeded,
            failed,
            pending,
            cancelled,
            failures: self.failures,
            incomplete,
            documents,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inscribe_roster::NameList;

    fn names(source: &str) -> Vec<NameEntry> {
        NameList::parse(source).map(NameList::into_entries).unwrap_or_default()
    }

    fn layouts(enabled: &[bool]) -> Vec<PageLayout> {
        enabled
            .iter()
            .enumerate()
            .map(|(i, &on)| {
                let mut layout = PageLayout::default_for_page(i as u32 + 1);
                layout.enabled = on;
                layout
            })
            .collect()
    }

    #[test]
    fn preconditions_are_checked_in_order() {
        assert!(matches!(preflight(&[], &names("Asha")), Err(BatchError::EmptyBatch)));
        assert!(matches!(preflight(&layouts(&[false]), &[]), Err(BatchError::EmptyBatch)));
        assert!(matches!(preflight(&layouts(&[true]), &[]), Err(BatchError::NoRecipients)));
        assert!(matches!(
            preflight(&layouts(&[false, false]), &names("Asha")),
            Err(BatchError::NoEnabledPages)
        ));
        assert!(preflight(&layouts(&[false, true]), &names("Asha")).is_ok());
    }

    #[test]
    fn layout_shape_is_checked_first() {
        let mut bad = layouts(&[true, true]);
        bad[1].page_number = 3;
        assert!(matches!(preflight(&bad, &[]), Err(BatchError::Layout(_))));
    }

    #[test]
    fn cancel_handle_is_shared() {
        let handle = CancelHandle::new();
        let clone = handle.clone();
        clone.cancel();
        assert!(handle.is_cancelled());
        handle.reset();
        assert!(!clone.is_cancelled());
    }

    #[test]
    fn panic_payloads_become_messages() {
        let payload = panic::catch_unwind(|| -> u8 { panic!("glyph table exploded") }).unwrap_err();
        assert_eq!(panic_message(payload), "glyph table exploded");
    }
}
