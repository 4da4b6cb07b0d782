use crate::subtitle::Cue;
use crate::translate::{TranslationError, Translator};
use futures::stream::{FuturesUnordered, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// Outcome of translating a single cue.
#[derive(Debug)]
struct CueResult {
    cue: Cue,
    fell_back: bool,
    skipped: bool,
}

/// Statistics from the translation pass.
#[derive(Debug, Clone, Default)]
pub struct TranslationStats {
    pub total_cues: usize,
    pub translated_cues: usize,
    /// Cues whose translation failed and kept their original text.
    pub fallback_cues: usize,
    /// Blank cues passed through without a call.
    pub skipped_cues: usize,
    pub total_time: Duration,
}

/// Translates cues concurrently with a bounded number of in-flight calls.
///
/// The bound is shared by every `translate_cues` call on the same
/// orchestrator, so concurrent uploads draw from one pool of permits.
pub struct TranslationOrchestrator {
    translator: Arc<dyn Translator>,
    concurrency: usize,
    semaphore: Arc<Semaphore>,
    timeout: Duration,
    show_progress: bool,
}

impl TranslationOrchestrator {
    /// Create a new orchestrator. A concurrency of 0 is treated as 1.
    pub fn new(translator: Arc<dyn Translator>, concurrency: usize) -> Self {
        let concurrency = concurrency.max(1);
        Self {
            translator,
            concurrency,
            semaphore: Arc::new(Semaphore::new(concurrency)),
            timeout: Duration::from_secs(30),
            show_progress: false,
        }
    }

    /// Per-call deadline; a call that exceeds it counts as failed.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Enable or disable progress bar display.
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Translate every cue, keeping index and timing. Failed calls fall back
    /// to the original text; the output is in input order.
    pub async fn translate_cues(&self, cues: Vec<Cue>) -> (Vec<Cue>, TranslationStats) {
        let total_cues = cues.len();
        let start_time = Instant::now();

        if cues.is_empty() {
            return (Vec::new(), TranslationStats::default());
        }

        info!(
            "Translating {} cues with {} concurrent requests using {}",
            total_cues,
            self.concurrency,
            self.translator.name()
        );

        let progress_bar = if self.show_progress {
            let pb = ProgressBar::new(total_cues as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} cues ({eta})")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            Some(pb)
        } else {
            None
        };

        let mut futures = FuturesUnordered::new();

        for (position, cue) in cues.into_iter().enumerate() {
            let sem = self.semaphore.clone();
            let translator = self.translator.clone();
            let pb = progress_bar.clone();
            let timeout = self.timeout;

            futures.push(async move {
                let result = if cue.text.trim().is_empty() {
                    CueResult {
                        cue,
                        fell_back: false,
                        skipped: true,
                    }
                } else {
                    // The semaphore is never closed, so acquire only fails on shutdown.
                    let _permit = sem.acquire().await.ok();
                    translate_one(&*translator, cue, timeout).await
                };

                if let Some(ref pb) = pb {
                    pb.inc(1);
                }
                (position, result)
            });
        }

        let mut results: Vec<(usize, CueResult)> = Vec::with_capacity(total_cues);
        while let Some(result) = futures.next().await {
            results.push(result);
        }

        if let Some(pb) = progress_bar {
            pb.finish_with_message("Translation complete");
        }

        // Completion order is arbitrary; restore file order.
        results.sort_by_key(|(position, _)| *position);

        let mut stats = TranslationStats {
            total_cues,
            ..TranslationStats::default()
        };
        let translated: Vec<Cue> = results
            .into_iter()
            .map(|(_, r)| {
                if r.skipped {
                    stats.skipped_cues += 1;
                } else if r.fell_back {
                    stats.fallback_cues += 1;
                } else {
                    stats.translated_cues += 1;
                }
                r.cue
            })
            .collect();
        stats.total_time = start_time.elapsed();

        info!(
            "Translation complete: {}/{} cues translated, {} kept original text, in {:.2}s",
            stats.translated_cues,
            total_cues,
            stats.fallback_cues,
            stats.total_time.as_secs_f64()
        );

        (translated, stats)
    }
}

async fn translate_one(translator: &dyn Translator, cue: Cue, timeout: Duration) -> CueResult {
    let call_start = Instant::now();

    let outcome = match tokio::time::timeout(timeout, translator.translate(&cue.text)).await {
        Ok(result) => result,
        Err(_) => Err(TranslationError::Timeout(timeout)),
    };

    match outcome {
        Ok(text) => {
            debug!(
                "Cue {} translated in {}ms",
                cue.index,
                call_start.elapsed().as_millis()
            );
            CueResult {
                cue: cue.with_text(text),
                fell_back: false,
                skipped: false,
            }
        }
        Err(e) => {
            warn!("Cue {} kept original text: {}", cue.index, e);
            CueResult {
                cue,
                fell_back: true,
                skipped: false,
            }
        }
    }
}
