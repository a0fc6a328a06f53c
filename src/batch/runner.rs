use std::fmt;
use std::path::PathBuf;

use crate::batch::manifest::{BatchPlan, GroupJob};
use crate::config::MorphConfig;
use crate::encode::select::{EncoderKind, OpenedSink, SinkFactory};
use crate::foundation::error::{MorphError, MorphResult};
use crate::prep::decode::load_group;
use crate::sequence::sequencer::{LoopSequencer, LoopStats};

/// How one group ended.
#[derive(Debug)]
pub enum GroupOutcome {
    /// The loop was fully written.
    Written {
        /// Encoder that produced the file.
        encoder: EncoderKind,
        /// Final output path.
        out_path: PathBuf,
        /// Frame and transition counters.
        stats: LoopStats,
    },
    /// Nothing was rendered (no listed images, or fewer than two usable ones).
    Skipped(MorphError),
    /// Rendering or encoding failed; any partial output was removed.
    Failed(MorphError),
}

/// Per-group line of the end-of-run summary.
#[derive(Debug)]
pub struct GroupReport {
    /// Group name.
    pub name: String,
    /// Source images that could not be used.
    pub skipped_images: Vec<(PathBuf, MorphError)>,
    /// Final state of the group.
    pub outcome: GroupOutcome,
}

impl GroupReport {
    /// Whether the group's output was written.
    pub fn is_written(&self) -> bool {
        matches!(self.outcome, GroupOutcome::Written { .. })
    }

    /// Whether the group failed while rendering or encoding.
    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, GroupOutcome::Failed(_))
    }
}

impl fmt::Display for GroupReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            GroupOutcome::Written {
                encoder,
                out_path,
                stats,
            } => write!(
                f,
                "{}: ok, {} frames via {encoder} -> {}",
                self.name,
                stats.frames_written,
                out_path.display()
            )?,
            GroupOutcome::Skipped(err) => write!(f, "{}: skipped ({err})", self.name)?,
            GroupOutcome::Failed(err) => write!(f, "{}: FAILED ({err})", self.name)?,
        }
        if let GroupOutcome::Written { stats, .. } = &self.outcome
            && stats.degraded_transitions > 0
        {
            write!(
                f,
                ", {} of {} transitions cross-dissolved",
                stats.degraded_transitions, stats.transitions
            )?;
        }
        if !self.skipped_images.is_empty() {
            write!(f, ", {} image(s) skipped", self.skipped_images.len())?;
        }
        Ok(())
    }
}

/// Outcome of a whole batch.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// One entry per requested group: groups with nothing listed first, then the planned
    /// jobs, each in request order.
    pub groups: Vec<GroupReport>,
}

impl BatchReport {
    /// Number of groups written successfully.
    pub fn written(&self) -> usize {
        self.groups.iter().filter(|g| g.is_written()).count()
    }

    /// Number of groups that failed to render or encode.
    pub fn failed(&self) -> usize {
        self.groups.iter().filter(|g| g.is_failed()).count()
    }

    /// Whether any group failed.
    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    /// Look up a group's report by name.
    pub fn group(&self, name: &str) -> Option<&GroupReport> {
        self.groups.iter().find(|g| g.name == name)
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for g in &self.groups {
            writeln!(f, "{g}")?;
        }
        write!(
            f,
            "{} of {} group(s) written, {} failed",
            self.written(),
            self.groups.len(),
            self.failed()
        )
    }
}

/// Runs groups one after another with a shared sequencer.
#[derive(Debug)]
pub struct BatchRunner {
    sequencer: LoopSequencer,
}

impl BatchRunner {
    /// Runner using the default estimator for `cfg`.
    pub fn new(cfg: &MorphConfig) -> Self {
        Self::with_sequencer(LoopSequencer::new(cfg))
    }

    /// Runner around an explicit sequencer.
    pub fn with_sequencer(sequencer: LoopSequencer) -> Self {
        Self { sequencer }
    }

    /// Run every job in `plan`; absent groups are reported as skipped.
    pub fn run(&self, plan: &BatchPlan, sinks: &dyn SinkFactory) -> BatchReport {
        let mut report = BatchReport::default();
        for name in &plan.missing {
            tracing::warn!(group = %name, "no files listed; skipping group");
            report.groups.push(GroupReport {
                name: name.clone(),
                skipped_images: Vec::new(),
                outcome: GroupOutcome::Skipped(MorphError::insufficient_images(name.clone(), 0)),
            });
        }
        for job in &plan.jobs {
            report.groups.push(self.run_group(job, sinks));
        }
        report
    }

    /// Prepare, sequence and encode one group.
    #[tracing::instrument(level = "info", skip_all, fields(group = %job.name))]
    pub fn run_group(&self, job: &GroupJob, sinks: &dyn SinkFactory) -> GroupReport {
        let size = self.sequencer.config().width;
        let prepared = load_group(&job.images, size);
        let usable = prepared.images.len();

        let outcome = if usable < 2 {
            let err = MorphError::insufficient_images(job.name.clone(), usable);
            tracing::warn!(error = %err, "skipping group");
            GroupOutcome::Skipped(err)
        } else {
            match self.encode(job, &prepared.images, sinks) {
                Ok((encoder, out_path, stats)) => {
                    tracing::info!(
                        out = %out_path.display(),
                        frames = stats.frames_written,
                        degraded = stats.degraded_transitions,
                        "group written"
                    );
                    GroupOutcome::Written {
                        encoder,
                        out_path,
                        stats,
                    }
                }
                Err(err) => {
                    tracing::warn!(error = %err, "group failed");
                    GroupOutcome::Failed(err)
                }
            }
        };

        GroupReport {
            name: job.name.clone(),
            skipped_images: prepared.skipped,
            outcome,
        }
    }

    fn encode(
        &self,
        job: &GroupJob,
        images: &[image::RgbImage],
        sinks: &dyn SinkFactory,
    ) -> MorphResult<(EncoderKind, PathBuf, LoopStats)> {
        let OpenedSink {
            mut sink,
            kind,
            out_path,
            replaces_existing,
        } = sinks.open(&job.out_path)?;
        // A file the sink is not allowed to replace was never touched by this run.
        let protected = !replaces_existing && out_path.exists();
        match self.sequencer.render(images, sink.as_mut()) {
            Ok(stats) => Ok((kind, out_path, stats)),
            Err(err) => {
                // Dropping the sink stops any encoder still holding the file.
                drop(sink);
                if !protected
                    && out_path.is_file()
                    && let Err(rm) = std::fs::remove_file(&out_path)
                {
                    tracing::warn!(out = %out_path.display(), error = %rm, "could not remove partial output");
                }
                Err(err)
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/batch/runner.rs"]
mod tests;
