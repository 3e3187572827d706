//! One complete run: read channels, harvest, export.

use crate::config::ConfigError;
use crate::export::{Export, ResultSink};
use crate::filter::RecordFilter;
use crate::harvest::{Harvester, RunResult};
use crate::platform::PlatformClient;
use crate::progress::{Progress, Reporter};
use crate::source::ChannelSource;
use eyre::Context;
use jiff::civil::Date;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// What a finished run hands back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub result: RunResult,
    pub export: Export,
}

/// Harvests `channel_ids` and hands the records to `sink` once, at the very end.
///
/// Always finishes with either a [`Progress::Saved`] or a [`Progress::NoData`] event,
/// unless writing the export itself fails.
pub async fn collect(
    platform: &dyn PlatformClient,
    channel_ids: &[String],
    filter: RecordFilter,
    sink: &dyn ResultSink,
    run_date: Date,
    reporter: &Reporter,
) -> eyre::Result<RunOutcome> {
    let result = Harvester::new(platform, filter, reporter)
        .run(channel_ids)
        .await;

    let export = match sink.emit(&result.records, run_date) {
        Ok(export) => export,
        Err(e) => {
            reporter.report(Progress::ExportFailed {
                error: format!("{e:#}"),
            });
            return Err(e).context("export results");
        }
    };
    match &export {
        Export::Written(path) => reporter.report(Progress::Saved {
            path: path.clone(),
            records: result.records.len(),
        }),
        Export::NoData => reporter.report(Progress::NoData),
    }

    Ok(RunOutcome { result, export })
}

/// A run executing in the background.
#[derive(Debug)]
pub struct RunHandle {
    /// Progress events, in order. Closes when the run is over.
    pub progress: mpsc::UnboundedReceiver<Progress>,
    /// Resolves exactly once, after the run has fully finished.
    pub completion: JoinHandle<eyre::Result<RunOutcome>>,
}

impl RunHandle {
    /// Feeds every progress event to `on_progress`, then waits for the outcome.
    pub async fn finish(mut self, mut on_progress: impl FnMut(Progress)) -> eyre::Result<RunOutcome> {
        while let Some(event) = self.progress.recv().await {
            on_progress(event);
        }
        self.completion.await.context("join collector task")?
    }
}

/// Everything a run needs except the channel list.
pub struct Collector<P, S> {
    platform: P,
    sink: S,
    filter: RecordFilter,
    run_date: Date,
}

impl<P, S> Collector<P, S>
where
    P: PlatformClient + 'static,
    S: ResultSink + 'static,
{
    /// Creates a collector whose export is dated today (local time).
    pub fn new(platform: P, sink: S, filter: RecordFilter) -> Self {
        Self {
            platform,
            sink,
            filter,
            run_date: jiff::Zoned::now().date(),
        }
    }

    pub fn with_run_date(mut self, run_date: Date) -> Self {
        self.run_date = run_date;
        self
    }

    /// Runs to completion on the current task.
    pub async fn run(
        &self,
        source: &dyn ChannelSource,
        reporter: &Reporter,
    ) -> eyre::Result<RunOutcome> {
        let channel_ids = source.channel_ids()?;
        collect(
            &self.platform,
            &channel_ids,
            self.filter,
            &self.sink,
            self.run_date,
            reporter,
        )
        .await
    }

    /// Reads the channel list, then runs on a background task.
    ///
    /// The channel list is read up front so that a bad source is reported before any
    /// request is made.
    pub fn spawn(self, source: &dyn ChannelSource) -> Result<RunHandle, ConfigError> {
        let channel_ids = source.channel_ids()?;
        let (reporter, progress) = Reporter::channel();

        let completion = tokio::spawn(async move {
            collect(
                &self.platform,
                &channel_ids,
                self.filter,
                &self.sink,
                self.run_date,
                &reporter,
            )
            .await
        });

        Ok(RunHandle {
            progress,
            completion,
        })
    }
}
