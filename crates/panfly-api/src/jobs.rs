// Asynchronous job submission and polling
//
// Log searches run server-side: the submit call returns a job id, then the
// status endpoint is polled until it reports FIN or the attempt budget runs
// out. Exhaustion is not an error; the latest payload is returned as-is.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::client::XmlApiClient;
use crate::envelope::{Envelope, wrap_fragment};
use crate::error::Error;
use crate::params::Params;

/// Status token reported once a job has completed.
pub const JOB_FINISHED: &str = "FIN";

/// Poll cadence and budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollConfig {
    /// 500 ms × 30 attempts: a 15 s ceiling.
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(500),
            max_attempts: 30,
        }
    }
}

/// Identifier returned by a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    pub job_id: String,
}

/// Terminal state of a poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Finished,
    TimedOut,
}

/// What a poll loop produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobResult {
    pub job_id: String,
    pub state: JobState,
    /// Payload of the final (or latest successful) status response.
    /// Empty if no poll ever succeeded.
    pub payload: String,
    /// Status calls actually issued.
    pub attempts: u32,
}

impl JobResult {
    pub fn is_finished(&self) -> bool {
        self.state == JobState::Finished
    }
}

/// Something that can answer "what is the status of job N".
///
/// Implemented by [`XmlApiClient`] for log jobs; tests drive the poll loop
/// with scripted sources.
pub trait JobStatusSource {
    fn job_status(
        &self,
        job_id: &str,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<Envelope, Error>> + Send;
}

impl JobStatusSource for XmlApiClient {
    async fn job_status(&self, job_id: &str, cancel: &CancellationToken) -> Result<Envelope, Error> {
        self.query(&Params::log_job(job_id), cancel).await
    }
}

impl XmlApiClient {
    /// Submit a job-producing request and extract its id.
    ///
    /// A success envelope without a job id is a hard error: there is no
    /// sensible empty result to fall back to.
    pub async fn submit_job(
        &self,
        params: &Params,
        cancel: &CancellationToken,
    ) -> Result<JobHandle, Error> {
        let env = self.query(params, cancel).await?;
        match extract_job_id(&env) {
            Some(job_id) => {
                debug!(%job_id, "job submitted");
                Ok(JobHandle { job_id })
            }
            None => Err(Error::JobSubmission {
                message: env.message.unwrap_or_else(|| "response carried no <job> element".into()),
            }),
        }
    }
}

/// Poll `source` until the job finishes, the budget runs out, or the caller
/// cancels.
///
/// Each attempt sleeps `interval` first, then issues one status call.
/// Failed status calls (transport or protocol) are logged and still count as
/// an attempt. Only cancellation aborts the loop with an error.
pub async fn poll_job<S>(
    source: &S,
    handle: &JobHandle,
    config: PollConfig,
    cancel: &CancellationToken,
) -> Result<JobResult, Error>
where
    S: JobStatusSource + Sync,
{
    let mut latest = String::new();

    for attempt in 1..=config.max_attempts {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(Error::Cancelled),
            () = tokio::time::sleep(config.interval) => {}
        }
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let env = match source.job_status(&handle.job_id, cancel).await {
            Ok(env) => env,
            Err(Error::Cancelled) => return Err(Error::Cancelled),
            Err(e) => {
                debug!(job_id = %handle.job_id, attempt, error = %e, "job poll failed, counting attempt");
                continue;
            }
        };

        let status = job_status_token(&env.payload);
        debug!(job_id = %handle.job_id, attempt, status = status.as_deref().unwrap_or("-"), "polled job");
        latest = env.payload;

        if status.as_deref() == Some(JOB_FINISHED) {
            return Ok(JobResult {
                job_id: handle.job_id.clone(),
                state: JobState::Finished,
                payload: latest,
                attempts: attempt,
            });
        }
    }

    warn!(
        job_id = %handle.job_id,
        attempts = config.max_attempts,
        "job did not finish within the polling budget, returning partial results"
    );
    Ok(JobResult {
        job_id: handle.job_id.clone(),
        state: JobState::TimedOut,
        payload: latest,
        attempts: config.max_attempts,
    })
}

/// `<job>` text (submission form) or `<job><id>` (status form), falling back
/// to the trailing number of a "...jobid N" message.
fn extract_job_id(env: &Envelope) -> Option<String> {
    let wrapped = env.wrapped_payload();
    let from_payload = roxmltree::Document::parse(&wrapped).ok().and_then(|doc| {
        let job = doc
            .root_element()
            .descendants()
            .find(|n| n.is_element() && n.tag_name().name() == "job")?;
        let id_node = job
            .children()
            .find(|n| n.is_element() && n.tag_name().name() == "id")
            .unwrap_or(job);
        let text: String = id_node
            .children()
            .filter(roxmltree::Node::is_text)
            .filter_map(|n| n.text())
            .collect();
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_owned())
    });

    from_payload.or_else(|| {
        let msg = env.message.as_deref()?;
        let idx = msg.to_ascii_lowercase().find("jobid")?;
        let digits: String = msg
            .get(idx + "jobid".len()..)?
            .trim_start()
            .chars()
            .take_while(char::is_ascii_digit)
            .collect();
        (!digits.is_empty()).then_some(digits)
    })
}

/// The `<job><status>` token of a status payload.
pub fn job_status_token(payload: &str) -> Option<String> {
    let wrapped = wrap_fragment(payload);
    let doc = roxmltree::Document::parse(&wrapped).ok()?;
    let status = doc
        .root_element()
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "job")
        .flat_map(|job| job.children())
        .find(|n| n.is_element() && n.tag_name().name() == "status")?;
    status.text().map(|s| s.trim().to_owned())
}
