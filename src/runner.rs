use crate::client::{
    GenerateRequest, HttpReply, SubmitRequest, WebhookClient, WebhookTransport,
};
use crate::config::{AppConfig, FALLBACK_SUBMIT_ENDPOINT};
use crate::error::{SubmitError, SubmitResult};
use crate::query::{select_query, Parity};
use std::fmt;
use std::io::Write;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Progress of a single run. Strictly forward; any failure ends in `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Init,
    Generated,
    QuerySelected,
    Submitted,
    Failed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "INIT",
            Self::Generated => "GENERATED",
            Self::QuerySelected => "QUERY_SELECTED",
            Self::Submitted => "SUBMITTED",
            Self::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

/// Where the bracketed progress lines go
pub struct Console {
    out: Box<dyn Write + Send>,
    err: Box<dyn Write + Send>,
}

impl Console {
    #[must_use]
    pub fn new(out: Box<dyn Write + Send>, err: Box<dyn Write + Send>) -> Self {
        Self { out, err }
    }

    #[must_use]
    pub fn stdio() -> Self {
        Self::new(Box::new(std::io::stdout()), Box::new(std::io::stderr()))
    }
}

/// Summary of a finished run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub state: RunState,
    pub parity: Parity,
    pub final_query: &'static str,
    pub submit_url: String,
    /// `None` on a dry run
    pub reply: Option<HttpReply>,
}

/// Drives generate -> select query -> submit for one configuration
pub struct Runner<T> {
    config: AppConfig,
    client: WebhookClient<T>,
    console: Console,
    dry_run: bool,
    state: RunState,
}

impl<T: WebhookTransport> Runner<T> {
    pub fn new(config: AppConfig, transport: T) -> Self {
        Self {
            config,
            client: WebhookClient::new(transport),
            console: Console::stdio(),
            dry_run: false,
            state: RunState::Init,
        }
    }

    #[must_use]
    pub fn with_console(mut self, console: Console) -> Self {
        self.console = console;
        self
    }

    /// Stop after query selection without calling the submit webhook
    #[must_use]
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    #[must_use]
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Execute the run once
    ///
    /// Every failure is reported as an `[ERROR]` line before it is returned.
    ///
    /// # Errors
    ///
    /// Returns the first error hit by any step; nothing is retried
    pub async fn run(&mut self) -> SubmitResult<RunOutcome> {
        let run_id = Uuid::new_v4();
        let span = info_span!("run", %run_id);

        match self.execute().instrument(span).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                // The [ERROR] line below is the user-facing report
                debug!(
                    "Run {} failed in state {} (status: {:?}): {e}",
                    run_id,
                    self.state,
                    e.status()
                );
                self.transition(RunState::Failed);
                // Best effort: the error is still returned if stderr is gone
                let _ = writeln!(self.console.err, "[ERROR] {e}");
                let _ = self.console.err.flush();
                Err(e)
            }
        }
    }

    async fn execute(&mut self) -> SubmitResult<RunOutcome> {
        writeln!(
            self.console.out,
            "[INIT] name={}, regNo={}, email={}",
            self.config.name, self.config.reg_no, self.config.email
        )?;

        // Step 1: webhook + token
        let generate_url = self.config.generate_url()?.to_string();
        info!("Requesting webhook from {}", generate_url);
        let generated = self
            .client
            .generate(&generate_url, &GenerateRequest::from(&self.config))
            .await?;
        self.transition(RunState::Generated);

        writeln!(
            self.console.out,
            "[OK] webhook={}, accessToken=*** (hidden)",
            generated.webhook.as_deref().unwrap_or_default()
        )?;

        // Step 2: pick the query from the registration number
        let parity = Parity::from_reg_no(&self.config.reg_no);
        let final_query = select_query(parity);
        info!("Registration number {} selects the {:?} query", self.config.reg_no, parity);
        writeln!(self.console.out, "[SQL] Selected finalQuery:\n{final_query}")?;
        self.transition(RunState::QuerySelected);

        let submit_url = match generated.webhook() {
            Some(url) => url.to_string(),
            None => {
                warn!("Generate response has no webhook, using {FALLBACK_SUBMIT_ENDPOINT}");
                self.config
                    .fallback_submit_url()
                    .ok_or_else(|| {
                        SubmitError::ConfigurationMissing(FALLBACK_SUBMIT_ENDPOINT.to_string())
                    })?
                    .to_string()
            }
        };

        if self.dry_run {
            info!("Dry run, skipping submission to {}", submit_url);
            writeln!(self.console.out, "[DRY-RUN] Would submit to {submit_url}")?;
            self.console.out.flush()?;
            return Ok(RunOutcome {
                state: self.state,
                parity,
                final_query,
                submit_url,
                reply: None,
            });
        }

        // Step 3: submit with the token as the raw Authorization value
        let request = SubmitRequest {
            final_query: final_query.to_string(),
        };
        let reply = self
            .client
            .submit(&submit_url, generated.access_token(), &request)
            .await?;
        self.transition(RunState::Submitted);

        writeln!(self.console.out, "[DONE] Submission status={}", reply.status)?;
        writeln!(self.console.out, "[RESP] Body={}", reply.body)?;
        self.console.out.flush()?;

        Ok(RunOutcome {
            state: self.state,
            parity,
            final_query,
            submit_url,
            reply: Some(reply),
        })
    }

    fn transition(&mut self, next: RunState) {
        debug!("Run state {} -> {}", self.state, next);
        self.state = next;
    }
}
