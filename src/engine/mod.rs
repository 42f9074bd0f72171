//! The runner: configuration, variable registration, and the run pipeline.

pub mod http;
pub(crate) mod matrix;
pub(crate) mod worker;

use std::sync::Arc;

use reqwest::Client;
use tokio::sync::mpsc;
use tracing::{debug, info};
use url::Url;

use crate::domain::{TransportPolicy, Variable};
use crate::error::Error;
use crate::ident::{RandomIds, RunIdSource};
use crate::report::Report;

use matrix::Matrix;
use worker::{request_worker, RunEvent};

const DEFAULT_WORKERS: usize = 10;

/// Runs every combination of the declared variables against one host.
///
/// ```no_run
/// use gridman::{Case, CaseResult, Runner, Variable};
///
/// # async fn demo() -> Result<(), gridman::Error> {
/// let mut runner = Runner::new("https://api.example.com")?.with_workers(4);
/// runner.add(
///     Variable::new("auth")
///         .case(Case::new("valid-token").setup(|_ctx, req| {
///             req.header("authorization", "Bearer test-token");
///         }))
///         .case(Case::new("missing-token").want_fail().validate(|_ctx, resp| {
///             if resp.status == 401 {
///                 CaseResult::fail("rejected without a token")
///             } else {
///                 CaseResult::pass()
///             }
///         })),
/// );
/// let report = runner.run().await?;
/// println!("{}", report.summary());
/// # Ok(())
/// # }
/// ```
pub struct Runner {
    base_url: Url,
    client: Client,
    variables: Vec<Variable>,
    workers: usize,
    verbose: bool,
    transport_policy: TransportPolicy,
    ids: Arc<dyn RunIdSource>,
}

impl Runner {
    /// Create a runner targeting `host`, which every request starts from.
    pub fn new(host: &str) -> Result<Self, Error> {
        let base_url = Url::parse(host).map_err(|source| Error::InvalidHost {
            url: host.to_string(),
            source,
        })?;
        let client = Client::builder().build().map_err(Error::Client)?;
        Ok(Self {
            base_url,
            client,
            variables: Vec::new(),
            workers: DEFAULT_WORKERS,
            verbose: false,
            transport_policy: TransportPolicy::default(),
            ids: Arc::new(RandomIds),
        })
    }

    /// Cap the number of requests in flight. Clamped to at least 1.
    /// Defaults to 10.
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Promote per-run lifecycle logging from debug to info level.
    #[must_use]
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Choose how transport-level failures are counted. Defaults to
    /// [`TransportPolicy::Drop`].
    #[must_use]
    pub fn with_transport_policy(mut self, policy: TransportPolicy) -> Self {
        self.transport_policy = policy;
        self
    }

    /// Replace the identifier source behind per-run user agents.
    #[must_use]
    pub fn with_id_source(mut self, ids: Arc<dyn RunIdSource>) -> Self {
        self.ids = ids;
        self
    }

    /// Register a variable as the next dimension of the combination space.
    ///
    /// Within each combination, setups and validators run in the order the
    /// variables were added. Names are not checked for duplicates.
    pub fn add(&mut self, variable: Variable) {
        self.variables.push(variable);
    }

    /// Execute every combination and aggregate the outcome.
    ///
    /// Resolves once every combination has been run or skipped. The runner
    /// is reusable; each call enumerates the space afresh.
    pub async fn run(&self) -> Result<Report, Error> {
        let matrix = Arc::new(Matrix::new(&self.variables)?);
        if self.verbose {
            info!(
                "running {} combinations on {} workers",
                matrix.total(),
                self.workers
            );
        } else {
            debug!(
                "running {} combinations on {} workers",
                matrix.total(),
                self.workers
            );
        }

        let (events, mut drain) = mpsc::unbounded_channel();
        let mut handles = Vec::with_capacity(self.workers);
        for _ in 0..self.workers {
            let client = self.client.clone();
            let base_url = self.base_url.clone();
            let ids = Arc::clone(&self.ids);
            let matrix = Arc::clone(&matrix);
            let events = events.clone();

            handles.push(tokio::spawn(request_worker(
                client,
                base_url,
                ids,
                self.verbose,
                matrix,
                events,
            )));
        }
        drop(events);

        let mut report = Report::default();
        while let Some(event) = drain.recv().await {
            match event {
                RunEvent::Completed(run) => report.absorb_run(run),
                RunEvent::Transport(failure) => {
                    report.absorb_transport(failure, self.transport_policy);
                }
            }
        }

        // The drain closed, so every worker is done; joining only
        // surfaces panics from caller closures.
        for handle in handles {
            handle.await.map_err(Error::Worker)?;
        }

        Ok(report)
    }
}
