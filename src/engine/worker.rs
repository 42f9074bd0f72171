use std::sync::Arc;

use reqwest::Client;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};
use url::Url;

use crate::context::RunContext;
use crate::domain::{Combination, Run, TransportFailure};
use crate::engine::http::{dispatch, Outbound};
use crate::engine::matrix::Matrix;
use crate::ident::RunIdSource;

/// One event per processed combination.
pub(crate) enum RunEvent {
    Completed(Run),
    Transport(TransportFailure),
}

/// Worker loop: claim combinations until the matrix runs dry.
///
/// Combinations containing a disabled case are skipped without producing an
/// event.
pub(crate) async fn request_worker(
    client: Client,
    base_url: Url,
    ids: Arc<dyn RunIdSource>,
    verbose: bool,
    matrix: Arc<Matrix>,
    events: UnboundedSender<RunEvent>,
) {
    while let Some(combination) = matrix.next() {
        if combination.iter().any(|case| case.disabled) {
            continue;
        }
        let event = run_combination(&client, &base_url, ids.as_ref(), verbose, &combination).await;
        if events.send(event).is_err() {
            return;
        }
    }
}

/// Exercise one combination: setups in declaration order, one request, then
/// validators in the same order.
async fn run_combination(
    client: &Client,
    base_url: &Url,
    ids: &dyn RunIdSource,
    verbose: bool,
    combination: &Combination,
) -> RunEvent {
    let mut ctx = RunContext::new();
    let mut outbound = Outbound::new(base_url.clone(), client.clone());
    outbound.header("user-agent", &format!("gridman-{}", ids.next_id()));

    let mut run = Run::default();
    for case in combination {
        (case.setup)(&mut ctx, &mut outbound);
        run.cases.push(case.name.clone());
        if case.want_fail {
            run.want_fail = true;
        }
    }

    let participants = run.cases.join(" ");
    if verbose {
        info!("starting run: {participants}");
    } else {
        debug!("starting run: {participants}");
    }

    let inbound = match dispatch(outbound).await {
        Ok(inbound) => inbound,
        Err(error) => {
            warn!("run `{participants}` failed on transport: {error}");
            return RunEvent::Transport(TransportFailure {
                cases: run.cases,
                error,
            });
        }
    };
    run.status = inbound.status;
    run.body = inbound.text();
    run.duration = inbound.duration;

    for case in combination {
        let mut result = (case.validate)(&ctx, &inbound);
        result.name = case.name.clone();
        result.wanted_fail = case.want_fail;
        let failed = result.failed;
        run.results.push(result);

        // Expected failure: stop validating, the run still passes
        if failed && case.want_fail {
            break;
        }
        if failed {
            run.failed = true;
        }
    }

    RunEvent::Completed(run)
}
