use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use finapp_onboarding::api::HttpBackend;
use finapp_onboarding::auth::{AuthPhase, AuthSignal};
use finapp_onboarding::config::ClientConfig;
use finapp_onboarding::gate::AccountingStartGate;
use finapp_onboarding::onboarding::{
    ChannelNavigator, NavigationSynchronizer, OnboardingStore, Presentation,
};
use finapp_onboarding::session::Session;

const HELP: &str = "\
Commands:
  status              show gate, onboarding status and current route
  date <YYYY-MM-DD>   set the accounting start date (one time only)
  start | postpone | skip
  next | back         move through the wizard (next completes on the last step)
  go <route>          navigate somewhere else
  refresh             reload both resources
  login | logout      toggle the authenticated session
  quit";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = ClientConfig::from_env()?;

    eprintln!("FinApp onboarding v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Backend: {}", config.api_base);
    eprintln!("   Device:  {}", config.device_type);
    eprintln!("   Type `help` for commands.\n");

    let backend = Arc::new(HttpBackend::new(&config)?);
    let auth = AuthSignal::new(AuthPhase::Authenticated);

    let gate = AccountingStartGate::new(backend.clone(), auth.subscribe());
    let store = OnboardingStore::new(backend, auth.subscribe(), config.device_type);

    let navigator = ChannelNavigator::new("/dashboard");
    let synchronizer = NavigationSynchronizer::new(navigator.clone());
    let sync_task = synchronizer.spawn(store.subscribe(), navigator.subscribe());

    // Print every route change, whoever caused it
    let route_task = tokio::spawn({
        let mut routes = navigator.subscribe();
        async move {
            while routes.changed().await.is_ok() {
                let route = routes.borrow_and_update().clone();
                eprintln!("   -> {route}");
            }
        }
    });

    let session = Session::start(auth.subscribe(), gate, store);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    eprint!("> ");
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let (command, arg) = match line.split_once(' ') {
            Some((c, a)) => (c, a.trim()),
            None => (line, ""),
        };

        let result = match command {
            "" => Ok(()),
            "help" => {
                eprintln!("{HELP}");
                Ok(())
            }
            "status" => {
                print_status(&session, &navigator);
                Ok(())
            }
            "date" => session.gate().set_date(arg).await.map(|date| {
                eprintln!("   Accounting starts on {date}");
            }),
            "start" => session.store().start_onboarding().await,
            "postpone" => session.store().postpone_onboarding().await,
            "skip" => session.store().skip_onboarding().await,
            "next" => session.store().advance_or_complete().await,
            "back" => {
                session.store().previous_step();
                Ok(())
            }
            "go" => {
                navigator.navigate(arg);
                Ok(())
            }
            "refresh" => {
                let gate_result = session.gate().refresh().await;
                let store_result = session.store().refresh().await;
                gate_result.and(store_result)
            }
            "login" => {
                auth.set(AuthPhase::Authenticated);
                Ok(())
            }
            "logout" => {
                auth.set(AuthPhase::Unauthenticated);
                Ok(())
            }
            "quit" | "exit" => break,
            other => {
                eprintln!("   Unknown command `{other}`; try `help`");
                Ok(())
            }
        };

        if let Err(e) = result {
            eprintln!("   Error: {e}");
        }
        // Let the synchronizer and session task catch up before prompting
        tokio::task::yield_now().await;
        eprint!("> ");
    }

    session.shutdown();
    sync_task.abort();
    route_task.abort();
    Ok(())
}

fn print_status(session: &Session, navigator: &ChannelNavigator) {
    let gate = session.gate().snapshot();
    let onboarding = session.store().snapshot();

    match gate.date {
        Some(date) => eprintln!("   Accounting start date: {date}"),
        None if session.gate().is_open() => {
            eprintln!("   Accounting start date: not set (use `date YYYY-MM-DD`)")
        }
        None => eprintln!("   Accounting start date: unknown"),
    }
    match onboarding.status {
        Some(status) => eprintln!("   Onboarding: {status}"),
        None => eprintln!("   Onboarding: not loaded"),
    }
    if let (Some(step), Some(progress)) = (onboarding.active_step(), onboarding.progress()) {
        eprintln!(
            "   Step {} of {}: {} ({})",
            progress.position, progress.total, step.key, step.route
        );
    }
    match session.presentation() {
        Presentation::Invitation => {
            eprintln!("   Take the tour? `start`, `postpone`, or `skip`")
        }
        Presentation::Wizard => eprintln!("   Wizard open: `next`, `back`, or `postpone`"),
        Presentation::Nothing => {}
    }
    for error in [gate.error, onboarding.error].into_iter().flatten() {
        eprintln!("   Last error: {error}");
    }
    eprintln!("   Route: {}", navigator.current());
}
