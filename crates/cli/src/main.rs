//! Command-line driver for the Cohort workflow core.
//!
//! Runs the engine end-to-end without a rendering layer: `cohort enroll`
//! scripts a bulk-enrollment session from JSON fixtures, and `cohort tour`
//! resolves and walks an onboarding tour for a page context. Side effects go
//! to the portal API when configured, or are dropped with `--offline`.

mod source;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::warn;

use cohort_api::PortalClient;
use cohort_engine::{
    EnrollmentStores, FlowHandles, ReviewWindow, SelectionSyncAdapter, Transition, WorkflowEngine, enrollment_steps, flow_key,
    resolve, review::DEFAULT_REVIEW_PAGE_SIZE, selection_cap_watch,
};
use cohort_types::{FlowContext, SourceRow};
use cohort_util::PortalPreferences;

use crate::source::FixturePageSource;

/// Selections past this size trigger the advisory warning.
const MAX_SELECTION_ADVISORY: usize = 500;

#[derive(Parser)]
#[command(name = "cohort", about = "Cohort admin portal workflow driver", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a scripted bulk-enrollment session from JSON fixtures.
    Enroll(EnrollArgs),
    /// Resolve and walk an onboarding tour for a page context.
    Tour(TourArgs),
}

#[derive(Args)]
struct EnrollArgs {
    /// JSON array of course rows, `{"id": ..., ...fields}` each.
    #[arg(long)]
    courses: PathBuf,
    /// JSON array of learner rows.
    #[arg(long)]
    learners: PathBuf,
    /// Page size used when paging the course fixture.
    #[arg(long, default_value_t = 25)]
    page_size: usize,
    /// Admin identity forwarded to the tracking sinks.
    #[arg(long, default_value = "local-admin")]
    subject: String,
    /// Drop side effects instead of posting them.
    #[arg(long)]
    offline: bool,
}

#[derive(Args)]
struct TourArgs {
    /// Page family the tour runs on.
    #[arg(long, value_enum)]
    page: PageArg,
    /// Subscription plans on the account (subscription-plans family).
    #[arg(long, default_value_t = 1)]
    subscription_count: usize,
    /// Whether any learner accepted an invite (subscription-detail family).
    #[arg(long)]
    has_accepted_members: bool,
    /// Whether the budget has spent transactions (learner-credit family).
    #[arg(long)]
    has_spent_transactions: bool,
    /// Force the credit-assignments checkpoint on, overriding preferences.
    #[arg(long)]
    assignments_enabled: bool,
    /// Admin identity forwarded to the tracking sinks.
    #[arg(long, default_value = "local-admin")]
    subject: String,
    /// Drop side effects instead of posting them.
    #[arg(long)]
    offline: bool,
}

#[derive(ValueEnum, Clone, Copy)]
enum PageArg {
    SubscriptionPlans,
    SubscriptionDetail,
    LearnerCredit,
    Unknown,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Command::Enroll(args) => run_enroll(args).await,
        Command::Tour(args) => run_tour(args).await,
    }
}

fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

async fn run_enroll(args: EnrollArgs) -> Result<()> {
    let handles = flow_handles(&args.subject, args.offline);
    let preferences = load_preferences();
    let stores = EnrollmentStores::new();
    selection_cap_watch(&stores.courses, MAX_SELECTION_ADVISORY);
    selection_cap_watch(&stores.learners, MAX_SELECTION_ADVISORY);

    // Page through the course catalog the way the table UI would, selecting
    // everything shown on each page.
    let course_rows = load_rows(&args.courses)?;
    let mut catalog = FixturePageSource::new(course_rows, args.page_size);
    let mut courses = SelectionSyncAdapter::new(Arc::clone(&stores.courses));
    for page in 0..catalog.page_count() {
        courses.set_local_page(page);
        courses.reconcile_page(&mut catalog);
        courses.select_all_on_page(catalog.page_rows());
        println!(
            "catalog page {}/{}: {:?}, {} selected so far",
            page + 1,
            catalog.page_count(),
            courses.checkbox_state(catalog.page_rows()),
            stores.courses.state().len(),
        );
    }

    // Learners arrive pre-filtered from the search side; take them all.
    let learner_rows = load_rows(&args.learners)?;
    let learners = SelectionSyncAdapter::new(Arc::clone(&stores.learners));
    learners.select_all_matching(&learner_rows);
    println!("selected {} learners", stores.learners.state().len());

    let window = ReviewWindow::new(preferences.review_page_size().unwrap_or(DEFAULT_REVIEW_PAGE_SIZE));
    let mut engine = WorkflowEngine::new(enrollment_steps(&stores, &handles)).context("enrollment flow is empty")?;
    loop {
        let step = engine.active_step();
        println!("step {}/{}: {}", engine.current_index() + 1, engine.len(), step.title());
        if step.key() == "review" {
            print_review(&window, &stores);
        }
        match engine.advance() {
            Transition::Advanced => {}
            Transition::Completed => {
                println!(
                    "enrollment submitted: {} courses x {} learners",
                    stores.courses.state().len(),
                    stores.learners.state().len(),
                );
                break;
            }
            Transition::Refused => {
                println!("cannot continue past '{}': the required selection is empty", engine.active_step().key());
                break;
            }
            _ => break,
        }
    }

    flush_side_effects(args.offline).await;
    Ok(())
}

async fn run_tour(args: TourArgs) -> Result<()> {
    let handles = flow_handles(&args.subject, args.offline);
    let preferences = load_preferences();
    let assignments_enabled = args.assignments_enabled || preferences.assignments_enabled();

    let context = match args.page {
        PageArg::SubscriptionPlans => FlowContext::SubscriptionPlans {
            subscription_count: args.subscription_count,
        },
        PageArg::SubscriptionDetail => FlowContext::SubscriptionDetail {
            has_accepted_members: args.has_accepted_members,
        },
        PageArg::LearnerCredit => FlowContext::LearnerCredit {
            has_spent_transactions: args.has_spent_transactions,
            assignments_enabled,
        },
        PageArg::Unknown => FlowContext::Unknown,
    };

    let steps = resolve(&context, &handles);
    println!("flow '{}' resolved to {} checkpoints", flow_key(&context), steps.len());
    let mut engine = WorkflowEngine::new(steps).context("resolver returned an empty flow")?;

    loop {
        let step = engine.active_step();
        println!("checkpoint {}/{}: {} ({})", engine.current_index() + 1, engine.len(), step.key(), step.title());
        match engine.advance() {
            Transition::Advanced => {}
            Transition::Completed => {
                println!("tour completed");
                break;
            }
            _ => break,
        }
    }

    flush_side_effects(args.offline).await;
    Ok(())
}

fn flow_handles(subject: &str, offline: bool) -> FlowHandles {
    if offline {
        return FlowHandles::noop(subject);
    }
    match PortalClient::new_from_env() {
        Ok(client) => {
            let client = Arc::new(client);
            FlowHandles::new(subject, client.clone(), client)
        }
        Err(error) => {
            warn!(%error, "portal API unavailable; dropping side effects");
            FlowHandles::noop(subject)
        }
    }
}

fn load_preferences() -> PortalPreferences {
    PortalPreferences::new().unwrap_or_else(|error| {
        warn!(%error, "preferences unavailable; using defaults");
        PortalPreferences::ephemeral()
    })
}

fn load_rows(path: &Path) -> Result<Vec<SourceRow>> {
    let data = std::fs::read_to_string(path).with_context(|| format!("read fixture {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("parse fixture {}", path.display()))
}

fn print_review(window: &ReviewWindow, stores: &EnrollmentStores) {
    let selection = stores.courses.state();
    println!("reviewing {} selected courses:", selection.len());
    for row in window.visible(&selection, false) {
        println!("  - {}", row.id);
    }
    if window.is_expandable(&selection) {
        println!("  ... and {} more (show all to expand)", window.hidden_count(&selection, false));
    }
}

/// Gives spawned fire-and-forget posts a moment to drain before exit. The
/// engine never waits on them; only this process boundary does.
async fn flush_side_effects(offline: bool) {
    if !offline {
        tokio::time::sleep(Duration::from_millis(250)).await;
    }
}
