mod config;

use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand, ValueEnum};
use client_core::{
    DecisionForm, FeedView, FilterPatch, HttpModerationClient, ItemState, ModerationSession,
    Reason, StatsState,
};
use shared::{
    domain::AdId,
    protocol::{SortDirection, SortField, StatsPeriod},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

type Session = ModerationSession<HttpModerationClient>;

#[derive(Parser, Debug)]
#[command(name = "moderator", about = "Review the listing moderation queue")]
struct Cli {
    /// API root, e.g. http://localhost:3001/api
    #[arg(long)]
    api_url: Option<String>,
    #[arg(long)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print one page of the queue.
    List(ListArgs),
    Show {
        id: i64,
    },
    Approve {
        id: i64,
    },
    Reject(ReasonedArgs),
    RequestChanges(ReasonedArgs),
    /// Step through consecutive ids starting at `id`.
    Walk {
        id: i64,
        #[arg(long, default_value_t = 5)]
        steps: u32,
        #[arg(long)]
        backwards: bool,
    },
    Stats {
        #[arg(long)]
        period: Option<String>,
    },
}

#[derive(Args, Debug)]
struct ListArgs {
    /// Filter as key=value: search, categoryId, status (comma separated), price (min,max).
    #[arg(long = "filter", value_name = "KEY=VALUE")]
    filters: Vec<String>,
    #[arg(long, value_enum, default_value_t = SortArg::CreatedAt)]
    sort: SortArg,
    #[arg(long, value_enum, default_value_t = OrderArg::Desc)]
    order: OrderArg,
    #[arg(long, default_value_t = 1)]
    page: u32,
}

#[derive(Args, Debug)]
struct ReasonedArgs {
    id: i64,
    /// Catalog reason label; repeatable.
    #[arg(long = "reason")]
    reasons: Vec<String>,
    /// Free text for the `other` reason.
    #[arg(long)]
    other: Option<String>,
    #[arg(long)]
    comment: String,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SortArg {
    CreatedAt,
    Price,
    Priority,
}

impl From<SortArg> for SortField {
    fn from(value: SortArg) -> Self {
        match value {
            SortArg::CreatedAt => SortField::CreatedAt,
            SortArg::Price => SortField::Price,
            SortArg::Priority => SortField::Priority,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OrderArg {
    Asc,
    Desc,
}

impl From<OrderArg> for SortDirection {
    fn from(value: OrderArg) -> Self {
        match value {
            OrderArg::Asc => SortDirection::Asc,
            OrderArg::Desc => SortDirection::Desc,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut settings = config::load_settings();
    if let Some(url) = &cli.api_url {
        settings.api_base_url = config::normalize_api_base_url(url);
    }
    if let Some(level) = &cli.log_level {
        settings.log_level = level.clone();
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let client = HttpModerationClient::with_timeout(
        &settings.api_base_url,
        Duration::from_secs(settings.request_timeout_secs),
    )
    .with_context(|| format!("failed to create API client for {}", settings.api_base_url))?;
    info!(api = client.base_url(), "moderator console started");
    let mut session = ModerationSession::with_stats_period(client, settings.stats_period);

    match cli.command {
        Command::List(args) => run_list(&mut session, args).await,
        Command::Show { id } => {
            session.open_item(AdId(id)).await;
            print_item(&session);
            Ok(())
        }
        Command::Approve { id } => {
            open_for_decision(&mut session, id).await?;
            session.approve().await?;
            report_decision(&session)
        }
        Command::Reject(args) => {
            let form = decision_form(&args)?;
            open_for_decision(&mut session, args.id).await?;
            session.reject(&form).await?;
            report_decision(&session)
        }
        Command::RequestChanges(args) => {
            let form = decision_form(&args)?;
            open_for_decision(&mut session, args.id).await?;
            session.request_changes(&form).await?;
            report_decision(&session)
        }
        Command::Walk {
            id,
            steps,
            backwards,
        } => run_walk(&mut session, id, steps, backwards).await,
        Command::Stats { period } => {
            let period = match period {
                Some(raw) => StatsPeriod::from_label(&raw)
                    .ok_or_else(|| anyhow!("unknown period '{raw}', expected today|week|month"))?,
                None => session.stats().period(),
            };
            session.select_stats_period(period).await;
            print_stats(&session)
        }
    }
}

async fn run_list(session: &mut Session, args: ListArgs) -> Result<()> {
    let pairs = args
        .filters
        .iter()
        .map(|raw| {
            raw.split_once('=')
                .ok_or_else(|| anyhow!("filter '{raw}' is not KEY=VALUE"))
        })
        .collect::<Result<Vec<_>>>()?;
    let patch = FilterPatch::from_pairs(pairs).context("invalid filter")?;

    let query = session.query_mut();
    query.edit_draft(patch);
    query.apply();
    query.set_sort(args.sort.into(), args.order.into());
    session.sync_listing().await;

    // The total is only known after the first page arrives.
    if args.page > 1 {
        session.query_mut().set_page(args.page)?;
        session.sync_listing().await;
    }

    match session.feed().view() {
        FeedView::Loading => println!("still loading"),
        FeedView::Empty => println!("no listings match"),
        FeedView::Failed(err) => bail!("failed to load listings: {err}"),
        FeedView::Items(items) => {
            for item in items {
                println!(
                    "#{:<5} {:<40} {:>10.2}  {:<10} {:<8} {}",
                    item.id,
                    item.title,
                    item.price,
                    item.status.label(),
                    format!("{:?}", item.priority).to_lowercase(),
                    item.category
                );
            }
        }
    }
    let query = session.query();
    println!(
        "page {}/{} ({} listings)",
        query.page(),
        query.total_pages().unwrap_or(0),
        query.total_items().unwrap_or(0)
    );
    Ok(())
}

async fn run_walk(session: &mut Session, id: i64, steps: u32, backwards: bool) -> Result<()> {
    session.open_item(AdId(id)).await;
    print_item(session);
    for _ in 0..steps {
        let moved = if backwards {
            session.prev_item().await
        } else {
            session.next_item().await
        };
        if moved.is_none() {
            println!("-- at the first listing");
            break;
        }
        print_item(session);
    }
    Ok(())
}

async fn open_for_decision(session: &mut Session, id: i64) -> Result<()> {
    session.open_item(AdId(id)).await;
    match session.item().map(|item| item.state()) {
        Some(ItemState::Loaded(_)) => Ok(()),
        Some(ItemState::NotFound) => bail!("listing #{id} not found"),
        Some(ItemState::Error(err)) => bail!("failed to load listing #{id}: {err}"),
        _ => bail!("listing #{id} did not load"),
    }
}

fn decision_form(args: &ReasonedArgs) -> Result<DecisionForm> {
    let mut form = DecisionForm::new().with_comment(args.comment.clone());
    for raw in &args.reasons {
        let reason =
            Reason::from_label(raw).ok_or_else(|| anyhow!("unknown reason '{raw}'"))?;
        form.toggle(reason, true);
    }
    if let Some(other) = &args.other {
        form.toggle(Reason::Other, true);
        form.set_other_text(other.clone());
    }
    Ok(form)
}

fn report_decision(session: &Session) -> Result<()> {
    if let Some(err) = session.item().and_then(|item| item.last_decision_error()) {
        bail!("decision not recorded: {err}");
    }
    print_item(session);
    Ok(())
}

fn print_item(session: &Session) {
    let Some(item) = session.item() else {
        return;
    };
    let id = item.current_id();
    match item.state() {
        ItemState::Loading => println!("#{id}: loading"),
        ItemState::NotFound => println!("#{id}: not found"),
        ItemState::Error(err) => println!("#{id}: error: {err}"),
        ItemState::Loaded(detail) => {
            println!("#{id}: {}", detail.title);
            println!("  {}", detail.description);
            for (key, value) in &detail.characteristics {
                println!("  {key}: {value}");
            }
            println!(
                "  seller: {} ({} ads, rating {}, {} years on site)",
                detail.seller.name,
                detail.seller.total_ads,
                detail.seller.rating,
                detail.seller.years_on_site(Utc::now())
            );
            for entry in &detail.moderation_history {
                println!(
                    "  {} {} by {}{}{}",
                    entry.timestamp.format("%Y-%m-%d %H:%M"),
                    entry.action.label(),
                    entry.moderator_name,
                    entry
                        .reason
                        .as_deref()
                        .map(|reason| format!(" [{reason}]"))
                        .unwrap_or_default(),
                    entry
                        .comment
                        .as_deref()
                        .map(|comment| format!(": {comment}"))
                        .unwrap_or_default(),
                );
            }
        }
    }
}

fn print_stats(session: &Session) -> Result<()> {
    let report = match session.stats().state() {
        StatsState::Ready(report) => report,
        StatsState::Failed(err) => bail!("failed to load stats: {err}"),
        StatsState::Idle | StatsState::Loading => bail!("stats did not load"),
    };
    println!("period: {}", report.period.as_str());
    println!(
        "reviewed {} | approved {:.1}% | rejected {:.1}% | changes {:.1}% | avg {} min",
        report.total_reviewed,
        report.approved_percentage,
        report.rejected_percentage,
        report.request_changes_percentage,
        report.average_review_minutes
    );
    if !report.has_data() {
        println!("no activity in this period");
        return Ok(());
    }
    for row in &report.activity {
        println!(
            "  {}  +{} -{} ~{} = {}",
            row.date, row.approved, row.rejected, row.request_changes, row.total
        );
    }
    for share in &report.decisions {
        println!("  {:<16} {:>5} ({:.1}%)", share.action.label(), share.count, share.percent());
    }
    for row in &report.top_categories {
        println!("  {:<24} {}", row.name, row.count);
    }
    Ok(())
}
