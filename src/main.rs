use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use badgeline::client::ApiClient;
use badgeline::config::{Config, Watchlist};
use badgeline::pipeline;
use badgeline::report::Reporter;
use badgeline::social::{self, FriendFinding, GroupAudit};

/// Fetch a user's badge history and chart cumulative badges over time.
#[derive(Parser, Debug)]
#[command(name = "badgeline", version, about)]
struct Cli {
    /// Target user identifier.
    user_id: u64,

    /// Optional display name used in logs and the chart title.
    username: Option<String>,

    /// Also audit group memberships and friends against the watchlist.
    #[arg(long)]
    extended_checks: bool,

    /// Directory the summary and chart are written to.
    #[arg(long, default_value = "graphs")]
    output_dir: PathBuf,

    /// JSON file with highlight badge ids and the social allow/deny lists.
    #[arg(long)]
    watchlist: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = Config::default();
    config.output_dir = cli.output_dir.clone();
    if let Some(path) = &cli.watchlist {
        config.watchlist = match Watchlist::from_file(path) {
            Ok(watchlist) => watchlist,
            Err(err) => {
                error!("failed to load watchlist {}: {err}", path.display());
                return ExitCode::FAILURE;
            }
        };
    }

    let client = match ApiClient::new(config.clone()) {
        Ok(client) => client,
        Err(err) => {
            error!("failed to construct HTTP client: {err}");
            return ExitCode::FAILURE;
        }
    };
    let reporter = Reporter::new(&config.output_dir);

    let display_name = match &cli.username {
        Some(name) => format!("{name} ({})", cli.user_id),
        None => cli.user_id.to_string(),
    };

    if cli.extended_checks {
        run_extended_checks(&client, cli.user_id, &display_name);
    }

    // A failed run is reported but does not exit non-zero: when an external
    // driver feeds multiple users through this binary, one bad user must not
    // look like a tool failure.
    match pipeline::process_user(&client, &reporter, cli.user_id, &display_name) {
        Ok(artifacts) => {
            println!(
                "{} badges ({} highlighted) for {display_name}; summary at {}",
                artifacts.total_badges,
                artifacts.highlighted,
                artifacts.summary_path.display()
            );
            if let Some(chart) = &artifacts.chart_path {
                println!("chart at {}", chart.display());
            }
        }
        Err(err) => error!("run for {display_name} failed: {err}"),
    }

    ExitCode::SUCCESS
}

fn run_extended_checks(client: &ApiClient, user_id: u64, display_name: &str) {
    match social::audit_groups(client, user_id) {
        Ok(audit) => print_group_audit(&audit, user_id, display_name),
        Err(err) => error!("enemy group check for {display_name} failed: {err}"),
    }
    match social::audit_friends(client, user_id) {
        Ok(audit) => {
            println!("\nFriends check for \"{display_name}\" - \"{user_id}\"");
            println!("{}", "-".repeat(80));
            println!("[Banished]");
            print_friend_findings(&audit.banished);
            println!("\n[Excommunicated]");
            print_friend_findings(&audit.excommunicated);
            println!("{}", "-".repeat(80));
        }
        Err(err) => error!("friends check for {display_name} failed: {err}"),
    }
}

fn print_group_audit(audit: &GroupAudit, user_id: u64, display_name: &str) {
    println!("\nEnemy groups check for \"{display_name}\" - \"{user_id}\"");
    println!("{}", "-".repeat(80));
    for finding in &audit.findings {
        let status = if finding.enemy {
            "enemy group"
        } else {
            "not an enemy group"
        };
        println!("Checking [{}] | Status: {status}", finding.group_name);
    }
    println!("{}", "-".repeat(80));
    println!("[Total enemy groups: {}]", audit.enemy_count);
    println!("[Total groups: {}]", audit.findings.len());
    println!("[Account created: {}]", audit.user.created);
    println!(
        "[Display name: {}]",
        audit.user.display_name.as_deref().unwrap_or("N/A")
    );
    println!("[Profile link: {}]", profile_link(user_id));
    println!(
        "[Friends: {} | Followers: {} | Following: {}]",
        audit.friends, audit.followers, audit.followings
    );
    println!("{}", "-".repeat(80));
}

fn print_friend_findings(findings: &[FriendFinding]) {
    for finding in findings {
        let status = if finding.is_friend {
            "friend"
        } else {
            "not a friend"
        };
        println!("{} | {status}", finding.name);
    }
}

/// Web profile URL for a user id, shown in the enemy-group report.
fn profile_link(user_id: u64) -> String {
    format!("https://www.roblox.com/users/{user_id}/profile")
}
