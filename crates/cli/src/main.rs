use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use giftdraw_core::{
    compute_draw, drawn_member, start_draw, CandidateTable, DrawConfig, ExclusionSet, GroupId,
    GroupSnapshot, MemberId, Participant, RngState, DEFAULT_MAX_ATTEMPTS,
};
use giftdraw_data::FileGroupStore;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Run and inspect gift-exchange draws.
#[derive(Parser)]
#[command(name = "giftdraw", version)]
struct Cli {
    /// Directory holding one JSON document per group
    #[arg(long, env = "GIFTDRAW_STORE", default_value = "groups")]
    store: PathBuf,

    /// Log level (trace, debug, info, warn, error); RUST_LOG wins when set
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a group document
    Init(InitArgs),
    /// Start the draw for a group
    Draw {
        #[arg(long)]
        group: String,
        /// Member starting the draw; must be an admin
        #[arg(long = "as")]
        requester: String,
        #[command(flatten)]
        engine: EngineArgs,
    },
    /// Show who a member drew
    Reveal {
        #[arg(long)]
        group: String,
        #[arg(long = "as")]
        requester: String,
    },
    /// Audit a stored draw, or report whether a pending group can draw
    Check {
        #[arg(long)]
        group: String,
    },
    /// Run many draws in memory and print how often each result comes up
    Simulate {
        #[arg(long = "member", required = true)]
        members: Vec<String>,
        #[arg(long = "exclude", value_parser = parse_pair)]
        exclusions: Vec<(String, String)>,
        #[arg(long, default_value = "1000")]
        trials: u32,
        #[command(flatten)]
        engine: EngineArgs,
    },
}

#[derive(Args)]
struct InitArgs {
    #[arg(long)]
    group: String,
    #[arg(long, default_value = "")]
    name: String,
    #[arg(long = "member", required = true)]
    members: Vec<String>,
    #[arg(long = "admin")]
    admins: Vec<String>,
    /// Members who already answered the group questions
    #[arg(long = "answered")]
    answered: Vec<String>,
    /// Mark every member as having answered
    #[arg(long)]
    all_answered: bool,
    /// Pair that must not draw each other, as `a:b`
    #[arg(long = "exclude", value_parser = parse_pair)]
    exclusions: Vec<(String, String)>,
}

#[derive(Args)]
struct EngineArgs {
    /// Seed for a reproducible draw; OS entropy when absent
    #[arg(long, env = "GIFTDRAW_SEED")]
    seed: Option<u64>,
    #[arg(long, env = "GIFTDRAW_MAX_ATTEMPTS", default_value_t = DEFAULT_MAX_ATTEMPTS)]
    max_attempts: u32,
    /// Fail instead of using an exact construction when greedy attempts run out
    #[arg(long)]
    no_fallback: bool,
}

impl EngineArgs {
    fn config(&self) -> DrawConfig {
        DrawConfig {
            max_attempts: self.max_attempts,
            fallback: !self.no_fallback,
        }
    }

    fn rng(&self) -> RngState {
        match self.seed {
            Some(seed) => RngState::from_seed(seed),
            None => RngState::from_entropy(),
        }
    }
}

fn parse_pair(raw: &str) -> Result<(String, String), String> {
    match raw.split_once(':') {
        Some((a, b)) if !a.is_empty() && !b.is_empty() => Ok((a.to_string(), b.to_string())),
        _ => Err(format!("expected `a:b`, got {raw:?}")),
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "giftdraw={level},giftdraw_core={level},giftdraw_data={level}"
        ))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);
    match cli.command {
        Command::Init(args) => init_group(&open_store(&cli.store)?, args),
        Command::Draw {
            group,
            requester,
            engine,
        } => draw_group(&open_store(&cli.store)?, group, requester, &engine),
        Command::Reveal { group, requester } => {
            let store = open_store(&cli.store)?;
            let drawn = drawn_member(&store, &GroupId::new(group), &MemberId::new(requester))?;
            println!("{drawn}");
            Ok(())
        }
        Command::Check { group } => check_group(&open_store(&cli.store)?, &GroupId::new(group)),
        Command::Simulate {
            members,
            exclusions,
            trials,
            engine,
        } => simulate(&members, &exclusions, trials, &engine),
    }
}

fn open_store(dir: &Path) -> anyhow::Result<FileGroupStore> {
    FileGroupStore::open(dir).with_context(|| format!("open store {}", dir.display()))
}

fn draw_group(
    store: &FileGroupStore,
    group: String,
    requester: String,
    engine: &EngineArgs,
) -> anyhow::Result<()> {
    let group = GroupId::new(group);
    let mut rng = engine.rng();
    let outcome = start_draw(
        store,
        &group,
        &MemberId::new(requester),
        &engine.config(),
        &mut rng,
    )?;
    println!(
        "group {group} drawn: {} pairs, strategy {:?}, {} attempt(s), seed {}",
        outcome.assignment.len(),
        outcome.strategy,
        outcome.attempts,
        rng.seed()
    );
    Ok(())
}

fn init_group(store: &FileGroupStore, args: InitArgs) -> anyhow::Result<()> {
    for id in args.admins.iter().chain(&args.answered) {
        if !args.members.contains(id) {
            bail!("{id} is not listed with --member");
        }
    }
    let members = args
        .members
        .iter()
        .map(|id| Participant {
            id: MemberId::new(id.as_str()),
            name: id.clone(),
            is_admin: args.admins.contains(id),
            has_answered: args.all_answered || args.answered.contains(id),
        })
        .collect();
    let mut group = GroupSnapshot::new(GroupId::new(args.group), members);
    group.name = args.name;
    group.exclusions = ExclusionSet::from_pairs(args.exclusions);
    if group.members.iter().all(|member| !member.is_admin) {
        warn!(group = %group.id, "group has no admin; nobody can start the draw");
    }
    let path = store.create(group)?;
    info!(path = %path.display(), "group created");
    Ok(())
}

fn check_group(store: &FileGroupStore, group: &GroupId) -> anyhow::Result<()> {
    let doc = store.document(group)?;
    let members = doc.group.member_ids();
    match &doc.draws {
        Some(assignment) => {
            assignment
                .verify(&members, &doc.group.exclusions)
                .with_context(|| format!("stored draw for {group} is invalid"))?;
            println!("group {group}: draw of {} pairs is valid", assignment.len());
        }
        None => {
            let table = CandidateTable::build(&members, &doc.group.exclusions);
            let pending = doc.group.pending_answers();
            println!(
                "group {group}: not drawn, {} member(s), feasible: {}, pending answers: {}",
                members.len(),
                members.len() >= 2 && table.is_feasible(),
                pending.len()
            );
        }
    }
    Ok(())
}

fn simulate(
    members: &[String],
    exclusions: &[(String, String)],
    trials: u32,
    engine: &EngineArgs,
) -> anyhow::Result<()> {
    let members: Vec<MemberId> = members.iter().map(|id| MemberId::new(id.as_str())).collect();
    let exclusions = ExclusionSet::from_pairs(
        exclusions
            .iter()
            .map(|(a, b)| (a.as_str(), b.as_str())),
    );
    let config = engine.config();
    let mut rng = engine.rng();
    let mut counts: BTreeMap<String, u32> = BTreeMap::new();
    let mut failures = 0u32;
    for _ in 0..trials {
        match compute_draw(&members, &exclusions, &config, &mut rng) {
            Ok(outcome) => {
                let key = outcome
                    .assignment
                    .sorted()
                    .iter()
                    .map(|pair| format!("{}>{}", pair.drawer, pair.drawn))
                    .collect::<Vec<_>>()
                    .join(" ");
                *counts.entry(key).or_default() += 1;
            }
            Err(err) => {
                if failures == 0 {
                    warn!(%err, "draw failed");
                }
                failures += 1;
            }
        }
    }
    println!("seed {}, {trials} trials, {failures} failed", rng.seed());
    for (key, count) in &counts {
        let share = f64::from(*count) / f64::from(trials.max(1)) * 100.0;
        println!("{count:>8} {share:>6.2}%  {key}");
    }
    Ok(())
}
