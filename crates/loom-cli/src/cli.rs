//! Clap CLI definitions for the `loom` command.
//!
//! This module defines the complete CLI surface using clap 4 derive macros:
//! a thin set of verbs over `IssueEngine`/`Storage`/`TemplateRegistry`
//! (spec.md §6).

use clap::{Args, Parser, Subcommand};

/// loom -- agent-oriented issue tracker and workflow engine.
///
/// Issues are typed against loaded workflow packs, with category-aware
/// ready/blocked queries and a dependency graph the engine enforces.
#[derive(Parser, Debug)]
#[command(
    name = "loom",
    about = "Agent-oriented issue tracker and workflow engine",
    long_about = "Issues typed against loaded workflow packs, with ready/blocked queries \
                  and dependency-graph enforcement.",
    version,
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Global flags available to all subcommands.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Project directory (default: auto-discover by walking up for config.json).
    #[arg(long, global = true)]
    pub project: Option<String>,

    /// Actor name for audit trail (default: $LOOM_ACTOR, git user.name, $USER).
    #[arg(long, global = true, env = "LOOM_ACTOR")]
    pub actor: Option<String>,

    /// Output in JSON format.
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose/debug output.
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output (errors only).
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,
}

/// All available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    // ===== Setup =====
    /// Initialize a loom project in the current directory.
    Init(InitArgs),

    /// Idempotent post-init scaffolding: ensure packs/templates directories
    /// and the database exist, then reload the template registry.
    Install,

    // ===== Working With Issues =====
    /// Create a new issue.
    #[command(alias = "new")]
    Create(CreateArgs),

    /// Update issue fields.
    Update(UpdateArgs),

    /// Close one or more issues.
    Close(CloseArgs),

    /// Reopen a closed issue.
    Reopen(ReopenArgs),

    /// Claim an issue for an assignee.
    Claim(ClaimArgs),

    /// Release a claimed issue back to its initial open state.
    Release(ReleaseArgs),

    /// Claim the next ready issue matching a filter.
    #[command(name = "claim-next")]
    ClaimNext(ClaimNextArgs),

    // ===== Views & Queries =====
    /// List issues.
    List(ListArgs),

    /// Show issue details.
    #[command(alias = "view")]
    Show(ShowArgs),

    /// Full-text search across issues.
    Search(SearchArgs),

    /// Show ready work (open category, no active blockers).
    Ready(ReadyArgs),

    /// Show blocked issues and what blocks them.
    Blocked(BlockedArgs),

    /// Show the longest chain of non-done issues through the dependency graph.
    #[command(name = "critical-path")]
    CriticalPath,

    // ===== Dependencies =====
    /// Manage dependencies between issues.
    Deps(DepsArgs),

    // ===== Workflow Packs & Templates =====
    /// Manage installed workflow packs.
    Packs(PacksArgs),

    /// Manage the type template registry.
    Templates(TemplatesArgs),

    // ===== Dashboard & Server =====
    /// Start (or reuse) the ethereal per-project dashboard and print its URL.
    Dashboard(DashboardArgs),

    /// Manage the persistent multi-project server daemon.
    Server(ServerArgs),

    // ===== Diagnostics =====
    /// Run health checks against the project, its store, and its dashboard process.
    Doctor,

    /// Generate shell completion scripts.
    Completion(CompletionArgs),

    /// Internal: runs the dashboard HTTP server in the foreground. Spawned
    /// by `dashboard` and `server start`; not meant to be invoked directly.
    #[command(name = "__serve", hide = true)]
    Serve(ServeArgs),
}

// ---------------------------------------------------------------------------
// Init / Install
// ---------------------------------------------------------------------------

/// Arguments for `loom init`.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Issue prefix (default: current directory name).
    #[arg(short = 'p', long)]
    pub prefix: Option<String>,

    /// Dashboard mode: a session-scoped process per project, or a
    /// persistent daemon shared across projects.
    #[arg(long, value_enum, default_value = "ethereal")]
    pub mode: InitMode,
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitMode {
    Ethereal,
    Server,
}

// ---------------------------------------------------------------------------
// Create / Update / Close / Reopen
// ---------------------------------------------------------------------------

/// Arguments for `loom create`.
#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Issue title.
    pub title: String,

    /// Issue type (must be a type loaded from an enabled workflow pack).
    #[arg(short = 't', long, default_value = "task")]
    pub r#type: String,

    /// Priority, 0 (highest) through 4 (lowest).
    #[arg(short = 'p', long, default_value_t = 2)]
    pub priority: i32,

    /// Parent issue id.
    #[arg(long)]
    pub parent: Option<String>,

    /// Issue description.
    #[arg(short = 'd', long)]
    pub description: Option<String>,

    /// Custom field in `name=value` form; may be repeated.
    #[arg(long = "field", value_name = "NAME=VALUE")]
    pub fields: Vec<String>,

    /// Label to attach; may be repeated.
    #[arg(short = 'l', long = "label")]
    pub labels: Vec<String>,

    /// Issue id this issue depends on (blocked by); may be repeated.
    #[arg(long = "dep")]
    pub deps: Vec<String>,
}

/// Arguments for `loom update`.
#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Issue id to update.
    pub id: String,

    /// New status (must be a valid state for the issue's type).
    #[arg(long)]
    pub status: Option<String>,

    /// New priority.
    #[arg(long)]
    pub priority: Option<i32>,

    /// New title.
    #[arg(long)]
    pub title: Option<String>,

    /// New assignee.
    #[arg(long)]
    pub assignee: Option<String>,

    /// New description.
    #[arg(long)]
    pub description: Option<String>,

    /// New notes.
    #[arg(long)]
    pub notes: Option<String>,

    /// New parent id. Pass an empty string to clear the parent.
    #[arg(long)]
    pub parent: Option<String>,

    /// Custom field in `name=value` form; may be repeated.
    #[arg(long = "field", value_name = "NAME=VALUE")]
    pub fields: Vec<String>,
}

/// Arguments for `loom close`.
#[derive(Args, Debug)]
pub struct CloseArgs {
    /// Issue ids to close.
    #[arg(required = true)]
    pub ids: Vec<String>,

    /// Target status, if the type has more than one done-category state.
    #[arg(long)]
    pub status: Option<String>,

    /// Close reason, recorded on the issue and in its event log.
    #[arg(short = 'r', long)]
    pub reason: Option<String>,
}

/// Arguments for `loom reopen`.
#[derive(Args, Debug)]
pub struct ReopenArgs {
    /// Issue id to reopen.
    pub id: String,
}

// ---------------------------------------------------------------------------
// Claim / Release / ClaimNext
// ---------------------------------------------------------------------------

/// Arguments for `loom claim`.
#[derive(Args, Debug)]
pub struct ClaimArgs {
    /// Issue id to claim.
    pub id: String,

    /// Assignee; defaults to the resolved actor.
    #[arg(long)]
    pub assignee: Option<String>,
}

/// Arguments for `loom release`.
#[derive(Args, Debug)]
pub struct ReleaseArgs {
    /// Issue id to release.
    pub id: String,
}

/// Arguments for `loom claim-next`.
#[derive(Args, Debug)]
pub struct ClaimNextArgs {
    /// Assignee; defaults to the resolved actor.
    #[arg(long)]
    pub assignee: Option<String>,

    /// Restrict to this issue type.
    #[arg(short = 't', long)]
    pub r#type: Option<String>,

    /// Minimum priority (inclusive).
    #[arg(long)]
    pub priority_min: Option<i32>,

    /// Maximum priority (inclusive).
    #[arg(long)]
    pub priority_max: Option<i32>,
}

// ---------------------------------------------------------------------------
// List / Show / Search / Ready / Blocked
// ---------------------------------------------------------------------------

/// Arguments for `loom list`.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Filter by status or category (open/wip/done).
    #[arg(long)]
    pub status: Option<String>,

    /// Filter by issue type.
    #[arg(short = 't', long = "type")]
    pub issue_type: Option<String>,

    /// Show full detail per issue instead of a compact line.
    #[arg(long)]
    pub long: bool,
}

/// Arguments for `loom show`.
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Issue id to show.
    pub id: String,
}

/// Arguments for `loom search`.
#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Full-text query.
    pub query: String,

    /// Filter by issue type.
    #[arg(short = 't', long = "type")]
    pub issue_type: Option<String>,

    /// Filter by status or category.
    #[arg(long)]
    pub status: Option<String>,
}

/// Arguments for `loom ready`.
#[derive(Args, Debug)]
pub struct ReadyArgs {
    /// Restrict to this issue type.
    #[arg(short = 't', long = "type")]
    pub issue_type: Option<String>,

    /// Restrict to this assignee.
    #[arg(long)]
    pub assignee: Option<String>,

    /// Maximum number of issues to return.
    #[arg(long)]
    pub limit: Option<i64>,
}

/// Arguments for `loom blocked`.
#[derive(Args, Debug)]
pub struct BlockedArgs {
    /// Restrict to this issue type.
    #[arg(short = 't', long = "type")]
    pub issue_type: Option<String>,

    /// Restrict to this assignee.
    #[arg(long)]
    pub assignee: Option<String>,
}

// ---------------------------------------------------------------------------
// Deps
// ---------------------------------------------------------------------------

/// Arguments for `loom deps`.
#[derive(Args, Debug)]
pub struct DepsArgs {
    #[command(subcommand)]
    pub command: DepsCommands,
}

/// Dependency subcommands.
#[derive(Subcommand, Debug)]
pub enum DepsCommands {
    /// Add a "blocks" dependency: `from` blocks `to`.
    Add(DepsAddArgs),
    /// Remove a dependency between two issues.
    Rm(DepsRmArgs),
}

/// Arguments for `loom deps add`.
#[derive(Args, Debug)]
pub struct DepsAddArgs {
    /// Issue id that blocks `to`.
    pub from: String,
    /// Issue id that is blocked by `from`.
    pub to: String,
}

/// Arguments for `loom deps rm`.
#[derive(Args, Debug)]
pub struct DepsRmArgs {
    /// Issue id on the blocking side.
    pub from: String,
    /// Issue id on the blocked side.
    pub to: String,
}

// ---------------------------------------------------------------------------
// Packs
// ---------------------------------------------------------------------------

/// Arguments for `loom packs`.
#[derive(Args, Debug)]
pub struct PacksArgs {
    #[command(subcommand)]
    pub command: PacksCommands,
}

/// Workflow pack subcommands.
#[derive(Subcommand, Debug)]
pub enum PacksCommands {
    /// List loaded workflow packs.
    List,
    /// Validate and install a workflow pack JSON file into the project.
    Install(PacksInstallArgs),
    /// Enable an installed pack.
    Enable(PacksEnableArgs),
    /// Disable an installed pack.
    Disable(PacksDisableArgs),
}

/// Arguments for `loom packs install`.
#[derive(Args, Debug)]
pub struct PacksInstallArgs {
    /// Path to the workflow pack JSON file.
    pub path: String,
}

/// Arguments for `loom packs enable`.
#[derive(Args, Debug)]
pub struct PacksEnableArgs {
    /// Pack name.
    pub name: String,
}

/// Arguments for `loom packs disable`.
#[derive(Args, Debug)]
pub struct PacksDisableArgs {
    /// Pack name.
    pub name: String,
}

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

/// Arguments for `loom templates`.
#[derive(Args, Debug)]
pub struct TemplatesArgs {
    #[command(subcommand)]
    pub command: TemplatesCommands,
}

/// Template registry subcommands.
#[derive(Subcommand, Debug)]
pub enum TemplatesCommands {
    /// List loaded type templates.
    List,
    /// Reload the template registry from disk.
    Reload,
}

// ---------------------------------------------------------------------------
// Server / Dashboard
// ---------------------------------------------------------------------------

/// Arguments for `loom dashboard`.
#[derive(Args, Debug)]
pub struct DashboardArgs {
    /// Print the URL without opening a browser.
    #[arg(long)]
    pub no_open: bool,
}

/// Arguments for `loom server`.
#[derive(Args, Debug)]
pub struct ServerArgs {
    #[command(subcommand)]
    pub command: ServerCommands,
}

/// Server daemon subcommands.
#[derive(Subcommand, Debug)]
pub enum ServerCommands {
    /// Start the server daemon if it isn't already running.
    Start,
    /// Stop the running server daemon.
    Stop,
    /// Show server daemon status and registered projects.
    Status,
    /// Register the current project with the server daemon.
    Register,
    /// Unregister the current project from the server daemon.
    Unregister,
}

// ---------------------------------------------------------------------------
// Completion
// ---------------------------------------------------------------------------

/// Arguments for `loom completion`.
#[derive(Args, Debug)]
pub struct CompletionArgs {
    #[command(subcommand)]
    pub shell: CompletionCommands,
}

/// Supported shells for completion script generation.
#[derive(Subcommand, Debug)]
pub enum CompletionCommands {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

// ---------------------------------------------------------------------------
// Serve (hidden)
// ---------------------------------------------------------------------------

/// Arguments for the hidden `loom __serve` subcommand.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Project directory to serve.
    #[arg(long)]
    pub project: String,

    /// Port to bind the dashboard HTTP server on.
    #[arg(long)]
    pub port: u16,
}
