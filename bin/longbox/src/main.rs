//! Longbox - terminal browser for a paginated comics-character catalog.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog interactively
//! MARVEL_PUBLIC_KEY=... MARVEL_PRIVATE_KEY=... longbox
//!
//! # Print one character's details and exit
//! longbox details 1011334
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use longbox_core::error::PaginationError;
use longbox_core::format::abbreviate_count;
use longbox_core::metrics::init_metrics;
use longbox_core::models::{
    AppearanceGroup, CharacterDetails, DisplayItem, DisplayList, ErrorPlaceholderModel,
};
use longbox_core::services::{
    DefaultEntryMapper, DefaultPageProcessor, DetailsService, ListUpdate, PaginationConfig,
    PaginationController,
};
use longbox_gateway::{DEFAULT_BASE_URL, GatewayClient, GatewayConfig};

/// Longbox CLI - comics-character catalog browser.
#[derive(Parser, Debug)]
#[command(name = "longbox")]
#[command(about = "Longbox - browse a comics-character catalog from the terminal")]
#[command(version)]
struct Cli {
    /// Catalog gateway base URL.
    #[arg(long, env = "LONGBOX_GATEWAY_URL", default_value = DEFAULT_BASE_URL)]
    gateway_url: String,

    /// Gateway public API key.
    #[arg(long, env = "MARVEL_PUBLIC_KEY")]
    public_key: String,

    /// Gateway private API key (used for request signing, never logged).
    #[arg(long, env = "MARVEL_PRIVATE_KEY")]
    private_key: String,

    /// Items per page when browsing the full catalog.
    #[arg(long, env = "LONGBOX_PAGE_SIZE", default_value = "50")]
    page_size: usize,

    /// Items per page when searching by name prefix.
    #[arg(long, env = "LONGBOX_SEARCH_PAGE_SIZE", default_value = "25")]
    search_page_size: usize,

    /// Enable JSON log output.
    #[arg(long, env = "JSON_LOGS")]
    json_logs: bool,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, env = "LOG_LEVEL", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print one character's details and exit.
    Details {
        /// Catalog identifier of the character.
        id: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.json_logs);
    init_metrics();

    // ─────────────────────────────────────────────────────────────────────────
    // 🚀 STARTUP
    // ─────────────────────────────────────────────────────────────────────────
    info!("🚀 Starting Longbox");
    debug!(gateway_url = %cli.gateway_url, "Catalog gateway");

    let gateway = Arc::new(
        GatewayClient::new(GatewayConfig::new(
            &cli.gateway_url,
            &cli.public_key,
            &cli.private_key,
        ))
        .context("Failed to build gateway client")?,
    );

    match cli.command {
        Some(Command::Details { id }) => print_details(gateway, id).await,
        None => browse(gateway, cli.page_size, cli.search_page_size).await,
    }
}

// =============================================================================
// Details command
// =============================================================================

async fn print_details(gateway: Arc<GatewayClient>, id: u64) -> Result<()> {
    let service = DetailsService::new(gateway);
    let details = service
        .character_details(id)
        .await
        .with_context(|| format!("Failed to load character {id}"))?;
    render_details(&details);
    Ok(())
}

fn render_details(details: &CharacterDetails) {
    println!("\n{}", details.name);
    println!("{}", "=".repeat(details.name.len()));
    println!("{}", details.description);
    if let Some(thumbnail) = &details.thumbnail {
        println!("🖼  {thumbnail}");
    }
    if let Some(modified) = details.modified {
        println!("Last modified {}", modified.format("%Y-%m-%d"));
    }
    render_appearances("Comics", &details.comics);
    render_appearances("Series", &details.series);
    render_appearances("Stories", &details.stories);
    render_appearances("Events", &details.events);
}

fn render_appearances(label: &str, group: &AppearanceGroup) {
    println!("\n{label}: {} appearance(s)", abbreviate_count(group.count));
    for reference in group.refs.iter().take(5) {
        println!("  - {}", reference.name);
    }
    if group.refs.len() > 5 {
        println!("  … and {} more", group.refs.len() - 5);
    }
    if let Some(link) = &group.link {
        println!("  🔗 {link}");
    }
}

// =============================================================================
// Interactive browsing
// =============================================================================

/// Which pagination session the screen currently shows.
enum Mode {
    FullList,
    Searching(String),
}

/// Per-session view state: the last published list plus transient error
/// rows appended for failed pages.
#[derive(Default)]
struct ViewState {
    list: DisplayList,
    error_rows: Vec<DisplayItem>,
    frozen: bool,
}

impl ViewState {
    fn apply(&mut self, update: ListUpdate) -> Option<String> {
        match update {
            Ok(list) => {
                self.list = list;
                self.error_rows.clear();
                None
            }
            Err(PaginationError::FetchError { page }) => {
                self.push_error_row(page);
                Some(format!("Page {page} failed to load, retry with: r {page}"))
            }
            Err(PaginationError::InitialFetchError) => {
                self.push_error_row(0);
                Some("Could not reach the catalog, retry with: r 0".to_string())
            }
            Err(PaginationError::NoResults) => Some("No matching characters".to_string()),
            Err(PaginationError::TotalChanged) => {
                self.frozen = true;
                Some("The catalog changed upstream, refresh with: g".to_string())
            }
        }
    }

    fn push_error_row(&mut self, page: u32) {
        let already_shown = self.error_rows.iter().any(|row| row.page() == page);
        if !already_shown {
            self.error_rows.push(DisplayItem::Error {
                model: ErrorPlaceholderModel::for_page(page),
                page,
            });
        }
    }

    /// Index of the next page to request, one past the last loaded page.
    fn next_page(&self) -> u32 {
        self.list
            .entries
            .iter()
            .map(DisplayItem::page)
            .max()
            .map_or(0, |last| last + 1)
    }

    fn clear(&mut self) {
        self.list = DisplayList::default();
        self.error_rows.clear();
        self.frozen = false;
    }
}

async fn browse(gateway: Arc<GatewayClient>, page_size: usize, search_page_size: usize) -> Result<()> {
    let processor = Arc::new(DefaultPageProcessor);
    let mapper = Arc::new(DefaultEntryMapper);

    let (full, mut full_updates) = PaginationController::spawn(
        PaginationConfig {
            page_size,
            filter: None,
        },
        gateway.clone(),
        processor.clone(),
        mapper.clone(),
    );
    // The search session starts idle; it is reset and reconfigured per query.
    let mut search: Option<(PaginationController, tokio::sync::mpsc::UnboundedReceiver<ListUpdate>)> =
        None;

    let details = DetailsService::new(gateway.clone());
    let mut mode = Mode::FullList;
    let mut full_state = ViewState::default();
    let mut search_state = ViewState::default();

    full.load_if_needed(0);
    print_help();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            Some(update) = full_updates.recv() => {
                let notice = full_state.apply(update);
                if matches!(mode, Mode::FullList) {
                    render(&mode, &full_state, notice.as_deref());
                }
            }
            Some(update) = recv_search(&mut search) => {
                let notice = search_state.apply(update);
                if matches!(mode, Mode::Searching(_)) {
                    render(&mode, &search_state, notice.as_deref());
                }
            }
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    break;
                };
                let input = line.trim();
                if input.is_empty() {
                    continue;
                }
                match parse_command(input) {
                    BrowseCommand::Quit => break,
                    BrowseCommand::Help => print_help(),
                    command => {
                        handle_command(
                            command,
                            &mut mode,
                            &full,
                            &mut search,
                            &mut full_state,
                            &mut search_state,
                            &details,
                            gateway.clone(),
                            processor.clone(),
                            mapper.clone(),
                            search_page_size,
                        )
                        .await;
                    }
                }
            }
            _ = signal::ctrl_c() => break,
        }
    }

    info!("🛑 Leaving the catalog");
    Ok(())
}

/// Awaitable search updates, pending while no search session exists.
async fn recv_search(
    search: &mut Option<(PaginationController, tokio::sync::mpsc::UnboundedReceiver<ListUpdate>)>,
) -> Option<ListUpdate> {
    match search {
        Some((_, updates)) => updates.recv().await,
        None => std::future::pending().await,
    }
}

#[derive(Debug, PartialEq, Eq)]
enum BrowseCommand {
    NextPage,
    Retry(u32),
    Search(String),
    ClearSearch,
    Details(u64),
    Refresh,
    Help,
    Quit,
    Unknown,
}

fn parse_command(input: &str) -> BrowseCommand {
    if let Some(query) = input.strip_prefix('/') {
        let query = query.trim();
        if query.is_empty() {
            return BrowseCommand::ClearSearch;
        }
        return BrowseCommand::Search(query.to_string());
    }

    let mut parts = input.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some("n"), None) => BrowseCommand::NextPage,
        (Some("r"), Some(page)) => page.parse().map_or(BrowseCommand::Unknown, BrowseCommand::Retry),
        (Some("d"), Some(id)) => id.parse().map_or(BrowseCommand::Unknown, BrowseCommand::Details),
        (Some("x"), None) => BrowseCommand::ClearSearch,
        (Some("g"), None) => BrowseCommand::Refresh,
        (Some("h"), None) => BrowseCommand::Help,
        (Some("q"), None) => BrowseCommand::Quit,
        _ => BrowseCommand::Unknown,
    }
}

#[allow(clippy::too_many_arguments)]
async fn handle_command(
    command: BrowseCommand,
    mode: &mut Mode,
    full: &PaginationController,
    search: &mut Option<(PaginationController, tokio::sync::mpsc::UnboundedReceiver<ListUpdate>)>,
    full_state: &mut ViewState,
    search_state: &mut ViewState,
    details: &DetailsService<GatewayClient>,
    gateway: Arc<GatewayClient>,
    processor: Arc<DefaultPageProcessor>,
    mapper: Arc<DefaultEntryMapper>,
    search_page_size: usize,
) {
    match command {
        BrowseCommand::NextPage => match mode {
            Mode::FullList => full.load_if_needed(full_state.next_page()),
            Mode::Searching(_) => {
                if let Some((controller, _)) = search {
                    controller.load_if_needed(search_state.next_page());
                }
            }
        },
        BrowseCommand::Retry(page) => match mode {
            Mode::FullList => full.load_if_needed(page),
            Mode::Searching(_) => {
                if let Some((controller, _)) = search {
                    controller.load_if_needed(page);
                }
            }
        },
        BrowseCommand::Search(query) => {
            // The filter is fixed per session, so each query gets a fresh one.
            let (controller, updates) = PaginationController::spawn(
                PaginationConfig {
                    page_size: search_page_size,
                    filter: Some(query.clone()),
                },
                gateway,
                processor,
                mapper,
            );
            controller.load_if_needed(0);
            *search = Some((controller, updates));
            search_state.clear();
            *mode = Mode::Searching(query);
            println!("🔎 Searching…");
        }
        BrowseCommand::ClearSearch => {
            if let Some((controller, _)) = search.take() {
                controller.reset();
            }
            search_state.clear();
            *mode = Mode::FullList;
            render(mode, full_state, None);
        }
        BrowseCommand::Details(id) => match details.character_details(id).await {
            Ok(details) => render_details(&details),
            Err(error) => {
                warn!(id, error = %error, "Details lookup failed");
                println!("⚠️  Could not load character {id}: {error}");
            }
        },
        BrowseCommand::Refresh => {
            let state = match mode {
                Mode::FullList => {
                    full.reset();
                    full.load_if_needed(0);
                    full_state
                }
                Mode::Searching(_) => {
                    if let Some((controller, _)) = search {
                        controller.reset();
                        controller.load_if_needed(0);
                    }
                    search_state
                }
            };
            state.clear();
            println!("🔄 Refreshing…");
        }
        BrowseCommand::Unknown => println!("Unknown command, h for help"),
        // Handled by the caller.
        BrowseCommand::Help | BrowseCommand::Quit => {}
    }
}

fn render(mode: &Mode, state: &ViewState, notice: Option<&str>) {
    match mode {
        Mode::FullList => println!("\n📚 Catalog"),
        Mode::Searching(query) => println!("\n🔎 Search: {query}"),
    }

    for item in state.list.entries.iter().chain(&state.error_rows) {
        match item {
            DisplayItem::Loaded { model, page } => {
                let marker = if model.thumbnail.is_some() { "🖼" } else { " " };
                match model.character_id {
                    Some(id) => println!("  {marker} [p{page}] {:<40} (d {id})", model.name),
                    None => println!("  {marker} [p{page}] {}", model.name),
                }
            }
            DisplayItem::Error { model, page } => {
                println!("  ❌ [p{page}] {} (r {page})", model.name);
            }
        }
    }

    if let Some(notice) = notice {
        println!("  ⚠️  {notice}");
    }
    if state.frozen {
        println!("  (list frozen until refresh)");
    }
    println!("{} item(s) shown", state.list.len());
}

fn print_help() {
    println!("Commands:");
    println!("  n          load the next page");
    println!("  r <page>   retry a failed page");
    println!("  /<text>    search by name prefix");
    println!("  x          leave search, back to the full catalog");
    println!("  d <id>     show a character's details");
    println!("  g          refresh the current list from scratch");
    println!("  h          this help");
    println!("  q          quit");
}

/// Initialize tracing subscriber.
fn init_tracing(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json {
        fmt().with_env_filter(filter).json().init();
    } else {
        fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use longbox_core::models::CharacterModel;

    #[test]
    fn commands_parse() {
        assert_eq!(parse_command("n"), BrowseCommand::NextPage);
        assert_eq!(parse_command("r 3"), BrowseCommand::Retry(3));
        assert_eq!(parse_command("/spid er"), BrowseCommand::Search("spid er".to_string()));
        assert_eq!(parse_command("/"), BrowseCommand::ClearSearch);
        assert_eq!(parse_command("x"), BrowseCommand::ClearSearch);
        assert_eq!(parse_command("d 1011334"), BrowseCommand::Details(1011334));
        assert_eq!(parse_command("g"), BrowseCommand::Refresh);
        assert_eq!(parse_command("q"), BrowseCommand::Quit);
        assert_eq!(parse_command("r nope"), BrowseCommand::Unknown);
        assert_eq!(parse_command("zzz"), BrowseCommand::Unknown);
    }

    fn loaded(name: &str, page: u32) -> DisplayItem {
        DisplayItem::Loaded {
            model: CharacterModel {
                model_id: format!("char-{page}"),
                character_id: None,
                name: name.to_string(),
                thumbnail: None,
            },
            page,
        }
    }

    #[test]
    fn next_page_follows_the_last_loaded_page() {
        let mut state = ViewState::default();
        assert_eq!(state.next_page(), 0);

        state.list = DisplayList {
            entries: vec![loaded("A", 0), loaded("B", 1)],
        };
        assert_eq!(state.next_page(), 2);
    }

    #[test]
    fn error_rows_deduplicate_per_page() {
        let mut state = ViewState::default();
        state.apply(Err(PaginationError::FetchError { page: 2 }));
        state.apply(Err(PaginationError::FetchError { page: 2 }));
        assert_eq!(state.error_rows.len(), 1);

        // A successful update clears the transient rows.
        state.apply(Ok(DisplayList::default()));
        assert!(state.error_rows.is_empty());
    }
}
