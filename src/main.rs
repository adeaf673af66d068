use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use alloy::signers::local::PrivateKeySigner;
use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use unlock::app::{App, InputMode};
use unlock::config;
use unlock::core::parse_command;
use unlock::domain::{parse_address, TokenCatalog, WithdrawalWorkflow};
use unlock::infrastructure::runtime::WorkerSettings;
use unlock::infrastructure::{token_list, ProviderConfig, RuntimeBridge, RuntimeCommand};
use unlock::logging;
use unlock::ui;

#[derive(Debug, Parser)]
#[command(
    name = "unlock",
    version,
    about = "Unlock: withdraw locked ERC20 tokens from a token locker contract"
)]
struct Args {
    /// HTTP JSON-RPC endpoint (e.g. http://localhost:8545)
    #[arg(long)]
    rpc: Option<String>,

    /// WebSocket endpoint (e.g. ws://localhost:8546)
    #[arg(long)]
    ws: Option<String>,

    /// IPC path (e.g. ~/.ethereum/geth.ipc). Unix only.
    #[arg(long)]
    ipc: Option<PathBuf>,

    /// Token locker contract address
    #[arg(long, env = "UNLOCK_LOCKER")]
    locker: Option<String>,

    /// Hex private key used to sign withdrawals. Without it the node's
    /// first unlocked account is used.
    #[arg(long, env = "UNLOCK_PRIVATE_KEY", hide_env_values = true)]
    private_key: Option<String>,

    /// Token list JSON replacing the bundled list
    #[arg(long)]
    token_list: Option<PathBuf>,

    /// GraphQL endpoint of the transfers subgraph
    #[arg(long)]
    subgraph: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = config::load()?;

    let _log_guard = config::log_dir().and_then(|dir| {
        match logging::init(&dir, config.log_level.as_deref()) {
            Ok(guard) => Some(guard),
            Err(err) => {
                eprintln!("Warning: logging disabled: {err:#}");
                None
            }
        }
    });

    let endpoints = endpoints_from_args_and_config(&args, &config)?;
    let locker = locker_from_args_and_config(&args, &config)?;
    let signer = args
        .private_key
        .as_deref()
        .map(|key| key.trim().parse::<PrivateKeySigner>())
        .transpose()
        .context("Invalid private key")?;
    let catalog = catalog_from_args_and_config(&args, &config)?;
    let subgraph = args
        .subgraph
        .clone()
        .or_else(|| config.subgraph.clone())
        .filter(|url| !url.trim().is_empty());

    tracing::info!(
        endpoints = endpoints.len(),
        locker = ?locker,
        tokens = catalog.len(),
        local_signer = signer.is_some(),
        "starting"
    );

    let mut app = App::new(WithdrawalWorkflow::new(catalog), locker);
    app.endpoints = endpoints.iter().map(ProviderConfig::display).collect();
    app.endpoint = app.endpoints.first().cloned().unwrap_or_default();
    if subgraph.is_some() {
        app.request_transfers();
    }

    let runtime = RuntimeBridge::new(WorkerSettings {
        endpoints,
        locker,
        signer,
        subgraph,
    })?;

    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app, runtime);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = %format!("{:#}", err), "exited with error");
        eprintln!("{err:?}");
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
    runtime: RuntimeBridge,
) -> Result<()> {
    let tick_rate = Duration::from_millis(200);
    let mut last_tick = Instant::now();

    loop {
        pump_background(&mut app, &runtime)?;
        terminal.draw(|f| ui::draw(f, &app))?;
        if app.should_quit {
            let _ = runtime.send(RuntimeCommand::Shutdown);
            return Ok(());
        }

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                handle_key(&mut app, key);
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.on_tick();
            last_tick = Instant::now();
        }
    }
}

/// Apply worker events and forward queued requests
fn pump_background(app: &mut App, runtime: &RuntimeBridge) -> Result<()> {
    for event in runtime.poll_events() {
        app.apply_event(event);
    }
    for command in app.take_commands() {
        runtime.send(command)?;
    }
    Ok(())
}

fn endpoints_from_args_and_config(
    args: &Args,
    config: &config::Config,
) -> Result<Vec<ProviderConfig>> {
    use std::collections::BTreeSet;

    fn push_endpoint(
        endpoints: &mut Vec<ProviderConfig>,
        seen: &mut BTreeSet<String>,
        endpoint: ProviderConfig,
    ) {
        if seen.insert(endpoint.display().to_lowercase()) {
            endpoints.push(endpoint);
        }
    }

    let mut endpoints = Vec::new();
    let mut seen = BTreeSet::<String>::new();

    // CLI arguments take precedence
    if let Some(ipc) = args.ipc.clone() {
        #[cfg(unix)]
        push_endpoint(&mut endpoints, &mut seen, ProviderConfig::Ipc(ipc));
        #[cfg(not(unix))]
        {
            let _ = ipc;
            return Err(anyhow::anyhow!("IPC is not supported on this platform"));
        }
    } else if let Some(ws) = args.ws.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        push_endpoint(&mut endpoints, &mut seen, ProviderConfig::WebSocket(ws.to_string()));
    } else if let Some(rpc) = args.rpc.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        push_endpoint(
            &mut endpoints,
            &mut seen,
            ProviderConfig::Http(normalize_http_endpoint(rpc)),
        );
    }

    // Config file endpoints
    for entry in &config.endpoints {
        if let Some(rpc) = entry.rpc.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            push_endpoint(
                &mut endpoints,
                &mut seen,
                ProviderConfig::Http(normalize_http_endpoint(rpc)),
            );
            continue;
        }
        if let Some(ws) = entry.ws.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            push_endpoint(&mut endpoints, &mut seen, ProviderConfig::WebSocket(ws.to_string()));
            continue;
        }
        #[cfg(unix)]
        if let Some(ipc) = entry.ipc.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            if let Some(path) = expand_path(ipc) {
                push_endpoint(&mut endpoints, &mut seen, ProviderConfig::Ipc(path));
            }
        }
    }

    // Default fallback
    if endpoints.is_empty() {
        push_endpoint(
            &mut endpoints,
            &mut seen,
            ProviderConfig::Http(normalize_http_endpoint("localhost:8545")),
        );
    }

    Ok(endpoints)
}

fn locker_from_args_and_config(
    args: &Args,
    config: &config::Config,
) -> Result<alloy::primitives::Address> {
    let raw = args
        .locker
        .as_deref()
        .or(config.locker.as_deref())
        .context("No lock contract configured (use --locker or `locker` in config.toml)")?;
    let raw = raw.trim();
    parse_address(raw).with_context(|| format!("Invalid lock contract address: {raw}"))
}

fn catalog_from_args_and_config(args: &Args, config: &config::Config) -> Result<TokenCatalog> {
    let list_path = args
        .token_list
        .clone()
        .or_else(|| config.token_list.as_deref().and_then(expand_path));

    let mut seed = match list_path {
        Some(path) => token_list::load(&path)?,
        None => token_list::bundled()?,
    };

    for spec in &config.tokens {
        match spec.to_token() {
            Some(token) => seed.push(token),
            None => tracing::warn!(address = %spec.address, "skipping config token"),
        }
    }

    Ok(TokenCatalog::new(seed))
}

fn normalize_http_endpoint(endpoint: &str) -> String {
    let trimmed = endpoint.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    }
}

fn expand_path(path: &str) -> Option<PathBuf> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(rest) = trimmed.strip_prefix("~/") {
        let home = std::env::var_os("HOME")?;
        return Some(PathBuf::from(home).join(rest));
    }
    Some(PathBuf::from(trimmed))
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    if app.help_open {
        if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc) {
            app.help_open = false;
        }
        return;
    }

    if app.workflow.withdraw_succeeded() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
            app.dismiss_success();
        }
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
        InputMode::Command => handle_command_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('?') => app.help_open = true,
        KeyCode::Char(':') => {
            app.command.input.clear();
            app.input_mode = InputMode::Command;
        }
        KeyCode::Char('i') | KeyCode::Char('/') => app.input_mode = InputMode::Editing,
        KeyCode::Char('w') => app.withdraw(),
        KeyCode::Char('r') => app.refresh(),
        KeyCode::Char('t') => app.request_transfers(),
        KeyCode::Down | KeyCode::Char('j') => app.move_suggestion(true),
        KeyCode::Up | KeyCode::Char('k') => app.move_suggestion(false),
        KeyCode::Enter => app.submit_input(),
        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.input_mode = InputMode::Normal,
        KeyCode::Enter => app.submit_input(),
        KeyCode::Down => app.move_suggestion(true),
        KeyCode::Up => app.move_suggestion(false),
        KeyCode::Backspace => app.input_backspace(),
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => app.clear_input(),
        KeyCode::Char(c) => app.input_char(c),
        _ => {}
    }
}

fn handle_command_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.command.input.clear();
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            let command = parse_command(&app.command.input);
            app.command.input.clear();
            app.input_mode = InputMode::Normal;
            app.run_command(command);
        }
        KeyCode::Backspace => {
            app.command.input.pop();
        }
        KeyCode::Char(c) => app.command.input.push(c),
        _ => {}
    }
}
