use std::time::{Duration, Instant};

use alloy::primitives::Address;

use crate::core::Command;
use crate::domain::{
    parse_address, ChainError, Report, Request, Token, WithdrawalWorkflow,
};
use crate::infrastructure::{RuntimeCommand, RuntimeEvent, TransferRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    /// Typing into the token field
    Editing,
    Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub level: StatusLevel,
    pub since: Instant,
}

#[derive(Debug, Clone, Default)]
pub struct CommandBar {
    pub input: String,
}

#[derive(Debug)]
pub struct App {
    pub workflow: WithdrawalWorkflow,
    /// Token field contents: a name prefix or a pasted address
    pub input: String,
    pub selected_suggestion: usize,
    pub input_mode: InputMode,
    pub command: CommandBar,
    pub status: Option<StatusMessage>,
    pub locker: Address,
    pub endpoint: String,
    pub endpoints: Vec<String>,
    pub connected: bool,
    pub chain_id: Option<u64>,
    pub sender: Option<Address>,
    pub transfers: Vec<TransferRecord>,
    pub help_open: bool,
    pub should_quit: bool,
    outbox: Vec<RuntimeCommand>,
}

impl App {
    pub fn new(workflow: WithdrawalWorkflow, locker: Address) -> Self {
        Self {
            workflow,
            input: String::new(),
            selected_suggestion: 0,
            input_mode: InputMode::Editing,
            command: CommandBar::default(),
            status: None,
            locker,
            endpoint: String::new(),
            endpoints: Vec::new(),
            connected: false,
            chain_id: None,
            sender: None,
            transfers: Vec::new(),
            help_open: false,
            should_quit: false,
            outbox: Vec::new(),
        }
    }

    pub fn set_status(&mut self, text: impl Into<String>, level: StatusLevel) {
        self.status = Some(StatusMessage {
            text: text.into(),
            level,
            since: Instant::now(),
        });
    }

    pub fn status_text(&self) -> Option<(&str, StatusLevel)> {
        self.status
            .as_ref()
            .map(|status| (status.text.as_str(), status.level))
    }

    pub fn on_tick(&mut self) {
        if let Some(status) = self.status.as_ref() {
            if status.since.elapsed() > Duration::from_secs(4) {
                self.status = None;
            }
        }
    }

    /// Commands queued for the runtime since the last call
    pub fn take_commands(&mut self) -> Vec<RuntimeCommand> {
        std::mem::take(&mut self.outbox)
    }

    fn submit(&mut self, request: Request) {
        tracing::debug!(action = %request.action(), ticket = ?request.ticket(), "queued");
        self.outbox.push(RuntimeCommand::Execute(request));
    }

    /// Catalog entries matching the token field
    pub fn suggestions(&self) -> Vec<&Token> {
        if parse_address(self.input.trim()).is_some() {
            return Vec::new();
        }
        self.workflow.catalog().filter(self.input.trim_start())
    }

    pub fn input_char(&mut self, c: char) {
        self.input.push(c);
        self.on_input_changed();
    }

    pub fn input_backspace(&mut self) {
        self.input.pop();
        self.on_input_changed();
    }

    pub fn clear_input(&mut self) {
        self.input.clear();
        self.on_input_changed();
    }

    /// A pasted or typed address is looked up as soon as it is complete.
    fn on_input_changed(&mut self) {
        self.selected_suggestion = 0;

        // pasted addresses often carry a trailing newline or space
        let raw = self.input.trim();
        let Some(address) = parse_address(raw) else {
            return;
        };
        if self.workflow.selected_token().map(|t| t.address) == Some(address) {
            return;
        }
        if let Some(request) = self.workflow.select_by_address(raw) {
            if matches!(request, Request::DiscoverToken { .. }) {
                self.set_status("Reading token from chain…", StatusLevel::Info);
            }
            self.submit(request);
        }
    }

    pub fn move_suggestion(&mut self, down: bool) {
        let len = self.suggestions().len();
        if len == 0 {
            self.selected_suggestion = 0;
            return;
        }
        self.selected_suggestion = if down {
            (self.selected_suggestion + 1).min(len - 1)
        } else {
            self.selected_suggestion.saturating_sub(1)
        };
    }

    /// Enter in the token field
    pub fn submit_input(&mut self) {
        if parse_address(self.input.trim()).is_some() {
            self.on_input_changed();
            self.input_mode = InputMode::Normal;
            return;
        }

        let Some(token) = self
            .suggestions()
            .get(self.selected_suggestion)
            .map(|token| (*token).clone())
        else {
            if !self.input.trim().is_empty() {
                self.set_status(
                    "No match. For a custom token, paste its full address",
                    StatusLevel::Warn,
                );
            }
            return;
        };

        self.select_token(token);
        self.input_mode = InputMode::Normal;
    }

    pub fn select_token(&mut self, token: Token) {
        self.input = token.symbol.clone();
        self.selected_suggestion = 0;
        let request = self.workflow.select_from_catalog(token);
        self.submit(request);
    }

    pub fn withdraw(&mut self) {
        match self.workflow.withdraw() {
            Some(request) => {
                self.set_status("Waiting for wallet signature…", StatusLevel::Info);
                self.submit(request);
            }
            None => self.set_status("Select a token first", StatusLevel::Warn),
        }
    }

    pub fn withdraw_early(&mut self) {
        if let Err(err) = self.workflow.withdraw_early() {
            self.set_status(err.to_string(), StatusLevel::Error);
        }
    }

    pub fn refresh(&mut self) {
        match self.workflow.refresh_balance() {
            Some(request) => self.submit(request),
            None => self.set_status("Select a token first", StatusLevel::Warn),
        }
    }

    pub fn dismiss_success(&mut self) {
        self.workflow.dismiss_success();
    }

    pub fn request_transfers(&mut self) {
        self.outbox.push(RuntimeCommand::FetchTransfers);
    }

    pub fn run_command(&mut self, command: Command) {
        match command {
            Command::Token(query) => {
                if parse_address(&query).is_some() {
                    self.input = query;
                    self.on_input_changed();
                    return;
                }
                let found = self.workflow.catalog().filter(&query).first().map(|t| (*t).clone());
                match found {
                    Some(token) => self.select_token(token),
                    None => self.set_status(format!("No token named {query}"), StatusLevel::Warn),
                }
            }
            Command::Withdraw => self.withdraw(),
            Command::WithdrawEarly => self.withdraw_early(),
            Command::Refresh => self.refresh(),
            Command::Transfers => self.request_transfers(),
            Command::Connect(index) => {
                if index >= self.endpoints.len() {
                    self.set_status(
                        format!("No endpoint {index} ({} configured)", self.endpoints.len()),
                        StatusLevel::Warn,
                    );
                    return;
                }
                self.connected = false;
                self.outbox.push(RuntimeCommand::SwitchEndpoint { index });
                self.set_status(format!("Connecting to {}…", self.endpoints[index]), StatusLevel::Info);
            }
            Command::Help => self.help_open = true,
            Command::Quit => self.should_quit = true,
            Command::Unknown(input) => {
                self.set_status(format!("Unknown command: {input}"), StatusLevel::Warn)
            }
        }
    }

    pub fn apply_event(&mut self, event: RuntimeEvent) {
        match event {
            RuntimeEvent::Connected {
                endpoint,
                chain_id,
                sender,
            } => {
                self.connected = true;
                self.chain_id = Some(chain_id);
                self.sender = sender;
                self.set_status(format!("Connected to {endpoint}"), StatusLevel::Info);
                self.endpoint = endpoint;
            }
            RuntimeEvent::Outcome(outcome) => {
                let report = self.workflow.apply(outcome);
                self.present(report);
            }
            RuntimeEvent::TransfersReady { transfers } => {
                self.set_status(
                    format!("{} transfers indexed", transfers.len()),
                    StatusLevel::Info,
                );
                self.transfers = transfers;
            }
            RuntimeEvent::Error { message } => {
                tracing::warn!(%message, "runtime error");
                self.set_status(message, StatusLevel::Error);
            }
        }
    }

    fn present(&mut self, report: Report) {
        match report {
            Report::BalanceShown { .. } => {}
            Report::TokenAdded { token, selected } => {
                if selected {
                    self.input = token.symbol.clone();
                    self.set_status(
                        format!("Added {} ({})", token.symbol, token.name),
                        StatusLevel::Info,
                    );
                } else {
                    self.set_status(
                        format!("Added {} to the list", token.symbol),
                        StatusLevel::Info,
                    );
                }
            }
            Report::WithdrawConfirmed { receipt, .. } => {
                tracing::info!(tx_hash = %receipt.tx_hash, "tokens transferred back to wallet");
                self.set_status("Tokens transferred back to your wallet", StatusLevel::Info);
                if let Some(request) = self.workflow.refresh_balance() {
                    self.submit(request);
                }
            }
            Report::Discarded { action, ticket } => {
                tracing::debug!(%action, ?ticket, "stale result dropped");
            }
            Report::Failed { action, error } => {
                let hint = match (&error, action) {
                    (ChainError::Reverted(_), crate::domain::Action::Withdraw) => {
                        " (lock may not have expired; early withdrawal is not supported)"
                    }
                    _ => "",
                };
                self.set_status(format!("{action} failed: {error}{hint}"), StatusLevel::Error);
            }
        }
    }
}
