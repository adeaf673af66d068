//! Token selection and withdrawal workflow
//!
//! Every operation is a pure state transition. Operations that need the
//! chain return a [`Request`] tagged with a [`Ticket`]; the runtime executes
//! it and hands the resulting [`Outcome`] back to [`WithdrawalWorkflow::apply`].
//! An outcome whose ticket no longer matches the current selection is
//! discarded, so a slow read for an old token can never overwrite the
//! balance shown for a newer one.

use std::fmt;

use alloy_primitives::{Address, U256};

use super::catalog::TokenCatalog;
use super::error::{ChainError, WorkflowError};
use super::token::{parse_address, Token, TokenAmount};

/// Correlation key attached to every request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub generation: u64,
    pub token: Address,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LockedBalance {
    #[default]
    NotLoaded,
    Loaded(TokenAmount),
}

impl LockedBalance {
    pub fn amount(&self) -> Option<TokenAmount> {
        match self {
            LockedBalance::NotLoaded => None,
            LockedBalance::Loaded(amount) => Some(*amount),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    pub token: Option<Token>,
    pub balance: LockedBalance,
    pub withdraw_succeeded: bool,
    /// Address whose token metadata is being read from chain
    pub discovering: Option<Address>,
    /// Balance read in flight for the selected token
    pub pending: Option<Ticket>,
    generation: u64,
}

impl SelectionState {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True while a balance or token read for the selection is outstanding
    pub fn is_loading(&self) -> bool {
        self.pending.is_some() || self.discovering.is_some()
    }

    fn selected_address(&self) -> Option<Address> {
        self.token.as_ref().map(|token| token.address)
    }

    fn is_current(&self, ticket: &Ticket) -> bool {
        ticket.generation == self.generation
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    LoadBalance,
    DiscoverToken,
    Withdraw,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Action::LoadBalance => "balance read",
            Action::DiscoverToken => "token lookup",
            Action::Withdraw => "withdrawal",
        };
        f.write_str(label)
    }
}

/// Chain work requested by the workflow
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// `balanceOf(lock contract)` on the token
    LoadBalance { ticket: Ticket, token: Token },
    /// Read balance, decimals, symbol and name of `ticket.token`
    DiscoverToken { ticket: Ticket },
    /// `withdraw(token)` on the lock contract
    Withdraw { ticket: Ticket, token: Token },
}

impl Request {
    pub fn ticket(&self) -> Ticket {
        match self {
            Request::LoadBalance { ticket, .. }
            | Request::DiscoverToken { ticket }
            | Request::Withdraw { ticket, .. } => *ticket,
        }
    }

    pub fn action(&self) -> Action {
        match self {
            Request::LoadBalance { .. } => Action::LoadBalance,
            Request::DiscoverToken { .. } => Action::DiscoverToken,
            Request::Withdraw { .. } => Action::Withdraw,
        }
    }

    /// Outcome for a request that never reached the chain
    pub fn fail(self, error: ChainError) -> Outcome {
        match self {
            Request::LoadBalance { ticket, .. } => Outcome::BalanceLoaded {
                ticket,
                result: Err(error),
            },
            Request::DiscoverToken { ticket } => Outcome::TokenDiscovered {
                ticket,
                result: Err(error),
            },
            Request::Withdraw { ticket, .. } => Outcome::WithdrawSettled {
                ticket,
                result: Err(error),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawReceipt {
    pub tx_hash: String,
    pub block_number: Option<u64>,
    pub gas_used: u64,
}

/// Completion of a [`Request`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    BalanceLoaded {
        ticket: Ticket,
        result: Result<U256, ChainError>,
    },
    TokenDiscovered {
        ticket: Ticket,
        result: Result<(Token, U256), ChainError>,
    },
    WithdrawSettled {
        ticket: Ticket,
        result: Result<WithdrawReceipt, ChainError>,
    },
}

impl Outcome {
    pub fn ticket(&self) -> Ticket {
        match self {
            Outcome::BalanceLoaded { ticket, .. }
            | Outcome::TokenDiscovered { ticket, .. }
            | Outcome::WithdrawSettled { ticket, .. } => *ticket,
        }
    }
}

/// What applying an outcome did, for the UI to present
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    BalanceShown {
        token: Address,
        balance: TokenAmount,
    },
    TokenAdded {
        token: Token,
        selected: bool,
    },
    WithdrawConfirmed {
        token: Address,
        receipt: WithdrawReceipt,
    },
    /// Result arrived after the selection moved on
    Discarded { action: Action, ticket: Ticket },
    Failed { action: Action, error: ChainError },
}

#[derive(Debug, Clone, Default)]
pub struct WithdrawalWorkflow {
    catalog: TokenCatalog,
    selection: SelectionState,
}

impl WithdrawalWorkflow {
    pub fn new(catalog: TokenCatalog) -> Self {
        Self {
            catalog,
            selection: SelectionState::default(),
        }
    }

    pub fn catalog(&self) -> &TokenCatalog {
        &self.catalog
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn selected_token(&self) -> Option<&Token> {
        self.selection.token.as_ref()
    }

    pub fn balance(&self) -> LockedBalance {
        self.selection.balance
    }

    pub fn withdraw_succeeded(&self) -> bool {
        self.selection.withdraw_succeeded
    }

    fn next_ticket(&mut self, token: Address) -> Ticket {
        self.selection.generation += 1;
        Ticket {
            generation: self.selection.generation,
            token,
        }
    }

    /// Select a token from the catalog and request its locked balance.
    pub fn select_from_catalog(&mut self, token: Token) -> Request {
        let ticket = self.next_ticket(token.address);
        self.selection.token = Some(token.clone());
        self.selection.balance = LockedBalance::NotLoaded;
        self.selection.withdraw_succeeded = false;
        self.selection.discovering = None;
        self.selection.pending = Some(ticket);
        Request::LoadBalance { ticket, token }
    }

    /// Select by raw user input. Malformed input is ignored.
    pub fn select_by_address(&mut self, raw: &str) -> Option<Request> {
        let address = parse_address(raw)?;

        if let Some(token) = self.catalog.get(&address).cloned() {
            return Some(self.select_from_catalog(token));
        }
        if self.selection.discovering == Some(address) {
            return None;
        }

        let ticket = self.next_ticket(address);
        self.selection.token = None;
        self.selection.balance = LockedBalance::NotLoaded;
        self.selection.withdraw_succeeded = false;
        self.selection.discovering = Some(address);
        self.selection.pending = None;
        Some(Request::DiscoverToken { ticket })
    }

    /// Re-read the balance of the selected token.
    pub fn refresh_balance(&mut self) -> Option<Request> {
        let token = self.selection.token.clone()?;
        let ticket = self.next_ticket(token.address);
        self.selection.balance = LockedBalance::NotLoaded;
        self.selection.pending = Some(ticket);
        Some(Request::LoadBalance { ticket, token })
    }

    /// Request a withdrawal of the selected token. No-op without a selection.
    pub fn withdraw(&mut self) -> Option<Request> {
        let token = self.selection.token.clone()?;
        let ticket = Ticket {
            generation: self.selection.generation,
            token: token.address,
        };
        Some(Request::Withdraw { ticket, token })
    }

    /// Withdrawal before the lock expires, against a penalty.
    pub fn withdraw_early(&self) -> Result<Request, WorkflowError> {
        if self.selection.token.is_none() {
            return Err(WorkflowError::NoTokenSelected);
        }
        Err(WorkflowError::EarlyWithdrawalUnsupported)
    }

    pub fn dismiss_success(&mut self) {
        self.selection.withdraw_succeeded = false;
    }

    pub fn apply(&mut self, outcome: Outcome) -> Report {
        match outcome {
            Outcome::BalanceLoaded { ticket, result } => self.apply_balance(ticket, result),
            Outcome::TokenDiscovered { ticket, result } => self.apply_discovery(ticket, result),
            Outcome::WithdrawSettled { ticket, result } => self.apply_withdrawal(ticket, result),
        }
    }

    fn apply_balance(&mut self, ticket: Ticket, result: Result<U256, ChainError>) -> Report {
        let matches_selection = self.selection.selected_address() == Some(ticket.token);
        if !self.selection.is_current(&ticket) || !matches_selection {
            return Report::Discarded {
                action: Action::LoadBalance,
                ticket,
            };
        }

        self.selection.pending = None;
        match result {
            Ok(raw) => {
                let decimals = self
                    .selection
                    .token
                    .as_ref()
                    .map(|token| token.decimals)
                    .unwrap_or(18);
                let balance = TokenAmount::new(raw, decimals);
                self.selection.balance = LockedBalance::Loaded(balance);
                Report::BalanceShown {
                    token: ticket.token,
                    balance,
                }
            }
            Err(error) => Report::Failed {
                action: Action::LoadBalance,
                error,
            },
        }
    }

    fn apply_discovery(
        &mut self,
        ticket: Ticket,
        result: Result<(Token, U256), ChainError>,
    ) -> Report {
        let current = self.selection.is_current(&ticket);

        match result {
            Ok((token, raw)) => {
                self.catalog.insert(token.clone());
                if !current {
                    return Report::TokenAdded {
                        token,
                        selected: false,
                    };
                }
                self.selection.discovering = None;
                self.selection.balance =
                    LockedBalance::Loaded(TokenAmount::new(raw, token.decimals));
                self.selection.token = Some(token.clone());
                Report::TokenAdded {
                    token,
                    selected: true,
                }
            }
            Err(_) if !current => Report::Discarded {
                action: Action::DiscoverToken,
                ticket,
            },
            Err(error) => {
                self.selection.discovering = None;
                Report::Failed {
                    action: Action::DiscoverToken,
                    error,
                }
            }
        }
    }

    fn apply_withdrawal(
        &mut self,
        ticket: Ticket,
        result: Result<WithdrawReceipt, ChainError>,
    ) -> Report {
        match result {
            Ok(receipt) => {
                self.selection.withdraw_succeeded = true;
                if self.selection.selected_address() == Some(ticket.token) {
                    self.selection.balance = LockedBalance::NotLoaded;
                }
                Report::WithdrawConfirmed {
                    token: ticket.token,
                    receipt,
                }
            }
            Err(error) => Report::Failed {
                action: Action::Withdraw,
                error,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(byte: u8, symbol: &str, decimals: u8) -> Token {
        Token {
            chain_id: 1,
            address: Address::repeat_byte(byte),
            name: format!("{symbol} Token"),
            symbol: symbol.to_string(),
            decimals,
            logo_uri: None,
        }
    }

    fn workflow() -> WithdrawalWorkflow {
        WithdrawalWorkflow::new(TokenCatalog::new(vec![
            token(0xaa, "USDC", 6),
            token(0xbb, "DAI", 18),
        ]))
    }

    fn units(n: u64, decimals: u8) -> U256 {
        U256::from(n) * U256::from(10u64).pow(U256::from(decimals))
    }

    #[test]
    fn test_select_issues_balance_read() {
        let mut wf = workflow();
        let usdc = token(0xaa, "USDC", 6);
        let request = wf.select_from_catalog(usdc.clone());

        assert_eq!(request.action(), Action::LoadBalance);
        assert_eq!(request.ticket().token, usdc.address);
        assert_eq!(wf.selected_token(), Some(&usdc));
        assert_eq!(wf.balance(), LockedBalance::NotLoaded);
    }

    #[test]
    fn test_balance_applies_with_token_decimals() {
        let mut wf = workflow();
        let request = wf.select_from_catalog(token(0xaa, "USDC", 6));

        let report = wf.apply(Outcome::BalanceLoaded {
            ticket: request.ticket(),
            result: Ok(units(100, 6)),
        });

        assert!(matches!(report, Report::BalanceShown { .. }));
        assert_eq!(wf.balance().amount().unwrap().to_string(), "100");
    }

    #[test]
    fn test_stale_balance_is_discarded() {
        let mut wf = workflow();
        let first = wf.select_from_catalog(token(0xaa, "USDC", 6));
        let second = wf.select_from_catalog(token(0xbb, "DAI", 18));

        let report = wf.apply(Outcome::BalanceLoaded {
            ticket: second.ticket(),
            result: Ok(units(7, 18)),
        });
        assert!(matches!(report, Report::BalanceShown { .. }));

        let report = wf.apply(Outcome::BalanceLoaded {
            ticket: first.ticket(),
            result: Ok(units(999, 6)),
        });
        assert!(matches!(report, Report::Discarded { .. }));
        assert_eq!(wf.selected_token().unwrap().symbol, "DAI");
        assert_eq!(wf.balance().amount().unwrap().to_string(), "7");
    }

    #[test]
    fn test_failed_balance_leaves_not_loaded() {
        let mut wf = workflow();
        let request = wf.select_from_catalog(token(0xaa, "USDC", 6));

        let report = wf.apply(Outcome::BalanceLoaded {
            ticket: request.ticket(),
            result: Err(ChainError::Rpc("boom".into())),
        });

        assert!(matches!(report, Report::Failed { action: Action::LoadBalance, .. }));
        assert_eq!(wf.balance(), LockedBalance::NotLoaded);
    }

    #[test]
    fn test_malformed_address_is_noop() {
        let mut wf = workflow();
        wf.select_from_catalog(token(0xaa, "USDC", 6));
        let generation = wf.selection().generation();

        assert!(wf.select_by_address("0x1234").is_none());
        assert!(wf.select_by_address("not an address").is_none());

        assert_eq!(wf.selection().generation(), generation);
        assert_eq!(wf.selected_token().unwrap().symbol, "USDC");
        assert_eq!(wf.catalog().len(), 2);
    }

    #[test]
    fn test_known_address_selects_from_catalog() {
        let mut wf = workflow();
        let addr = format!("{:?}", Address::repeat_byte(0xbb));
        let request = wf.select_by_address(&addr).unwrap();

        assert_eq!(request.action(), Action::LoadBalance);
        assert_eq!(wf.selected_token().unwrap().symbol, "DAI");
    }

    #[test]
    fn test_discovery_appends_and_selects() {
        let mut wf = workflow();
        let addr = Address::repeat_byte(0xcc);
        let request = wf.select_by_address(&format!("{addr:?}")).unwrap();
        assert_eq!(request.action(), Action::DiscoverToken);
        assert_eq!(wf.selection().discovering, Some(addr));

        // repeated input for the same address does not start another lookup
        assert!(wf.select_by_address(&format!("{addr:?}")).is_none());

        let mkr = token(0xcc, "MKR", 18);
        let report = wf.apply(Outcome::TokenDiscovered {
            ticket: request.ticket(),
            result: Ok((mkr.clone(), units(3, 18))),
        });

        assert_eq!(
            report,
            Report::TokenAdded {
                token: mkr.clone(),
                selected: true
            }
        );
        assert_eq!(wf.catalog().len(), 3);
        assert_eq!(wf.selected_token(), Some(&mkr));
        assert_eq!(wf.selection().discovering, None);
        assert_eq!(wf.balance().amount().unwrap().to_string(), "3");
    }

    #[test]
    fn test_failed_discovery_adds_nothing() {
        let mut wf = workflow();
        let addr = Address::repeat_byte(0xcc);
        let request = wf.select_by_address(&format!("{addr:?}")).unwrap();

        let report = wf.apply(Outcome::TokenDiscovered {
            ticket: request.ticket(),
            result: Err(ChainError::Decode("symbol".into())),
        });

        assert!(matches!(report, Report::Failed { action: Action::DiscoverToken, .. }));
        assert_eq!(wf.catalog().len(), 2);
        assert!(wf.selected_token().is_none());
        assert_eq!(wf.selection().discovering, None);
    }

    #[test]
    fn test_stale_discovery_adds_without_selecting() {
        let mut wf = workflow();
        let request = wf
            .select_by_address(&format!("{:?}", Address::repeat_byte(0xcc)))
            .unwrap();
        wf.select_from_catalog(token(0xaa, "USDC", 6));

        let report = wf.apply(Outcome::TokenDiscovered {
            ticket: request.ticket(),
            result: Ok((token(0xcc, "MKR", 18), units(1, 18))),
        });

        assert!(matches!(report, Report::TokenAdded { selected: false, .. }));
        assert_eq!(wf.catalog().len(), 3);
        assert_eq!(wf.selected_token().unwrap().symbol, "USDC");
        assert_eq!(wf.balance(), LockedBalance::NotLoaded);
    }

    #[test]
    fn test_withdraw_without_selection_is_noop() {
        let mut wf = workflow();
        assert!(wf.withdraw().is_none());
        assert_eq!(wf.withdraw_early(), Err(WorkflowError::NoTokenSelected));
    }

    #[test]
    fn test_withdraw_success_and_dismiss() {
        let mut wf = workflow();
        wf.select_from_catalog(token(0xaa, "USDC", 6));
        let request = wf.withdraw().unwrap();
        assert_eq!(request.action(), Action::Withdraw);

        let report = wf.apply(Outcome::WithdrawSettled {
            ticket: request.ticket(),
            result: Ok(WithdrawReceipt {
                tx_hash: "0x01".into(),
                block_number: Some(5),
                gas_used: 42_000,
            }),
        });

        assert!(matches!(report, Report::WithdrawConfirmed { .. }));
        assert!(wf.withdraw_succeeded());
        wf.dismiss_success();
        assert!(!wf.withdraw_succeeded());
    }

    #[test]
    fn test_withdraw_failure_shows_no_success() {
        let mut wf = workflow();
        wf.select_from_catalog(token(0xaa, "USDC", 6));
        let request = wf.withdraw().unwrap();

        let report = wf.apply(Outcome::WithdrawSettled {
            ticket: request.ticket(),
            result: Err(ChainError::Rejected("user rejected".into())),
        });

        assert!(matches!(report, Report::Failed { action: Action::Withdraw, .. }));
        assert!(!wf.withdraw_succeeded());
    }

    #[test]
    fn test_early_withdraw_is_rejected() {
        let mut wf = workflow();
        wf.select_from_catalog(token(0xaa, "USDC", 6));
        assert_eq!(
            wf.withdraw_early(),
            Err(WorkflowError::EarlyWithdrawalUnsupported)
        );
    }

    #[test]
    fn test_failed_balance_is_no_longer_loading() {
        let mut wf = workflow();
        let request = wf.select_from_catalog(token(0xaa, "USDC", 6));
        assert_eq!(wf.selection().pending, Some(request.ticket()));
        assert!(wf.selection().is_loading());

        wf.apply(Outcome::BalanceLoaded {
            ticket: request.ticket(),
            result: Err(ChainError::Rpc("timeout".into())),
        });

        assert_eq!(wf.balance(), LockedBalance::NotLoaded);
        assert!(!wf.selection().is_loading());

        let retry = wf.refresh_balance().unwrap();
        assert_eq!(wf.selection().pending, Some(retry.ticket()));
    }

    #[test]
    fn test_stale_balance_keeps_newer_read_pending() {
        let mut wf = workflow();
        let first = wf.select_from_catalog(token(0xaa, "USDC", 6));
        let second = wf.select_from_catalog(token(0xbb, "DAI", 18));

        wf.apply(Outcome::BalanceLoaded {
            ticket: first.ticket(),
            result: Err(ChainError::Rpc("late".into())),
        });
        assert_eq!(wf.selection().pending, Some(second.ticket()));
    }

    #[test]
    fn test_unreached_request_fails_with_disconnected() {
        let mut wf = workflow();
        let request = wf.select_from_catalog(token(0xaa, "USDC", 6));
        let outcome = request.clone().fail(ChainError::Disconnected);

        assert_eq!(outcome.ticket(), request.ticket());
        let report = wf.apply(outcome);
        assert_eq!(
            report,
            Report::Failed {
                action: Action::LoadBalance,
                error: ChainError::Disconnected
            }
        );
        assert!(!wf.selection().is_loading());
    }

    #[test]
    fn test_stale_failed_discovery_is_discarded() {
        let mut wf = workflow();
        let request = wf
            .select_by_address(&format!("{:?}", Address::repeat_byte(0xcc)))
            .unwrap();
        wf.select_from_catalog(token(0xaa, "USDC", 6));

        let report = wf.apply(Outcome::TokenDiscovered {
            ticket: request.ticket(),
            result: Err(ChainError::Rpc("gone".into())),
        });

        assert!(matches!(
            report,
            Report::Discarded {
                action: Action::DiscoverToken,
                ..
            }
        ));
        assert_eq!(wf.catalog().len(), 2);
        assert_eq!(wf.selected_token().unwrap().symbol, "USDC");
    }

    #[test]
    fn test_upper_prefix_and_padded_address_are_ignored() {
        let mut wf = workflow();
        assert!(wf
            .select_by_address(&format!("0X{}", "cc".repeat(20)))
            .is_none());
        assert!(wf
            .select_by_address(&format!(" 0x{} ", "dd".repeat(20)))
            .is_none());
        assert_eq!(wf.selection().generation(), 0);
        assert_eq!(wf.selection().discovering, None);
    }

    #[test]
    fn test_refresh_invalidates_older_reads() {
        let mut wf = workflow();
        let first = wf.select_from_catalog(token(0xaa, "USDC", 6));
        let refresh = wf.refresh_balance().unwrap();

        let report = wf.apply(Outcome::BalanceLoaded {
            ticket: first.ticket(),
            result: Ok(units(1, 6)),
        });
        assert!(matches!(report, Report::Discarded { .. }));

        wf.apply(Outcome::BalanceLoaded {
            ticket: refresh.ticket(),
            result: Ok(U256::ZERO),
        });
        assert!(wf.balance().amount().unwrap().is_zero());
    }
}
