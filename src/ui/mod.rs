use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

pub mod layout;

use crate::app::{App, InputMode, StatusLevel};
use crate::domain::{short_address, to_checksum_address, LockedBalance};

pub fn draw(f: &mut Frame, app: &App) {
    let areas = layout::areas(f.size());

    draw_header(f, areas.header, app);
    draw_token_input(f, areas.token_input, app);
    draw_suggestions(f, areas.suggestions, app);
    draw_details(f, areas.details, app);
    draw_status_line(f, areas.status_line, app);
    draw_command_line(f, areas.command_line, app);

    if app.workflow.withdraw_succeeded() {
        draw_success_popup(f, areas.size, app);
    }
    if app.help_open {
        draw_help_popup(f, areas.size);
    }
}

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let endpoint = if app.endpoint.is_empty() {
        "--".to_string()
    } else {
        app.endpoint.clone()
    };
    let title = Line::from(vec![
        Span::styled(
            "Unlock",
            Style::default()
                .fg(Color::LightCyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled("RPC", Style::default().fg(Color::DarkGray)),
        Span::raw(format!(" {} ", endpoint)),
        Span::styled("Chain", Style::default().fg(Color::DarkGray)),
        Span::raw(format!(
            " {}",
            app.chain_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "--".to_string())
        )),
    ]);

    let left = Paragraph::new(title)
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Left);

    let wallet = app
        .sender
        .as_ref()
        .map(short_address)
        .unwrap_or_else(|| "--".to_string());
    let right_line = Line::from(vec![
        Span::styled("Wallet ", Style::default().fg(Color::DarkGray)),
        Span::raw(format!("{}  ", wallet)),
        Span::styled("Locker ", Style::default().fg(Color::DarkGray)),
        Span::raw(short_address(&app.locker)),
    ]);
    let right = Paragraph::new(right_line)
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Left);

    f.render_widget(left, chunks[0]);
    f.render_widget(right, chunks[1]);
}

fn draw_token_input(f: &mut Frame, area: Rect, app: &App) {
    let editing = app.input_mode == InputMode::Editing;
    let border_style = if editing {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };

    let content = if app.input.is_empty() && !editing {
        Line::from(Span::styled(
            "Select token or paste address",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let mut spans = vec![Span::raw(app.input.clone())];
        if editing {
            spans.push(Span::styled("_", Style::default().fg(Color::Cyan)));
        }
        Line::from(spans)
    };

    let paragraph = Paragraph::new(content).block(
        Block::default()
            .title("Token")
            .borders(Borders::ALL)
            .border_style(border_style),
    );
    f.render_widget(paragraph, area);
}

fn draw_suggestions(f: &mut Frame, area: Rect, app: &App) {
    let suggestions = app.suggestions();

    let items: Vec<ListItem> = if suggestions.is_empty() {
        vec![ListItem::new(Line::from(Span::styled(
            "For custom token, input full address",
            Style::default().fg(Color::DarkGray),
        )))]
    } else {
        suggestions
            .iter()
            .map(|token| {
                ListItem::new(Line::from(vec![
                    Span::styled(
                        format!("{:<8}", token.symbol),
                        Style::default().fg(Color::LightCyan),
                    ),
                    Span::raw(token.name.clone()),
                ]))
            })
            .collect()
    };

    let mut state = ListState::default();
    if !suggestions.is_empty() {
        state.select(Some(app.selected_suggestion.min(suggestions.len() - 1)));
    }

    let list = List::new(items)
        .block(
            Block::default()
                .title(format!(
                    "Tokens ({}/{})",
                    suggestions.len(),
                    app.workflow.catalog().len()
                ))
                .borders(Borders::ALL),
        )
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    f.render_stateful_widget(list, area, &mut state);
}

fn draw_details(f: &mut Frame, area: Rect, app: &App) {
    let paragraph = Paragraph::new(Text::from(detail_lines(app)))
        .block(Block::default().title("Unlock Token").borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn detail_lines(app: &App) -> Vec<Line<'static>> {
    let label = Style::default().fg(Color::DarkGray);
    let selection = app.workflow.selection();

    let mut lines = vec![
        Line::from("Select the ERC20 token you have previously locked"),
        Line::from("and press w to get your tokens back."),
        Line::from(""),
    ];

    if let Some(address) = selection.discovering {
        lines.push(Line::from(vec![
            Span::styled("Reading ", label),
            Span::raw(to_checksum_address(&address)),
        ]));
        return lines;
    }

    let Some(token) = selection.token.as_ref() else {
        lines.push(Line::from(Span::styled("No token selected", label)));
        return lines;
    };

    lines.push(Line::from(vec![
        Span::styled("Token    ", label),
        Span::raw(token.label()),
    ]));
    lines.push(Line::from(vec![
        Span::styled("Address  ", label),
        Span::raw(token.checksum_address()),
    ]));
    lines.push(Line::from(vec![
        Span::styled("Decimals ", label),
        Span::raw(token.decimals.to_string()),
    ]));
    lines.push(Line::from(""));

    match selection.balance {
        LockedBalance::NotLoaded if selection.is_loading() => {
            lines.push(Line::from(Span::styled("Loading locked balance…", label)));
        }
        LockedBalance::NotLoaded => {
            lines.push(Line::from(Span::styled(
                "Balance unavailable, press r to retry",
                Style::default().fg(Color::LightYellow),
            )));
        }
        LockedBalance::Loaded(amount) if amount.is_zero() => {
            lines.push(Line::from("You haven't locked any amount of this token."));
        }
        LockedBalance::Loaded(amount) => {
            lines.push(Line::from(vec![
                Span::styled("Total locked: ", label),
                Span::styled(
                    format!("{} {}", amount, token.symbol),
                    Style::default()
                        .fg(Color::LightGreen)
                        .add_modifier(Modifier::BOLD),
                ),
            ]));
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "[w] Withdraw   [r] Refresh",
        Style::default().fg(Color::LightBlue),
    )));
    lines
}

fn draw_status_line(f: &mut Frame, area: Rect, app: &App) {
    let connection = if app.connected {
        Span::styled("online", Style::default().fg(Color::LightGreen))
    } else {
        Span::styled("connecting", Style::default().fg(Color::LightYellow))
    };
    let mut spans = vec![
        Span::styled("Node ", Style::default().fg(Color::DarkGray)),
        connection,
        Span::raw("  "),
        Span::styled("Tokens ", Style::default().fg(Color::DarkGray)),
        Span::raw(app.workflow.catalog().len().to_string()),
    ];
    if !app.transfers.is_empty() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            "Transfers ",
            Style::default().fg(Color::DarkGray),
        ));
        spans.push(Span::raw(app.transfers.len().to_string()));
        if let Some(latest) = app.transfers.first().and_then(|t| t.time()) {
            spans.push(Span::styled(
                format!(" (latest {})", latest.format("%Y-%m-%d %H:%M UTC")),
                Style::default().fg(Color::DarkGray),
            ));
        }
    }

    let paragraph = Paragraph::new(Line::from(spans))
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Left);
    f.render_widget(paragraph, area);
}

fn draw_command_line(f: &mut Frame, area: Rect, app: &App) {
    let content = match app.input_mode {
        InputMode::Command => Line::from(vec![
            Span::styled(": ", Style::default().fg(Color::Yellow)),
            Span::raw(app.command.input.clone()),
            Span::styled(
                "  token <addr|name> | withdraw | refresh | transfers | quit",
                Style::default().fg(Color::DarkGray),
            ),
        ]),
        InputMode::Normal | InputMode::Editing => {
            if let Some((text, level)) = app.status_text() {
                let color = match level {
                    StatusLevel::Info => Color::LightGreen,
                    StatusLevel::Warn => Color::LightYellow,
                    StatusLevel::Error => Color::LightRed,
                };
                Line::from(vec![
                    Span::styled("msg: ", Style::default().fg(Color::DarkGray)),
                    Span::styled(text.to_string(), Style::default().fg(color)),
                ])
            } else {
                action_hints(app)
            }
        }
    };

    let paragraph = Paragraph::new(content).style(Style::default().fg(Color::White));
    f.render_widget(paragraph, area);
}

fn action_hints(app: &App) -> Line<'static> {
    let hints = match app.input_mode {
        InputMode::Editing => "type to filter | ↑/↓ choose | Enter select | Esc done",
        _ => "i edit | w withdraw | r refresh | : command | ? help | q quit",
    };
    Line::from(Span::styled(hints, Style::default().fg(Color::DarkGray)))
}

fn draw_success_popup(f: &mut Frame, area: Rect, app: &App) {
    let popup_area = centered_rect(50, 30, area);
    f.render_widget(Clear, popup_area);

    let symbol = app
        .workflow
        .selected_token()
        .map(|token| token.symbol.clone())
        .unwrap_or_else(|| "Your tokens".to_string());
    let lines = vec![
        Line::from(Span::styled(
            "Withdrawal successful",
            Style::default()
                .fg(Color::LightGreen)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(format!("{symbol} transferred back to your wallet.")),
        Line::from(""),
        Line::from(Span::styled(
            "Enter / Esc to close",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let paragraph = Paragraph::new(Text::from(lines))
        .block(Block::default().title("Success").borders(Borders::ALL))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, popup_area);
}

fn draw_help_popup(f: &mut Frame, area: Rect) {
    let popup_area = centered_rect(64, 60, area);
    f.render_widget(Clear, popup_area);

    let lines = vec![
        Line::from("Token field"),
        Line::from("  i          Edit token field"),
        Line::from("  type       Filter by name (prefix)"),
        Line::from("  ↑ / ↓      Move selection"),
        Line::from("  Enter      Select token"),
        Line::from("  paste      Full address reads the token from chain"),
        Line::from("  Esc        Leave the field"),
        Line::from(""),
        Line::from("Actions"),
        Line::from("  w          Withdraw selected token"),
        Line::from("  r          Refresh locked balance"),
        Line::from("  :          Command bar"),
        Line::from("  ?          Toggle help"),
        Line::from("  q          Quit"),
        Line::from(""),
        Line::from("Commands"),
        Line::from("  :token <address|name>   :withdraw   :early"),
        Line::from("  :refresh   :transfers   :connect <n>   :quit"),
    ];

    let paragraph = Paragraph::new(Text::from(lines))
        .block(Block::default().title("Help").borders(Borders::ALL))
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: true });

    f.render_widget(paragraph, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
