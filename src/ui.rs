//! Rendering for boardwatch's single-screen TUI.
//!
//! Layout, top to bottom: a header with catalog statistics, the search and
//! filter status line, the product list, and a footer carrying either key
//! hints or a transient toast. Modals (alert, detail, help) render centered
//! over everything else.
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, Paragraph, Wrap},
};

use crate::{
    state::{AppState, DataOrigin, Focus, Modal, Product},
    theme::{Theme, theme},
    util::{ellipsize, format_price, human_age},
};

/// Render one full frame.
pub fn ui(f: &mut Frame, app: &mut AppState) {
    let th = theme();
    let area = f.area();

    let bg = Block::default().style(Style::default().bg(th.base));
    f.render_widget(bg, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(area);

    render_header(f, app, &th, chunks[0]);
    render_search_line(f, app, &th, chunks[1]);
    render_list(f, app, &th, chunks[2]);
    render_footer(f, app, &th, chunks[3]);

    match app.modal.clone() {
        Modal::Alert { message } => render_alert(f, &th, area, &message),
        Modal::Detail { product } => render_detail(f, &th, area, &product),
        Modal::Help => render_help(f, &th, area),
        Modal::None => {}
    }
}

fn render_header(f: &mut Frame, app: &AppState, th: &Theme, area: Rect) {
    let mut title_spans = vec![Span::styled(
        "Boardwatch",
        Style::default().fg(th.accent).add_modifier(Modifier::BOLD),
    )];
    if app.loading {
        title_spans.push(Span::styled(
            "  fetching catalog…",
            Style::default().fg(th.faint),
        ));
    }

    let stats_line = if app.origin.is_some() {
        let mut spans = vec![
            Span::styled(
                format!("{} products", app.stats.total),
                Style::default().fg(th.text),
            ),
            Span::styled("  •  ", Style::default().fg(th.faint)),
            Span::styled(
                format!("{} brands", app.stats.brands),
                Style::default().fg(th.text),
            ),
            Span::styled("  •  ", Style::default().fg(th.faint)),
            Span::styled(
                format!("updated {}", app.stats.last_updated),
                Style::default().fg(th.subtext),
            ),
        ];
        if app.origin == Some(DataOrigin::Cache) {
            let marker = match app.cache_age {
                Some(age) => format!("  [cached {} ago, possibly stale]", human_age(age)),
                None => "  [cached, possibly stale]".to_string(),
            };
            spans.push(Span::styled(
                marker,
                Style::default().fg(th.warn).add_modifier(Modifier::BOLD),
            ));
        }
        Line::from(spans)
    } else if app.load_failed {
        Line::from(Span::styled(
            "Catalog unavailable - press r to retry",
            Style::default().fg(th.err),
        ))
    } else {
        Line::from(Span::styled("Loading…", Style::default().fg(th.faint)))
    };

    let header = Paragraph::new(vec![Line::from(title_spans), stats_line]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(th.border)),
    );
    f.render_widget(header, area);
}

fn render_search_line(f: &mut Frame, app: &AppState, th: &Theme, area: Rect) {
    let search_focused = matches!(app.focus, Focus::Search);
    let mut spans = vec![
        Span::styled(
            "> ",
            Style::default().fg(if search_focused { th.accent } else { th.faint }),
        ),
        Span::styled(
            app.view.search_keyword().to_string(),
            Style::default().fg(if search_focused { th.text } else { th.subtext }),
        ),
    ];
    if search_focused {
        spans.push(Span::styled("█", Style::default().fg(th.accent)));
    }

    let brand = if app.view.brand_filter().is_empty() {
        "all".to_string()
    } else {
        app.view.brand_filter().to_string()
    };
    let mut status = format!("   brand: {brand}  sort: {}", app.view.sort_key().label());
    if app.view.discount_only() {
        status.push_str("  discounts only");
    }
    spans.push(Span::styled(status, Style::default().fg(th.faint)));

    let search = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .title(Span::styled("Search", Style::default().fg(th.faint)))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(if search_focused {
                th.accent
            } else {
                th.border
            })),
    );
    f.render_widget(search, area);
}

/// Build the list line for one product.
fn product_line(p: &Product, th: &Theme, width: usize) -> Line<'static> {
    let name_width = width.saturating_sub(34).max(12);
    let mut segs = vec![
        Span::styled(
            format!("{:<12} ", ellipsize(&p.brand, 12)),
            Style::default().fg(th.brand),
        ),
        Span::styled(
            format!("{:<w$} ", ellipsize(&p.name, name_width), w = name_width),
            Style::default().fg(th.text).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("{:>9}", format_price(p.current_price)),
            Style::default().fg(th.price),
        ),
    ];
    if let Some(original) = p.original_price
        && p.current_price.is_some_and(|c| c < original)
    {
        segs.push(Span::styled(
            format!("  {}", format_price(Some(original))),
            Style::default()
                .fg(th.faint)
                .add_modifier(Modifier::CROSSED_OUT),
        ));
    }
    if !p.discount.trim().is_empty() {
        segs.push(Span::styled(
            format!("  -{}", p.discount.trim_start_matches('-')),
            Style::default().fg(th.warn).add_modifier(Modifier::BOLD),
        ));
    }
    if !p.category.is_empty() {
        segs.push(Span::styled(
            format!("  {}", p.category),
            Style::default().fg(th.subtext),
        ));
    }
    Line::from(segs)
}

fn render_list(f: &mut Frame, app: &mut AppState, th: &Theme, area: Rect) {
    let visible = app.view.visible();
    let width = area.width.saturating_sub(4) as usize;
    let items: Vec<ListItem> = visible.iter().map(|p| ListItem::new(product_line(p, th, width))).collect();

    let list_focused = matches!(app.focus, Focus::List);
    let title = format!(
        "Products ({} of {})",
        visible.len(),
        app.view.filtered_len()
    );
    let list = List::new(items)
        .style(Style::default().fg(th.text).bg(th.base))
        .block(
            Block::default()
                .title(Span::styled(title, Style::default().fg(th.faint)))
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(if list_focused { th.accent } else { th.border })),
        )
        .highlight_style(Style::default().fg(th.mantle).bg(th.highlight))
        .highlight_symbol("> ");
    f.render_stateful_widget(list, area, &mut app.list_state);
}

fn render_footer(f: &mut Frame, app: &AppState, th: &Theme, area: Rect) {
    let line = if let Some(msg) = &app.toast_message {
        Line::from(Span::styled(
            format!(" {msg}"),
            Style::default().fg(th.warn).add_modifier(Modifier::BOLD),
        ))
    } else {
        let mut hints =
            " Tab focus  /: search  b: brand  d: discounts  s: sort  r: refresh  Enter: details  y/p: copy  ?: help  q: quit".to_string();
        if app.view.has_more() {
            hints.push_str("  ↓ more");
        }
        Line::from(Span::styled(hints, Style::default().fg(th.faint)))
    };
    f.render_widget(Paragraph::new(line), area);
}

/// Centered rectangle with the given percentage size.
fn centered_rect(pct_x: u16, pct_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - pct_y) / 2),
            Constraint::Percentage(pct_y),
            Constraint::Percentage((100 - pct_y) / 2),
        ])
        .split(area);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - pct_x) / 2),
            Constraint::Percentage(pct_x),
            Constraint::Percentage((100 - pct_x) / 2),
        ])
        .split(vertical[1]);
    horizontal[1]
}

fn render_alert(f: &mut Frame, th: &Theme, area: Rect, message: &str) {
    let rect = centered_rect(60, 30, area);
    f.render_widget(Clear, rect);
    let body = Paragraph::new(vec![
        Line::from(Span::styled(message.to_string(), Style::default().fg(th.text))),
        Line::from(""),
        Line::from(Span::styled(
            "Esc to dismiss",
            Style::default().fg(th.faint),
        )),
    ])
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .title(Span::styled("Notice", Style::default().fg(th.err)))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(th.err))
            .style(Style::default().bg(th.mantle)),
    );
    f.render_widget(body, rect);
}

fn render_detail(f: &mut Frame, th: &Theme, area: Rect, p: &Product) {
    let rect = centered_rect(70, 60, area);
    f.render_widget(Clear, rect);

    let field = |label: &str, value: String| -> Line<'static> {
        Line::from(vec![
            Span::styled(format!("{label:<10}"), Style::default().fg(th.faint)),
            Span::styled(value, Style::default().fg(th.text)),
        ])
    };
    let mut lines = vec![
        field("Brand", p.brand.clone()),
        field("Name", p.name.clone()),
        field("Price", format_price(p.current_price)),
    ];
    if p.original_price.is_some() {
        lines.push(field("Was", format_price(p.original_price)));
    }
    if !p.discount.trim().is_empty() {
        lines.push(field("Discount", p.discount.clone()));
    }
    if !p.category.is_empty() {
        lines.push(field("Category", p.category.clone()));
    }
    if let Some(url) = &p.product_url {
        lines.push(field("Link", url.clone()));
    }
    if !p.image_url.is_empty() {
        lines.push(field("Image", p.image_url.clone()));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "y: copy link  p: copy price info  Esc: close",
        Style::default().fg(th.faint),
    )));

    let title = if p.name.is_empty() { "Product" } else { p.name.as_str() };
    let body = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .title(Span::styled(
                title.to_string(),
                Style::default().fg(th.accent).add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(th.accent))
            .style(Style::default().bg(th.mantle)),
    );
    f.render_widget(body, rect);
}

fn render_help(f: &mut Frame, th: &Theme, area: Rect) {
    let rect = centered_rect(50, 60, area);
    f.render_widget(Clear, rect);
    let entry = |keys: &str, what: &str| -> Line<'static> {
        Line::from(vec![
            Span::styled(format!("  {keys:<12}"), Style::default().fg(th.accent)),
            Span::styled(what.to_string(), Style::default().fg(th.text)),
        ])
    };
    let lines = vec![
        entry("Tab", "switch focus between search and list"),
        entry("type", "edit the search keyword (search focus)"),
        entry("j/k, ↑/↓", "move selection, reveal more at the bottom"),
        entry("PgUp/PgDn", "move by a whole page"),
        entry("g/G", "jump to top/bottom"),
        entry("b/B", "cycle brand filter forward/backward"),
        entry("d", "toggle discounted-only"),
        entry("s", "cycle sort: name, brand, price"),
        entry("r, F5", "refresh the catalog"),
        entry("Enter", "open product details"),
        entry("y", "copy product link"),
        entry("p", "copy brand, name and price"),
        entry("q, Esc", "quit"),
    ];
    let body = Paragraph::new(lines).block(
        Block::default()
            .title(Span::styled("Keys", Style::default().fg(th.accent)))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(th.border))
            .style(Style::default().bg(th.mantle)),
    );
    f.render_widget(body, rect);
}
