use super::app::{App, Focus, TreeRow};
use crate::output::value_to_cell;
use datascope_types::{FilterMode, Problem, SortOrder};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Cell, List, ListItem, ListState, Paragraph, Row, Table, Wrap},
};

pub fn draw(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(frame.area());

    if let Some(problem) = app.session().errors().panel.clone() {
        render_panel_error(frame, chunks[0], &problem);
    } else {
        let panes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(chunks[0]);
        render_tree(frame, panes[0], app);
        render_data(frame, panes[1], app);
    }

    render_footer(frame, chunks[1], app);
}

fn render_panel_error(frame: &mut Frame, area: Rect, problem: &Problem) {
    let lines = vec![
        Line::from(Span::styled(
            problem.title.clone(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(problem.detail.clone()),
        Line::from(""),
        Line::from(Span::styled(
            "[r] retry   [q] quit",
            Style::default().fg(Color::Yellow),
        )),
    ];
    let block = Block::bordered().title("Connection failed");
    frame.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: true }), area);
}

fn render_tree(frame: &mut Frame, area: Rect, app: &mut App) {
    let (tree_area, error_area) = if app.session().errors().inline.is_some() {
        let split = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(4)])
            .split(area);
        (split[0], Some(split[1]))
    } else {
        (area, None)
    };

    let rows = app.tree_rows();
    let items: Vec<ListItem> = rows.iter().map(tree_item).collect();

    let title = if app.is_editing_tree_filter() {
        format!("Tree - find: {}_", app.tree_filter())
    } else if !app.tree_filter().is_empty() {
        format!("Tree - find: {}", app.tree_filter())
    } else {
        "Tree".to_string()
    };

    let mut block = Block::bordered().title(title);
    if app.focus() == Focus::Tree {
        block = block.border_style(Style::default().fg(Color::Cyan));
    }

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD));

    let mut state = ListState::default();
    if !rows.is_empty() {
        state.select(Some(app.tree_cursor().min(rows.len() - 1)));
    }
    frame.render_stateful_widget(list, tree_area, &mut state);

    if let (Some(area), Some((at, problem))) = (error_area, app.session().errors().inline.clone()) {
        let lines = vec![
            Line::from(Span::styled(
                format!("Failed to load /{}", at),
                Style::default().fg(Color::Red),
            )),
            Line::from(Span::raw(problem.detail)),
        ];
        let block = Block::bordered()
            .title("[r] retry  [x] dismiss")
            .border_style(Style::default().fg(Color::Red));
        frame.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: true }), area);
    }
}

fn tree_item(row: &TreeRow) -> ListItem<'static> {
    let indent = "  ".repeat(row.depth.saturating_sub(1) as usize);
    let marker = if row.is_entity {
        "· "
    } else if row.shows_table {
        "≡ "
    } else if !row.expandable {
        "  "
    } else if row.expanded {
        "▾ "
    } else {
        "▸ "
    };
    let style = if row.is_entity {
        Style::default().fg(Color::White)
    } else {
        Style::default().fg(Color::Blue)
    };
    ListItem::new(Line::from(vec![
        Span::raw(format!("{}{}", indent, marker)),
        Span::styled(row.name.clone(), style),
    ]))
}

fn render_data(frame: &mut Frame, area: Rect, app: &mut App) {
    let banner = app
        .session()
        .errors()
        .query
        .clone()
        .or_else(|| app.session().errors().delete.clone());
    let editing = app.is_editing_query_filter();

    let mut constraints = Vec::new();
    if banner.is_some() {
        constraints.push(Constraint::Length(3));
    }
    if editing {
        constraints.push(Constraint::Length(3));
    }
    constraints.push(Constraint::Min(0));
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);
    let mut next = 0;

    if let Some(problem) = banner {
        let line = Line::from(vec![
            Span::styled(
                format!("{}: ", problem.title),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Span::raw(problem.detail),
        ]);
        let block = Block::bordered()
            .title("[r] retry  [x] dismiss")
            .border_style(Style::default().fg(Color::Red));
        frame.render_widget(Paragraph::new(line).block(block), chunks[next]);
        next += 1;
    }

    if editing {
        let title = match app.filter_mode() {
            FilterMode::Structured => "Filter - key=value pairs, Enter applies, Esc cancels",
            _ => "Filter - Enter applies, Esc cancels",
        };
        let block = Block::bordered().title(title);
        frame.render_widget(
            Paragraph::new(format!("{}_", app.query_draft())).block(block),
            chunks[next],
        );
        next += 1;
    }

    let content = chunks[next];
    if app.session().page().is_some() {
        render_query_table(frame, content, app);
    } else if app.session().leaf_entities().is_some() {
        render_entity_list(frame, content, app);
    } else if let Some(info) = app.session().entity_info() {
        let mut lines = vec![
            Line::from(Span::styled(
                info.name.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(format!("type: {}", info.entity_type)),
        ];
        if let Some(size) = info.size_bytes {
            lines.push(Line::from(format!("size: {} bytes", size)));
        }
        if info.is_downloadable() {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "Binary content - fetch it with 'datascope download'",
                Style::default().fg(Color::Yellow),
            )));
        }
        frame.render_widget(
            Paragraph::new(lines).block(Block::bordered().title("Entity")),
            content,
        );
    } else {
        frame.render_widget(
            Paragraph::new("Select a container or entity on the left.")
                .block(Block::bordered().title("Data")),
            content,
        );
    }
}

fn render_query_table(frame: &mut Frame, area: Rect, app: &mut App) {
    let Some(page) = app.session().page() else {
        return;
    };
    let query = app.session().query_state();
    let indicator = match query.sort_order() {
        SortOrder::Asc => " ▲",
        SortOrder::Desc => " ▼",
    };

    let columns: Vec<String> = page.fields.iter().map(|f| f.name.clone()).collect();
    let header_cells: Vec<Cell> = columns
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let mut label = name.clone();
            if query.sort_by() == Some(name.as_str()) {
                label.push_str(indicator);
            }
            let mut style = Style::default().add_modifier(Modifier::BOLD);
            if app.focus() == Focus::Data && i == app.col_cursor() {
                style = style.fg(Color::Yellow);
            }
            Cell::from(label).style(style)
        })
        .collect();

    let rows: Vec<Row> = page
        .rows
        .iter()
        .map(|record| {
            Row::new(
                columns
                    .iter()
                    .map(|c| {
                        Cell::from(value_to_cell(
                            record.get(c).unwrap_or(&serde_json::Value::Null),
                        ))
                    })
                    .collect::<Vec<Cell>>(),
            )
        })
        .collect();

    let widths: Vec<Constraint> = columns.iter().map(|_| Constraint::Min(10)).collect();

    let total = match page.total_count {
        Some(total) => format!("{} total", total),
        None => "total unknown".to_string(),
    };
    let title = format!(
        "{} - page {} · {} rows · {}",
        app.session().location_string(),
        query.page(),
        page.returned_count,
        total
    );
    let mut block = Block::bordered().title(title);
    if app.focus() == Focus::Data {
        block = block.border_style(Style::default().fg(Color::Cyan));
    }

    let table = Table::new(rows, widths)
        .header(Row::new(header_cells))
        .block(block);
    frame.render_widget(table, area);
}

fn render_entity_list(frame: &mut Frame, area: Rect, app: &mut App) {
    let Some(entities) = app.session().leaf_entities() else {
        return;
    };

    let items: Vec<ListItem> = entities
        .iter()
        .map(|e| {
            ListItem::new(Line::from(vec![
                Span::raw(e.name.clone()),
                Span::styled(format!("  {}", e.entity_type), Style::default().fg(Color::DarkGray)),
            ]))
        })
        .collect();

    let mut block = Block::bordered().title(format!("Entities ({})", entities.len()));
    if app.focus() == Focus::Data {
        block = block.border_style(Style::default().fg(Color::Cyan));
    }

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD));

    let mut state = ListState::default();
    if !entities.is_empty() {
        state.select(Some(app.entity_cursor().min(entities.len() - 1)));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_footer(frame: &mut Frame, area: Rect, app: &App) {
    let key = |label: &str| Span::styled(label.to_string(), Style::default().fg(Color::Yellow));

    let mut spans = vec![
        key("[q]"),
        Span::raw("uit "),
        key("[tab]"),
        Span::raw(" pane "),
        key("[enter]"),
        Span::raw(" open "),
        key("[/]"),
        Span::raw(" find "),
    ];
    if app.session().page().is_some() {
        spans.extend([key("[s]"), Span::raw("ort ")]);
        if app.filter_mode() != FilterMode::None {
            spans.extend([key("[f]"), Span::raw("ilter ")]);
        }
        spans.extend([key("[n/p]"), Span::raw(" page ")]);
    }
    spans.push(key("[r]"));
    spans.push(Span::raw("etry"));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
