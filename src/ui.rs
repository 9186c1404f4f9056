use crate::core::{DashboardCore, DashboardTab, genre_label};
use crate::dashboard::DashboardSnapshot;
use crate::model::FrequencyTable;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Cell, List, ListItem, ListState, Paragraph, Row, Table, Wrap};

const APP_TITLE: &str = "Repertoire  ";
const MAX_LABEL_WIDTH: usize = 28;

#[derive(Clone, Copy)]
struct ThemePalette {
    bg: Color,
    panel_bg: Color,
    panel_alt_bg: Color,
    border: Color,
    text: Color,
    muted: Color,
    accent: Color,
    alert: Color,
    demand: Color,
    supply: Color,
    queue: Color,
    selected_bg: Color,
}

const PALETTE: ThemePalette = ThemePalette {
    bg: Color::Rgb(10, 15, 24),
    panel_bg: Color::Rgb(19, 29, 43),
    panel_alt_bg: Color::Rgb(24, 38, 58),
    border: Color::Rgb(69, 121, 176),
    text: Color::Rgb(214, 228, 248),
    muted: Color::Rgb(149, 173, 204),
    accent: Color::Rgb(100, 203, 184),
    alert: Color::Rgb(249, 174, 88),
    demand: Color::Rgb(255, 75, 75),
    supply: Color::Rgb(30, 144, 255),
    queue: Color::Rgb(0, 204, 150),
    selected_bg: Color::Rgb(34, 55, 82),
};

pub fn draw(frame: &mut Frame, core: &DashboardCore) {
    let colors = PALETTE;
    frame.render_widget(
        Block::default().style(Style::default().bg(colors.bg)),
        frame.area(),
    );

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(3),
        ])
        .split(frame.area());

    frame.render_widget(
        Paragraph::new(kpi_line(core.snapshot.as_ref(), &colors)).block(panel_block(
            "Repertoire Dashboard",
            colors.panel_bg,
            colors.text,
            colors.border,
        )),
        vertical[0],
    );

    if let Some(message) = &core.load_error {
        draw_load_error(frame, vertical[1], message, &colors);
    } else {
        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(30), Constraint::Min(20)])
            .split(vertical[1]);
        draw_genre_list(frame, body[0], core, &colors);
        if let Some(snapshot) = &core.snapshot {
            draw_tab_area(frame, body[1], core, snapshot, &colors);
        }
    }

    let footer = Paragraph::new(Line::from(vec![
        Span::styled(
            "Keys: Up/Down move, Space toggle, a all, x clear, Tab switch view, PgUp/PgDn scroll, r reload, R force, q quit",
            Style::default().fg(colors.muted),
        ),
        Span::styled("  |  ", Style::default().fg(colors.muted)),
        Span::styled(core.status.as_str(), Style::default().fg(colors.text)),
    ]))
    .block(panel_block(
        "Message",
        colors.panel_bg,
        colors.text,
        colors.border,
    ));
    frame.render_widget(footer, vertical[2]);
}

fn kpi_line(snapshot: Option<&DashboardSnapshot>, colors: &ThemePalette) -> Line<'static> {
    let mut spans = vec![Span::styled(
        APP_TITLE,
        Style::default()
            .fg(colors.accent)
            .add_modifier(Modifier::BOLD),
    )];

    let Some(snapshot) = snapshot else {
        spans.push(Span::styled("No data loaded", Style::default().fg(colors.muted)));
        return Line::from(spans);
    };

    let kpis = &snapshot.kpis;
    let items = [
        ("Executions", kpis.executions.to_string(), colors.text),
        ("Songs played", kpis.distinct_played.to_string(), colors.text),
        ("In catalog", kpis.catalog_size.to_string(), colors.text),
        ("In queue", kpis.queue_size.to_string(), colors.queue),
        ("Turnover", kpis.turnover_label(), colors.alert),
    ];
    for (idx, (label, value, color)) in items.into_iter().enumerate() {
        if idx > 0 {
            spans.push(Span::styled("  |  ", Style::default().fg(colors.muted)));
        }
        spans.push(Span::styled(
            format!("{label} "),
            Style::default().fg(colors.muted),
        ));
        spans.push(Span::styled(
            value,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
    }
    Line::from(spans)
}

fn draw_load_error(frame: &mut Frame, area: Rect, message: &str, colors: &ThemePalette) {
    let text = vec![
        Line::from(Span::styled(
            "The sources could not be loaded. Nothing is shown until they are.",
            Style::default()
                .fg(colors.alert)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(colors.text),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Fix the file or settings.json, then press r.",
            Style::default().fg(colors.muted),
        )),
    ];
    frame.render_widget(
        Paragraph::new(text)
            .block(panel_block(
                "Load Error",
                colors.panel_bg,
                colors.text,
                colors.alert,
            ))
            .wrap(Wrap { trim: true }),
        area,
    );
}

fn draw_genre_list(frame: &mut Frame, area: Rect, core: &DashboardCore, colors: &ThemePalette) {
    let items: Vec<ListItem> = core
        .genres
        .iter()
        .map(|genre| {
            let (marker, style) = if core.is_genre_selected(genre) {
                ("[x] ", Style::default().fg(colors.accent))
            } else {
                ("[ ] ", Style::default().fg(colors.muted))
            };
            ListItem::new(Line::from(vec![
                Span::styled(marker, style),
                Span::styled(genre_label(genre).to_string(), Style::default().fg(colors.text)),
            ]))
        })
        .collect();

    let mut state = ListState::default();
    state.select((!core.genres.is_empty()).then_some(core.selected_genre));

    let title = if core.selection.is_empty() {
        String::from("Genres (no filter)")
    } else {
        format!("Genres {}/{}", core.selection.len(), core.genres.len())
    };
    let list = List::new(items)
        .block(panel_block(
            &title,
            colors.panel_bg,
            colors.text,
            colors.border,
        ))
        .highlight_style(
            Style::default()
                .bg(colors.selected_bg)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_tab_area(
    frame: &mut Frame,
    area: Rect,
    core: &DashboardCore,
    snapshot: &DashboardSnapshot,
    colors: &ThemePalette,
) {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(4)])
        .split(area);
    frame.render_widget(Paragraph::new(tab_line(core.tab, colors)), vertical[0]);

    let halves = |rect: Rect| {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(rect)
    };

    match core.tab {
        DashboardTab::Performed => {
            let columns = halves(vertical[1]);
            draw_ranking(
                frame,
                columns[0],
                "Top 10 Songs",
                snapshot.top_titles.as_ref(),
                colors.accent,
                false,
                colors,
            );
            draw_ranking(
                frame,
                columns[1],
                "Genres Performed",
                snapshot.performed_genres.as_ref(),
                colors.alert,
                true,
                colors,
            );
        }
        DashboardTab::Artists => {
            let columns = halves(vertical[1]);
            draw_ranking(
                frame,
                columns[0],
                "Most Performed (Demand)",
                snapshot.top_performed_artists.as_ref(),
                colors.demand,
                false,
                colors,
            );
            draw_ranking(
                frame,
                columns[1],
                "Largest in Catalog (Supply)",
                snapshot.top_catalog_artists.as_ref(),
                colors.supply,
                false,
                colors,
            );
        }
        DashboardTab::Queue => draw_queue(frame, vertical[1], core, snapshot, colors),
    }
}

fn tab_line(selected: DashboardTab, colors: &ThemePalette) -> Line<'static> {
    let mut spans = Vec::new();
    for (idx, tab) in DashboardTab::ALL.into_iter().enumerate() {
        if idx > 0 {
            spans.push(Span::styled(" -- ", Style::default().fg(colors.muted)));
        }
        let mut style = Style::default().fg(colors.accent);
        if tab == selected {
            style = style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
        }
        spans.push(Span::styled(format!("{} {}", idx + 1, tab.label()), style));
    }
    Line::from(spans)
}

fn draw_queue(
    frame: &mut Frame,
    area: Rect,
    core: &DashboardCore,
    snapshot: &DashboardSnapshot,
    colors: &ThemePalette,
) {
    let queue = snapshot.queue();
    if queue.is_empty() {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                "Queue cleared! Every song under this filter has been performed.",
                Style::default()
                    .fg(colors.queue)
                    .add_modifier(Modifier::BOLD),
            )))
            .block(panel_block(
                "Queue",
                colors.panel_alt_bg,
                colors.text,
                colors.border,
            ))
            .wrap(Wrap { trim: true }),
            area,
        );
        return;
    }

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(vertical[0]);

    draw_ranking(
        frame,
        columns[0],
        "Artists with Most Songs Waiting",
        snapshot.top_queue_artists.as_ref(),
        colors.queue,
        false,
        colors,
    );
    draw_ranking(
        frame,
        columns[1],
        "Genres Waiting",
        snapshot.queue_genres.as_ref(),
        colors.queue,
        true,
        colors,
    );

    let header = Row::new(vec![
        Cell::from("Title"),
        Cell::from("Artist"),
        Cell::from("Genre"),
    ])
    .style(
        Style::default()
            .fg(colors.accent)
            .add_modifier(Modifier::BOLD),
    );
    let rows: Vec<Row> = queue
        .rows()
        .iter()
        .skip(core.queue_scroll)
        .map(|entry| {
            Row::new(vec![
                Cell::from(entry.title.clone()),
                Cell::from(entry.artist.clone()),
                Cell::from(genre_label(&entry.genre).to_string()),
            ])
            .style(Style::default().fg(colors.text))
        })
        .collect();
    let title = format!(
        "Queue: {} songs available ({}-{})",
        queue.len(),
        core.queue_scroll + 1,
        queue.len()
    );
    let table = Table::new(
        rows,
        [
            Constraint::Percentage(45),
            Constraint::Percentage(35),
            Constraint::Percentage(20),
        ],
    )
    .header(header)
    .block(panel_block(
        &title,
        colors.panel_alt_bg,
        colors.text,
        colors.border,
    ));
    frame.render_widget(table, vertical[1]);
}

fn draw_ranking(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    ranking: Option<&FrequencyTable>,
    bar_color: Color,
    show_share: bool,
    colors: &ThemePalette,
) {
    let inner_width = usize::from(area.width.saturating_sub(2));
    let lines: Vec<Line> = match ranking {
        None => vec![Line::from(Span::styled(
            "Column not present in the source",
            Style::default().fg(colors.muted),
        ))],
        Some(ranking) if ranking.is_empty() => vec![Line::from(Span::styled(
            "No rows under this filter",
            Style::default().fg(colors.muted),
        ))],
        Some(ranking) => ranking_lines(ranking, inner_width, show_share)
            .into_iter()
            .map(|(label, bar, figure)| {
                Line::from(vec![
                    Span::styled(label, Style::default().fg(colors.text)),
                    Span::styled(bar, Style::default().fg(bar_color)),
                    Span::styled(figure, Style::default().fg(colors.muted)),
                ])
            })
            .collect(),
    };

    frame.render_widget(
        Paragraph::new(lines).block(panel_block(
            title,
            colors.panel_bg,
            colors.text,
            colors.border,
        )),
        area,
    );
}

/// Label, bar and figure text for each entry, sized to `width` columns.
fn ranking_lines(
    ranking: &FrequencyTable,
    width: usize,
    show_share: bool,
) -> Vec<(String, String, String)> {
    let label_width = ranking
        .entries()
        .iter()
        .map(|entry| genre_label(&entry.label).chars().count())
        .max()
        .unwrap_or(0)
        .min(MAX_LABEL_WIDTH);
    let total = ranking.total();
    let max = ranking.max_count();

    let figures: Vec<String> = ranking
        .entries()
        .iter()
        .map(|entry| {
            if show_share && total > 0 {
                format!(" {} ({:.1}%)", entry.count, entry.count as f64 * 100.0 / total as f64)
            } else {
                format!(" {}", entry.count)
            }
        })
        .collect();
    let figure_width = figures.iter().map(String::len).max().unwrap_or(0);
    let bar_width = width.saturating_sub(label_width + 1 + figure_width);

    ranking
        .entries()
        .iter()
        .zip(figures)
        .map(|(entry, figure)| {
            let label = fit_label(genre_label(&entry.label), label_width);
            let bar = bar(entry.count, max, bar_width);
            (format!("{label} "), bar, figure)
        })
        .collect()
}

fn fit_label(label: &str, width: usize) -> String {
    let count = label.chars().count();
    if count <= width {
        return format!("{label}{}", " ".repeat(width - count));
    }
    let mut cut: String = label.chars().take(width.saturating_sub(1)).collect();
    cut.push('~');
    cut
}

fn bar(count: usize, max: usize, width: usize) -> String {
    if max == 0 || width == 0 {
        return String::new();
    }
    let filled = ((count as f64 / max as f64) * width as f64).round() as usize;
    "#".repeat(filled.clamp(1, width))
}

fn panel_block(title: &str, bg: Color, text: Color, border: Color) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            format!(" {title} "),
            Style::default().fg(text).add_modifier(Modifier::BOLD),
        ))
        .border_style(Style::default().fg(border))
        .style(Style::default().bg(bg))
}
