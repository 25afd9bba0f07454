use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::form::{FormField, TaskForm};
use crate::list::{LoadState, Modal, NotificationKind, TaskList};
use crate::task::{format_due_date, status_color, StatusColor, Task, TaskStatus};

pub fn color_for(status: TaskStatus) -> Color {
    match status_color(status) {
        StatusColor::Primary => Color::Blue,
        StatusColor::Accent => Color::Magenta,
        StatusColor::Warn => Color::Red,
    }
}

pub fn render(f: &mut Frame, list: &TaskList) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(f.area());

    render_header(f, chunks[0], list);
    render_tasks(f, chunks[1], list);
    render_status_bar(f, chunks[2], list);
    render_help(f, chunks[3], list);

    let area = f.area();
    match &list.modal {
        Some(Modal::Form(form)) => render_form(f, area, form),
        Some(Modal::ConfirmDelete(task)) => render_confirmation(f, area, task),
        None => {}
    }
}

fn render_header(f: &mut Frame, area: Rect, list: &TaskList) {
    let filter = list.filter.map_or("ALL", |s| s.as_str());
    let mut spans = vec![
        Span::styled(
            "Tasks",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" | "),
        Span::styled(format!("Filter: {}", filter), Style::default().fg(Color::Yellow)),
    ];
    if list.load_state == LoadState::Loading {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled("Loading...", Style::default().fg(Color::Red)));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn task_line(task: &Task) -> Line<'_> {
    let mut spans = vec![
        Span::raw(format!("[#{}] ", task.short_id())),
        Span::styled(
            format!("{:<11} ", task.status.as_str()),
            Style::default().fg(color_for(task.status)),
        ),
        Span::styled(&task.title, Style::default().fg(Color::White)),
    ];
    if let Some(due_date) = &task.due_date {
        spans.push(Span::raw(format!(" (Due: {})", format_due_date(due_date))));
    }
    Line::from(spans)
}

fn render_tasks(f: &mut Frame, area: Rect, list: &TaskList) {
    let items: Vec<ListItem> = if list.tasks.is_empty() && list.load_state == LoadState::Displaying
    {
        vec![ListItem::new(Line::from(Span::styled(
            "No tasks",
            Style::default().add_modifier(Modifier::DIM),
        )))]
    } else {
        list.tasks.iter().map(|t| ListItem::new(task_line(t))).collect()
    };

    let widget = List::new(items)
        .block(Block::default().borders(Borders::ALL))
        .highlight_style(Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED));

    let mut state = ListState::default();
    if !list.tasks.is_empty() {
        state.select(Some(list.selected));
    }
    f.render_stateful_widget(widget, area, &mut state);
}

fn render_status_bar(f: &mut Frame, area: Rect, list: &TaskList) {
    let line = match &list.notification {
        Some(notification) => {
            let color = match notification.kind {
                NotificationKind::Success => Color::Green,
                NotificationKind::Error => Color::Red,
            };
            Line::from(Span::styled(
                notification.message.as_str(),
                Style::default().fg(color),
            ))
        }
        None => Line::from(format!("{} task(s)", list.tasks.len())),
    };
    f.render_widget(Paragraph::new(line), area);
}

fn render_help(f: &mut Frame, area: Rect, list: &TaskList) {
    let keys: &[(&str, &str)] = match list.modal {
        Some(Modal::Form(_)) => &[
            ("Tab/↑↓", "fields"),
            ("←→", "status"),
            ("Enter", "save"),
            ("Esc", "cancel"),
        ],
        Some(Modal::ConfirmDelete(_)) => &[("y", "delete"), ("n/Esc", "keep")],
        None => &[
            ("n", "new"),
            ("e", "edit"),
            ("d", "delete"),
            ("f", "filter"),
            ("r", "reload"),
            ("q", "quit"),
        ],
    };
    let spans: Vec<Span> = keys
        .iter()
        .flat_map(|(key, action)| {
            [
                Span::styled(format!("{} ", key), Style::default().fg(Color::Cyan)),
                Span::styled(format!("{}  ", action), Style::default().fg(Color::Gray)),
            ]
        })
        .collect();
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_form(f: &mut Frame, area: Rect, form: &TaskForm) {
    let popup_area = centered_rect(70, 60, area);
    f.render_widget(Clear, popup_area);

    let title = if form.is_edit_mode() {
        " Edit Task "
    } else {
        " New Task "
    };
    let block = Block::default()
        .title(title)
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let mut content = vec![Line::from("")];
    for field in FormField::ALL {
        let focused = form.focused == field;
        let label_style = if focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        let value = match field {
            FormField::Title => Span::raw(form.title.as_str()),
            FormField::Description => Span::raw(form.description.as_str()),
            FormField::Status => Span::styled(
                format!("< {} >", form.status),
                Style::default().fg(color_for(form.status)),
            ),
            FormField::DueDate => Span::raw(form.due_date.as_str()),
        };
        let mut spans = vec![Span::styled(format!("{:<13}", field.label()), label_style), value];
        if focused && field != FormField::Status {
            spans.push(Span::styled("█", Style::default().fg(Color::Yellow)));
        }
        content.push(Line::from(spans));
        content.push(Line::from(""));
    }

    if let Some(error) = &form.error_message {
        content.push(Line::from(vec![
            Span::styled("Error: ", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
            Span::styled(error.as_str(), Style::default().fg(Color::Red)),
        ]));
    }

    let paragraph = Paragraph::new(content)
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, popup_area);
}

fn render_confirmation(f: &mut Frame, area: Rect, task: &Task) {
    let popup_area = centered_rect(50, 35, area);
    f.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(" Delete Task ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Are you sure you want to delete this task?",
            Style::default().fg(Color::Yellow),
        )),
        Line::from(Span::raw(task.title.as_str())),
        Line::from(""),
        Line::from(vec![
            Span::styled("[y] ", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
            Span::raw("Yes  "),
            Span::styled("[n] ", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
            Span::raw("No"),
        ]),
    ];

    let paragraph = Paragraph::new(content)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
