use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{backend::Backend, Terminal};
use std::{io, time::Duration, time::Instant};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::client::TaskService;
use crate::form::FormAction;
use crate::list::{LoadState, Modal, TaskList};
use crate::task::TaskStatus;
use crate::ui;

const TICK_RATE: Duration = Duration::from_millis(250);

/// The shell: one list component, the service it talks to, and the loop
/// that feeds it keys.
pub struct App<S> {
    pub list: TaskList,
    pub service: S,
    pub should_quit: bool,
}

impl<S: TaskService> App<S> {
    pub fn new(service: S, filter: Option<TaskStatus>) -> Self {
        Self {
            list: TaskList::new(filter),
            service,
            should_quit: false,
        }
    }

    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        let (key_tx, mut key_rx) = mpsc::channel(100);
        let _input = tokio::task::spawn_blocking(move || read_keys(key_tx));
        let mut ticker = tokio::time::interval(TICK_RATE);

        info!("task list opened");
        self.list.load_state = LoadState::Loading;
        terminal.draw(|f| ui::render(f, &self.list))?;
        self.list.load_tasks(&self.service).await;

        while !self.should_quit {
            terminal.draw(|f| ui::render(f, &self.list))?;

            tokio::select! {
                _ = ticker.tick() => {
                    self.list.expire_notification(Instant::now());
                }
                key = key_rx.recv() => match key {
                    Some(key) => {
                        if self.will_reload(&key) {
                            self.list.load_state = LoadState::Loading;
                            terminal.draw(|f| ui::render(f, &self.list))?;
                        }
                        self.handle_key(key).await;
                    }
                    None => break,
                },
            }
        }
        Ok(())
    }

    /// Whether `key` starts a request that ends in a list reload, so the
    /// loading indicator can be drawn before it is awaited.
    pub fn will_reload(&self, key: &KeyEvent) -> bool {
        match &self.list.modal {
            Some(Modal::Form(form)) => key.code == KeyCode::Enter && form.is_valid(),
            Some(Modal::ConfirmDelete(_)) => {
                matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y'))
            }
            None => matches!(key.code, KeyCode::Char('f') | KeyCode::Char('r')),
        }
    }

    pub async fn handle_key(&mut self, key: KeyEvent) {
        match &mut self.list.modal {
            Some(Modal::Form(form)) => match form.handle_key(key) {
                FormAction::Submit => {
                    self.list.submit_form(&self.service).await;
                }
                FormAction::Cancel => self.list.close_form(),
                FormAction::None => {}
            },
            Some(Modal::ConfirmDelete(_)) => match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => {
                    self.list.resolve_delete(true, &self.service).await;
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    self.list.resolve_delete(false, &self.service).await;
                }
                _ => {}
            },
            None => self.handle_list_key(key).await,
        }
    }

    async fn handle_list_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Up | KeyCode::Char('k') => self.list.select_previous(),
            KeyCode::Down | KeyCode::Char('j') => self.list.select_next(),
            KeyCode::Char('n') => self.list.open_task_form(None),
            KeyCode::Char('e') | KeyCode::Enter => {
                if let Some(task) = self.list.selected_task().cloned() {
                    self.list.open_task_form(Some(&task));
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(task) = self.list.selected_task().cloned() {
                    self.list.request_delete(&task);
                }
            }
            KeyCode::Char('f') => self.list.cycle_filter(&self.service).await,
            KeyCode::Char('r') => self.list.load_tasks(&self.service).await,
            _ => {}
        }
    }
}

/// Blocking key reader; stops once the UI loop drops its receiver.
fn read_keys(key_tx: mpsc::Sender<KeyEvent>) {
    while !key_tx.is_closed() {
        match event::poll(TICK_RATE) {
            Ok(true) => match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    if key_tx.blocking_send(key).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(err) => {
                    debug!(error = %err, "terminal input closed");
                    break;
                }
            },
            Ok(false) => {}
            Err(err) => {
                debug!(error = %err, "terminal input closed");
                break;
            }
        }
    }
}
