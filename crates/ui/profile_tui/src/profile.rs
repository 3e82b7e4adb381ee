use app::Application;
use color_eyre::Result;
use profile_form::{Collection, CollectionClient, Effect, InternalEvent, ProfileForm, TaskExecutor};
use ratatui::layout::{Constraint, Layout, Rect};
use strum::IntoEnumIterator;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info};

use crate::{
    action::Action,
    components::{form_page::FormPage, status_bar::StatusBar, Component},
    config::Config,
    tui::{Event, EventResponse, Frame, Tui},
};

impl Application for ProfileApp {
    const APP_ID: &'static str = "profile_tui";
    // The terminal belongs to the UI; logs only go to the file.
    const CONSOLE_LOG: bool = false;
}

pub struct ProfileApp {
    pub config: Config,
    pub form: ProfileForm,
    pub client: CollectionClient,
    pub page: FormPage,
    pub status_bar: StatusBar,
    pub should_quit: bool,
    pub should_suspend: bool,
}

impl ProfileApp {
    pub fn new(config: Config, form: ProfileForm, client: CollectionClient) -> Self {
        Self {
            config,
            form,
            client,
            page: FormPage::new(),
            status_bar: StatusBar::new(),
            should_quit: false,
            should_suspend: false,
        }
    }

    fn tui(&self) -> Result<Tui> {
        Ok(Tui::new()?
            .tick_rate(self.config.ui.tick_rate)
            .frame_rate(self.config.ui.frame_rate)
            .mouse(self.config.ui.mouse)
            .paste(true))
    }

    pub async fn run(&mut self) -> Result<()> {
        let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
        let (task_tx, task_rx) = mpsc::unbounded_channel::<InternalEvent>();
        let executor = TaskExecutor::new(self.client.clone(), task_tx);
        forward_task_events(task_rx, action_tx.clone());

        let mut tui = self.tui()?;
        tui.enter()?;
        self.page.init(&self.form)?;
        self.status_bar.init(&self.form)?;

        info!(
            base = %self.client.base_url(),
            remote = self.form.settings().remote_enabled,
            "form started"
        );
        run_effects(&executor, self.form.start());
        if !self.form.settings().remote_enabled {
            action_tx
                .send(Action::Status("Offline: using bundled lists".into()))
                .ok();
        }

        loop {
            if let Some(e) = tui.next().await {
                let response = self.page.handle_events(e.clone(), &mut self.form)?;
                let stop_event_propagation = match response {
                    Some(EventResponse::Continue(action)) => {
                        action_tx.send(action).ok();
                        false
                    }
                    Some(EventResponse::Stop(action)) => {
                        action_tx.send(action).ok();
                        true
                    }
                    None => false,
                };

                if !stop_event_propagation {
                    match e {
                        Event::Closed => {
                            action_tx.send(Action::Quit).ok();
                        }
                        Event::Tick => {
                            action_tx.send(Action::Tick).ok();
                        }
                        Event::Render => {
                            action_tx.send(Action::Render).ok();
                        }
                        Event::Resize(x, y) => {
                            action_tx.send(Action::Resize(x, y)).ok();
                        }
                        Event::Error => {
                            action_tx
                                .send(Action::Error("Terminal input error".into()))
                                .ok();
                        }
                        _ => {}
                    }
                }
            }

            while let Ok(action) = action_rx.try_recv() {
                match action {
                    Action::Tick | Action::Render => {}
                    _ => debug!("{action}"),
                }
                match &action {
                    Action::Quit => self.should_quit = true,
                    Action::Suspend => self.should_suspend = true,
                    Action::Resume => self.should_suspend = false,
                    Action::Resize(w, h) => {
                        tui.resize(Rect::new(0, 0, *w, *h))?;
                        self.draw(&mut tui, &action_tx)?;
                    }
                    Action::Render => self.draw(&mut tui, &action_tx)?,
                    Action::Refresh => self.refresh(&executor, &action_tx),
                    Action::TaskFinished(_, result) => {
                        if self.form.apply(result.clone()) {
                            if let Some(collection) = Collection::for_field(result.ticket().field) {
                                action_tx
                                    .send(Action::Status(format!(
                                        "{collection}: loaded from backend"
                                    )))
                                    .ok();
                            }
                        }
                    }
                    _ => {}
                }

                if let Some(next) = self.page.update(action.clone(), &mut self.form)? {
                    action_tx.send(next).ok();
                }
                if let Some(next) = self.status_bar.update(action, &mut self.form)? {
                    action_tx.send(next).ok();
                }
            }

            if self.should_suspend {
                tui.suspend()?;
                action_tx.send(Action::Resume).ok();
                tui = self.tui()?;
                tui.enter()?;
            } else if self.should_quit {
                tui.stop()?;
                break;
            }
        }
        self.form.close();
        info!(summary = ?self.form.summary(), "form closed");
        tui.exit()?;
        Ok(())
    }

    fn refresh(&mut self, executor: &TaskExecutor, action_tx: &UnboundedSender<Action>) {
        if !self.form.settings().remote_enabled {
            action_tx
                .send(Action::Status("Offline: nothing to refresh".into()))
                .ok();
            return;
        }
        let effects: Vec<Effect> = Collection::iter()
            .filter_map(|collection| self.form.refresh(collection.field()))
            .collect();
        run_effects(executor, effects);
    }

    fn draw(&mut self, tui: &mut Tui, action_tx: &UnboundedSender<Action>) -> Result<()> {
        tui.draw(|f| {
            if let Err(err) = self.render(f) {
                action_tx
                    .send(Action::Error(format!("Failed to draw: {err:?}")))
                    .ok();
            }
        })?;
        Ok(())
    }

    fn render(&mut self, frame: &mut Frame<'_>) -> Result<()> {
        let [body, footer] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(frame.area());
        self.page.draw(frame, body, &self.form)?;
        self.status_bar.draw(frame, footer, &self.form)?;
        Ok(())
    }
}

/// Hand effects to the executor. Logging effects are written right away.
fn run_effects(executor: &TaskExecutor, effects: Vec<Effect>) {
    for effect in effects {
        match effect {
            Effect::Async(kind) => {
                let label = kind.to_string();
                let id = executor.spawn(kind);
                debug!(id, %label, "task scheduled");
            }
            Effect::Log(message) => info!("{message}"),
        }
    }
}

/// Executor lifecycle events become actions for the run loop.
fn forward_task_events(
    mut task_rx: UnboundedReceiver<InternalEvent>,
    action_tx: UnboundedSender<Action>,
) {
    tokio::spawn(async move {
        while let Some(event) = task_rx.recv().await {
            let action = match event {
                InternalEvent::TaskStarted { id, label } => Action::TaskStarted(id, label),
                InternalEvent::TaskFinished { id, result } => Action::TaskFinished(id, result),
            };
            if action_tx.send(action).is_err() {
                break;
            }
        }
    });
}
