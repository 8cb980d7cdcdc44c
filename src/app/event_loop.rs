use std::sync::Arc;

use crossterm::event::Event;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info, warn};

use crate::document::PathQuery;
use crate::error::{AppError, AppResult};
use crate::event::DomainEvent;
use crate::ui::{self, Screen};
use crate::worker::{JobRequest, JobWorker};

use super::core::App;
use super::event_bus::EventBusRuntime;
use super::terminal_session::{TerminalSession, TerminalSurface};

struct LoopRuntime {
    session: TerminalSession,
    worker: JobWorker,
    loop_event_rx: UnboundedReceiver<DomainEvent>,
    loop_event_runtime: EventBusRuntime,
    needs_redraw: bool,
}

enum WaitEvent {
    Event(DomainEvent),
    Closed,
}

enum LoopControl {
    Continue,
    Break,
}

impl App {
    pub async fn run(&mut self) -> AppResult<()> {
        let mut runtime = self.initialize_loop_runtime()?;
        info!(
            document = %self.document.source().display_name(),
            lines = self.document.lines().len(),
            keymap = %self.config.keymap.preset,
            "viewer started"
        );

        let result = self.drive(&mut runtime).await;

        runtime.loop_event_runtime.shutdown();
        runtime.worker.shutdown();
        runtime
            .session
            .restore()
            .map_err(|err| AppError::io_with_context(err, "failed to restore terminal"))?;
        info!("viewer stopped");
        result
    }

    fn initialize_loop_runtime(&mut self) -> AppResult<LoopRuntime> {
        let worker = JobWorker::spawn(
            self.config.viewer.worker_threads,
            Arc::new(PathQuery),
            self.config.viewer.jq_cache_entries,
        )?;
        let session = TerminalSession::enter()?;
        let size = session
            .size()
            .map_err(|err| AppError::io_with_context(err, "failed to read terminal size"))?;
        self.handle_resize(size.height);

        let (loop_event_rx, loop_event_runtime) = EventBusRuntime::spawn();
        Ok(LoopRuntime {
            session,
            worker,
            loop_event_rx,
            loop_event_runtime,
            needs_redraw: true,
        })
    }

    async fn drive(&mut self, runtime: &mut LoopRuntime) -> AppResult<()> {
        loop {
            if runtime.needs_redraw {
                self.render_frame(&mut runtime.session)?;
                runtime.needs_redraw = false;
            }

            let waited = wait_next_event(&mut runtime.loop_event_rx, &runtime.worker).await;
            if matches!(
                self.handle_waited_event(waited, runtime)?,
                LoopControl::Break
            ) {
                return Ok(());
            }
        }
    }

    pub(crate) fn render_frame(&self, session: &mut impl TerminalSurface) -> AppResult<()> {
        let tree = if self.state.view.tree {
            Some(self.tree.tree())
        } else if self.state.view.collapsible {
            Some(self.collapsible.tree())
        } else {
            None
        };
        let file_name = self.document.source().display_name();
        let screen = Screen {
            state: &self.state,
            file_name: &file_name,
            lines: self.displayed_lines(),
            tree,
            help: self.keys.help_entries(),
            goto_armed: self.dispatcher.goto().is_armed(),
            config: &self.config,
        };
        session
            .draw(|frame| ui::draw(frame, &screen))
            .map_err(|err| AppError::io_with_context(err, "failed to draw frame"))
    }

    fn handle_waited_event(
        &mut self,
        waited: WaitEvent,
        runtime: &mut LoopRuntime,
    ) -> AppResult<LoopControl> {
        match waited {
            WaitEvent::Event(DomainEvent::Input(Event::Key(key))) => {
                let outcome = self.handle_key(key)?;
                if outcome.quit_requested {
                    info!("quit requested");
                    return Ok(LoopControl::Break);
                }
                for job in outcome.jobs {
                    self.submit_job(&runtime.worker, job);
                }
                if outcome.clear_terminal {
                    runtime
                        .session
                        .clear()
                        .map_err(|err| AppError::io_with_context(err, "failed to clear terminal"))?;
                }
                runtime.needs_redraw |= outcome.redraw;
            }
            WaitEvent::Event(DomainEvent::Input(Event::Resize(_, height))) => {
                self.handle_resize(height);
                runtime.needs_redraw = true;
            }
            WaitEvent::Event(DomainEvent::Input(_)) => {}
            WaitEvent::Event(DomainEvent::InputError(message)) => {
                self.state.status.message = format!("input error: {message}");
                runtime.needs_redraw = true;
            }
            WaitEvent::Event(DomainEvent::JobComplete(result)) => {
                runtime.needs_redraw |= self.apply_job_result(result);
            }
            WaitEvent::Closed => {
                debug!("event sources closed");
                return Ok(LoopControl::Break);
            }
        }
        Ok(LoopControl::Continue)
    }

    fn submit_job(&mut self, worker: &JobWorker, job: JobRequest) {
        if let Err(err) = worker.submit(job) {
            warn!(error = %err, "failed to submit background job");
            self.state.status.message = err.to_string();
        }
    }
}

async fn wait_next_event(
    loop_event_rx: &mut UnboundedReceiver<DomainEvent>,
    worker: &JobWorker,
) -> WaitEvent {
    tokio::select! {
        biased;
        maybe_loop = loop_event_rx.recv() => {
            match maybe_loop {
                Some(event) => WaitEvent::Event(event),
                None => WaitEvent::Closed,
            }
        },
        maybe_job = worker.recv_result() => {
            match maybe_job {
                Some(result) => WaitEvent::Event(DomainEvent::JobComplete(result)),
                None => WaitEvent::Closed,
            }
        },
    }
}
