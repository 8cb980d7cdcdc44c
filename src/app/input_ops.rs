use std::sync::Arc;

use crossterm::event::{KeyEvent, KeyEventKind};
use tracing::{debug, warn};

use crate::error::{AppError, AppResult};
use crate::input::KeyInput;
use crate::worker::{JobRequest, QueryJob, SearchJob};

use super::core::App;
use super::effects::Effect;

#[derive(Debug, Default)]
pub(crate) struct InputOutcome {
    pub redraw: bool,
    pub clear_terminal: bool,
    pub quit_requested: bool,
    pub jobs: Vec<JobRequest>,
}

impl App {
    pub(crate) fn handle_key(&mut self, key: KeyEvent) -> AppResult<InputOutcome> {
        if key.kind == KeyEventKind::Release {
            return Ok(InputOutcome::default());
        }

        let input = KeyInput::from(key);
        let schema_before = self.state.view.schema;
        let dispatched = self.dispatcher.handle_key_event(
            &input.text,
            &input,
            &mut self.state,
            &mut self.effects,
            &mut self.tree,
            &mut self.collapsible,
        );
        match dispatched {
            Ok(_) => {}
            Err(AppError::Delegate { delegate, message }) => {
                warn!(delegate, %message, "view delegate failed");
                self.state.status.message = format!("{delegate} view error: {message}");
            }
            Err(err) => return Err(err),
        }

        self.sync_views();
        let mut outcome = self.apply_effects();
        if schema_before != self.state.view.schema
            && let Some(job) = self.rerun_committed_search()
        {
            outcome.jobs.push(job);
        }
        outcome.redraw = true;
        Ok(outcome)
    }

    pub(crate) fn handle_resize(&mut self, height: u16) {
        debug!(height, "terminal resized");
        self.state.set_terminal_height(i32::from(height));
        self.sync_views();
    }

    fn apply_effects(&mut self) -> InputOutcome {
        let mut outcome = InputOutcome::default();
        for effect in self.effects.drain() {
            match effect {
                Effect::Exit => outcome.quit_requested = true,
                Effect::ExportSchema => self.export_schema(),
                Effect::ExportData => self.export_data(),
                Effect::StartSearch(request) => {
                    outcome.jobs.push(JobRequest::Search(SearchJob {
                        generation: request.generation,
                        term: request.term,
                        scope: request.scope,
                        regex: request.regex,
                        lines: Arc::clone(self.displayed_lines()),
                    }));
                }
                Effect::SubmitJq(request) => {
                    outcome.jobs.push(JobRequest::Query(QueryJob {
                        generation: request.generation,
                        query: request.query,
                        input: Arc::clone(self.document.value()),
                    }));
                }
                Effect::RestoreTerminal => outcome.clear_terminal = true,
            }
        }
        outcome
    }

    /// Matches are line indices, so a committed search is recomputed when
    /// the plain pane switches between document and outline.
    fn rerun_committed_search(&mut self) -> Option<JobRequest> {
        let generation = self.state.take_generation();
        let search = self.state.search.as_mut()?;
        search.generation = generation;
        search.pending = true;
        search.matches.clear();
        search.current = None;
        Some(JobRequest::Search(SearchJob {
            generation,
            term: search.term.clone(),
            scope: search.scope,
            regex: search.regex,
            lines: Arc::clone(self.displayed_lines()),
        }))
    }
}
