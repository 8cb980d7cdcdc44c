use tracing::debug;

use crate::viewport::ScrollState;
use crate::worker::JobResult;

use super::core::App;
use super::state::Mode;

impl App {
    /// Applies a finished background job. Results whose generation no
    /// longer matches the live search or jq session are dropped.
    pub(crate) fn apply_job_result(&mut self, result: JobResult) -> bool {
        match result {
            JobResult::Search {
                generation,
                result,
                elapsed,
            } => {
                let Some(search) = self
                    .state
                    .search
                    .as_mut()
                    .filter(|search| search.generation == generation)
                else {
                    debug!(generation, "dropping stale search result");
                    return false;
                };
                search.pending = false;
                search.current = None;
                match result {
                    Ok(matches) => {
                        debug!(generation, matches = matches.len(), ?elapsed, "search applied");
                        search.matches = matches;
                        let total = search.matches.len();
                        match search.step(true) {
                            Some(line) => {
                                self.state.status.message = format!("match 1/{total}");
                                self.state.sync_viewports();
                                self.state.scroll.center_on(line);
                                self.reveal_in_views(line);
                            }
                            None => {
                                self.state.status.message =
                                    format!("no matches for \"{}\"", search.term);
                            }
                        }
                    }
                    Err(err) => {
                        search.matches.clear();
                        self.state.status.message = err.to_string();
                    }
                }
                true
            }
            JobResult::Query {
                generation,
                query,
                result,
                elapsed,
            } => {
                let result_height = self.state.jq_result_height();
                let Mode::Jq(session) = &mut self.state.mode else {
                    debug!(generation, "dropping jq result after leaving jq mode");
                    return false;
                };
                if session.generation != generation {
                    debug!(generation, current = session.generation, "dropping stale jq result");
                    return false;
                }
                session.pending = false;
                match result {
                    Ok(output) => {
                        debug!(%query, lines = output.lines.len(), ?elapsed, "jq result applied");
                        session.last_error = None;
                        session.error_scroll = 0;
                        session.result_scroll = ScrollState::new(output.lines.len(), result_height);
                        session.result = Some(output.lines.clone());
                        self.jq_output = Some(output);
                    }
                    Err(err) => {
                        session.last_error = Some(err.to_string());
                        session.error_scroll = 0;
                    }
                }
                true
            }
        }
    }
}
