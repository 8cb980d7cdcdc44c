use crossterm::event::Event;

use crate::worker::JobResult;

#[derive(Debug)]
pub(crate) enum DomainEvent {
    Input(Event),
    InputError(String),
    JobComplete(JobResult),
}
