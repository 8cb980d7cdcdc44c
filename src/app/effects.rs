use crate::dispatch::{JqRequest, SearchRequest, ViewerEffects};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Exit,
    ExportSchema,
    ExportData,
    StartSearch(SearchRequest),
    SubmitJq(JqRequest),
    RestoreTerminal,
}

/// Records what the handlers asked for; the app applies it once the
/// dispatch has returned.
#[derive(Debug, Default)]
pub struct EffectQueue {
    pending: Vec<Effect>,
}

impl EffectQueue {
    pub fn drain(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.pending)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl ViewerEffects for EffectQueue {
    fn request_exit(&mut self) {
        self.pending.push(Effect::Exit);
    }

    fn export_schema(&mut self) {
        self.pending.push(Effect::ExportSchema);
    }

    fn export_data(&mut self) {
        self.pending.push(Effect::ExportData);
    }

    fn start_search(&mut self, request: SearchRequest) {
        self.pending.push(Effect::StartSearch(request));
    }

    fn submit_jq(&mut self, request: JqRequest) {
        self.pending.push(Effect::SubmitJq(request));
    }

    fn restore_terminal(&mut self) {
        self.pending.push(Effect::RestoreTerminal);
    }
}
