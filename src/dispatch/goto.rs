/// Two-keystroke "go to top" combo.
///
/// The first trigger arms the sequence, the second fires it. Any dispatch
/// that does not press the trigger disarms it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GotoSequence {
    waiting_for_second_trigger: bool,
    pressed_this_dispatch: bool,
}

impl GotoSequence {
    pub fn is_armed(&self) -> bool {
        self.waiting_for_second_trigger
    }

    /// Records a trigger press. Returns `true` when this press completes the
    /// sequence.
    pub fn press(&mut self) -> bool {
        self.pressed_this_dispatch = true;
        if self.waiting_for_second_trigger {
            self.waiting_for_second_trigger = false;
            return true;
        }
        self.waiting_for_second_trigger = true;
        false
    }

    pub fn disarm(&mut self) {
        self.waiting_for_second_trigger = false;
    }

    pub(crate) fn begin_dispatch(&mut self) {
        self.pressed_this_dispatch = false;
    }

    pub(crate) fn end_dispatch(&mut self) {
        if !self.pressed_this_dispatch {
            self.waiting_for_second_trigger = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::GotoSequence;

    #[test]
    fn second_press_fires_and_disarms() {
        let mut goto = GotoSequence::default();
        goto.begin_dispatch();
        assert!(!goto.press());
        goto.end_dispatch();
        assert!(goto.is_armed());

        goto.begin_dispatch();
        assert!(goto.press());
        goto.end_dispatch();
        assert!(!goto.is_armed());
    }

    #[test]
    fn dispatch_without_press_disarms() {
        let mut goto = GotoSequence::default();
        goto.begin_dispatch();
        goto.press();
        goto.end_dispatch();

        goto.begin_dispatch();
        goto.end_dispatch();
        assert!(!goto.is_armed());

        goto.begin_dispatch();
        assert!(!goto.press());
        goto.end_dispatch();
        assert!(goto.is_armed());
    }
}
