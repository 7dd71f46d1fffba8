use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use quantum_core::api::{
    LifecycleSnapshot, LifecycleStatus, RequestSnapshot, RequestStatus, TuiConfig,
};

/// What the flow should do after a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TuiAction {
    None,
    Submit(String),
    Restart,
    Quit,
}

/// Presentation state. Controller state is only ever copied in through
/// `sync`; the app owns nothing but the input line and UI ephemera.
pub struct TuiApp {
    pub config: TuiConfig,
    pub lifecycle: LifecycleSnapshot,
    pub request: RequestSnapshot,
    pub input_buffer: String,
    pub input_cursor: usize,
    pub notice: Option<String>,
    pub spinner_frame: usize,
}

impl TuiApp {
    pub fn new(config: TuiConfig) -> Self {
        Self {
            config,
            lifecycle: LifecycleSnapshot {
                status: LifecycleStatus::Unloaded,
                progress: 0.0,
                error: None,
            },
            request: RequestSnapshot {
                status: RequestStatus::Idle,
                request_id: None,
                query: None,
                partial_output: String::new(),
                revealed: 0,
                total: 0,
            },
            input_buffer: String::new(),
            input_cursor: 0,
            notice: None,
            spinner_frame: 0,
        }
    }

    pub fn sync(&mut self, lifecycle: LifecycleSnapshot, request: RequestSnapshot) {
        if request.request_id != self.request.request_id {
            self.notice = None;
        }
        self.lifecycle = lifecycle;
        self.request = request;
    }

    /// Back to a fresh screen for a restarted session.
    pub fn reset(&mut self) {
        *self = Self::new(self.config.clone());
    }

    pub fn tick(&mut self) {
        self.spinner_frame = self.spinner_frame.wrapping_add(1);
    }

    pub fn set_notice(&mut self, notice: impl Into<String>) {
        self.notice = Some(notice.into());
    }

    pub fn is_processing(&self) -> bool {
        self.request.is_processing()
    }

    /// The query box is editable only once the model is ready and no request
    /// is in flight.
    pub fn input_enabled(&self) -> bool {
        self.lifecycle.is_ready() && !self.is_processing()
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> TuiAction {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => return TuiAction::Quit,
            KeyCode::Char('c') if ctrl => return TuiAction::Quit,
            KeyCode::Char('r') if ctrl => return TuiAction::Restart,
            _ => {}
        }
        if !self.input_enabled() {
            return TuiAction::None;
        }

        match key.code {
            KeyCode::Enter if key.modifiers.contains(KeyModifiers::SHIFT) => {
                self.insert_char('\n');
            }
            KeyCode::Enter => {
                if self.input_buffer.trim().is_empty() {
                    return TuiAction::None;
                }
                return TuiAction::Submit(self.input_buffer.clone());
            }
            KeyCode::Backspace => self.backspace(),
            KeyCode::Left => self.move_left(),
            KeyCode::Right => self.move_right(),
            KeyCode::Home => self.input_cursor = 0,
            KeyCode::End => self.input_cursor = self.input_buffer.len(),
            KeyCode::Char(ch) if !ctrl => self.insert_char(ch),
            _ => {}
        }
        TuiAction::None
    }

    fn insert_char(&mut self, ch: char) {
        self.input_buffer.insert(self.input_cursor, ch);
        self.input_cursor += ch.len_utf8();
    }

    fn backspace(&mut self) {
        if self.input_cursor == 0 {
            return;
        }
        let prev = prev_char_boundary(&self.input_buffer, self.input_cursor);
        self.input_buffer.replace_range(prev..self.input_cursor, "");
        self.input_cursor = prev;
    }

    fn move_left(&mut self) {
        self.input_cursor = prev_char_boundary(&self.input_buffer, self.input_cursor);
    }

    fn move_right(&mut self) {
        self.input_cursor = next_char_boundary(&self.input_buffer, self.input_cursor);
    }
}

fn prev_char_boundary(s: &str, idx: usize) -> usize {
    s[..idx].char_indices().next_back().map(|(i, _)| i).unwrap_or(0)
}

fn next_char_boundary(s: &str, idx: usize) -> usize {
    s[idx..]
        .chars()
        .next()
        .map(|ch| idx + ch.len_utf8())
        .unwrap_or(s.len())
}
