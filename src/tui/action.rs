/// A user intent, already decoded from the raw key for the current screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    // Menu
    SetUrl,
    Browse,
    Save,
    Quit,

    // Editors
    Confirm,
    Cancel,
    Char(char),
    Backspace,
    CursorLeft,
    CursorRight,

    // Event browser
    Toggle,
    EditNotes,
    Back,
    Next,
    Previous,
}

/// Blocking work the loop must perform on behalf of the state machine. The
/// result is fed back through the matching completion handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Fetch(String),
    Save,
    Quit,
}
