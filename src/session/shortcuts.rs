use crate::session::messages::{Key, KeyPress, Msg, Named, TextMsg};
use crate::session::state::Session;

pub fn handle_key_event(session: &Session, press: &KeyPress) -> Option<Msg> {
    let KeyPress { key, modifiers } = press;
    let typing = session.is_typing();

    match key {
        Key::Named(Named::Escape) => Some(Msg::CancelRequested),
        // Undo/redo shortcuts (the session ignores them while typing)
        Key::Character(c)
            if c.eq_ignore_ascii_case("z") && modifiers.control() && !modifiers.shift() =>
        {
            Some(Msg::Undo)
        }
        Key::Character(c)
            if (c.eq_ignore_ascii_case("y") && modifiers.control())
                || (c.eq_ignore_ascii_case("z") && modifiers.control() && modifiers.shift()) =>
        {
            Some(Msg::Redo)
        }
        // Copy finalizes any open text field first
        Key::Character(c) if c.eq_ignore_ascii_case("c") && modifiers.control() => Some(Msg::Copy),
        // Text field editing
        Key::Character(c) if typing && !modifiers.control() && !modifiers.alt => {
            Some(Msg::Text(TextMsg::Insert(c.clone())))
        }
        Key::Named(Named::Enter) if typing => Some(Msg::Text(TextMsg::Insert("\n".to_string()))),
        Key::Named(Named::Backspace) if typing => Some(Msg::Text(TextMsg::Backspace)),
        _ => None,
    }
}
