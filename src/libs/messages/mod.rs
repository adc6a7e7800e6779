pub mod display;
pub mod macros;
pub mod types;

pub use types::Message;

/// Prints a validation failure header followed by one bullet per message.
pub fn print_validation(errors: &[Message]) {
    crate::msg_error!(Message::ValidationFailed);
    for error in errors {
        eprintln!("   • {}", error);
    }
}
