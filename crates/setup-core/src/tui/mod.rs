//! CLI prompts using cliclack (Charm-style inline prompts)
//!
//! This module is optional and only available when the `tui` feature is enabled.

#[cfg(feature = "tui")]
mod prompts;

#[cfg(feature = "tui")]
pub use prompts::{open_docs, run, CreateArgs, SdkPick};

/// Restore the terminal cursor on panic and on Ctrl+C
#[cfg(feature = "tui")]
pub fn install_terminal_guards() {
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        std::process::exit(130);
    })
    .ok();
}

/// Make sure the cursor is visible again after the prompts finished
#[cfg(feature = "tui")]
pub fn show_cursor() {
    let _ = console::Term::stderr().show_cursor();
}
