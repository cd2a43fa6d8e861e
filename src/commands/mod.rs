//! Administrative commands contributed by the alias service.

/// `alias.switch <group>`: change a channel's active alias group.
pub mod switch;

pub use switch::{SWITCH_COMMAND, SwitchOutcome, switch_group};
