use babelflag_core::languages;

use crate::commands::{CommandResult, EXIT_UNSUPPORTED_REACTION};

pub fn run(reaction: &str) -> CommandResult {
    let reaction = reaction.trim().trim_matches(':');

    if let Some(resolved) = languages::resolve_language(reaction) {
        let message = format!(
            "{} translates into {} ({})",
            resolved.flag, resolved.language_name, resolved.code
        );
        return CommandResult::success("resolve", message);
    }

    let flag = languages::normalize_reaction(reaction);
    let message = match languages::language_name(reaction) {
        Some(language_name) => {
            format!("{flag} maps to {language_name}, which has no translation language code")
        }
        None => format!("{flag} is not a known flag reaction"),
    };
    CommandResult::failure("resolve", "unsupported_reaction", message, EXIT_UNSUPPORTED_REACTION)
}
