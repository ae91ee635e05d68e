use icad_tone_core::cooldown::{CooldownStore, InMemoryCooldownStore};

pub struct CooldownOptions {
    pub scope: String,
}

/// Print the current cooldown snapshot for a scope.
///
/// The shipped `InMemoryCooldownStore` is process-local, so a snapshot taken
/// from a fresh CLI invocation is always empty; this command is primarily
/// useful when the store is wired to a long-lived process (e.g. a service
/// embedding this crate) rather than invoked standalone.
pub fn run_cooldown(options: CooldownOptions) -> Result<(), Box<dyn std::error::Error>> {
    let store = InMemoryCooldownStore::default();
    let snapshot = store.snapshot(&options.scope)?;

    if snapshot.is_empty() {
        println!("No active cooldowns for scope '{}'.", options.scope);
        return Ok(());
    }

    for entry in snapshot {
        println!(
            "{:<24} last_detected={} ignore_seconds={}",
            entry.profile_id, entry.last_detected, entry.ignore_seconds
        );
    }

    Ok(())
}
