use std::path::PathBuf;

use icad_tone_core::catalog::{ProfileCatalog, TomlProfileCatalog};

pub struct ProfilesOptions {
    pub catalog: PathBuf,
    pub scope: String,
}

pub fn run_profiles(options: ProfilesOptions) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = TomlProfileCatalog::load(&options.catalog)?;
    let profiles = catalog.list_profiles(&options.scope);

    if profiles.is_empty() {
        println!("No profiles configured for scope '{}'.", options.scope);
        return Ok(());
    }

    for profile in profiles {
        println!(
            "{:<24} a={:<8} b={:<8} tol={}% cooldown={}s",
            profile.profile_name, profile.a_tone, profile.b_tone, profile.tone_tolerance_percent, profile.ignore_seconds
        );
    }

    Ok(())
}
