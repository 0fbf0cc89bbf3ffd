use profile_store::storage::storage_for_namespace;
use profile_store::{AppState, ProfileRecord, ThemeMode};

fn main() {
    tracing_subscriber::fmt::init();

    // On native platforms this is a TOML file in the config directory
    let storage = storage_for_namespace("com.example.profiles").expect("Failed to open storage");
    let mut state = AppState::new(storage);

    let report = state.load();
    if !report.skipped_records.is_empty() {
        println!("Skipped unreadable records at {:?}", report.skipped_records);
    }

    let prefs = state.preferences().expect("loaded");
    println!("Current preferences:");
    println!("  Theme: {}", prefs.theme_mode);
    println!("  Font scale: {}", prefs.font_scale);
    println!("  Language: {}", prefs.language);

    state
        .insert_front(ProfileRecord::new("Ana", "CS", "2023", "a@x.com", "08123"))
        .expect("Failed to save record");
    state.set_theme_mode(ThemeMode::Dark).expect("Failed to save theme");

    println!("\nProfiles (newest first):");
    for (i, record) in state.records().expect("loaded").iter().enumerate() {
        println!("  {}: {}", i, record.name.as_deref().unwrap_or("<unnamed>"));
    }

    println!("\nStored at: {}", state.storage_path());
}
