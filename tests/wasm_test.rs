#![cfg(all(target_arch = "wasm32", feature = "wasm"))]

use profile_store::storage::wasm::LocalStorage;
use profile_store::storage::Storage;
use profile_store::{AppState, ProfileRecord, ThemeMode};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn test_wasm_storage() {
    // Unique ID so runs do not see each other's keys
    let test_id = format!("test_{}", js_sys::Date::now());
    let storage = LocalStorage::new(&test_id);

    storage.set_double("font_scale", 1.2).expect("Failed to save font scale");
    storage
        .set_string_list("profiles", &["{\"name\":\"Ana\"}".to_string()])
        .expect("Failed to save profiles");

    assert_eq!(storage.get_double("font_scale").unwrap(), Some(1.2));
    assert_eq!(
        storage.get_string_list("profiles").unwrap(),
        Some(vec!["{\"name\":\"Ana\"}".to_string()])
    );
    assert!(storage.get_path("profiles").starts_with("localStorage::"));

    storage.remove("profiles").unwrap();
    assert_eq!(storage.get_string_list("profiles").unwrap(), None);
}

#[wasm_bindgen_test]
fn test_wasm_state_survives_reload() {
    let test_id = format!("test_state_{}", js_sys::Date::now());

    {
        let mut state = AppState::new(Box::new(LocalStorage::new(&test_id)));
        state.load();
        state.set_theme_mode(ThemeMode::Dark).expect("Failed to save theme");
        state
            .insert_front(ProfileRecord::new("Ana", "CS", "2023", "a@x.com", "08123"))
            .expect("Failed to save record");
    }

    let mut state = AppState::new(Box::new(LocalStorage::new(&test_id)));
    state.load();
    assert_eq!(state.preferences().unwrap().theme_mode, ThemeMode::Dark);
    assert_eq!(state.records().unwrap().len(), 1);
}
