//! Example of using profile_store from a browser
//!
//! To build for WASM:
//! cargo build --example wasm_usage --target wasm32-unknown-unknown --features wasm

#[cfg(target_arch = "wasm32")]
mod bindings {
    use profile_store::storage::create_storage;
    use profile_store::{AppState, ProfileRecord, ThemeMode};
    use wasm_bindgen::prelude::*;

    fn to_js(e: impl std::fmt::Display) -> JsValue {
        JsValue::from_str(&e.to_string())
    }

    #[wasm_bindgen]
    pub struct ProfileApp {
        state: AppState,
    }

    #[wasm_bindgen]
    impl ProfileApp {
        #[wasm_bindgen(constructor)]
        pub fn new() -> Result<ProfileApp, JsValue> {
            // In WASM, the argument becomes the app ID prefix for localStorage keys
            let storage = create_storage("com.example.profiles").map_err(to_js)?;
            let mut state = AppState::new(storage);
            state.load();
            Ok(ProfileApp { state })
        }

        #[wasm_bindgen(getter)]
        pub fn theme(&self) -> String {
            self.state
                .preferences()
                .map(|p| p.theme_mode.to_string())
                .unwrap_or_default()
        }

        #[wasm_bindgen(setter)]
        pub fn set_theme(&mut self, label: String) -> Result<(), JsValue> {
            let mode: ThemeMode = label.parse().map_err(to_js)?;
            self.state.set_theme_mode(mode).map_err(to_js)
        }

        pub fn add_profile(
            &mut self,
            name: String,
            major: String,
            year: String,
            email: String,
            phone: String,
        ) -> Result<(), JsValue> {
            self.state
                .insert_front(ProfileRecord::new(name, major, year, email, phone))
                .map_err(to_js)
        }

        pub fn delete_profile(&mut self, index: usize) -> Result<(), JsValue> {
            self.state.delete_at(index).map(|_| ()).map_err(to_js)
        }

        /// Profiles as a JSON array, newest first.
        pub fn profiles_json(&self) -> Result<String, JsValue> {
            let records: Vec<_> = self
                .state
                .records()
                .map(|r| r.iter().collect())
                .unwrap_or_default();
            serde_json::to_string(&records).map_err(to_js)
        }
    }
}

fn main() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    #[cfg(not(target_arch = "wasm32"))]
    println!("This example only runs on wasm32-unknown-unknown.");
}
