#![no_main]
use libfuzzer_sys::fuzz_target;

use serde_json;

fuzz_target!(|schema_and_instance: (jddf::Schema, Vec<u8>)| {
    let (schema, instance) = schema_and_instance;

    // We're only interested in fuzzing against valid schemas.
    if schema.verify().is_err() {
        return;
    }

    if let Ok(instance) = serde_json::from_slice(&instance) {
        let _ = jddf::Validator::new()
            .with_max_depth(32)
            .validate(&schema, &instance);
    }
});
