#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|schema: jddf::Schema| {
    let _ = schema.verify();
});
