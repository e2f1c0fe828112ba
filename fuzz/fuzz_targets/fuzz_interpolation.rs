#![no_main]

use libfuzzer_sys::fuzz_target;
use tether_runtime::{Interpolation, Value};

fuzz_target!(|text: &str| {
    if let Some(interp) = Interpolation::parse(text) {
        assert!(!interp.key().is_empty());
        let rendered = interp.render(&Value::from(""));
        assert_eq!(rendered.len(), interp.prefix().len() + interp.suffix().len());
    }
});
