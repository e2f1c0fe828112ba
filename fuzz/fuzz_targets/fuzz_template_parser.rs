#![no_main]

use libfuzzer_sys::fuzz_target;
use tether_core::Document;

fuzz_target!(|data: &[u8]| {
    let src = String::from_utf8_lossy(data);
    if let Ok(doc) = Document::parse(&src) {
        let html = doc.to_html();
        let again = Document::parse(&html).expect("serialized output must parse");
        assert_eq!(again.to_html(), html);
    }
});
