#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use tether_core::Document;
use tether_runtime::{Options, ReactiveObject, Value, ViewModel};

const KEYS: [&str; 3] = ["a", "b", "c"];

#[derive(Arbitrary, Debug)]
enum Piece {
    Text(u8),
    Marker(u8),
    Model(u8),
    Click,
    Open,
    Close,
}

#[derive(Arbitrary, Debug)]
enum Step {
    Set { key: u8, value: i8 },
    Input { nth: u8, text: u8 },
    Click { nth: u8 },
}

#[derive(Arbitrary, Debug)]
struct Scenario {
    pieces: Vec<Piece>,
    steps: Vec<Step>,
}

fn key(n: u8) -> &'static str {
    KEYS[usize::from(n) % KEYS.len()]
}

impl Scenario {
    fn template(&self) -> String {
        let mut out = String::from("<div id=\"app\">");
        let mut depth = 0usize;
        for piece in &self.pieces {
            match piece {
                Piece::Text(n) => out.push_str(&format!("t{n} ")),
                Piece::Marker(n) => out.push_str(&format!("<b>{{{{ {} }}}}</b>", key(*n))),
                Piece::Model(n) => out.push_str(&format!("<input v-model=\"{}\">", key(*n))),
                Piece::Click => out.push_str("<button @click=\"bump\">+</button>"),
                Piece::Open => {
                    out.push_str("<span>");
                    depth += 1;
                }
                Piece::Close if depth > 0 => {
                    out.push_str("</span>");
                    depth -= 1;
                }
                Piece::Close => {}
            }
        }
        out.push_str(&"</span>".repeat(depth));
        out.push_str("</div>");
        out
    }
}

fuzz_target!(|scenario: Scenario| {
    let doc = Document::parse(&scenario.template()).expect("generated template parses");
    let data: ReactiveObject = KEYS.iter().map(|&k| (k, Value::from(0))).collect();
    let vm = ViewModel::mount(
        Options::new().el("#app").data(data).method("bump", |vm, _| {
            let n = vm.get("a").as_f64().unwrap_or_default();
            vm.set("a", n + 1.0)
        }),
        &doc,
    )
    .expect("mount");

    let inputs = doc.root().query_selector_all("input").expect("selector");
    let buttons = doc.root().query_selector_all("button").expect("selector");
    for step in &scenario.steps {
        match step {
            Step::Set { key: k, value } => vm.set(key(*k), i32::from(*value)).expect("set"),
            Step::Input { nth, text } if !inputs.is_empty() => {
                let input = &inputs[usize::from(*nth) % inputs.len()];
                input.user_input(&text.to_string()).expect("input");
            }
            Step::Click { nth } if !buttons.is_empty() => {
                buttons[usize::from(*nth) % buttons.len()].click().expect("click");
            }
            _ => {}
        }
    }

    // Every model input mirrors its key after the dust settles.
    for binding in vm.bindings() {
        if binding.kind() == "model" {
            let expected = vm.get(binding.target()).to_render_string();
            assert_eq!(binding.node().value(), expected);
        }
    }
});
