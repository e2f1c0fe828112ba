#![forbid(unsafe_code)]

//! Classification of directive attributes.

pub const DIRECTIVE_PREFIX: &str = "v-";
pub const EVENT_SHORTHAND: char = '@';
pub const EVENT_DIRECTIVE: &str = "on:";

/// Name of the canonical two-way binding directive (`v-model`).
pub const MODEL_DIRECTIVE: &str = "model";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// `v-on:<event>` or `@<event>`. `event` may be empty.
    Event { event: String },
    /// Any other `v-<name>`; bound as a two-way model.
    Model { name: String },
}

impl Directive {
    /// Classify an attribute name. Returns `None` for ordinary attributes.
    #[must_use]
    pub fn parse(attr: &str) -> Option<Self> {
        let normalized;
        let attr = match attr.strip_prefix(EVENT_SHORTHAND) {
            Some(rest) => {
                normalized = format!("{DIRECTIVE_PREFIX}{EVENT_DIRECTIVE}{rest}");
                normalized.as_str()
            }
            None => attr,
        };
        let name = attr.strip_prefix(DIRECTIVE_PREFIX)?;
        match name.strip_prefix(EVENT_DIRECTIVE) {
            Some(event) => Some(Directive::Event {
                event: event.to_string(),
            }),
            None => Some(Directive::Model {
                name: name.to_string(),
            }),
        }
    }

    #[must_use]
    pub fn is_event(&self) -> bool {
        matches!(self, Directive::Event { .. })
    }

    /// A model directive spelled something other than `v-model`.
    #[must_use]
    pub fn is_implicit_model(&self) -> bool {
        matches!(self, Directive::Model { name } if name != MODEL_DIRECTIVE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(e: &str) -> Option<Directive> {
        Some(Directive::Event {
            event: e.to_string(),
        })
    }

    fn model(n: &str) -> Option<Directive> {
        Some(Directive::Model {
            name: n.to_string(),
        })
    }

    #[test]
    fn event_forms() {
        assert_eq!(Directive::parse("v-on:click"), event("click"));
        assert_eq!(Directive::parse("@click"), event("click"));
        assert_eq!(Directive::parse("@"), event(""));
        assert_eq!(Directive::parse("v-on:"), event(""));
    }

    #[test]
    fn everything_else_is_model() {
        assert_eq!(Directive::parse("v-model"), model("model"));
        assert_eq!(Directive::parse("v-bind"), model("bind"));
        assert_eq!(Directive::parse("v-on"), model("on"));
        assert_eq!(Directive::parse("v-"), model(""));
        assert!(Directive::parse("v-text").unwrap().is_implicit_model());
        assert!(!Directive::parse("v-model").unwrap().is_implicit_model());
    }

    #[test]
    fn plain_attributes() {
        assert_eq!(Directive::parse("class"), None);
        assert_eq!(Directive::parse("value"), None);
        assert_eq!(Directive::parse("von"), None);
    }
}
