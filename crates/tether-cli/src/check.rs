use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use tether_runtime::Binding;

use crate::config::AppConfig;
use crate::error::Result;
use crate::mount::Mounted;

#[derive(Debug, Clone, Args)]
pub struct CheckArgs {
    /// HTML template file.
    #[arg(long)]
    pub template: PathBuf,

    /// JSON app file; defaults to `{"el": "#app"}` with no data.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct BindingReport {
    pub kind: &'static str,
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    pub element: String,
}

impl BindingReport {
    fn from_binding(binding: &Binding) -> Self {
        let node = binding.node();
        // Text bindings live on a text node; report its element.
        let element = node
            .tag_name()
            .or_else(|| node.parent().and_then(|parent| parent.tag_name()))
            .unwrap_or_default();
        let event = match binding {
            Binding::Event { event, .. } => Some(event.clone()),
            _ => None,
        };
        Self {
            kind: binding.kind(),
            target: binding.target().to_string(),
            event,
            element,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub el: String,
    pub compiled: bool,
    pub proxied: Vec<String>,
    pub methods: Vec<String>,
    pub bindings: Vec<BindingReport>,
    /// Text/model keys that are not data keys; they render empty and never
    /// update.
    pub unknown_keys: Vec<String>,
}

impl CheckReport {
    #[must_use]
    pub fn from_mounted(app: &Mounted, config: &AppConfig) -> Self {
        let bindings = app.vm.bindings();
        let mut unknown_keys: Vec<String> = bindings
            .iter()
            .filter(|b| !matches!(b, Binding::Event { .. }))
            .map(|b| b.target().to_string())
            .filter(|key| !app.vm.is_proxied(key))
            .collect();
        unknown_keys.sort();
        unknown_keys.dedup();

        Self {
            el: config.el.clone(),
            compiled: app.vm.is_compiled(),
            proxied: app.vm.proxied_keys().to_vec(),
            methods: app.vm.methods().names(),
            bindings: bindings.iter().map(BindingReport::from_binding).collect(),
            unknown_keys,
        }
    }

    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let state = if self.compiled { "compiled" } else { "not found" };
        out.push_str(&format!("el: {} ({state})\n", self.el));
        out.push_str(&format!("proxied: {}\n", self.proxied.join(", ")));
        out.push_str(&format!("methods: {}\n", self.methods.join(", ")));
        out.push_str(&format!("bindings: {}\n", self.bindings.len()));
        for binding in &self.bindings {
            out.push_str(&format!(
                "  {:<6} {:<12} <{}>",
                binding.kind, binding.target, binding.element
            ));
            if let Some(event) = &binding.event {
                out.push_str(&format!(" on {event}"));
            }
            out.push('\n');
        }
        if !self.unknown_keys.is_empty() {
            out.push_str(&format!("unknown keys: {}\n", self.unknown_keys.join(", ")));
        }
        out
    }
}

pub fn check(args: &CheckArgs) -> Result<String> {
    let config = match &args.config {
        Some(path) => AppConfig::from_path(path)?,
        None => AppConfig::default(),
    };
    let app = Mounted::load(&args.template, &config)?;
    let report = CheckReport::from_mounted(&app, &config);
    if args.json {
        Ok(serde_json::to_string_pretty(&report)?)
    } else {
        Ok(report.to_text())
    }
}

pub fn run_check(args: CheckArgs) -> Result<()> {
    let output = check(&args)?;
    print!("{output}");
    Ok(())
}
