use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use tether_runtime::Value;

use crate::config::AppConfig;
use crate::error::{CliError, Result};
use crate::mount::Mounted;

#[derive(Debug, Clone, Args)]
pub struct RenderArgs {
    /// HTML template file.
    #[arg(long)]
    pub template: PathBuf,

    /// JSON app file (`el`, `data`, `methods`, `mounted`).
    #[arg(long)]
    pub config: PathBuf,

    /// Click the first element matching SELECTOR. Repeatable.
    #[arg(long = "click", value_name = "SELECTOR")]
    pub clicks: Vec<String>,

    /// Type TEXT into the first element matching SELECTOR. Repeatable.
    #[arg(long = "input", value_name = "SELECTOR=TEXT")]
    pub inputs: Vec<String>,

    /// Assign a JSON value to a data key. Repeatable.
    #[arg(long = "set", value_name = "KEY=JSON")]
    pub sets: Vec<String>,

    /// Print `{"html": ..., "data": ...}` instead of bare HTML.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderOutput {
    pub html: String,
    pub data: serde_json::Value,
}

fn split_pair<'a>(raw: &'a str, what: &str) -> Result<(&'a str, &'a str)> {
    raw.split_once('=')
        .ok_or_else(|| CliError::invalid(format!("expected {what}, got {raw:?}")))
}

/// Mount, replay the scripted steps (clicks, then inputs, then sets), and
/// return the rendered output.
pub fn render(args: &RenderArgs) -> Result<String> {
    let config = AppConfig::from_path(&args.config)?;
    let app = Mounted::load(&args.template, &config)?;

    for selector in &args.clicks {
        tracing::debug!(message = "cli.click", selector = %selector);
        app.target(selector)?.click()?;
    }
    for raw in &args.inputs {
        let (selector, text) = split_pair(raw, "SELECTOR=TEXT")?;
        tracing::debug!(message = "cli.input", selector, text);
        app.target(selector)?.user_input(text)?;
    }
    for raw in &args.sets {
        let (key, json) = split_pair(raw, "KEY=JSON")?;
        let value: serde_json::Value = serde_json::from_str(json)?;
        app.vm.set(key, Value::from(value))?;
    }

    if args.json {
        let output = RenderOutput {
            html: app.html(),
            data: Value::from(app.vm.data().clone()).to_json(),
        };
        Ok(serde_json::to_string_pretty(&output)?)
    } else {
        Ok(app.html())
    }
}

pub fn run_render(args: RenderArgs) -> Result<()> {
    let output = render(&args)?;
    println!("{output}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use tempfile::tempdir;

    use super::{RenderArgs, render};
    use crate::error::CliError;

    const TEMPLATE: &str = r#"<div id="app"><p>{{msg}}</p><input v-model="msg"><button @click="reset">x</button></div>"#;
    const CONFIG: &str = r#"{
        "data": {"msg": "hi", "count": 0},
        "methods": {"reset": [{"op": "clear", "key": "msg"}]}
    }"#;

    fn args(dir: &Path) -> RenderArgs {
        let template = dir.join("index.html");
        let config = dir.join("app.json");
        std::fs::write(&template, TEMPLATE).expect("write template");
        std::fs::write(&config, CONFIG).expect("write config");
        RenderArgs {
            template,
            config,
            clicks: Vec::new(),
            inputs: Vec::new(),
            sets: Vec::new(),
            json: false,
        }
    }

    #[test]
    fn renders_initial_state() {
        let temp = tempdir().expect("tempdir");
        let out = render(&args(temp.path())).expect("render");
        assert_eq!(
            out,
            r#"<div id="app"><p>hi</p><input value="hi"><button>x</button></div>"#
        );
    }

    #[test]
    fn replays_steps_in_order() {
        let temp = tempdir().expect("tempdir");
        let mut args = args(temp.path());
        args.clicks = vec!["button".to_string()];
        args.inputs = vec!["input=typed=text".to_string()];
        args.sets = vec!["count=3".to_string()];
        args.json = true;
        let out = render(&args).expect("render");
        let json: serde_json::Value = serde_json::from_str(&out).expect("json output");
        assert_eq!(json["data"]["msg"], "typed=text");
        assert_eq!(json["data"]["count"], 3);
        assert_eq!(
            json["html"],
            r#"<div id="app"><p>typed=text</p><input value="typed=text"><button>x</button></div>"#
        );
    }

    #[test]
    fn missing_target_is_reported() {
        let temp = tempdir().expect("tempdir");
        let mut args = args(temp.path());
        args.clicks = vec!["#nope".to_string()];
        let err = render(&args).unwrap_err();
        assert!(matches!(err, CliError::TargetNotFound { .. }));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn malformed_steps_are_rejected() {
        let temp = tempdir().expect("tempdir");
        let mut args = args(temp.path());
        args.inputs = vec!["input".to_string()];
        assert!(matches!(
            render(&args),
            Err(CliError::InvalidArgument { .. })
        ));

        args.inputs.clear();
        args.sets = vec!["count={".to_string()];
        assert!(matches!(render(&args), Err(CliError::Json(_))));

        args.sets = vec!["unknown=1".to_string()];
        assert!(matches!(render(&args), Err(CliError::Runtime(_))));
    }

    #[test]
    fn json_data_keeps_config_shape() {
        let temp = tempdir().expect("tempdir");
        let mut args = args(temp.path());
        std::fs::write(
            &args.config,
            r#"{"data": {"zeta": 1, "msg": "hi", "alpha": [1, 2], "ratio": 0.5}}"#,
        )
        .expect("write config");
        args.json = true;
        let out = render(&args).expect("render");
        let json: serde_json::Value = serde_json::from_str(&out).expect("json output");
        assert_eq!(
            serde_json::to_string(&json["data"]).expect("serialize data"),
            r#"{"zeta":1,"msg":"hi","alpha":[1,2],"ratio":0.5}"#
        );
    }

    #[test]
    fn unreadable_files_name_the_path() {
        let temp = tempdir().expect("tempdir");
        let mut args = args(temp.path());
        args.template = temp.path().join("missing.html");
        let err = render(&args).unwrap_err();
        assert!(err.to_string().contains("missing.html"));
    }
}
