//! Operator commands typed into the running sniper.

use anyhow::{Result, anyhow, bail};
use sniper_domain::{AssetId, ExecutionRecord};
use sniper_execution::control::ControlSurface;

pub const HELP: &str = "\
/settings              show all settings
/get KEY               show one setting
/set KEY VALUE         change a setting
/buy ASSET             buy now with the configured amount
/sell ASSET            sell the whole holding now
/cancel ASSET          cancel a pending auto-sell
/status [ASSET]        show an execution, or all running ones
anything else          treated as a signal message";

/// A parsed operator command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorCommand {
    Settings,
    Get(String),
    Set { key: String, value: String },
    Buy(AssetId),
    Sell(AssetId),
    Cancel(AssetId),
    Status(Option<AssetId>),
    Help,
}

/// Parses `line` as a command. Lines not starting with `/` are signals and
/// yield `None`.
pub fn parse(line: &str) -> Result<Option<OperatorCommand>> {
    let Some(rest) = line.trim().strip_prefix('/') else {
        return Ok(None);
    };
    let mut parts = rest.split_whitespace();
    let name = parts.next().unwrap_or_default().to_lowercase();
    let args: Vec<&str> = parts.collect();

    let asset = |args: &[&str]| -> Result<AssetId> {
        match args {
            [asset] => Ok(AssetId::new(*asset)),
            _ => Err(anyhow!("usage: /{name} ASSET")),
        }
    };

    let command = match name.as_str() {
        "settings" | "config" => OperatorCommand::Settings,
        "get" => match args.as_slice() {
            [key] => OperatorCommand::Get((*key).to_string()),
            _ => bail!("usage: /get KEY"),
        },
        "set" => match args.as_slice() {
            [key, value] => OperatorCommand::Set {
                key: (*key).to_string(),
                value: (*value).to_string(),
            },
            _ => bail!("usage: /set KEY VALUE"),
        },
        "buy" => OperatorCommand::Buy(asset(&args)?),
        "sell" => OperatorCommand::Sell(asset(&args)?),
        "cancel" => OperatorCommand::Cancel(asset(&args)?),
        "status" => match args.as_slice() {
            [] => OperatorCommand::Status(None),
            [asset] => OperatorCommand::Status(Some(AssetId::new(*asset))),
            _ => bail!("usage: /status [ASSET]"),
        },
        "help" | "start" => OperatorCommand::Help,
        other => bail!("unknown command /{other}, try /help"),
    };
    Ok(Some(command))
}

/// Runs `command` and renders the reply.
pub async fn execute(command: OperatorCommand, control: &ControlSurface) -> String {
    match command {
        OperatorCommand::Settings => control
            .settings()
            .entries()
            .into_iter()
            .map(|(key, value)| format!("{key} = {value}"))
            .collect::<Vec<_>>()
            .join("\n"),
        OperatorCommand::Get(key) => match control.get_setting(&key) {
            Ok(value) => format!("{key} = {value}"),
            Err(e) => format!("error: {e}"),
        },
        OperatorCommand::Set { key, value } => match control.set_setting(&key, &value).await {
            Ok(_) => format!("{key} set to {value}"),
            Err(e) => format!("error: {e}"),
        },
        OperatorCommand::Buy(asset) => match control.manual_trigger(asset).await {
            Ok(record) => render(&record),
            Err(e) => format!("ignored: {e}"),
        },
        OperatorCommand::Sell(asset) => match control.manual_dispose(asset).await {
            Ok(record) => render(&record),
            Err(e) => format!("ignored: {e}"),
        },
        OperatorCommand::Cancel(asset) => match control.cancel_exit(&asset) {
            Ok(exit) => format!("auto-sell for {} cancelled", exit.asset_id),
            Err(e) => format!("error: {e}"),
        },
        OperatorCommand::Status(Some(asset)) => {
            let exit = control
                .pending_exit(&asset)
                .map(|exit| format!("\nauto-sell at {}", exit.fire_at))
                .unwrap_or_default();
            match control.status(&asset) {
                Some(record) => format!("{}{exit}", render(&record)),
                None => format!("no execution for {asset}{exit}"),
            }
        }
        OperatorCommand::Status(None) => {
            let running = control.in_flight();
            if running.is_empty() {
                "no executions running".to_string()
            } else {
                running.iter().map(render).collect::<Vec<_>>().join("\n")
            }
        }
        OperatorCommand::Help => HELP.to_string(),
    }
}

/// One-line summary of a record.
pub fn render(record: &ExecutionRecord) -> String {
    let mut line = format!(
        "{} {} {} (attempt {})",
        record.asset_id, record.direction, record.state, record.attempts
    );
    if let Some(tx) = &record.transaction_id {
        line.push_str(&format!(" tx={tx}"));
    }
    if let Some(error) = &record.last_error {
        line.push_str(&format!(" error={error}"));
    }
    line
}
