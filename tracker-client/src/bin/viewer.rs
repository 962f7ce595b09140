//! Terminal viewer
//!
//! Renders the derived view as text on every change. Commands on stdin:
//! `place`, `advance <stage #>`, `reset`, `quit`.

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use tracker_client::{
    ClientConfig, HttpClient, Screen, Stage, ViewModel, ViewerSession, WsConnector,
    resolve_from_config,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = ClientConfig::from_env();
    let role = resolve_from_config(&config);
    tracing::info!(order_id = %config.order_id, role = %role, "Mounting viewer");

    let http = HttpClient::new(&config)?;
    let connector = WsConnector::from_config(&config);
    let session = ViewerSession::mount(&config, role, &connector, &http).await?;

    let controls = session.controls();
    let mut views = session.views();
    let shutdown = CancellationToken::new();
    let session_task = tokio::spawn(session.run(shutdown.clone()));

    print_view(&views.borrow_and_update());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,

            changed = views.changed() => {
                if changed.is_err() {
                    break;
                }
                print_view(&views.borrow_and_update());
            }

            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let mut parts = line.split_whitespace();
                let result = match (parts.next(), parts.next()) {
                    (Some("place"), _) => controls.place_order().await,
                    (Some("reset"), _) if role.is_admin() => controls.reset().await,
                    (Some("advance"), Some(n)) if role.is_admin() => {
                        match n.parse::<usize>().ok().and_then(|i| Stage::ALL.get(i).copied()) {
                            Some(stage) => controls.advance(stage).await,
                            None => {
                                eprintln!("unknown stage {n}; use 0-{}", Stage::ALL.len() - 1);
                                Ok(())
                            }
                        }
                    }
                    (Some("quit"), _) => break,
                    (None, _) => Ok(()),
                    _ => {
                        eprintln!("commands: place | advance <n> | reset | quit");
                        Ok(())
                    }
                };
                if let Err(e) = result {
                    tracing::error!("Failed to send intent: {}", e);
                    break;
                }
            }
        }
    }

    shutdown.cancel();
    session_task.await?;
    Ok(())
}

fn print_view(view: &ViewModel) {
    println!("\n{}", view.title);
    match &view.screen {
        Screen::PlaceOrder {
            banner,
            action_label,
        } => {
            println!("  {banner}");
            println!("  [ {action_label} ]  (place)");
        }
        Screen::Tracker { .. } | Screen::AdminPanel { .. } => {
            for step in view.screen.steps() {
                let marker = if step.is_current {
                    ">"
                } else if step.is_active {
                    "*"
                } else {
                    " "
                };
                println!("  {marker} {} {:<18} {}", step.icon, step.label, step.time_text);
            }
        }
    }
    if let Screen::AdminPanel {
        heading,
        controls,
        reset_label,
        ..
    } = &view.screen
    {
        println!("  {heading}:");
        for (i, control) in controls.iter().enumerate() {
            let mark = if control.highlighted { "●" } else { "○" };
            println!("    {mark} advance {i}: {}", control.label);
        }
        println!("    reset: {reset_label}");
    }
}
