use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use siriusxm_e2e::{ChromeDriver, ConnectionMode, Diagnostics, Scenario, Settings};
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(author, version, about = "End-to-end checks for the SiriusXM web player", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the available scenarios
    List,
    /// Run scenarios by name (all of them when none are given)
    Run {
        names: Vec<String>,
        /// Show the browser window instead of running headless
        #[arg(long)]
        headed: bool,
        /// Chrome executable to launch
        #[arg(long, env = "CHROME_PATH")]
        chrome_path: Option<String>,
        /// Attach to a Chrome already listening on this remote debugging port
        #[arg(long)]
        debug_port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    match args.command {
        Command::List => {
            for scenario in Scenario::ALL {
                let marker = if scenario.needs_credentials() { " [login]" } else { "" };
                println!("{:<28} {}{}", scenario.name(), scenario.description(), marker);
            }
            Ok(())
        }
        Command::Run {
            names,
            headed,
            chrome_path,
            debug_port,
        } => {
            let scenarios = resolve(&names)?;
            let mut settings = Settings::from_env().context("Failed to read settings")?;
            if headed {
                settings.headless = false;
            }
            if chrome_path.is_some() {
                settings.chrome_path = chrome_path;
            }
            let mode = match debug_port {
                Some(port) => ConnectionMode::DebugPort(port),
                None => ConnectionMode::from_settings(&settings),
            };
            run(&scenarios, &settings, mode).await
        }
    }
}

fn resolve(names: &[String]) -> anyhow::Result<Vec<Scenario>> {
    if names.is_empty() {
        return Ok(Scenario::ALL.to_vec());
    }
    names
        .iter()
        .map(|name| match Scenario::from_name(name) {
            Some(scenario) => Ok(scenario),
            None => bail!("Unknown scenario '{}'; see `siriusxm-e2e list`", name),
        })
        .collect()
}

async fn run(scenarios: &[Scenario], settings: &Settings, mode: ConnectionMode) -> anyhow::Result<()> {
    let attach = matches!(mode, ConnectionMode::DebugPort(_));
    let mut driver = ChromeDriver::new(mode)
        .await
        .context("Failed to start Chrome")?;
    let diagnostics = Diagnostics::new(&settings.screenshot_dir);
    let mut failed = Vec::new();

    for &scenario in scenarios {
        if !driver.is_alive().await {
            if attach {
                bail!("Lost the connection to the attached Chrome");
            }
            log::warn!("Chrome session DEAD, restarting...");
            driver = ChromeDriver::launch(settings)
                .await
                .context("Failed to restart Chrome")?;
        }

        let started = Instant::now();
        match scenario
            .run_in_new_tab(|| driver.new_page(), settings, &diagnostics)
            .await
        {
            Ok(()) => log::info!("PASS {} ({:.1?})", scenario, started.elapsed()),
            Err(e) => {
                log::error!("FAIL {} ({:.1?}): {}", scenario, started.elapsed(), e);
                eprintln!("FAIL {}: {}", scenario, e);
                failed.push(scenario);
            }
        }
    }

    // An attached browser belongs to the user
    if !attach {
        if let Err(e) = driver.close().await {
            log::warn!("Failed to close Chrome: {}", e);
        }
    }

    if failed.is_empty() {
        println!("{} scenario(s) passed", scenarios.len());
        Ok(())
    } else {
        let names: Vec<_> = failed.iter().map(|s| s.name()).collect();
        bail!("{} of {} scenario(s) failed: {}", failed.len(), scenarios.len(), names.join(", "))
    }
}
