//! adbdev - Android device automation from the command line
//!
//! Usage:
//!     adbdev [OPTIONS] <COMMAND>
//!
//! Environment Variables:
//!     ADBDEV_SERIAL: Target device serial for multi-device setups
//!     ADB_BRIDGE_*: Timeout and delay overrides (see adb_bridge docs)

use adb_bridge::{recording::RecordingManager, AdbRunner};
use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};

/// Android device automation over adb
#[derive(Parser, Debug)]
#[command(name = "adbdev")]
#[command(about = "Android device automation over adb")]
#[command(after_help = r#"Examples:
    # List attached devices
    adbdev devices

    # Query the UI of the single attached device
    adbdev ui find-text "Login"
    adbdev ui clickable
    adbdev scroll-to "Terms of Service"

    # Target one of several devices
    adbdev -s emulator-5554 screenshot --output screen.png

    # Record the screen for up to a minute, then fetch the file
    adbdev record start --duration 60
    adbdev record stop
    adbdev record pull --local-dir ./recordings
"#)]
struct Cli {
    /// Target device serial (optional with a single attached device)
    #[arg(short = 's', long, env = "ADBDEV_SERIAL", global = true)]
    serial: Option<String>,

    /// Path to the adb binary
    #[arg(long, default_value = "adb", global = true)]
    adb_path: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List attached devices
    Devices,
    /// Capture a screenshot
    Screenshot {
        /// Write the PNG here instead of printing metadata
        #[arg(short, long)]
        output: Option<String>,
    },
    /// UI hierarchy queries
    #[command(subcommand)]
    Ui(UiCommands),
    /// Screen recording lifecycle
    #[command(subcommand)]
    Record(RecordCommands),
    /// Tap at coordinates
    Tap { x: i32, y: i32 },
    /// Swipe between two points
    Swipe {
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        /// Gesture duration in milliseconds
        #[arg(long, default_value = "300")]
        duration_ms: u32,
    },
    /// Scroll the screen one step
    Scroll {
        #[arg(value_enum)]
        direction: Direction,
    },
    /// Scroll down until the given text is visible
    ScrollTo {
        text: String,
        /// Give up after this many scroll steps
        #[arg(long, default_value = "10")]
        max_scrolls: u32,
    },
    /// Press a key by name (BACK, HOME, ENTER, ...) or keycode
    Key { key: String },
    /// Type text into the focused field
    Type { text: String },
    /// App lifecycle operations
    #[command(subcommand)]
    App(AppCommands),
    /// Dump recent logcat lines
    Logcat {
        #[arg(short = 'n', long, default_value = "100")]
        lines: u32,
        /// Filter to one tag
        #[arg(long)]
        tag: Option<String>,
        /// Minimum level for the tag filter (V/D/I/W/E/F)
        #[arg(long, default_value = "V")]
        level: char,
        /// Keep only lines mentioning this package
        #[arg(long)]
        package: Option<String>,
    },
    /// Run a raw shell command on the device
    Shell { command: String },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum Direction {
    Up,
    Down,
}

#[derive(Subcommand, Debug)]
enum UiCommands {
    /// Print the parsed hierarchy as JSON
    Dump,
    /// Find the first element whose text matches
    FindText {
        text: String,
        /// Require exact equality instead of substring containment
        #[arg(long)]
        exact: bool,
    },
    /// Find the first element whose resource-id contains the query
    FindId { resource_id: String },
    /// List clickable elements with their tap points
    Clickable,
    /// Extract all visible text in document order
    Text,
}

#[derive(Subcommand, Debug)]
enum RecordCommands {
    /// Start recording (max 180 seconds)
    Start {
        #[arg(long, default_value = "180")]
        duration: u64,
        #[arg(long, default_value = "recording")]
        basename: String,
    },
    /// Stop the active recording and print the artifact path
    Stop,
    /// Show the session state for the device
    Status,
    /// Pull completed recordings into a local directory
    Pull {
        #[arg(long, default_value = "./recordings")]
        local_dir: String,
    },
}

#[derive(Subcommand, Debug)]
enum AppCommands {
    /// Launch an app by package name
    Launch { package: String },
    /// Force stop an app
    Stop { package: String },
    /// Clear an app's data
    Clear { package: String },
    /// List installed packages
    List {
        #[arg(long)]
        filter: Option<String>,
        #[arg(long)]
        include_system: bool,
    },
    /// Show the currently focused activity
    Current,
}

fn json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let runner = AdbRunner::with_path(cli.adb_path.clone());

    // Device listing has its own output; everything else needs a
    // resolved target first
    if let Commands::Devices = cli.command {
        let devices = adb_bridge::list_devices(&runner).await?;
        return json(&devices);
    }

    let device = adb_bridge::resolve(&runner, cli.serial.as_deref()).await?;
    let serial = device.serial.as_str();

    match cli.command {
        Commands::Devices => unreachable!(),
        Commands::Screenshot { output } => match output {
            Some(path) => {
                let bytes =
                    adb_bridge::screenshot_to_file(&runner, serial, path.as_ref()).await?;
                println!("Wrote {} bytes to {}", bytes, path);
            }
            None => {
                let shot = adb_bridge::screenshot(&runner, serial).await?;
                json(&shot)?;
            }
        },
        Commands::Ui(cmd) => {
            let tree = adb_bridge::capture_tree(&runner, serial).await?;
            match cmd {
                UiCommands::Dump => json(&tree)?,
                UiCommands::FindText { text, exact } => match tree.find_by_text(&text, exact) {
                    Some(node) => json(&node)?,
                    None => println!("No element matching {:?}", text),
                },
                UiCommands::FindId { resource_id } => match tree.find_by_id(&resource_id) {
                    Some(node) => json(&node)?,
                    None => println!("No element with resource-id {:?}", resource_id),
                },
                UiCommands::Clickable => {
                    let clickable: Vec<_> = tree.clickable_nodes().collect();
                    json(&clickable)?;
                }
                UiCommands::Text => {
                    for text in tree.all_text() {
                        println!("{}", text);
                    }
                }
            }
        }
        Commands::Record(cmd) => {
            let manager = RecordingManager::new(runner.clone());
            match cmd {
                RecordCommands::Start { duration, basename } => {
                    let status = manager.start(serial, duration, &basename).await?;
                    json(&status)?;
                }
                RecordCommands::Stop => match manager.stop(serial).await {
                    Ok(path) => println!("{}", path),
                    // Each CLI invocation is a fresh process, so a
                    // recording started by an earlier one is not in
                    // this manager's map; signal screenrecord directly
                    Err(adb_bridge::BridgeError::NoActiveSession(_)) => {
                        adb_bridge::adb::files::shell(
                            &runner,
                            serial,
                            "pkill -l SIGINT screenrecord",
                        )
                        .await?;
                        println!("Stopped screenrecord on {}; files are under /sdcard/", serial);
                    }
                    Err(e) => return Err(e.into()),
                },
                RecordCommands::Status => {
                    let status = manager.status(serial).await?;
                    json(&status)?;
                }
                RecordCommands::Pull { local_dir } => {
                    let pulled = manager.pull_artifacts(serial, &local_dir).await?;
                    for path in &pulled {
                        println!("{}", path);
                    }
                    println!("Pulled {} recording(s) to {}", pulled.len(), local_dir);
                }
            }
        }
        Commands::Tap { x, y } => {
            adb_bridge::input::tap(&runner, serial, x, y).await?;
            println!("Tapped ({}, {})", x, y);
        }
        Commands::Swipe {
            x1,
            y1,
            x2,
            y2,
            duration_ms,
        } => {
            adb_bridge::input::swipe(&runner, serial, (x1, y1), (x2, y2), duration_ms).await?;
            println!("Swiped ({}, {}) -> ({}, {})", x1, y1, x2, y2);
        }
        Commands::Scroll { direction } => {
            match direction {
                Direction::Down => adb_bridge::input::scroll_down(&runner, serial).await?,
                Direction::Up => adb_bridge::input::scroll_up(&runner, serial).await?,
            }
            println!(
                "Scrolled {}",
                match direction {
                    Direction::Down => "down",
                    Direction::Up => "up",
                }
            );
        }
        Commands::ScrollTo { text, max_scrolls } => {
            match adb_bridge::scroll_to_text(&runner, serial, &text, max_scrolls).await? {
                Some(node) => json(&node)?,
                None => println!("No element matching {:?} after {} scrolls", text, max_scrolls),
            }
        }
        Commands::Key { key } => {
            adb_bridge::input::press_key(&runner, serial, &key).await?;
            println!("Pressed {}", key);
        }
        Commands::Type { text } => {
            adb_bridge::input::type_text(&runner, serial, &text).await?;
            println!("Typed {} characters", text.chars().count());
        }
        Commands::App(cmd) => match cmd {
            AppCommands::Launch { package } => {
                adb_bridge::adb::apps::launch(&runner, serial, &package).await?;
                println!("Launched {}", package);
            }
            AppCommands::Stop { package } => {
                adb_bridge::adb::apps::force_stop(&runner, serial, &package).await?;
                println!("Stopped {}", package);
            }
            AppCommands::Clear { package } => {
                adb_bridge::adb::apps::clear_data(&runner, serial, &package).await?;
                println!("Cleared {}", package);
            }
            AppCommands::List {
                filter,
                include_system,
            } => {
                let packages = adb_bridge::adb::apps::list_packages(
                    &runner,
                    serial,
                    filter.as_deref(),
                    include_system,
                )
                .await?;
                for package in packages {
                    println!("{}", package);
                }
            }
            AppCommands::Current => {
                match adb_bridge::adb::apps::current_activity(&runner, serial).await? {
                    Some(component) => println!("{}", component),
                    None => println!("No focused activity found"),
                }
            }
        },
        Commands::Logcat {
            lines,
            tag,
            level,
            package,
        } => {
            let text = adb_bridge::adb::logs::logcat_dump(
                &runner,
                serial,
                lines,
                tag.as_deref(),
                level.to_ascii_uppercase(),
                package.as_deref(),
            )
            .await?;
            println!("{}", text);
        }
        Commands::Shell { command } => {
            let output = adb_bridge::adb::files::shell(&runner, serial, &command).await?;
            print!("{}", output);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    if which::which(&cli.adb_path).is_err() {
        return Err(anyhow!(
            "{} is not installed or not in PATH (install android platform-tools)",
            cli.adb_path
        ));
    }

    run(cli).await
}
