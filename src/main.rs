//! Strata CLI - layered terminal dashboard

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;
use ratatui::style::Style;

mod demo;

use strata::config::StrataConfig;
use strata::error::{FixSuggestion, Result};
use strata::logging::{self, LogSource};
use strata::style::{MarkupEngine, Theme};
use strata::tui::layout::LayoutBudget;
use strata::tui::widgets::{Backdrop, Header};
use strata::tui::{self, ContextHandle, ExitStatus, HeaderSlot, RenderContext};

#[derive(Parser)]
#[command(name = "strata")]
#[command(about = "Strata - layered terminal dashboard")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive dashboard demo
    Run {
        /// Built-in theme name or theme file
        #[arg(short, long)]
        theme: Option<String>,

        /// Disable drop shadows
        #[arg(long)]
        no_shadow: bool,

        /// ASCII borders instead of box drawing
        #[arg(long)]
        ascii: bool,

        /// Config file (default: ~/.config/strata/config.yaml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print markup rendered as ANSI escape sequences
    Render {
        /// Markup text, e.g. "{{[red::B]}}hello{{[-]}}"
        text: String,

        /// Built-in theme name or theme file
        #[arg(short, long, default_value = "classic")]
        theme: String,

        /// Semantic style used as the base
        #[arg(short, long)]
        base: Option<String>,
    },

    /// Print the layout budget for a terminal size
    Layout {
        #[arg(long)]
        width: u16,

        #[arg(long)]
        height: u16,

        /// Reserve room for dialog shadows
        #[arg(long)]
        shadow: bool,

        /// Header lines
        #[arg(long, default_value_t = 1)]
        header: u16,
    },

    /// List built-in themes
    Themes,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            theme,
            no_shadow,
            ascii,
            config,
        } => run_dashboard(theme, no_shadow, ascii, config).await,
        Commands::Render { text, theme, base } => {
            logging::init_stderr();
            render_markup(&text, &theme, base.as_deref()).map(|_| ExitStatus::Clean)
        }
        Commands::Layout {
            width,
            height,
            shadow,
            header,
        } => {
            print_layout(width, height, shadow, header);
            Ok(ExitStatus::Clean)
        }
        Commands::Themes => {
            list_themes();
            Ok(ExitStatus::Clean)
        }
    };

    match result {
        Ok(status) => std::process::exit(status.code()),
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            if let Some(suggestion) = e.fix_suggestion() {
                eprintln!("  {} {}", "Fix:".yellow(), suggestion);
            }
            std::process::exit(1);
        }
    }
}

async fn run_dashboard(
    theme_override: Option<String>,
    no_shadow: bool,
    ascii: bool,
    config_path: Option<PathBuf>,
) -> Result<ExitStatus> {
    let path = config_path.unwrap_or_else(StrataConfig::config_path);
    let mut config = StrataConfig::load_from(&path)?.with_env();

    // CLI overrides
    if let Some(theme) = theme_override {
        config.ui.theme = theme;
    }
    if no_shadow {
        config.ui.shadow = false;
    }
    if ascii {
        config.ui.line_characters = false;
    }

    let theme = Theme::find(&config.ui.theme)?;
    let logs = logging::init_file(&config.log_file())?;
    tracing::info!(theme = %theme.name, config = %path.display(), "Starting dashboard");

    let ctx = ContextHandle::new(RenderContext::new(theme, config.ui.clone()));
    let mut header = Header::new("Strata", env!("CARGO_PKG_VERSION"));
    header.set_slot(HeaderSlot::Template, "demo", false);
    header.set_flags(vec!["demo".to_string()]);

    let screen = Box::new(demo::main_menu(ctx.clone()));
    let source: &dyn LogSource = logs.as_ref();
    tui::run(
        ctx,
        Backdrop::new(header),
        screen,
        Some((source, config.log.backlog_lines)),
        |app| app.on_header_action(demo::header_action),
    )
    .await
}

fn render_markup(text: &str, theme: &str, base: Option<&str>) -> Result<()> {
    let theme = Theme::find(theme)?;
    let engine = MarkupEngine::new(&theme);
    let base = match base {
        Some(name) => engine.semantic_style(name, Style::default()),
        None => Style::default(),
    };
    println!("{}", engine.render_ansi(text, base));
    Ok(())
}

fn print_layout(width: u16, height: u16, shadow: bool, header: u16) {
    let budget = LayoutBudget::new(shadow, header);
    let area = budget.content_area(width, height);
    println!("{} {}x{}", "terminal:".cyan(), width, height);
    println!("{} {}x{}", "content:".cyan(), area.width, area.height);
    println!("{} ({}, {})", "origin:".cyan(), area.x, area.y);
    println!(
        "{} top {} | bottom {}",
        "chrome:".cyan(),
        area.top_chrome,
        area.bottom_chrome
    );
    println!("{} {}x{}", "shadow:".cyan(), area.shadow_width, area.shadow_height);
}

fn list_themes() {
    for name in Theme::builtin_names() {
        match Theme::builtin(name) {
            Some(theme) => println!("{} {}", name.green().bold(), theme.description),
            None => println!("{}", name),
        }
    }
}
