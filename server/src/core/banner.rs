//! Startup banner and URL display

use super::config::{AppConfig, is_all_interfaces};
use super::constants::APP_NAME;

/// Label width for aligned banner rows
const W: usize = 12;

/// Print the startup banner with URLs
pub fn print_banner(config: &AppConfig) {
    let host = config.server.host.as_str();
    let port = config.server.port;

    // Use localhost for display when binding to all interfaces
    let display_host = if is_all_interfaces(host) {
        "localhost"
    } else {
        host
    };

    println!();
    println!(
        "  \x1b[1m\x1b[36m{}\x1b[0m \x1b[90mv{} ({})\x1b[0m",
        APP_NAME,
        env!("CARGO_PKG_VERSION"),
        config.environment
    );
    println!();

    let login_url = format!("http://{}:{}/api/v1/auth/login", display_host, port);
    println!(
        "  \x1b[32m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m {}",
        "Login:",
        terminal_link(&login_url)
    );
    println!(
        "  \x1b[33m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m {}",
        "Provider:", config.provider.url
    );

    match (&config.fallback.url, config.fallback.enabled) {
        (Some(url), true) => println!(
            "  \x1b[35m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m {}",
            "Fallback:", url
        ),
        _ => println!("  \x1b[90m➜  {:<W$} disabled\x1b[0m", "Fallback:"),
    }

    if host == "127.0.0.1" || host == "localhost" {
        println!(
            "  \x1b[90m➜  {:<W$} use --host 0.0.0.0 to expose\x1b[0m",
            "Network:"
        );
    }

    if config.session.secret_generated {
        println!(
            "  \x1b[90m➜  {:<W$} JWT_SECRET not set, OAuth state is signed with a per-process key\x1b[0m",
            "Session:"
        );
    }

    println!();
}

/// Format a URL as a clickable terminal hyperlink if supported.
///
/// Uses OSC 8 escape sequences and falls back to plain colored text.
fn terminal_link(url: &str) -> String {
    if supports_hyperlinks::on(supports_hyperlinks::Stream::Stdout) {
        format!("\x1b]8;;{}\x07\x1b[36m{}\x1b[0m\x1b]8;;\x07", url, url)
    } else {
        format!("\x1b[36m{}\x1b[0m", url)
    }
}
