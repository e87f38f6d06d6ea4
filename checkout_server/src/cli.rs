use std::{env, env::VarError};

/// There's no real CLI for the server, so just do quick 'n dirty
pub fn handle_command_line_args() -> bool {
    let has_cli_args = env::args().count() > 1;
    if has_cli_args {
        // We don't expect any CLI args, so always print the help
        display_readme();
        display_envs();
    }
    has_cli_args
}

fn display_readme() {
    const README: &str = include_str!("./cli-help.txt");
    println!("\n{README}\n");
}

fn display_envs() {
    // Secrets are never printed
    const DISPLAY_ENVS: [&str; 14] = [
        "RUST_LOG",
        "CHECKOUT_HOST",
        "CHECKOUT_PORT",
        "CHECKOUT_DATABASE_URL",
        "CHECKOUT_RAZORPAY_KEY_ID",
        "CHECKOUT_RAZORPAY_API_URL",
        "CHECKOUT_GATEWAY_TIMEOUT_SECS",
        "CHECKOUT_STORAGE_TIMEOUT_SECS",
        "CHECKOUT_PENDING_PAYMENT_TTL_MINS",
        "CHECKOUT_PENDING_SWEEP_INTERVAL_SECS",
        "CHECKOUT_PRICE_POLICY",
        "CHECKOUT_CURRENCY",
        "CHECKOUT_RUN_MIGRATIONS",
        "CHECKOUT_TOKEN_LIFETIME_HOURS",
    ];

    println!("Current environment values (EXCLUDING variables that contain secrets):");
    DISPLAY_ENVS.iter().for_each(|&name| {
        let val = match env::var(name) {
            Ok(s) => s,
            Err(VarError::NotPresent) => "Not set".into(),
            Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
        };
        println!("  {name:<40} {val:<15}");
    })
}
