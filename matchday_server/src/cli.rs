use std::{env, env::VarError};

/// There's no real CLI for the server, so just do quick 'n dirty
pub fn handle_command_line_args() -> bool {
    let has_cli_args = env::args().count() > 1;
    if has_cli_args {
        // Any argument at all gets the help text
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
    // Secrets are left off this list on purpose
    const DISPLAY_ENVS: [&str; 12] = [
        "RUST_LOG",
        "MDL_HOST",
        "MDL_PORT",
        "MDL_DATABASE_URL",
        "MDL_RUN_MIGRATIONS",
        "MDL_SESSION_LIFETIME_HOURS",
        "MDL_IDENTITY_HMAC_CHECKS",
        "MDL_SWEEP_INTERVAL_SECS",
        "MDL_SCHEDULE_UTC_OFFSET_MINUTES",
        "MDL_AVATAR_PATH",
        "MDL_AVATAR_PUBLIC_URL",
        "MDL_AVATAR_MAX_BYTES",
    ];

    println!("Current environment values (EXCLUDING variables that contain secrets):");
    DISPLAY_ENVS.iter().for_each(|&name| {
        let val = match env::var(name) {
            Ok(s) => s,
            Err(VarError::NotPresent) => "Not set".into(),
            Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
        };
        println!("  {name:<35} {val:<15}");
    })
}
