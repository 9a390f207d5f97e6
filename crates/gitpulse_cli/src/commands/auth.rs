use gitpulse::github::error::is_placeholder_token;

use crate::config::Config;

/// Save a GitHub token to the config file.
pub(crate) fn handle_set_token(token: &str) -> Result<(), Box<dyn std::error::Error>> {
    if token.trim().is_empty() || is_placeholder_token(token) {
        return Err("Refusing to save an empty or placeholder token. \
                    Generate a personal access token at https://github.com/settings/tokens"
            .into());
    }

    let path = Config::save_github_token(token)?;
    println!("Token saved to {}", path.display());
    Ok(())
}
