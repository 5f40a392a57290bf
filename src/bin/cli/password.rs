//! Password handling for CLI operations.

use rpassword::prompt_password;
use zipset::Password;

/// Prompts for password confirmation (for creating encrypted archives)
fn confirm_password() -> Option<Password> {
    let pwd1 = match prompt_password("Enter password: ") {
        Ok(pwd) => pwd,
        Err(_) => return None,
    };

    if pwd1.is_empty() {
        eprintln!("Password cannot be empty");
        return None;
    }

    let pwd2 = match prompt_password("Confirm password: ") {
        Ok(pwd) => pwd,
        Err(_) => return None,
    };

    if pwd1 == pwd2 {
        Some(Password::new(pwd1))
    } else {
        eprintln!("Passwords do not match");
        None
    }
}

/// Resolves the password from the command line or an interactive prompt.
///
/// Returns `Err(())` when a prompt was requested but produced no password.
pub fn resolve_password(
    provided: Option<String>,
    ask: bool,
    confirm: bool,
) -> Result<Option<Password>, ()> {
    if let Some(pwd) = provided {
        return Ok(Some(Password::new(pwd)));
    }
    if !ask {
        return Ok(None);
    }

    let prompted = if confirm {
        confirm_password()
    } else {
        match prompt_password("Enter password: ") {
            Ok(pwd) if !pwd.is_empty() => Some(Password::new(pwd)),
            _ => None,
        }
    };
    prompted.map(Some).ok_or(())
}
