use std::env;
use std::path::PathBuf;

/// Return the user's home directory path.
///
/// Uses HOME on Unix-like systems and USERPROFILE on Windows.
pub fn get_home_dir() -> Result<String, String> {
    if let Ok(home) = env::var("HOME") {
        if !home.is_empty() {
            return Ok(home);
        }
    }

    if let Ok(profile) = env::var("USERPROFILE") {
        if !profile.is_empty() {
            return Ok(profile);
        }
    }

    Err("Home directory not set".to_string())
}

/// `~/.config/astrolabe`.
pub fn default_data_dir() -> Result<PathBuf, String> {
    Ok(PathBuf::from(get_home_dir()?).join(".config").join("astrolabe"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn with_env<F: FnOnce()>(home: Option<&str>, userprofile: Option<&str>, f: F) {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let prev_home = env::var("HOME").ok();
        let prev_userprofile = env::var("USERPROFILE").ok();

        match home {
            Some(value) => env::set_var("HOME", value),
            None => env::remove_var("HOME"),
        }
        match userprofile {
            Some(value) => env::set_var("USERPROFILE", value),
            None => env::remove_var("USERPROFILE"),
        }

        f();

        match prev_home {
            Some(value) => env::set_var("HOME", value),
            None => env::remove_var("HOME"),
        }
        match prev_userprofile {
            Some(value) => env::set_var("USERPROFILE", value),
            None => env::remove_var("USERPROFILE"),
        }
    }

    #[test]
    fn get_home_dir_prefers_home() {
        with_env(Some("/tmp/home"), Some("/tmp/profile"), || {
            assert_eq!(get_home_dir().unwrap(), "/tmp/home");
        });
    }

    #[test]
    fn get_home_dir_falls_back_to_userprofile() {
        with_env(Some(""), Some("/tmp/profile"), || {
            assert_eq!(get_home_dir().unwrap(), "/tmp/profile");
        });
    }

    #[test]
    fn missing_home_is_an_error() {
        with_env(None, None, || {
            assert!(get_home_dir().is_err());
            assert!(default_data_dir().is_err());
        });
    }

    #[test]
    fn data_dir_lives_under_config() {
        with_env(Some("/tmp/home"), None, || {
            assert_eq!(
                default_data_dir().unwrap(),
                PathBuf::from("/tmp/home/.config/astrolabe")
            );
        });
    }
}
