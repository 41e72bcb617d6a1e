//! Registry queries through `reg.exe` and post-install registry assertions.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use super::config::HarnessConfig;
use super::error::{Error, Result};
use super::paths::absolute_display;
use super::process::Executor;

/// Machine-wide environment variables.
pub const SYSTEM_ENVIRONMENT_REGKEY: &str =
    r"HKLM\System\CurrentControlSet\Control\Session Manager\Environment";

/// Root of the JDK runtime registration.
pub const JAVASOFT_JDK_REGKEY: &str = r"HKLM\Software\JavaSoft\JDK";

/// `    <name>    REG_<TYPE>    <data>` lines printed by `reg query`.
static VALUE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s+(?P<name>.*?)\s+(?P<kind>REG_[A-Z_]+)(?:\s{4}(?P<data>.*))?$")
        .expect("valid reg query line regex")
});

/// Extracts the data of `name` from `reg query` output.
///
/// An empty `name` selects the key's default value, which `reg` prints
/// under a localized label such as `(Default)`.
pub fn parse_reg_query_output(lines: &[String], name: &str) -> Option<String> {
    lines.iter().find_map(|line| {
        let caps = VALUE_LINE.captures(line)?;
        let matches = name.is_empty() || caps["name"].eq_ignore_ascii_case(name);
        matches.then(|| {
            caps.name("data")
                .map(|data| data.as_str().to_string())
                .unwrap_or_default()
        })
    })
}

/// Reads a registry value; `None` when the key or value does not exist.
pub async fn query_value(config: &HarnessConfig, key: &str, name: &str) -> Result<Option<String>> {
    let mut exec = Executor::of(config.system32("reg.exe"), ["query", key])
        .timeout(config.command_timeout);
    exec = if name.is_empty() {
        exec.arg("/ve")
    } else {
        exec.arg("/v").arg(name)
    };

    let output = exec.output().await?;
    match output.code {
        Some(0) => Ok(parse_reg_query_output(&output.stdout, name)),
        Some(1) => Ok(None),
        code => Err(Error::UnexpectedExitCode {
            command: exec.command_line(),
            code,
            expected: 0,
            stderr: output.stderr,
        }),
    }
}

/// Reads a machine-wide environment variable.
///
/// On Windows this goes to the registry so variables written by an MSI
/// install are visible without restarting the process. Elsewhere the
/// process environment is used.
pub async fn system_env_var(config: &HarnessConfig, name: &str) -> Result<Option<String>> {
    if cfg!(windows) {
        query_value(config, SYSTEM_ENVIRONMENT_REGKEY, name).await
    } else {
        Ok(std::env::var(name).ok())
    }
}

pub async fn assert_registry_value_equals(
    config: &HarnessConfig,
    key: &str,
    name: &str,
    expected: &str,
) -> Result<()> {
    let what = format!("{key}:{name}");
    match query_value(config, key, name).await? {
        Some(actual) if actual == expected => Ok(()),
        Some(actual) => Err(Error::assertion(what, expected, actual)),
        None => Err(Error::assertion(what, expected, "<absent>")),
    }
}

pub async fn assert_registry_value_absent(config: &HarnessConfig, key: &str, name: &str) -> Result<()> {
    match query_value(config, key, name).await? {
        None => Ok(()),
        Some(actual) => Err(Error::assertion(format!("{key}:{name}"), "<absent>", actual)),
    }
}

/// A current version must be 1 to 4 dot-separated numbers.
pub fn is_valid_current_version(version: &str) -> bool {
    let parts: Vec<&str> = version.split('.').collect();
    (1..=4).contains(&parts.len())
        && parts
            .iter()
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()))
}

/// Install directory as registered by the MSI: absolute, trailing backslash.
fn install_dir_value(installed: &Path) -> Result<String> {
    Ok(format!("{}\\", absolute_display(installed)?))
}

fn javaw_command(installed: &Path) -> Result<String> {
    let javaw = absolute_display(&installed.join("bin").join("javaw.exe"))?;
    Ok(format!("\"{javaw}\" -jar \"%1\" %*"))
}

/// The runtime registration points `JavaHome` at the install directory.
pub async fn assert_registry_runtime(config: &HarnessConfig, installed: &Path) -> Result<()> {
    let current = query_value(config, &format!("{JAVASOFT_JDK_REGKEY}\\"), "CurrentVersion")
        .await?
        .ok_or_else(|| Error::assertion("current version", "<present>", "<absent>"))?;
    if !is_valid_current_version(&current) {
        return Err(Error::assertion("current version format", "1 to 4 numeric parts", &current));
    }
    assert_registry_value_equals(
        config,
        &format!("{JAVASOFT_JDK_REGKEY}\\{current}"),
        "JavaHome",
        &install_dir_value(installed)?,
    )
    .await
}

/// No runtime registration points at the install directory.
pub async fn assert_no_registry_runtime(config: &HarnessConfig, installed: &Path) -> Result<()> {
    let Some(current) = query_value(config, &format!("{JAVASOFT_JDK_REGKEY}\\"), "CurrentVersion").await?
    else {
        return Ok(());
    };
    let java_home = query_value(config, &format!("{JAVASOFT_JDK_REGKEY}\\{current}"), "JavaHome").await?;
    let unexpected = install_dir_value(installed)?;
    match java_home {
        Some(java_home) if java_home == unexpected => {
            Err(Error::assertion("JavaHome", format!("not {unexpected}"), java_home))
        }
        _ => Ok(()),
    }
}

/// The `.jar` file association launches `javaw.exe` from the install.
pub async fn assert_registry_jar(config: &HarnessConfig, installed: &Path) -> Result<()> {
    let classes = r"HKLM\Software\Classes";
    let expected = [
        (format!(r"{classes}\.jar"), "", "JARFile".to_string()),
        (format!(r"{classes}\.jar"), "Content Type", "application/java-archive".to_string()),
        (format!(r"{classes}\JARFile"), "", "JAR File".to_string()),
        (format!(r"{classes}\JARFile"), "EditFlags", "0x10000".to_string()),
        (format!(r"{classes}\JARFile\Shell\Open"), "", "&Launch with OpenJDK".to_string()),
        (format!(r"{classes}\JARFile\Shell\Open\Command"), "", javaw_command(installed)?),
    ];
    for (key, name, value) in &expected {
        assert_registry_value_equals(config, key, name, value).await?;
    }
    Ok(())
}

/// No `.jar` association launches `javaw.exe` from the install.
pub async fn assert_no_registry_jar(config: &HarnessConfig, installed: &Path) -> Result<()> {
    let command = query_value(config, r"HKLM\Software\Classes\JARFile\Shell\Open\Command", "").await?;
    let unexpected = javaw_command(installed)?;
    match command {
        Some(command) if command == unexpected => {
            Err(Error::assertion("Command", format!("not {unexpected}"), command))
        }
        _ => Ok(()),
    }
}

pub async fn assert_env_java_home(config: &HarnessConfig, installed: &Path) -> Result<()> {
    assert_registry_value_equals(config, SYSTEM_ENVIRONMENT_REGKEY, "JAVA_HOME", &install_dir_value(installed)?)
        .await
}

pub async fn assert_no_env_java_home(config: &HarnessConfig, installed: &Path) -> Result<()> {
    let unexpected = install_dir_value(installed)?;
    match query_value(config, SYSTEM_ENVIRONMENT_REGKEY, "JAVA_HOME").await? {
        Some(value) if value == unexpected => {
            Err(Error::assertion("JAVA_HOME", format!("not {unexpected}"), value))
        }
        _ => Ok(()),
    }
}

pub async fn assert_env_vendor_java_home(config: &HarnessConfig, installed: &Path) -> Result<()> {
    assert_registry_value_equals(
        config,
        SYSTEM_ENVIRONMENT_REGKEY,
        "VENDOR_JAVA_HOME",
        &install_dir_value(installed)?,
    )
    .await
}

/// `PATH` ends with the install's `bin` directory.
pub async fn assert_env_path(config: &HarnessConfig, installed: &Path) -> Result<()> {
    let bin = absolute_display(&installed.join("bin"))?;
    match query_value(config, SYSTEM_ENVIRONMENT_REGKEY, "PATH").await? {
        Some(path) if path.ends_with(&bin) => Ok(()),
        Some(path) => Err(Error::assertion("PATH", format!("...{bin}"), path)),
        None => Err(Error::assertion("PATH", format!("...{bin}"), "<absent>")),
    }
}

pub async fn assert_no_env_path(config: &HarnessConfig, installed: &Path) -> Result<()> {
    let bin = absolute_display(&installed.join("bin"))?;
    match query_value(config, SYSTEM_ENVIRONMENT_REGKEY, "PATH").await? {
        Some(path) if path.ends_with(&bin) => Err(Error::assertion("PATH", format!("not ...{bin}"), path)),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_string).collect()
    }

    #[test]
    fn parses_named_value() {
        let out = lines(
            "\r\nHKEY_LOCAL_MACHINE\\Software\\JavaSoft\\JDK\n    CurrentVersion    REG_SZ    21.0.2\n\n",
        );
        assert_eq!(parse_reg_query_output(&out, "CurrentVersion").as_deref(), Some("21.0.2"));
        assert_eq!(parse_reg_query_output(&out, "currentversion").as_deref(), Some("21.0.2"));
        assert_eq!(parse_reg_query_output(&out, "JavaHome"), None);
    }

    #[test]
    fn parses_names_and_data_with_spaces() {
        let out = lines(
            "HKEY_LOCAL_MACHINE\\Software\\Classes\\.jar\n    Content Type    REG_SZ    application/java-archive\n    (Default)    REG_SZ    JARFile\n",
        );
        assert_eq!(
            parse_reg_query_output(&out, "Content Type").as_deref(),
            Some("application/java-archive")
        );

        let out = lines(
            "HKEY_LOCAL_MACHINE\\Software\\Classes\\JARFile\\Shell\\Open\\Command\n    (Default)    REG_SZ    \"C:\\Program Files\\jdk\\bin\\javaw.exe\" -jar \"%1\" %*\n",
        );
        assert_eq!(
            parse_reg_query_output(&out, "").as_deref(),
            Some("\"C:\\Program Files\\jdk\\bin\\javaw.exe\" -jar \"%1\" %*")
        );
    }

    #[test]
    fn parses_dword_and_empty_values() {
        let out = lines("    EditFlags    REG_DWORD    0x10000\n    Empty    REG_SZ\n");
        assert_eq!(parse_reg_query_output(&out, "EditFlags").as_deref(), Some("0x10000"));
        assert_eq!(parse_reg_query_output(&out, "Empty").as_deref(), Some(""));
    }

    #[test]
    fn validates_current_version() {
        assert!(is_valid_current_version("21"));
        assert!(is_valid_current_version("21.0.2"));
        assert!(is_valid_current_version("21.0.2.13"));
        assert!(!is_valid_current_version("21.0.2.13.1"));
        assert!(!is_valid_current_version("21.x"));
        assert!(!is_valid_current_version(""));
        assert!(!is_valid_current_version("21..2"));
    }
}
