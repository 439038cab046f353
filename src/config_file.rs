//! Configuration files: `.linesiftrc` / `config.ini` and `.env`
//!
//! A config file holds a root-level `defaults = <args>` line that is inserted
//! in front of the command-line arguments, and an `[aliases]` section whose
//! entries are expanded in place of `-a NAME`. Because the defaults come
//! first, anything given explicitly on the command line overrides them.

use anyhow::{anyhow, Context, Result};
use std::collections::{HashMap, HashSet};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const PROJECT_FILE_NAME: &str = ".linesiftrc";
const MAX_ALIAS_DEPTH: usize = 10;

/// Loaded configuration file contents
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    pub defaults: Option<String>,
    pub aliases: HashMap<String, String>,
}

impl ConfigFile {
    /// Walk up from the working directory looking for `.linesiftrc`.
    pub fn find_project_config() -> Option<PathBuf> {
        let cwd = env::current_dir().ok()?;
        cwd.ancestors()
            .map(|dir| dir.join(PROJECT_FILE_NAME))
            .find(|candidate| candidate.is_file())
    }

    /// User-level config locations, most preferred first.
    pub fn user_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if cfg!(windows) {
            if let Ok(appdata) = env::var("APPDATA") {
                paths.push(PathBuf::from(appdata).join("linesift").join("config.ini"));
            }
            if let Ok(profile) = env::var("USERPROFILE") {
                paths.push(PathBuf::from(profile).join(PROJECT_FILE_NAME));
            }
        } else {
            let home = env::var("HOME").ok().map(PathBuf::from);
            let xdg_config = env::var("XDG_CONFIG_HOME")
                .map(PathBuf::from)
                .ok()
                .or_else(|| home.as_ref().map(|h| h.join(".config")))
                .unwrap_or_else(|| PathBuf::from(".config"));

            paths.push(xdg_config.join("linesift").join("config.ini"));
            if let Some(home) = home {
                paths.push(home.join(PROJECT_FILE_NAME));
            }
        }

        paths
    }

    /// Load with precedence: project file over the first existing user file.
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        if let Some(user_path) = Self::user_config_paths().into_iter().find(|p| p.is_file()) {
            config = config.merged_with(Self::load_from_path(&user_path)?);
        }
        if let Some(project_path) = Self::find_project_config() {
            config = config.merged_with(Self::load_from_path(&project_path)?);
        }

        Ok(config)
    }

    /// Load an explicit file if given, otherwise search the usual places.
    pub fn load_with_custom_path(custom_path: Option<&str>) -> Result<Self> {
        match custom_path {
            Some(path) => Self::load_from_path(Path::new(path)),
            None => Self::load(),
        }
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Parse INI content. Unknown keys and sections are ignored.
    pub fn parse(content: &str) -> Result<Self> {
        let mut config = Self::default();
        let mut section: Option<String> = None;

        for (index, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                section = Some(name.trim().to_string());
                continue;
            }

            let (key, value) = line
                .split_once('=')
                .ok_or_else(|| anyhow!("line {}: expected 'key = value'", index + 1))?;
            let (key, value) = (key.trim(), value.trim());

            match section.as_deref() {
                None if key == "defaults" => config.defaults = Some(value.to_string()),
                Some("aliases") => {
                    config.aliases.insert(key.to_string(), value.to_string());
                }
                _ => {}
            }
        }

        Ok(config)
    }

    /// `overlay` wins for defaults and for aliases defined in both.
    fn merged_with(mut self, overlay: Self) -> Self {
        if overlay.defaults.is_some() {
            self.defaults = overlay.defaults;
        }
        self.aliases.extend(overlay.aliases);
        self
    }

    /// Expand one alias into arguments, following `-a` references.
    pub fn resolve_alias(&self, name: &str) -> Result<Vec<String>> {
        self.resolve_alias_inner(name, &mut HashSet::new(), 0)
    }

    fn resolve_alias_inner(
        &self,
        name: &str,
        seen: &mut HashSet<String>,
        depth: usize,
    ) -> Result<Vec<String>> {
        if depth > MAX_ALIAS_DEPTH {
            return Err(anyhow!("Alias chain too deep: {} levels", depth));
        }
        if !seen.insert(name.to_string()) {
            return Err(anyhow!("Circular alias reference: {}", name));
        }

        let value = self
            .aliases
            .get(name)
            .ok_or_else(|| anyhow!("Unknown alias: {}", name))?;
        let args = shell_words::split(value)
            .with_context(|| format!("Invalid alias '{}': failed to parse arguments", name))?;

        let mut expanded = Vec::with_capacity(args.len());
        let mut iter = args.into_iter();
        while let Some(arg) = iter.next() {
            let target = match alias_flag(&arg) {
                None => {
                    expanded.push(arg);
                    continue;
                }
                Some(Some(target)) => target,
                Some(None) => iter
                    .next()
                    .ok_or_else(|| anyhow!("Alias '{}' ends with '{}' and no name", name, arg))?,
            };
            expanded.extend(self.resolve_alias_inner(&target, seen, depth + 1)?);
        }

        seen.remove(name);
        Ok(expanded)
    }

    /// Insert defaults after the program name and expand every `-a NAME`.
    pub fn process_args(&self, args: Vec<String>) -> Result<Vec<String>> {
        let mut iter = args.into_iter();
        let mut combined: Vec<String> = iter.next().into_iter().collect();

        if let Some(defaults) = &self.defaults {
            combined.extend(
                shell_words::split(defaults).context("Invalid defaults: failed to parse arguments")?,
            );
        }
        combined.extend(iter);

        let mut processed = Vec::with_capacity(combined.len());
        let mut iter = combined.into_iter();
        while let Some(arg) = iter.next() {
            let name = match alias_flag(&arg) {
                None => {
                    processed.push(arg);
                    continue;
                }
                Some(Some(name)) => name,
                Some(None) => iter
                    .next()
                    .ok_or_else(|| anyhow!("'{}' requires an alias name", arg))?,
            };
            processed.extend(self.resolve_alias(&name)?);
        }

        Ok(processed)
    }

    /// Print where configuration is searched for and what is active.
    pub fn show_config() {
        println!(
            "Configuration precedence: CLI > config file defaults/aliases > LINESIFT_* environment > .env > built-in defaults\n"
        );

        let project = Self::find_project_config();
        let user_paths = Self::user_config_paths();

        println!("Configuration search locations (in precedence order):");
        match &project {
            Some(path) => println!("  1. Project: {} (found)", path.display()),
            None => println!(
                "  1. Project: {} (searched up directory tree, not found)",
                PROJECT_FILE_NAME
            ),
        }
        for (i, path) in user_paths.iter().enumerate() {
            let status = if path.is_file() { "found" } else { "not found" };
            println!("  {}. User: {} ({})", i + 2, path.display(), status);
        }

        match Self::load() {
            Ok(config) => {
                if let Some(defaults) = &config.defaults {
                    println!("\nActive defaults:\n  defaults = {}", defaults);
                }
                if !config.aliases.is_empty() {
                    println!("\nActive aliases:");
                    let mut aliases: Vec<_> = config.aliases.iter().collect();
                    aliases.sort();
                    for (name, value) in aliases {
                        println!("  {} = {}", name, value);
                    }
                }
                if config == Self::default() {
                    println!("\nExample configuration file ({}):", PROJECT_FILE_NAME);
                    println!();
                    println!("# Arguments applied to every linesift command");
                    println!("defaults = --threads 8 --stats");
                    println!();
                    println!("[aliases]");
                    println!("errors = -p 'ERROR|FATAL'");
                    println!("noise-count = -p 'healthcheck|heartbeat' -F count");
                }
            }
            Err(e) => println!("\nError loading configuration: {:#}", e),
        }

        match DotEnv::load_from_cwd() {
            Ok(Some(dotenv)) => println!("\n.env: {} variable(s)", dotenv.vars.len()),
            Ok(None) => println!("\n.env: not found"),
            Err(e) => println!("\n.env: {:#}", e),
        }
    }
}

/// Recognise every spelling clap accepts for `--alias`.
///
/// `Some(None)` means the name is the next argument; `--alias=NAME`,
/// `-aNAME` and `-a=NAME` carry it inline.
fn alias_flag(arg: &str) -> Option<Option<String>> {
    if arg == "-a" || arg == "--alias" {
        return Some(None);
    }
    if let Some(name) = arg.strip_prefix("--alias=") {
        return Some(Some(name.to_string()));
    }
    arg.strip_prefix("-a")
        .filter(|rest| !rest.is_empty())
        .map(|rest| Some(rest.strip_prefix('=').unwrap_or(rest).to_string()))
}

/// Variables read from a `.env` file
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DotEnv {
    pub vars: Vec<(String, String)>,
}

impl DotEnv {
    pub const FILE_NAME: &'static str = ".env";

    /// Load `.env` from the working directory, if there is one.
    pub fn load_from_cwd() -> Result<Option<Self>> {
        let path = Path::new(Self::FILE_NAME);
        if !path.is_file() {
            return Ok(None);
        }
        Self::load_from_path(path).map(Some)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid {}", path.display()))
    }

    /// `KEY=VALUE` per line with an optional `export ` prefix. Values follow
    /// the usual dotenv quoting and comment rules.
    pub fn parse(content: &str) -> Result<Self> {
        let mut vars = Vec::new();

        for (index, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let line = line.strip_prefix("export ").unwrap_or(line);

            let (key, value) = line
                .split_once('=')
                .ok_or_else(|| anyhow!("line {}: expected KEY=VALUE", index + 1))?;
            let key = key.trim();
            if key.is_empty() || key.contains(char::is_whitespace) {
                return Err(anyhow!("line {}: invalid variable name '{}'", index + 1, key));
            }

            let value = parse_dotenv_value(value)
                .map_err(|e| anyhow!("line {}: {} in {}", index + 1, e, key))?;
            vars.push((key.to_string(), value));
        }

        Ok(Self { vars })
    }

    /// Set every variable not already present in the environment.
    ///
    /// Must run before any thread is spawned.
    pub fn apply(&self) -> usize {
        let mut applied = 0;
        for (key, value) in &self.vars {
            if env::var_os(key).is_none() {
                env::set_var(key, value);
                applied += 1;
            }
        }
        applied
    }
}

/// Decode the right-hand side of a `.env` assignment.
///
/// Single quotes are literal, double quotes expand `\n`, `\t`, `\r`, `\"`,
/// `\'` and `\\`. Anything after the closing quote must be a comment. An
/// unquoted value ends at the first `#` that follows whitespace.
fn parse_dotenv_value(raw: &str) -> Result<String> {
    let raw = raw.trim();

    if let Some(rest) = raw.strip_prefix('\'') {
        let end = rest
            .find('\'')
            .ok_or_else(|| anyhow!("unterminated single quote"))?;
        ensure_only_comment(&rest[end + 1..])?;
        return Ok(rest[..end].to_string());
    }

    if let Some(rest) = raw.strip_prefix('"') {
        let mut value = String::with_capacity(rest.len());
        let mut chars = rest.char_indices();
        while let Some((i, c)) = chars.next() {
            match c {
                '"' => {
                    ensure_only_comment(&rest[i + 1..])?;
                    return Ok(value);
                }
                '\\' => match chars.next() {
                    Some((_, 'n')) => value.push('\n'),
                    Some((_, 't')) => value.push('\t'),
                    Some((_, 'r')) => value.push('\r'),
                    Some((_, escaped @ ('"' | '\'' | '\\'))) => value.push(escaped),
                    Some((_, other)) => {
                        value.push('\\');
                        value.push(other);
                    }
                    None => break,
                },
                c => value.push(c),
            }
        }
        return Err(anyhow!("unterminated double quote"));
    }

    let bytes = raw.as_bytes();
    let end = (1..bytes.len())
        .find(|&i| bytes[i] == b'#' && bytes[i - 1].is_ascii_whitespace())
        .unwrap_or(bytes.len());
    Ok(raw[..end].trim_end().to_string())
}

fn ensure_only_comment(trailing: &str) -> Result<()> {
    let trailing = trailing.trim_start();
    if trailing.is_empty() || trailing.starts_with('#') {
        Ok(())
    } else {
        Err(anyhow!("unexpected text after closing quote: '{}'", trailing))
    }
}
