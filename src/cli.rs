//! Command-line interface for ts-analyzer.

use anyhow::Context;
use clap::Parser;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::analysis::{parse_categories, SUPPORTED_EXTENSIONS};
use crate::config::{self, Config};
use crate::detect::{CheckOptions, Pattern, Polarity, Runner};
use crate::report;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

pub const DEFAULT_FILE_GLOB: &str = "**/*.ts";
pub const DEFAULT_FN_TYPES: &str = "exported";

/// Check that TypeScript functions contain (or avoid) a code block.
///
/// Every function of the selected kinds is inspected; functions whose
/// body lacks the code block are reported, or with --invert, functions
/// whose body contains it. A `// @ts-analyzer-ignore` comment on the line
/// above a function skips it.
#[derive(Parser, Debug)]
#[command(name = "ts-analyzer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Code block to check for in functions
    #[arg(long)]
    pub code_block: Option<String>,

    /// Treat the code block as a regular expression (also enabled by `regex: true` in the config)
    #[arg(long)]
    pub regex: bool,

    /// Report functions that DO contain the code block (also enabled by `invert: true` in
    /// the config; the flag cannot turn it off)
    #[arg(long)]
    pub invert: bool,

    /// Glob pattern for files to check [default: **/*.ts]
    #[arg(long)]
    pub file_glob: Option<String>,

    /// Directory to search in
    #[arg(long, default_value = ".")]
    pub dir: PathBuf,

    /// Function types to check: exported, internal, callback (comma-separated) [default: exported]
    #[arg(long)]
    pub fn_types: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Path to config YAML file (default: auto-discover in --dir)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Settings after merging flags over the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub code_block: String,
    pub regex: bool,
    pub invert: bool,
    pub file_glob: String,
    pub fn_types: String,
}

impl Settings {
    /// Flags win over config values; boolean flags are OR-ed with the config.
    pub fn merge(args: &Cli, config: &Config) -> anyhow::Result<Self> {
        let code_block = args
            .code_block
            .clone()
            .or_else(|| config.code_block.clone())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| anyhow::anyhow!("code-block is required"))?;

        Ok(Self {
            code_block,
            regex: args.regex || config.regex.unwrap_or(false),
            invert: args.invert || config.invert.unwrap_or(false),
            file_glob: args
                .file_glob
                .clone()
                .or_else(|| config.file_glob.clone())
                .unwrap_or_else(|| DEFAULT_FILE_GLOB.to_string()),
            fn_types: args
                .fn_types
                .clone()
                .or_else(|| config.fn_types_list())
                .unwrap_or_else(|| DEFAULT_FN_TYPES.to_string()),
        })
    }
}

/// Load the explicit config file, or discover one in `dir`.
fn load_config(args: &Cli) -> anyhow::Result<Config> {
    let path = match &args.config {
        Some(p) => Some(p.clone()),
        None => Config::discover(&args.dir),
    };

    let Some(path) = path else {
        return Ok(Config::default());
    };

    tracing::debug!("Using config {}", path.display());
    let config = Config::parse_file(&path)?;
    config::validate(&config).with_context(|| format!("invalid config {}", path.display()))?;
    Ok(config)
}

/// Collect the source files under `root` that match `file_glob`.
///
/// Relative globs match the path relative to `root`; absolute globs match
/// the absolute path. `node_modules` directories are never entered.
pub fn collect_files(root: &Path, file_glob: &str, config: &Config) -> anyhow::Result<Vec<PathBuf>> {
    let matcher = globset::GlobBuilder::new(file_glob)
        .literal_separator(true)
        .build()
        .with_context(|| format!("invalid file glob {:?}", file_glob))?
        .compile_matcher();
    let absolute_glob = Path::new(file_glob).is_absolute();

    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| !(e.file_type().is_dir() && e.file_name() == "node_modules"))
    {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if !SUPPORTED_EXTENSIONS.contains(&ext) {
            continue;
        }

        let relative = path.strip_prefix(root).unwrap_or(path);
        if config.is_path_excluded(relative) {
            tracing::debug!("Excluded by config: {}", relative.display());
            continue;
        }

        let matched = if absolute_glob {
            matcher.is_match(path)
        } else {
            matcher.is_match(relative)
        };
        if matched {
            files.push(path.to_path_buf());
        }
    }

    files.sort();
    Ok(files)
}

/// Run the analyzer, writing the report to stdout.
pub fn run(args: &Cli) -> anyhow::Result<i32> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_with_output(args, &mut out)
}

/// Run the analyzer, writing the report to `out`.
pub fn run_with_output<W: Write>(args: &Cli, out: &mut W) -> anyhow::Result<i32> {
    // Validate format
    if args.format != "pretty" && args.format != "json" {
        eprintln!("Error: invalid format {:?}, must be 'pretty' or 'json'", args.format);
        return Ok(EXIT_ERROR);
    }

    let config = match load_config(args) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let settings = match Settings::merge(args, &config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let categories = match parse_categories(&settings.fn_types) {
        Ok(c) => c,
        Err(_) => {
            eprintln!(
                "Error: Invalid function types. Use 'exported', 'internal', 'callback', or a comma-separated combination"
            );
            return Ok(EXIT_ERROR);
        }
    };

    let pattern = match Pattern::new(&settings.code_block, settings.regex) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let root = match args.dir.canonicalize() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: cannot access directory {}: {}", args.dir.display(), e);
            return Ok(EXIT_ERROR);
        }
    };

    let files = match collect_files(&root, &settings.file_glob, &config) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error finding files: {:#}", e);
            return Ok(EXIT_ERROR);
        }
    };

    if files.is_empty() {
        eprintln!("No files found matching pattern: {}", settings.file_glob);
        return Ok(EXIT_FAILED);
    }
    tracing::info!("Found {} files to check", files.len());

    let options = CheckOptions::new(pattern, Polarity::from_invert(settings.invert), categories);
    let runner = Runner::new(options)?;
    let result = runner.run(&files);

    match args.format.as_str() {
        "json" => report::write_json(out, runner.options(), &result)?,
        _ => report::write_pretty(out, runner.options(), &result, args.verbose)?,
    }

    if result.passed() {
        Ok(EXIT_SUCCESS)
    } else {
        Ok(EXIT_FAILED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["ts-analyzer"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_collect_files_glob_and_node_modules() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().canonicalize().unwrap();
        write(&root, "a.ts", "");
        write(&root, "src/b.ts", "");
        write(&root, "src/c.tsx", "");
        write(&root, "src/d.js", "");
        write(&root, "node_modules/pkg/index.ts", "");

        let files = collect_files(&root, "**/*.ts", &Config::default()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(&root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(names, vec!["a.ts", "src/b.ts"]);

        let top = collect_files(&root, "*.ts", &Config::default()).unwrap();
        assert_eq!(top.len(), 1);

        let tsx = collect_files(&root, "**/*.{ts,tsx}", &Config::default()).unwrap();
        assert_eq!(tsx.len(), 3);
    }

    #[test]
    fn test_collect_files_absolute_glob() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().canonicalize().unwrap();
        write(&root, "src/a.ts", "");
        write(&root, "other/b.ts", "");

        let glob = format!("{}/src/**/*.ts", root.display());
        let files = collect_files(&root, &glob, &Config::default()).unwrap();
        assert_eq!(files, vec![root.join("src/a.ts")]);

        // a relative glob never sees the absolute prefix
        let files = collect_files(&root, "src/**/*.ts", &Config::default()).unwrap();
        assert_eq!(files, vec![root.join("src/a.ts")]);
    }

    #[test]
    fn test_collect_files_module_extensions() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().canonicalize().unwrap();
        write(&root, "a.ts", "");
        write(&root, "b.mts", "");
        write(&root, "c.cts", "");
        write(&root, "d.mjs", "");

        let mts = collect_files(&root, "*.mts", &Config::default()).unwrap();
        assert_eq!(mts, vec![root.join("b.mts")]);

        let all = collect_files(&root, "*", &Config::default()).unwrap();
        assert_eq!(all, vec![root.join("a.ts"), root.join("b.mts"), root.join("c.cts")]);
    }

    #[cfg(unix)]
    #[test]
    fn test_collect_files_skips_symlink_loop() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().canonicalize().unwrap();
        write(&root, "a.ts", "");
        std::os::unix::fs::symlink(&root, root.join("loop")).unwrap();

        let files = collect_files(&root, "**/*.ts", &Config::default()).unwrap();
        assert_eq!(files, vec![root.join("a.ts")]);
    }

    #[test]
    fn test_run_analyzes_mts_and_cts() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().to_string_lossy().to_string();
        write(temp.path(), "esm.mts", "export const load = () => {
    return 1;
};
");
        write(temp.path(), "cjs.cts", "export function require2() { audit(); }
");

        colored::control::set_override(false);
        let mut out = Vec::new();
        let code = run_with_output(
            &cli(&["--code-block", "audit()", "--dir", &dir, "--file-glob", "*.{mts,cts}"]),
            &mut out,
        )
        .unwrap();
        assert_eq!(code, EXIT_FAILED);

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("esm.mts:1 - Missing required code block"));
        assert!(!text.contains("cjs.cts:"));
    }

    #[test]
    fn test_collect_files_excluded_paths() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().canonicalize().unwrap();
        write(&root, "src/api.ts", "");
        write(&root, "src/generated/api.ts", "");

        let config = Config {
            excluded_paths: vec!["**/generated/**".to_string()],
            ..Default::default()
        };
        let files = collect_files(&root, "**/*.ts", &config).unwrap();
        assert_eq!(files, vec![root.join("src/api.ts")]);
    }

    #[test]
    fn test_settings_merge() {
        let config = Config {
            code_block: Some("fromConfig".to_string()),
            invert: Some(true),
            fn_types: vec!["internal".to_string(), "callback".to_string()],
            ..Default::default()
        };

        let settings = Settings::merge(&cli(&["--code-block", "fromFlag"]), &config).unwrap();
        assert_eq!(settings.code_block, "fromFlag");
        assert!(settings.invert);
        assert!(!settings.regex);
        assert_eq!(settings.fn_types, "internal,callback");
        assert_eq!(settings.file_glob, DEFAULT_FILE_GLOB);

        let defaults = Settings::merge(&cli(&["--code-block", "x"]), &Config::default()).unwrap();
        assert_eq!(defaults.fn_types, DEFAULT_FN_TYPES);

        assert!(Settings::merge(&cli(&[]), &Config::default()).is_err());
    }

    #[test]
    fn test_run_exit_codes() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().to_string_lossy().to_string();
        write(temp.path(), "ok.ts", "export function ok() { requiredCode(); }\n");

        let mut out = Vec::new();
        let code = run_with_output(&cli(&["--code-block", "requiredCode", "--dir", &dir]), &mut out).unwrap();
        assert_eq!(code, EXIT_SUCCESS);

        write(temp.path(), "bad.ts", "export function bad() {}\n");
        let mut out = Vec::new();
        let code = run_with_output(&cli(&["--code-block", "requiredCode", "--dir", &dir]), &mut out).unwrap();
        assert_eq!(code, EXIT_FAILED);
        assert!(String::from_utf8_lossy(&out).contains("Missing required code block"));

        let mut out = Vec::new();
        let code = run_with_output(
            &cli(&["--code-block", "requiredCode", "--dir", &dir, "--file-glob", "**/*.mts"]),
            &mut out,
        )
        .unwrap();
        assert_eq!(code, EXIT_FAILED);
        assert!(out.is_empty());
    }

    #[test]
    fn test_run_usage_errors() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().to_string_lossy().to_string();
        write(temp.path(), "a.ts", "export function a() {}\n");
        let mut out = Vec::new();

        let bad_regex = cli(&["--code-block", "getContext(", "--regex", "--dir", &dir]);
        assert_eq!(run_with_output(&bad_regex, &mut out).unwrap(), EXIT_ERROR);

        let bad_types = cli(&["--code-block", "x", "--fn-types", "public", "--dir", &dir]);
        assert_eq!(run_with_output(&bad_types, &mut out).unwrap(), EXIT_ERROR);

        let bad_format = cli(&["--code-block", "x", "--format", "xml", "--dir", &dir]);
        assert_eq!(run_with_output(&bad_format, &mut out).unwrap(), EXIT_ERROR);

        let missing = cli(&["--dir", &dir]);
        assert_eq!(run_with_output(&missing, &mut out).unwrap(), EXIT_ERROR);

        assert!(out.is_empty());
    }

    #[test]
    fn test_run_uses_discovered_config() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().to_string_lossy().to_string();
        write(temp.path(), ".ts-analyzer.yaml", "code_block: forbiddenCode\ninvert: true\n");
        write(temp.path(), "a.ts", "export function a() { forbiddenCode(); }\n");

        let mut out = Vec::new();
        let code = run_with_output(&cli(&["--dir", &dir, "--format", "json"]), &mut out).unwrap();
        assert_eq!(code, EXIT_FAILED);

        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json["polarity"], "forbid");
        assert_eq!(json["files"][0]["issues"][0]["kind"], "forbidden");
    }
}
