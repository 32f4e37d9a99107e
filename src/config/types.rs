use serde::Deserialize;

/// Main configuration structure for pagebench
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub harvest: HarvestConfig,
    #[serde(default)]
    pub convert: ConvertConfig,
    #[serde(default)]
    pub bench: BenchConfig,
}

/// Which rendering backend fetches pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RendererKind {
    /// Plain HTTP GET, title read from the `<title>` element
    #[default]
    Http,
    /// Headless Chromium (requires the `chromium` cargo feature)
    Chromium,
}

/// Lifetime of rendering contexts across fetches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContextPolicy {
    /// Launch a fresh context for every fetch and close it afterwards
    #[default]
    PerFetch,
    /// Keep idle contexts around and hand them to later fetches
    Reuse,
}

/// How far page loading must progress before the document is read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WaitCondition {
    /// The initial document has been parsed; subresources may still load
    #[default]
    DomContentLoaded,
    /// The page and all its subresources have loaded
    Load,
}

/// Page harvesting configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HarvestConfig {
    /// Page whose links make up the corpus
    #[serde(rename = "seed-url", default = "default_seed_url")]
    pub seed_url: String,

    /// Maximum number of distinct links to fetch
    #[serde(rename = "page-count", default = "default_page_count")]
    pub page_count: usize,

    /// Fetches dispatched together; also the concurrency ceiling
    #[serde(rename = "batch-size", default = "default_batch_size")]
    pub batch_size: usize,

    /// Per-page navigation timeout (milliseconds)
    #[serde(rename = "timeout-ms", default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Directory receiving the harvested `.html` files
    #[serde(rename = "output-dir", default = "default_pages_dir")]
    pub output_dir: String,

    #[serde(default)]
    pub renderer: RendererKind,

    #[serde(rename = "context-policy", default)]
    pub context_policy: ContextPolicy,

    /// Load stage a navigation waits for
    #[serde(rename = "wait-until", default)]
    pub wait_until: WaitCondition,

    /// Extra arguments passed to the browser on launch
    #[serde(rename = "browser-args", default = "default_browser_args")]
    pub browser_args: Vec<String>,

    /// User agent sent by the HTTP renderer
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,
}

/// Batch conversion configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ConvertConfig {
    /// Document-conversion program invoked once per file
    #[serde(default = "default_convert_program")]
    pub program: String,

    /// Input format passed as `--from`
    #[serde(default = "default_convert_from")]
    pub from: String,

    /// Output format passed as `--to`
    #[serde(default = "default_convert_to")]
    pub to: String,

    /// Directory receiving the converted `.md` files
    #[serde(rename = "output-dir", default = "default_convert_output_dir")]
    pub output_dir: String,

    /// Maximum number of conversion processes alive at once
    #[serde(default = "default_convert_concurrency")]
    pub concurrency: usize,
}

/// Benchmark run configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BenchConfig {
    /// Warmup rounds per command
    #[serde(default = "default_warmup")]
    pub warmup: u32,

    /// Timed rounds per command
    #[serde(default = "default_runs")]
    pub runs: u32,

    /// Where the Markdown report is written
    #[serde(rename = "report-path", default = "default_report_path")]
    pub report_path: String,

    /// Tools that must answer `--version` before anything runs
    #[serde(rename = "required-tools", default = "default_required_tools")]
    pub required_tools: Vec<String>,

    /// Shell commands run once before timing (e.g. a release build)
    #[serde(default = "default_prepare")]
    pub prepare: Vec<String>,

    /// Converter commands handed to the timing tool
    #[serde(rename = "command", default = "default_commands")]
    pub commands: Vec<CommandEntry>,

    /// Version probes listed in the report
    #[serde(rename = "version", default = "default_versions")]
    pub versions: Vec<CommandEntry>,
}

/// A named shell command
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommandEntry {
    pub name: String,
    pub command: String,
}

impl CommandEntry {
    pub fn new(name: &str, command: &str) -> Self {
        Self {
            name: name.to_string(),
            command: command.to_string(),
        }
    }
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            seed_url: default_seed_url(),
            page_count: default_page_count(),
            batch_size: default_batch_size(),
            timeout_ms: default_timeout_ms(),
            output_dir: default_pages_dir(),
            renderer: RendererKind::default(),
            context_policy: ContextPolicy::default(),
            wait_until: WaitCondition::default(),
            browser_args: default_browser_args(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            program: default_convert_program(),
            from: default_convert_from(),
            to: default_convert_to(),
            output_dir: default_convert_output_dir(),
            concurrency: default_convert_concurrency(),
        }
    }
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            warmup: default_warmup(),
            runs: default_runs(),
            report_path: default_report_path(),
            required_tools: default_required_tools(),
            prepare: default_prepare(),
            commands: default_commands(),
            versions: default_versions(),
        }
    }
}

fn default_seed_url() -> String {
    "https://en.wikipedia.org/wiki/Rust_(programming_language)".to_string()
}

fn default_page_count() -> usize {
    200
}

fn default_batch_size() -> usize {
    10
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_pages_dir() -> String {
    "bench/bench-pages".to_string()
}

fn default_browser_args() -> Vec<String> {
    vec!["--lang=en-US".to_string()]
}

fn default_user_agent() -> String {
    format!("pagebench/{}", env!("CARGO_PKG_VERSION"))
}

fn default_convert_program() -> String {
    "pandoc".to_string()
}

fn default_convert_from() -> String {
    "html".to_string()
}

fn default_convert_to() -> String {
    "markdown".to_string()
}

fn default_convert_output_dir() -> String {
    "bench/bench-out/pandoc".to_string()
}

fn default_convert_concurrency() -> usize {
    50
}

fn default_warmup() -> u32 {
    3
}

fn default_runs() -> u32 {
    5
}

fn default_report_path() -> String {
    "bench/README.md".to_string()
}

fn default_required_tools() -> Vec<String> {
    vec!["hyperfine".to_string(), "pandoc".to_string()]
}

fn default_prepare() -> Vec<String> {
    vec!["cargo build --release".to_string()]
}

fn default_commands() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "htmd",
            "cargo run --release -- ./bench/bench-pages -o ./bench/bench-out/htmd",
        ),
        CommandEntry::new("turndown", "bun bench/turndownCli.ts ./bench/bench-pages"),
        CommandEntry::new("pandoc", "pagebench convert ./bench/bench-pages"),
    ]
}

fn default_versions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new("Hyperfine", "hyperfine --version"),
        CommandEntry::new("Pandoc", "pandoc -v"),
    ]
}
