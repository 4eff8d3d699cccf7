//! Entity and period inference from trial balance file names.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

static PERIOD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(20\d{2})(0[1-9]|1[0-2])").expect("valid period pattern"));
static ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)TB_([^_.]+)").expect("valid entity pattern"));

const TB_PREFIX: &str = "TB_";

fn file_name(path: &Path) -> &str {
    path.file_name().and_then(|n| n.to_str()).unwrap_or_default()
}

/// First `YYYYMM` period embedded in the file name.
#[must_use]
pub fn infer_period_from_filename(path: impl AsRef<Path>) -> Option<String> {
    let caps = PERIOD_RE.captures(file_name(path.as_ref()))?;
    Some(format!("{}{}", &caps[1], &caps[2]))
}

/// Entity code following `TB_` in the file name.
#[must_use]
pub fn infer_entity_from_filename(path: impl AsRef<Path>) -> Option<String> {
    ENTITY_RE
        .captures(file_name(path.as_ref()))
        .map(|caps| caps[1].to_string())
}

/// True when `name` has the shape `TB_*_{period}.xlsx`.
#[must_use]
pub fn is_tb_file_for_period(name: &str, period: &str) -> bool {
    let suffix = format!("_{period}.xlsx");
    name.len() >= TB_PREFIX.len() + suffix.len()
        && name.starts_with(TB_PREFIX)
        && name.ends_with(&suffix)
}
