use std::env;
use std::sync::OnceLock;

static LOG_FAILURES: OnceLock<bool> = OnceLock::new();
static FAIL_FAST: OnceLock<bool> = OnceLock::new();

fn parse_bool(value: &str) -> bool {
    let normalized = value.trim().to_ascii_lowercase();
    matches!(normalized.as_str(), "1" | "true" | "yes" | "on")
}

fn read_flag(cell: &'static OnceLock<bool>, name: &str) -> bool {
    *cell.get_or_init(|| match env::var(name) {
        Ok(value) if !value.trim().is_empty() => parse_bool(&value),
        _ => false,
    })
}

/// `LINALG_EXT_LOG_FAILURES`: warn on every operation the batch driver rejects.
pub(crate) fn log_failures_enabled() -> bool {
    read_flag(&LOG_FAILURES, "LINALG_EXT_LOG_FAILURES")
}

/// `LINALG_EXT_FAIL_FAST`: stop the batch driver at the first rejected operation.
pub(crate) fn fail_fast_enabled() -> bool {
    read_flag(&FAIL_FAST, "LINALG_EXT_FAIL_FAST")
}

#[cfg(test)]
mod tests {
    use super::parse_bool;

    #[test]
    fn parse_bool_accepts_common_truthy_spellings() {
        for value in ["1", "true", "TRUE", " yes ", "On"] {
            assert!(parse_bool(value), "{value:?} should parse as true");
        }
    }

    #[test]
    fn parse_bool_rejects_everything_else() {
        for value in ["", "0", "false", "off", "no", "2", "enable"] {
            assert!(!parse_bool(value), "{value:?} should parse as false");
        }
    }
}
